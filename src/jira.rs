//! Opens a tracking ticket for the unmatched recordkeeper report.

use std::path::Path;
use std::time::Duration;

use log::info;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::config::JiraConfig;
use crate::error::JiraError;

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedIssue {
    pub id: String,
    pub key: String,
}

pub fn issue_payload(cfg: &JiraConfig, report_name: &str, unmatched: usize) -> Value {
    let mut fields = json!({
        "project": { "key": cfg.project_key },
        "issuetype": { "name": "Task" },
        "summary": format!("Map {} unmatched Form 5500 recordkeepers", unmatched),
        "description": format!(
            "{} recordkeeper names in form5500_search_view have no company id.\n\
             Suggested matches are in the attached {}. Add confirmed rows to the \
             recordkeeper mapping file and rebuild the search table.",
            unmatched, report_name
        ),
    });
    if let Some(assignee) = &cfg.assignee {
        fields["assignee"] = json!({ "name": assignee });
    }
    json!({ "fields": fields })
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, JiraError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(JiraError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Create the issue and attach the report to it.
pub async fn create_unmatched_issue(
    cfg: &JiraConfig,
    report_path: &str,
    unmatched: usize,
) -> Result<CreatedIssue, JiraError> {
    let report_name = Path::new(report_path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| report_path.to_string());
    let report = tokio::fs::read(report_path)
        .await
        .map_err(|source| JiraError::Report {
            path: report_path.to_string(),
            source,
        })?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let response = client
        .post(format!("{}/rest/api/2/issue", cfg.base_url))
        .basic_auth(&cfg.creator, Some(&cfg.token))
        .json(&issue_payload(cfg, &report_name, unmatched))
        .send()
        .await?;
    let issue: CreatedIssue = check(response).await?.json().await?;
    info!("Created Jira issue {}", issue.key);

    let form = Form::new().part(
        "file",
        Part::bytes(report)
            .file_name(report_name)
            .mime_str("text/csv")?,
    );
    let response = client
        .post(format!(
            "{}/rest/api/2/issue/{}/attachments",
            cfg.base_url, issue.key
        ))
        .basic_auth(&cfg.creator, Some(&cfg.token))
        .header("X-Atlassian-Token", "no-check")
        .multipart(form)
        .send()
        .await?;
    check(response).await?;
    info!("Attached report to {}", issue.key);
    Ok(issue)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(assignee: Option<&str>) -> JiraConfig {
        JiraConfig {
            base_url: "https://jira.example.com".into(),
            project_key: "DATA".into(),
            creator: "etl@example.com".into(),
            token: "t".into(),
            assignee: assignee.map(str::to_string),
        }
    }

    #[test]
    fn payload_names_count_and_report() {
        let v = issue_payload(&cfg(None), "unmatched_rks.csv", 12);
        assert_eq!(v["fields"]["project"]["key"], "DATA");
        assert_eq!(v["fields"]["issuetype"]["name"], "Task");
        assert_eq!(
            v["fields"]["summary"],
            "Map 12 unmatched Form 5500 recordkeepers"
        );
        assert!(
            v["fields"]["description"]
                .as_str()
                .unwrap()
                .contains("unmatched_rks.csv")
        );
        assert!(v["fields"].get("assignee").is_none());
    }

    #[test]
    fn payload_sets_assignee() {
        let v = issue_payload(&cfg(Some("jdoe")), "r.csv", 1);
        assert_eq!(v["fields"]["assignee"]["name"], "jdoe");
    }

    #[tokio::test]
    async fn missing_report_is_reported_before_any_request() {
        let err = create_unmatched_issue(&cfg(None), "/nonexistent/unmatched_rks.csv", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, JiraError::Report { .. }));
    }
}
