use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "database.host",
            });
        }
        if self.username.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "database.username",
            });
        }
        if self.database.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "database.database",
            });
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "database.port",
                reason: format!("{} is out of range", self.port),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .finish()
    }
}

/// Inputs of the search-table rebuild.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct RebuildConfig {
    /// Dataset section suffix of the yearly tables, e.g. `latest` or `all`.
    pub section: String,
    pub years: Vec<String>,
    pub rk_mapping_file: Option<String>,
    pub dry_run: bool,
}

impl RebuildConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        crate::statements::validate_ident(&self.section).map_err(|e| {
            ConfigError::InvalidValue {
                field: "rebuild.section",
                reason: e.to_string(),
            }
        })?;
        if self.years.is_empty() {
            return Err(ConfigError::MissingField {
                field: "rebuild.years",
            });
        }
        for year in &self.years {
            crate::statements::validate_year(year).map_err(|e| {
                ConfigError::InvalidValue {
                    field: "rebuild.years",
                    reason: e.to_string(),
                }
            })?;
        }
        Ok(())
    }
}

pub const DEFAULT_MATCH_CUTOFF: usize = 6;
pub const DEFAULT_REPORT_PATH: &str = "unmatched_rks.csv";

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ReportConfig {
    pub out_path: String,
    /// Suggestions are kept only when their edit distance is below this value.
    pub cutoff: usize,
    pub in_process: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            out_path: DEFAULT_REPORT_PATH.into(),
            cutoff: DEFAULT_MATCH_CUTOFF,
            in_process: false,
        }
    }
}

impl ReportConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.out_path.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "report.out_path",
            });
        }
        if self.cutoff == 0 {
            return Err(ConfigError::InvalidValue {
                field: "report.cutoff",
                reason: "must be > 0".into(),
            });
        }
        Ok(())
    }
}

#[derive(Clone, Serialize, Deserialize, Default)]
pub struct JiraConfig {
    pub base_url: String,
    pub project_key: String,
    pub creator: String,
    pub token: String,
    pub assignee: Option<String>,
}

impl JiraConfig {
    /// Returns `None` unless both credentials are present.
    pub fn from_parts(
        base_url: String,
        project_key: String,
        creator: Option<String>,
        token: Option<String>,
        assignee: Option<String>,
    ) -> Result<Option<Self>, ConfigError> {
        let (creator, token) = match (creator, token) {
            (Some(c), Some(t)) if !c.trim().is_empty() && !t.trim().is_empty() => (c, t),
            _ => return Ok(None),
        };
        if base_url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "jira.base_url",
            });
        }
        if project_key.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "jira.project_key",
            });
        }
        Ok(Some(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            project_key,
            creator,
            token,
            assignee: assignee.filter(|a| !a.trim().is_empty()),
        }))
    }
}

impl std::fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraConfig")
            .field("base_url", &self.base_url)
            .field("project_key", &self.project_key)
            .field("creator", &self.creator)
            .field("token", &"<redacted>")
            .field("assignee", &self.assignee)
            .finish()
    }
}

pub const DEFAULT_ZIP_CODE_URL: &str =
    "https://raw.githubusercontent.com/jdcalvin/form5500-data-sets-import/master/form5500/zipcode.csv";

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ZipCodeConfig {
    pub url: String,
    pub download_dir: String,
}

impl Default for ZipCodeConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ZIP_CODE_URL.into(),
            download_dir: ".".into(),
        }
    }
}

impl ZipCodeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "zip_codes.url",
                reason: format!("not an http(s) url: {}", self.url),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> DatabaseConfig {
        DatabaseConfig {
            username: "etl".into(),
            password: "s3cret".into(),
            host: "localhost".into(),
            port: 5432,
            database: "form5500".into(),
        }
    }

    #[test]
    fn debug_redacts_password() {
        let s = format!("{:?}", db());
        assert!(!s.contains("s3cret"));
        assert!(s.contains("<redacted>"));
    }

    #[test]
    fn database_requires_host() {
        let mut cfg = db();
        cfg.host = " ".into();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::MissingField {
                field: "database.host"
            })
        ));
    }

    #[test]
    fn rebuild_rejects_bad_year_and_section() {
        let mut cfg = RebuildConfig {
            section: "latest".into(),
            years: vec!["2019".into(), "2020".into()],
            rk_mapping_file: None,
            dry_run: false,
        };
        assert!(cfg.validate().is_ok());

        cfg.years = vec!["20x9".into()];
        assert!(cfg.validate().is_err());

        cfg.years = vec![];
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::MissingField {
                field: "rebuild.years"
            })
        ));

        cfg.years = vec!["2019".into()];
        cfg.section = "latest; drop table x".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn jira_needs_both_credentials() {
        let none = JiraConfig::from_parts(
            "https://jira.example.com".into(),
            "DATA".into(),
            Some("me@example.com".into()),
            None,
            None,
        )
        .unwrap();
        assert!(none.is_none());

        let some = JiraConfig::from_parts(
            "https://jira.example.com/".into(),
            "DATA".into(),
            Some("me@example.com".into()),
            Some("tok-123".into()),
            Some("".into()),
        )
        .unwrap()
        .unwrap();
        assert_eq!(some.base_url, "https://jira.example.com");
        assert!(some.assignee.is_none());
        assert!(!format!("{:?}", some).contains("tok-123"));
    }

    #[test]
    fn jira_with_credentials_needs_project() {
        let err = JiraConfig::from_parts(
            "https://jira.example.com".into(),
            "".into(),
            Some("me".into()),
            Some("tok".into()),
            None,
        );
        assert!(err.is_err());
    }

    #[test]
    fn report_cutoff_must_be_positive() {
        let cfg = ReportConfig {
            cutoff: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
        assert!(ReportConfig::default().validate().is_ok());
    }

    #[test]
    fn zip_url_must_be_http() {
        let cfg = ZipCodeConfig {
            url: "ftp://example.com/zip.csv".into(),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
        assert!(ZipCodeConfig::default().validate().is_ok());
    }
}
