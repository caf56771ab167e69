//! High-level workflows behind each CLI command.

pub mod summary;

use std::io::Write;

use anyhow::{Context, Result};
use log::{info, warn};
use sqlx::PgPool;

use crate::config::{JiraConfig, RebuildConfig, ReportConfig, ZipCodeConfig};
use crate::db::{self, ExecutionReport};
use crate::export::write_unmatched_report;
use crate::extensions::{self, Extension};
use crate::import::{read_rk_mappings, validate_csv_file};
use crate::matching::suggest_matches;
use crate::models::{MatchSuggestion, RkMapping};
use crate::statements::{SqlStatement, rebuild_plan};
use summary::RunSummary;

/// Mapping rows to load, or `None` when no usable file was given.
pub fn load_rk_mappings(
    path: Option<&str>,
    summary: &mut RunSummary,
) -> Result<Option<Vec<RkMapping>>> {
    let Some(path) = path else {
        info!("No rk mapping file given; keeping the existing mapping table");
        return Ok(None);
    };
    if let Err(e) = validate_csv_file(path) {
        warn!("could not find rk mapping file ({}); keeping the existing mapping table", e);
        summary.note(format!("rk mapping file skipped: {}", e));
        return Ok(None);
    }
    let import = read_rk_mappings(path)?;
    info!(
        "Read {} rk mappings from {} ({} rows skipped)",
        import.rows.len(),
        path,
        import.skipped
    );
    if import.truncated {
        summary.note(format!(
            "{} stopped at an empty line; {} mappings imported",
            path,
            import.rows.len()
        ));
    }
    Ok(Some(import.rows))
}

pub fn plan_rebuild(cfg: &RebuildConfig, summary: &mut RunSummary) -> Result<Vec<SqlStatement>> {
    cfg.validate()?;
    let mappings = load_rk_mappings(cfg.rk_mapping_file.as_deref(), summary)?;
    rebuild_plan(&cfg.section, &cfg.years, mappings.as_deref())
}

/// Dry-run output: one commented description line, then the statement.
pub fn print_plan<W: Write>(out: &mut W, plan: &[SqlStatement]) -> std::io::Result<()> {
    for stmt in plan {
        writeln!(out, "-- {}", stmt.description)?;
        writeln!(out, "{}", stmt.sql)?;
        writeln!(out)?;
    }
    Ok(())
}

pub async fn rebuild_search_table(
    pool: &PgPool,
    plan: &[SqlStatement],
    summary: &mut RunSummary,
) -> Result<ExecutionReport> {
    info!("Building form_5500_search table ({} statements)...", plan.len());
    let report = db::execute_plan(pool, plan).await?;
    info!(
        "Rebuild complete: {} statements in {:.2?}",
        report.statements, report.elapsed
    );
    summary.record(&report);
    Ok(report)
}

pub async fn collect_suggestions(
    pool: &PgPool,
    cfg: &ReportConfig,
) -> Result<Vec<MatchSuggestion>> {
    if cfg.in_process {
        let names = db::fetch_unmatched_names(pool).await?;
        let registry = db::fetch_rk_mappings(pool).await?;
        info!(
            "Scoring {} unmatched names against {} known providers in process",
            names.len(),
            registry.len()
        );
        Ok(suggest_matches(&names, &registry, cfg.cutoff))
    } else {
        db::fetch_unmatched_suggestions(pool, cfg.cutoff).await
    }
}

/// Write the report and, when Jira is configured, open a ticket for it.
pub async fn find_unmatched_rks(
    pool: &PgPool,
    cfg: &ReportConfig,
    jira: Option<&JiraConfig>,
    summary: &mut RunSummary,
) -> Result<usize> {
    cfg.validate()?;
    let suggestions = collect_suggestions(pool, cfg).await?;
    let with_match = suggestions.iter().filter(|s| s.has_match()).count();
    let written = write_unmatched_report(&cfg.out_path, &suggestions)
        .with_context(|| format!("Failed to write {}", cfg.out_path))?;
    info!(
        "Wrote {} unmatched recordkeepers to {} ({} with a suggested match)",
        written, cfg.out_path, with_match
    );
    summary.note(format!(
        "{} unmatched, {} with suggestions -> {}",
        written, with_match, cfg.out_path
    ));

    match jira {
        Some(jira_cfg) if written > 0 => {
            let issue = crate::jira::create_unmatched_issue(jira_cfg, &cfg.out_path, written)
                .await
                .context("Failed to create Jira issue")?;
            summary.note(format!("Jira issue {}", issue.key));
        }
        Some(_) => info!("No unmatched recordkeepers; no Jira issue created"),
        None => info!("Jira not configured; no issue created"),
    }
    Ok(written)
}

pub async fn install_extension(
    pool: &PgPool,
    extension: Extension,
    zip_cfg: &ZipCodeConfig,
    summary: &mut RunSummary,
) -> Result<ExecutionReport> {
    zip_cfg.validate()?;
    let report = extensions::run_extension(pool, extension, zip_cfg)
        .await
        .with_context(|| format!("Extension {} failed", extension))?;
    summary.record(&report);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(file: Option<String>) -> RebuildConfig {
        RebuildConfig {
            section: "latest".into(),
            years: vec!["2020".into()],
            rk_mapping_file: file,
            dry_run: true,
        }
    }

    #[test]
    fn missing_mapping_file_is_skipped() {
        let mut summary = RunSummary::start("rebuild");
        let plan = plan_rebuild(&cfg(Some("/nonexistent/rk.csv".into())), &mut summary).unwrap();
        assert!(!plan.iter().any(|s| s.sql.contains("CREATE TABLE sched_c_provider")));
        assert!(plan.iter().any(|s| s.sql.contains("SET rk_company_id")));
        assert_eq!(summary.notes.len(), 1);
    }

    #[test]
    fn mapping_file_rows_become_inserts() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "sched_c_provider_name,fbi_company_id").unwrap();
        writeln!(f, "JOHN HANCOCK,3").unwrap();
        writeln!(f, "O'NEIL PARTNERS,4").unwrap();
        f.flush().unwrap();

        let mut summary = RunSummary::start("rebuild");
        let path = f.path().to_string_lossy().into_owned();
        let plan = plan_rebuild(&cfg(Some(path)), &mut summary).unwrap();
        let inserts: Vec<_> = plan
            .iter()
            .filter(|s| s.sql.starts_with("INSERT INTO sched_c_provider"))
            .collect();
        assert_eq!(inserts.len(), 2);
        assert!(inserts[1].sql.contains("'O''NEIL PARTNERS',4"));
        assert!(summary.notes.is_empty());
    }

    #[test]
    fn duplicate_mapping_names_insert_once() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "FIDELITY,1").unwrap();
        writeln!(f, " FIDELITY ,2").unwrap();
        f.flush().unwrap();

        let mut summary = RunSummary::start("rebuild");
        let path = f.path().to_string_lossy().into_owned();
        let plan = plan_rebuild(&cfg(Some(path)), &mut summary).unwrap();
        let inserts: Vec<_> = plan
            .iter()
            .filter(|s| s.sql.starts_with("INSERT INTO sched_c_provider"))
            .collect();
        assert_eq!(inserts.len(), 1);
        assert!(inserts[0].sql.contains("'FIDELITY',1"));
    }

    #[test]
    fn malformed_mapping_file_aborts() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "A,1").unwrap();
        writeln!(f, "B").unwrap();
        f.flush().unwrap();
        let mut summary = RunSummary::start("rebuild");
        let path = f.path().to_string_lossy().into_owned();
        assert!(plan_rebuild(&cfg(Some(path)), &mut summary).is_err());
    }

    #[test]
    fn invalid_config_fails_before_planning() {
        let mut c = cfg(None);
        c.years = vec!["twenty".into()];
        let mut summary = RunSummary::start("rebuild");
        let err = plan_rebuild(&c, &mut summary).unwrap_err();
        match err.downcast_ref::<crate::error::ConfigError>() {
            Some(crate::error::ConfigError::InvalidValue { field, reason }) => {
                assert_eq!(*field, "rebuild.years");
                assert_eq!(reason, "Invalid year: \"twenty\"");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn print_plan_comments_descriptions() {
        let plan = vec![SqlStatement::new("SELECT 1;", "ping")];
        let mut out = Vec::new();
        print_plan(&mut out, &plan).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "-- ping\nSELECT 1;\n\n");
    }
}
