use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use log::info;
use sqlx::PgPool;

use crate::config::ZipCodeConfig;
use crate::db::{ExecutionReport, copy_csv_into, execute_plan};
use crate::statements::SqlStatement;

pub const ZIP_CODE_TABLE: &str = "zip_codes";

pub fn create_table_statement() -> SqlStatement {
    SqlStatement::new(
        include_str!("../../sql/zip_codes/create_table.sql"),
        "Create zip_codes table",
    )
}

pub fn create_search_function_statement() -> SqlStatement {
    SqlStatement::new(
        include_str!("../../sql/zip_codes/create_search_function.sql"),
        "Create zip code search function",
    )
}

/// Last path segment of `url`, without query string or fragment.
pub fn file_name_from_url(url: &str) -> Result<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() && path.contains('/') => Ok(name.to_string()),
        _ => bail!("Cannot derive a file name from {}", url),
    }
}

/// Download the zip-code CSV into `dir`, reusing a non-empty file that is
/// already there.
pub async fn download_zip_code_csv(url: &str, dir: &Path) -> Result<PathBuf> {
    let dest = dir.join(file_name_from_url(url)?);
    if let Ok(meta) = tokio::fs::metadata(&dest).await {
        if meta.is_file() && meta.len() > 0 {
            info!("  - Reusing {} ({} bytes)", dest.display(), meta.len());
            return Ok(dest);
        }
    }

    info!("  - Downloading {} to {}", url, dest.display());
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(120))
        .build()
        .context("Failed to build HTTP client")?;
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Error while downloading {}", url))?
        .error_for_status()
        .with_context(|| format!("Error while downloading {}", url))?;
    let bytes = response
        .bytes()
        .await
        .with_context(|| format!("Error while downloading {}", url))?;
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    tokio::fs::write(&dest, &bytes)
        .await
        .with_context(|| format!("Error while creating {}", dest.display()))?;
    info!("  - Wrote {} bytes", bytes.len());
    Ok(dest)
}

pub async fn install_zip_codes(pool: &PgPool, cfg: &ZipCodeConfig) -> Result<ExecutionReport> {
    info!("Adding zip codes extension");
    let started = Instant::now();

    // Download before touching the database so a bad URL leaves the table alone.
    let csv_path = download_zip_code_csv(&cfg.url, Path::new(&cfg.download_dir)).await?;

    let mut report = execute_plan(pool, &[create_table_statement()]).await?;

    info!("Importing zip codes into {} table", ZIP_CODE_TABLE);
    let imported = copy_csv_into(pool, ZIP_CODE_TABLE, &csv_path.to_string_lossy())
        .await
        .context("Importing zip codes into zip_codes table")?;
    info!("  - Imported {} zip codes", imported);

    let function = execute_plan(pool, &[create_search_function_statement()]).await?;

    report.statements += function.statements + 1;
    report.rows_affected += function.rows_affected + imported;
    report.elapsed = started.elapsed();
    Ok(report)
}
