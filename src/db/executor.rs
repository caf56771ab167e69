use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{debug, info};
use sqlx::PgPool;

use crate::statements::{SqlStatement, validate_ident};

#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    pub statements: usize,
    pub rows_affected: u64,
    pub elapsed: Duration,
}

/// Run a plan in order inside one transaction. The first failure rolls the
/// whole plan back, so a failed rebuild leaves the previous tables in place.
pub async fn execute_plan(pool: &PgPool, plan: &[SqlStatement]) -> Result<ExecutionReport> {
    let started = Instant::now();
    let mut report = ExecutionReport::default();
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    for (idx, stmt) in plan.iter().enumerate() {
        info!("[{}/{}] {}", idx + 1, plan.len(), stmt.description);
        debug!("{}", stmt.sql);
        let t0 = Instant::now();
        let res = sqlx::raw_sql(&stmt.sql)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Statement failed: {}", stmt.description))?;
        debug!(
            "  {} rows in {:.2?}",
            res.rows_affected(),
            t0.elapsed()
        );
        report.rows_affected += res.rows_affected();
        report.statements += 1;
    }

    tx.commit().await.context("Failed to commit rebuild")?;
    report.elapsed = started.elapsed();
    Ok(report)
}

fn copy_statement(table: &str) -> String {
    format!("COPY {} FROM STDIN WITH (FORMAT csv, HEADER true)", table)
}

/// Stream a CSV file with a header line into `table` via `COPY ... FROM STDIN`.
pub async fn copy_csv_into(pool: &PgPool, table: &str, path: &str) -> Result<u64> {
    validate_ident(table)?;
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path))?;

    let mut conn = pool
        .acquire()
        .await
        .context("Failed to acquire connection for COPY")?;
    let mut copy = conn
        .copy_in_raw(&copy_statement(table))
        .await
        .with_context(|| format!("Failed to start COPY into {}", table))?;
    for chunk in data.chunks(64 * 1024) {
        copy.send(chunk)
            .await
            .with_context(|| format!("COPY into {} failed", table))?;
    }
    let rows = copy
        .finish()
        .await
        .with_context(|| format!("Failed to finish COPY into {}", table))?;
    Ok(rows)
}
