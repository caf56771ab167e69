use anyhow::{Context, Result};
use sqlx::{PgPool, Row};

use crate::models::{MatchSuggestion, RkMapping};
use crate::statements::{RK_MAPPING_TABLE, SEARCH_VIEW, unmatched_rks_statements};

/// Map one result row of the suggestion query, where `''` and `-1` mean
/// "no candidate below the cutoff".
pub(crate) fn suggestion_from_row(
    rk_name: String,
    possible_match: String,
    company_id: i32,
    similarity: i32,
) -> MatchSuggestion {
    if company_id == -1 && possible_match.is_empty() {
        return MatchSuggestion::unmatched(rk_name);
    }
    MatchSuggestion {
        rk_name,
        possible_match: Some(possible_match),
        company_id: Some(company_id),
        distance: (similarity >= 0).then_some(similarity),
    }
}

/// Run the SQL suggestion query. Temp tables are session scoped, so every
/// statement goes through the same connection.
pub async fn fetch_unmatched_suggestions(
    pool: &PgPool,
    cutoff: usize,
) -> Result<Vec<MatchSuggestion>> {
    let stmts = unmatched_rks_statements(cutoff);
    let mut conn = pool.acquire().await.context("Failed to acquire connection")?;

    for stmt in &stmts.setup {
        log::debug!("{}", stmt.description);
        sqlx::raw_sql(&stmt.sql)
            .execute(&mut *conn)
            .await
            .with_context(|| format!("Statement failed: {}", stmt.description))?;
    }

    log::info!("{}", stmts.query.description);
    let rows = sqlx::query(&stmts.query.sql)
        .persistent(false)
        .fetch_all(&mut *conn)
        .await
        .with_context(|| format!("Query failed: {}", stmts.query.description))?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        out.push(suggestion_from_row(
            row.try_get("rk_name")?,
            row.try_get("possible_match_name")?,
            row.try_get("possible_match_id")?,
            row.try_get("match_similarity")?,
        ));
    }

    for stmt in &stmts.cleanup {
        sqlx::raw_sql(&stmt.sql)
            .execute(&mut *conn)
            .await
            .with_context(|| format!("Statement failed: {}", stmt.description))?;
    }
    Ok(out)
}

pub async fn fetch_unmatched_names(pool: &PgPool) -> Result<Vec<String>> {
    let sql = format!(
        "SELECT DISTINCT rk_name FROM {} WHERE rk_name IS NOT NULL AND rk_company_id IS NULL",
        SEARCH_VIEW
    );
    sqlx::query_scalar::<_, String>(&sql)
        .fetch_all(pool)
        .await
        .context("Failed to fetch unmatched recordkeeper names")
}

pub async fn fetch_rk_mappings(pool: &PgPool) -> Result<Vec<RkMapping>> {
    let sql = format!(
        "SELECT sched_c_provider_name, fbi_company_id FROM {}",
        RK_MAPPING_TABLE
    );
    sqlx::query_as::<_, RkMapping>(&sql)
        .fetch_all(pool)
        .await
        .with_context(|| format!("Failed to fetch {}", RK_MAPPING_TABLE))
}
