//! SQL generation for the search-table rebuild and the unmatched report.
//!
//! Every function here is pure: it returns [`SqlStatement`] values and never
//! touches a connection. Section and year values are interpolated into table
//! names, so callers validate them with [`validate_ident`] / [`validate_year`]
//! before building a plan.

pub mod rk_mapping;
pub mod schedules;
pub mod search_table;
pub mod unmatched;

use anyhow::{Result, bail};

use crate::models::{RkMapping, table_mappings};

pub use rk_mapping::{
    RK_MAPPING_TABLE, drop_and_create_rk_mapping_table, insert_rk_mapping, update_rk_mappings,
};
pub use schedules::{remove_no_asset_records, update_from_schedules};
pub use search_table::{
    SEARCH_TABLE, SEARCH_VIEW, create_index, create_materialized_view,
    drop_and_create_search_table, insert_union, select_long_form, select_short_form,
};
pub use unmatched::unmatched_rks_statements;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlStatement {
    pub sql: String,
    pub description: String,
}

impl SqlStatement {
    pub fn new(sql: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            description: description.into(),
        }
    }
}

pub fn validate_ident(name: &str) -> Result<()> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        bail!("Invalid identifier: {:?}", name);
    }
    Ok(())
}

pub fn validate_year(year: &str) -> Result<()> {
    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        bail!("Invalid year: {:?}", year);
    }
    Ok(())
}

pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Full ordered rebuild plan.
///
/// `mappings` is `Some` only when the mapping CSV validated; in that case the
/// mapping table is rebuilt from it before recordkeeper ids are applied.
pub fn rebuild_plan(
    section: &str,
    years: &[String],
    mappings: Option<&[RkMapping]>,
) -> Result<Vec<SqlStatement>> {
    validate_ident(section)?;
    for year in years {
        validate_year(year)?;
    }

    let mut plan = drop_and_create_search_table();
    plan.push(insert_union(years, section)?);

    for year in years {
        plan.extend(update_from_schedules(year, section));
    }

    plan.push(remove_no_asset_records());

    if let Some(rows) = mappings {
        plan.extend(drop_and_create_rk_mapping_table());
        plan.extend(rows.iter().map(insert_rk_mapping));
    }
    plan.push(update_rk_mappings());

    plan.push(create_materialized_view());
    plan.extend(table_mappings().iter().map(create_index));
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn years(ys: &[&str]) -> Vec<String> {
        ys.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn quote_literal_doubles_quotes() {
        assert_eq!(quote_literal("O'Brien & Co"), "'O''Brien & Co'");
        assert_eq!(quote_literal(""), "''");
    }

    #[test]
    fn ident_rules() {
        assert!(validate_ident("latest").is_ok());
        assert!(validate_ident("all_2").is_ok());
        assert!(validate_ident("").is_err());
        assert!(validate_ident("a-b").is_err());
        assert!(validate_ident("x;drop").is_err());
    }

    #[test]
    fn year_rules() {
        assert!(validate_year("2021").is_ok());
        assert!(validate_year("21").is_err());
        assert!(validate_year("２０２１").is_err());
    }

    #[test]
    fn plan_order_without_mappings() {
        let plan = rebuild_plan("latest", &years(&["2019", "2020"]), None).unwrap();
        assert!(plan[0].sql.starts_with("DROP TABLE IF EXISTS form_5500_search CASCADE"));
        assert!(plan[1].sql.starts_with("CREATE TABLE form_5500_search"));
        assert!(plan[2].sql.starts_with("INSERT INTO form_5500_search"));

        let delete_pos = plan
            .iter()
            .position(|s| s.sql.starts_with("DELETE FROM form_5500_search"))
            .unwrap();
        let rk_pos = plan
            .iter()
            .position(|s| s.sql.contains("SET rk_company_id"))
            .unwrap();
        let view_pos = plan
            .iter()
            .position(|s| s.sql.starts_with("CREATE MATERIALIZED VIEW"))
            .unwrap();
        assert!(delete_pos < rk_pos && rk_pos < view_pos);
        assert!(!plan.iter().any(|s| s.sql.contains("CREATE TABLE sched_c_provider")));

        let per_year = update_from_schedules("2019", "latest").len();
        assert_eq!(delete_pos, 3 + 2 * per_year);

        let indexes = &plan[view_pos + 1..];
        assert_eq!(indexes.len(), table_mappings().len());
        assert!(indexes.iter().all(|s| s.sql.starts_with("CREATE INDEX")));
    }

    #[test]
    fn plan_with_mappings_inserts_before_rk_update() {
        let rows = vec![
            RkMapping {
                provider_name: "FIDELITY".into(),
                company_id: 7,
            },
            RkMapping {
                provider_name: "T. ROWE PRICE".into(),
                company_id: 9,
            },
        ];
        let plan = rebuild_plan("latest", &years(&["2021"]), Some(&rows)).unwrap();
        let create_pos = plan
            .iter()
            .position(|s| s.sql.starts_with("CREATE TABLE sched_c_provider"))
            .unwrap();
        let inserts: Vec<_> = plan
            .iter()
            .enumerate()
            .filter(|(_, s)| s.sql.starts_with(&format!("INSERT INTO {}", RK_MAPPING_TABLE)))
            .map(|(i, _)| i)
            .collect();
        let rk_pos = plan
            .iter()
            .position(|s| s.sql.contains("SET rk_company_id"))
            .unwrap();
        assert_eq!(inserts, vec![create_pos + 1, create_pos + 2]);
        assert_eq!(rk_pos, create_pos + 3);
    }

    #[test]
    fn plan_rejects_invalid_inputs() {
        assert!(rebuild_plan("latest", &[], None).is_err());
        assert!(rebuild_plan("lat est", &years(&["2020"]), None).is_err());
        let err = rebuild_plan("latest", &years(&["2020'"]), None).unwrap_err();
        assert_eq!(err.to_string(), "Invalid year: \"2020'\"");
        let err = rebuild_plan("lat est", &years(&["2020"]), None).unwrap_err();
        assert!(err.to_string().starts_with("Invalid identifier"));
    }
}
