use anyhow::{Result, bail};

use crate::models::{ColumnMapping, InvestmentType, ProviderRole, table_mappings};

use super::SqlStatement;

pub const SEARCH_TABLE: &str = "form_5500_search";
pub const SEARCH_VIEW: &str = "form5500_search_view";

pub fn drop_and_create_search_table() -> Vec<SqlStatement> {
    vec![
        SqlStatement::new(
            format!("DROP TABLE IF EXISTS {} CASCADE;", SEARCH_TABLE),
            format!("drop {} table", SEARCH_TABLE),
        ),
        SqlStatement::new(
            format!("CREATE TABLE {} ({});", SEARCH_TABLE, search_table_columns()),
            format!("create {} table", SEARCH_TABLE),
        ),
    ]
}

fn search_table_columns() -> String {
    let mut cols: Vec<String> = table_mappings()
        .iter()
        .map(|m| format!("{} {}", m.alias, m.data_type))
        .collect();
    cols.push("rk_company_id int".into());
    for role in ProviderRole::ALL {
        cols.push(format!("{} text", role.name_column()));
        cols.push(format!("{} text", role.ein_column()));
    }
    for inv in InvestmentType::ALL {
        cols.push(format!("{} boolean", inv.column()));
    }
    cols.push("table_origin text".into());
    cols.join(", ")
}

/// `table_origin` value of long-form rows for a year.
pub(crate) fn long_form_origin(year: &str, section: &str) -> String {
    format!("{}_{}", year, section)
}

pub(crate) fn short_form_origin(year: &str, section: &str) -> String {
    format!("sf_{}_{}", year, section)
}

pub fn select_long_form(year: &str, section: &str) -> String {
    let cols: Vec<String> = table_mappings()
        .iter()
        .map(|m| format!("{} as {}", m.long_form, m.alias))
        .collect();
    format!(
        "   SELECT {}, '{origin}' as table_origin from f_5500_{origin} as f_{year}",
        cols.join(", "),
        origin = long_form_origin(year, section),
        year = year,
    )
}

pub fn select_short_form(year: &str, section: &str) -> String {
    let cols: Vec<String> = table_mappings()
        .iter()
        .map(|m| format!("{} as {}", m.short_form, m.alias))
        .collect();
    format!(
        "   SELECT {}, '{origin}' as table_origin from f_5500_{origin} as f_{year}_sf",
        cols.join(", "),
        origin = short_form_origin(year, section),
        year = year,
    )
}

pub fn insert_union(years: &[String], section: &str) -> Result<SqlStatement> {
    if years.is_empty() {
        bail!("At least one year is required");
    }
    let selects: Vec<String> = years
        .iter()
        .flat_map(|y| [select_long_form(y, section), select_short_form(y, section)])
        .collect();
    let mut cols: Vec<&str> = table_mappings().iter().map(|m| m.alias).collect();
    cols.push("table_origin");
    let cols = cols.join(",");
    Ok(SqlStatement::new(
        format!(
            "INSERT INTO {table} ({cols}) SELECT {cols} FROM (\n{selects}\n) as f_s;",
            table = SEARCH_TABLE,
            cols = cols,
            selects = selects.join("\n      UNION ALL\n"),
        ),
        format!("Inserting records into {}", SEARCH_TABLE),
    ))
}

pub fn create_materialized_view() -> SqlStatement {
    SqlStatement::new(
        format!(
            "CREATE MATERIALIZED VIEW {} AS SELECT * FROM {};",
            SEARCH_VIEW, SEARCH_TABLE
        ),
        format!("Creating materialized view {}", SEARCH_VIEW),
    )
}

pub fn create_index(mapping: &ColumnMapping) -> SqlStatement {
    SqlStatement::new(
        format!(
            "CREATE INDEX {} ON {} ({});",
            mapping.index_name(),
            SEARCH_VIEW,
            mapping.alias
        ),
        format!("Creating index {}", mapping.index_name()),
    )
}
