use crate::models::RkMapping;

use super::search_table::SEARCH_TABLE;
use super::{SqlStatement, quote_literal};

pub const RK_MAPPING_TABLE: &str = "sched_c_provider_to_fbi_rk_company_id_mappings";

pub fn drop_and_create_rk_mapping_table() -> Vec<SqlStatement> {
    vec![
        SqlStatement::new(
            format!("DROP TABLE IF EXISTS {};", RK_MAPPING_TABLE),
            format!("drop {} table", RK_MAPPING_TABLE),
        ),
        SqlStatement::new(
            format!(
                "CREATE TABLE {} ( sched_c_provider_name text PRIMARY KEY, fbi_company_id INTEGER NOT NULL);",
                RK_MAPPING_TABLE
            ),
            format!("create {} table", RK_MAPPING_TABLE),
        ),
    ]
}

pub fn insert_rk_mapping(mapping: &RkMapping) -> SqlStatement {
    SqlStatement::new(
        format!(
            "INSERT INTO {} (sched_c_provider_name, fbi_company_id) VALUES ({},{});",
            RK_MAPPING_TABLE,
            quote_literal(&mapping.provider_name),
            mapping.company_id
        ),
        "Importing rk company id mapping",
    )
}

pub fn update_rk_mappings() -> SqlStatement {
    SqlStatement::new(
        format!(
            "UPDATE {} SET rk_company_id = fbi_company_id FROM {} WHERE rk_name = sched_c_provider_name;",
            SEARCH_TABLE, RK_MAPPING_TABLE
        ),
        "Updating records with new rk mappings",
    )
}
