use crate::models::{InvestmentType, ProviderRole};

use super::SqlStatement;
use super::search_table::{SEARCH_TABLE, long_form_origin};

fn schedule_table(kind: &str, year: &str, section: &str) -> String {
    format!("f_5500_{}_{}_{}", kind, year, section)
}

/// Per-year updates that pull totals, investment flags and providers from
/// the schedule tables. Only long-form rows of `year` are touched; short
/// forms report their totals inline and have no Schedule C.
pub fn update_from_schedules(year: &str, section: &str) -> Vec<SqlStatement> {
    let mut statements = vec![
        total_assets_from_schedule_h(year, section),
        total_assets_from_schedule_i(year, section),
        investment_flags_from_schedule_h(year, section),
    ];
    for role in ProviderRole::ALL {
        statements.push(provider_from_schedule_c(role, year, section));
    }
    statements
}

fn total_assets_from_schedule_h(year: &str, section: &str) -> SqlStatement {
    SqlStatement::new(
        format!(
            "UPDATE {search} s SET total_assets = h.tot_assets_eoy_amt \
             FROM {sched} h \
             WHERE s.ack_id = h.ack_id AND s.table_origin = '{origin}';",
            search = SEARCH_TABLE,
            sched = schedule_table("sch_h", year, section),
            origin = long_form_origin(year, section),
        ),
        format!("Setting total assets from schedule H ({})", year),
    )
}

fn total_assets_from_schedule_i(year: &str, section: &str) -> SqlStatement {
    SqlStatement::new(
        format!(
            "UPDATE {search} s SET total_assets = i.small_tot_assets_eoy_amt \
             FROM {sched} i \
             WHERE s.ack_id = i.ack_id AND s.table_origin = '{origin}' AND s.total_assets IS NULL;",
            search = SEARCH_TABLE,
            sched = schedule_table("sch_i", year, section),
            origin = long_form_origin(year, section),
        ),
        format!("Setting total assets from schedule I ({})", year),
    )
}

fn investment_flags_from_schedule_h(year: &str, section: &str) -> SqlStatement {
    let sets: Vec<String> = InvestmentType::ALL
        .iter()
        .map(|inv| {
            format!(
                "{} = COALESCE(h.{}, 0) > 0",
                inv.column(),
                inv.schedule_h_column()
            )
        })
        .collect();
    SqlStatement::new(
        format!(
            "UPDATE {search} s SET {sets} \
             FROM {sched} h \
             WHERE s.ack_id = h.ack_id AND s.table_origin = '{origin}';",
            search = SEARCH_TABLE,
            sets = sets.join(", "),
            sched = schedule_table("sch_h", year, section),
            origin = long_form_origin(year, section),
        ),
        format!("Setting investment types from schedule H ({})", year),
    )
}

// The highest-paid qualifying provider wins when a filing lists several.
fn provider_from_schedule_c(role: ProviderRole, year: &str, section: &str) -> SqlStatement {
    let codes: Vec<String> = role
        .service_codes()
        .iter()
        .map(|c| format!("'{}'", c))
        .collect();
    SqlStatement::new(
        format!(
            "UPDATE {search} s SET {name_col} = p.provider_name, {ein_col} = p.provider_ein \
             FROM (\
             SELECT DISTINCT ON (c.ack_id) c.ack_id, c.provider_other_name AS provider_name, c.provider_other_ein AS provider_ein \
             FROM {items} c \
             JOIN {codes_table} k ON c.ack_id = k.ack_id AND c.row_order = k.row_order \
             WHERE k.service_code IN ({codes}) \
             ORDER BY c.ack_id, c.provider_other_direct_comp_amt DESC NULLS LAST\
             ) p \
             WHERE s.ack_id = p.ack_id AND s.table_origin = '{origin}';",
            search = SEARCH_TABLE,
            name_col = role.name_column(),
            ein_col = role.ein_column(),
            items = schedule_table("sch_c_part1_item2", year, section),
            codes_table = schedule_table("sch_c_part1_item2_codes", year, section),
            codes = codes.join(","),
            origin = long_form_origin(year, section),
        ),
        format!("Setting {} from schedule C ({})", role.label(), year),
    )
}

pub fn remove_no_asset_records() -> SqlStatement {
    SqlStatement::new(
        format!(
            "DELETE FROM {} WHERE total_assets IS NULL OR total_assets = 0;",
            SEARCH_TABLE
        ),
        "Removing records without assets",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_update_per_concern() {
        let stmts = update_from_schedules("2021", "latest");
        assert_eq!(stmts.len(), 3 + ProviderRole::ALL.len());
        for s in &stmts {
            assert!(s.sql.starts_with("UPDATE form_5500_search s SET"));
            assert!(s.sql.contains("s.table_origin = '2021_latest'"));
        }
    }

    #[test]
    fn schedule_i_only_fills_missing_totals() {
        let stmts = update_from_schedules("2021", "latest");
        assert!(stmts[0].sql.contains("FROM f_5500_sch_h_2021_latest h"));
        assert!(stmts[1].sql.contains("FROM f_5500_sch_i_2021_latest i"));
        assert!(stmts[1].sql.contains("AND s.total_assets IS NULL"));
        assert!(!stmts[0].sql.contains("IS NULL"));
    }

    #[test]
    fn investment_flags_cover_all_types() {
        let stmts = update_from_schedules("2019", "all");
        let sql = &stmts[2].sql;
        for inv in InvestmentType::ALL {
            assert!(sql.contains(&format!(
                "{} = COALESCE(h.{}, 0) > 0",
                inv.column(),
                inv.schedule_h_column()
            )));
        }
    }

    #[test]
    fn recordkeeper_uses_recordkeeping_codes() {
        let stmt = provider_from_schedule_c(ProviderRole::Recordkeeper, "2020", "latest");
        assert!(stmt.sql.contains("SET rk_name = p.provider_name, rk_ein = p.provider_ein"));
        assert!(stmt.sql.contains("WHERE k.service_code IN ('15','64')"));
        assert!(stmt.sql.contains("FROM f_5500_sch_c_part1_item2_2020_latest c"));
        assert!(stmt.sql.contains("JOIN f_5500_sch_c_part1_item2_codes_2020_latest k"));
        assert_eq!(stmt.description, "Setting recordkeeper from schedule C (2020)");
    }

    #[test]
    fn highest_direct_compensation_wins_per_filing() {
        for role in ProviderRole::ALL {
            let sql = provider_from_schedule_c(role, "2020", "latest").sql;
            assert!(sql.contains("SELECT DISTINCT ON (c.ack_id) c.ack_id,"));
            assert!(sql.contains("ORDER BY c.ack_id, c.provider_other_direct_comp_amt DESC NULLS LAST"));
        }
    }

    #[test]
    fn no_asset_delete() {
        assert_eq!(
            remove_no_asset_records().sql,
            "DELETE FROM form_5500_search WHERE total_assets IS NULL OR total_assets = 0;"
        );
    }
}
