use super::SqlStatement;
use super::rk_mapping::RK_MAPPING_TABLE;
use super::search_table::SEARCH_VIEW;

/// Statements of the unmatched recordkeeper report.
///
/// All three groups must run on the same session: `setup` fills the temp
/// tables that `query` reads, `cleanup` drops them. `query` yields
/// `(rk_name, possible_match_name, possible_match_id, match_similarity)` with
/// `''` / `-1` where no candidate is below `cutoff`.
#[derive(Debug, Clone)]
pub struct UnmatchedStatements {
    pub setup: Vec<SqlStatement>,
    pub query: SqlStatement,
    pub cleanup: Vec<SqlStatement>,
}

pub fn unmatched_rks_statements(cutoff: usize) -> UnmatchedStatements {
    let setup = vec![
        SqlStatement::new(
            "DROP TABLE IF EXISTS unmatched_rks;",
            "drop unmatched_rks temp table",
        ),
        SqlStatement::new(
            "CREATE TEMP TABLE unmatched_rks (rk_name text);",
            "create unmatched_rks temp table",
        ),
        SqlStatement::new(
            format!(
                "INSERT INTO unmatched_rks (SELECT DISTINCT (rk_name) FROM {} WHERE rk_name IS NOT NULL AND rk_company_id IS NULL);",
                SEARCH_VIEW
            ),
            "Collecting recordkeepers without a company id",
        ),
        SqlStatement::new(
            "DROP TABLE IF EXISTS match_options;",
            "drop match_options temp table",
        ),
        SqlStatement::new(
            "CREATE TEMP TABLE match_options (rk_name text, sched_c_provider_name text, company_id int, lev int);",
            "create match_options temp table",
        ),
        SqlStatement::new(
            format!(
                "INSERT INTO match_options (\
                 SELECT rk_name, sched_c_provider_name, fbi_company_id, levenshtein(rk_name, sched_c_provider_name) \
                 FROM unmatched_rks \
                 LEFT JOIN {map} ON LEFT(rk_name, 2) = LEFT({map}.sched_c_provider_name, 2)\
                 );",
                map = RK_MAPPING_TABLE
            ),
            "Scoring candidate matches",
        ),
    ];

    let query = SqlStatement::new(
        format!(
            "SELECT DISTINCT ON (best.rk_name) \
             best.rk_name, \
             COALESCE(match_options.sched_c_provider_name, '') AS possible_match_name, \
             COALESCE(match_options.company_id, -1) AS possible_match_id, \
             COALESCE(match_options.lev, -1) AS match_similarity \
             FROM (SELECT rk_name, min(lev) AS lev FROM match_options GROUP BY rk_name) best \
             LEFT JOIN match_options ON best.rk_name = match_options.rk_name \
             AND best.lev = match_options.lev AND best.lev < {cutoff} \
             ORDER BY best.rk_name, match_options.sched_c_provider_name;",
            cutoff = cutoff
        ),
        "Finding unmatched rks and suggested matches",
    );

    let cleanup = vec![
        SqlStatement::new(
            "DROP TABLE IF EXISTS unmatched_rks;",
            "drop unmatched_rks temp table",
        ),
        SqlStatement::new(
            "DROP TABLE IF EXISTS match_options;",
            "drop match_options temp table",
        ),
    ];

    UnmatchedStatements {
        setup,
        query,
        cleanup,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoff_is_interpolated() {
        let stmts = unmatched_rks_statements(4);
        assert!(stmts.query.sql.contains("best.lev < 4"));
    }

    #[test]
    fn candidates_blocked_on_two_char_prefix() {
        let stmts = unmatched_rks_statements(6);
        let scoring = stmts.setup.last().unwrap();
        assert!(scoring.sql.contains("levenshtein(rk_name, sched_c_provider_name)"));
        assert!(scoring.sql.contains(
            "LEFT(rk_name, 2) = LEFT(sched_c_provider_to_fbi_rk_company_id_mappings.sched_c_provider_name, 2)"
        ));
    }

    #[test]
    fn ties_resolve_to_smallest_candidate_name() {
        let sql = unmatched_rks_statements(6).query.sql;
        assert!(sql.starts_with("SELECT DISTINCT ON (best.rk_name) "));
        assert!(sql.contains("AND best.lev = match_options.lev"));
        assert!(sql.ends_with("ORDER BY best.rk_name, match_options.sched_c_provider_name;"));
    }

    #[test]
    fn unmatched_names_come_from_view() {
        let stmts = unmatched_rks_statements(6);
        assert!(stmts.setup[2].sql.contains("FROM form5500_search_view"));
        assert!(stmts.setup[2].sql.contains("rk_company_id IS NULL"));
    }

    #[test]
    fn temp_tables_dropped_afterwards() {
        let stmts = unmatched_rks_statements(6);
        assert_eq!(stmts.cleanup.len(), 2);
        assert!(stmts.cleanup.iter().all(|s| s.sql.starts_with("DROP TABLE IF EXISTS")));
    }
}
