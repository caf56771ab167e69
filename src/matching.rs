//! In-process counterpart of the SQL suggestion query.
//!
//! Candidates are blocked on the first two characters of the name, scored
//! with Levenshtein distance, and the closest one is kept when its distance
//! is below the cutoff.

use std::collections::{BTreeSet, HashMap};

use strsim::levenshtein;

use crate::models::{MatchSuggestion, RkMapping};

fn prefix2(s: &str) -> String {
    s.chars().take(2).collect()
}

/// One suggestion per distinct name, sorted by name.
pub fn suggest_matches(
    unmatched: &[String],
    registry: &[RkMapping],
    cutoff: usize,
) -> Vec<MatchSuggestion> {
    let mut blocks: HashMap<String, Vec<&RkMapping>> = HashMap::new();
    for m in registry {
        blocks.entry(prefix2(&m.provider_name)).or_default().push(m);
    }

    let names: BTreeSet<&str> = unmatched.iter().map(String::as_str).collect();
    names
        .into_iter()
        .map(|name| {
            let best = blocks.get(&prefix2(name)).and_then(|candidates| {
                candidates
                    .iter()
                    .map(|m| (levenshtein(name, &m.provider_name), *m))
                    .min_by(|(da, a), (db, b)| {
                        da.cmp(db).then_with(|| a.provider_name.cmp(&b.provider_name))
                    })
            });
            match best {
                Some((dist, m)) if dist < cutoff => MatchSuggestion {
                    rk_name: name.to_string(),
                    possible_match: Some(m.provider_name.clone()),
                    company_id: Some(m.company_id),
                    distance: Some(dist as i32),
                },
                _ => MatchSuggestion::unmatched(name),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reg(rows: &[(&str, i32)]) -> Vec<RkMapping> {
        rows.iter()
            .map(|(n, id)| RkMapping {
                provider_name: n.to_string(),
                company_id: *id,
            })
            .collect()
    }

    fn names(ns: &[&str]) -> Vec<String> {
        ns.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn closest_candidate_wins() {
        let registry = reg(&[
            ("FIDELITY INVESTMENTS", 1),
            ("FIDELITY INVESTMENTS INSTITUTIONAL", 2),
        ]);
        let out = suggest_matches(&names(&["FIDELITY INVESTMENT"]), &registry, 6);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].possible_match.as_deref(), Some("FIDELITY INVESTMENTS"));
        assert_eq!(out[0].company_id, Some(1));
        assert_eq!(out[0].distance, Some(1));
    }

    #[test]
    fn different_prefix_is_never_a_candidate() {
        let registry = reg(&[("VANGUARD GROUP", 5)]);
        // one edit away, but the first two characters differ
        let out = suggest_matches(&names(&["XANGUARD GROUP"]), &registry, 6);
        assert_eq!(out, vec![MatchSuggestion::unmatched("XANGUARD GROUP")]);
    }

    #[test]
    fn distance_at_cutoff_is_blank() {
        let registry = reg(&[("ABCDEF", 3)]);
        // "AB" + 6 edits away
        let out = suggest_matches(&names(&["ABXXXXXX"]), &registry, 6);
        assert!(!out[0].has_match());

        let out = suggest_matches(&names(&["ABCDEFXXXXX"]), &registry, 6);
        assert_eq!(out[0].distance, Some(5));
    }

    #[test]
    fn ties_pick_smallest_name() {
        let registry = reg(&[("PRUDENTIAL B", 9), ("PRUDENTIAL A", 8)]);
        let out = suggest_matches(&names(&["PRUDENTIAL C"]), &registry, 6);
        assert_eq!(out[0].possible_match.as_deref(), Some("PRUDENTIAL A"));
        assert_eq!(out[0].company_id, Some(8));
    }

    #[test]
    fn output_is_distinct_and_sorted() {
        let registry = reg(&[("EMPOWER", 4)]);
        let out = suggest_matches(&names(&["ZETA", "EMPOWR", "ZETA", "ALPHA"]), &registry, 6);
        let got: Vec<&str> = out.iter().map(|s| s.rk_name.as_str()).collect();
        assert_eq!(got, vec!["ALPHA", "EMPOWR", "ZETA"]);
        assert_eq!(out[1].company_id, Some(4));
    }

    #[test]
    fn prefix_is_char_based() {
        let registry = reg(&[("ÉTOILE FINANCIAL", 11)]);
        let out = suggest_matches(&names(&["ÉTOILE FINANCIAL LLC"]), &registry, 6);
        assert_eq!(out[0].distance, Some(4));
    }

    #[test]
    fn empty_registry_yields_blanks() {
        let out = suggest_matches(&names(&["ANY"]), &[], 6);
        assert_eq!(out, vec![MatchSuggestion::unmatched("ANY")]);
    }
}
