//! Keyword synonym expansion and query building.

use std::collections::{BTreeMap, HashSet};

/// Expansion groups in input order: each keyword with its related terms.
///
/// Keywords without an entry in `table` expand to themselves only (or to
/// nothing when `include_original` is false).
pub fn expand_keywords(
    keywords: &[String],
    table: &BTreeMap<String, Vec<String>>,
    include_original: bool,
) -> Vec<(String, Vec<String>)> {
    keywords
        .iter()
        .map(|keyword| {
            let mut terms = Vec::new();
            if include_original {
                terms.push(keyword.clone());
            }
            if let Some(expansions) = table.get(keyword) {
                terms.extend(expansions.iter().cloned());
            }
            (keyword.clone(), terms)
        })
        .collect()
}

/// Every keyword plus its expansions, de-duplicated, first occurrence kept.
pub fn all_expanded_terms(keywords: &[String], table: &BTreeMap<String, Vec<String>>) -> Vec<String> {
    let mut seen = HashSet::new();
    expand_keywords(keywords, table, true)
        .into_iter()
        .flat_map(|(_, terms)| terms)
        .filter(|term| seen.insert(term.to_lowercase()))
        .collect()
}

/// Quoted OR query, e.g. `"Robot" OR "Robotics"`.
pub fn build_search_query(
    keywords: &[String],
    table: &BTreeMap<String, Vec<String>>,
    use_expansion: bool,
) -> String {
    let terms = if use_expansion {
        all_expanded_terms(keywords, table)
    } else {
        keywords.to_vec()
    };
    terms
        .iter()
        .map(|t| format!("\"{}\"", t))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Split comma-separated user input into trimmed, non-empty keywords.
pub fn parse_keyword_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> BTreeMap<String, Vec<String>> {
        BTreeMap::from([
            (
                "Robot".to_string(),
                vec!["Robotics".to_string(), "Social Robot".to_string()],
            ),
            (
                "Social Robot".to_string(),
                vec!["Service Robot".to_string(), "Companion Robot".to_string()],
            ),
        ])
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_expand_keywords() {
        let groups = expand_keywords(&strings(&["Robot", "Drone"]), &table(), true);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].1, strings(&["Robot", "Robotics", "Social Robot"]));
        assert_eq!(groups[1].1, strings(&["Drone"]));

        let without = expand_keywords(&strings(&["Drone"]), &table(), false);
        assert!(without[0].1.is_empty());
    }

    #[test]
    fn test_all_expanded_terms_dedupes_in_order() {
        let terms = all_expanded_terms(&strings(&["Robot", "Social Robot"]), &table());
        assert_eq!(
            terms,
            strings(&["Robot", "Robotics", "Social Robot", "Service Robot", "Companion Robot"])
        );
    }

    #[test]
    fn test_build_search_query() {
        let plain = build_search_query(&strings(&["Robot", "Hotel"]), &table(), false);
        assert_eq!(plain, "\"Robot\" OR \"Hotel\"");

        let expanded = build_search_query(&strings(&["Robot"]), &table(), true);
        assert_eq!(expanded, "\"Robot\" OR \"Robotics\" OR \"Social Robot\"");
    }

    #[test]
    fn test_parse_keyword_list() {
        assert_eq!(
            parse_keyword_list(" Social Robot, Tourism ,, AI "),
            strings(&["Social Robot", "Tourism", "AI"])
        );
        assert!(parse_keyword_list(" , ").is_empty());
    }
}
