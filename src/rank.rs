//! Presentation ordering for classified results.

use crate::record::ClassifiedRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Display ordering applied to an already ranked and truncated result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Priority tier, then citations (the ranking order)
    #[default]
    Priority,
    /// Citations descending
    Citations,
    /// Newest first; unknown years last
    YearDesc,
    /// Oldest first; unknown years last
    YearAsc,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "priority" => Ok(SortOrder::Priority),
            "citations" => Ok(SortOrder::Citations),
            "year-desc" => Ok(SortOrder::YearDesc),
            "year-asc" => Ok(SortOrder::YearAsc),
            other => Err(format!(
                "unknown sort '{}' (expected priority, citations, year-desc or year-asc)",
                other
            )),
        }
    }
}

/// Order by priority tier, then by citation count descending.
///
/// The sort is stable, so exact ties keep their incoming order.
pub fn rank(mut records: Vec<ClassifiedRecord>) -> Vec<ClassifiedRecord> {
    records.sort_by_key(|r| (r.priority().rank(), Reverse(r.record.citation_count)));
    records
}

/// Reorder records for display. All sorts are stable.
pub fn sort_results(mut records: Vec<ClassifiedRecord>, order: SortOrder) -> Vec<ClassifiedRecord> {
    match order {
        SortOrder::Priority => return rank(records),
        SortOrder::Citations => records.sort_by_key(|r| Reverse(r.record.citation_count)),
        // `None < Some`, so reversing puts unknown years at the end.
        SortOrder::YearDesc => records.sort_by_key(|r| Reverse(r.record.year)),
        SortOrder::YearAsc => records.sort_by_key(|r| (r.record.year.is_none(), r.record.year)),
    }
    records
}
