//! Scholarly metadata sources.
//!
//! Each adapter maps one API's response schema into [`CandidateRecord`]s.
//! `fetch` is infallible by contract: network errors, timeouts, non-2xx
//! statuses and malformed payloads are logged and yield whatever records
//! were collected before the failure (usually none).

pub mod openalex;
pub mod semanticscholar;

use crate::record::CandidateRecord;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;

pub use openalex::OpenAlexSource;
pub use semanticscholar::SemanticScholarSource;

/// Per-request timeout for source APIs
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Records requested per page
pub const PER_PAGE: usize = 100;

/// Upper bound on pages fetched per source and search
pub const MAX_PAGES: usize = 3;

/// Authors retained per record
pub const MAX_AUTHORS: usize = 3;

/// Identifies a source for selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    SemanticScholar,
    OpenAlex,
}

/// Which sources a search consults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceSelection {
    #[serde(alias = "semanticscholar")]
    Semantic,
    OpenAlex,
    #[default]
    Both,
}

impl SourceSelection {
    pub fn includes(self, id: SourceId) -> bool {
        matches!(
            (self, id),
            (SourceSelection::Both, _)
                | (SourceSelection::Semantic, SourceId::SemanticScholar)
                | (SourceSelection::OpenAlex, SourceId::OpenAlex)
        )
    }
}

impl std::str::FromStr for SourceSelection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "semantic" | "semanticscholar" => Ok(SourceSelection::Semantic),
            "openalex" => Ok(SourceSelection::OpenAlex),
            "both" => Ok(SourceSelection::Both),
            other => Err(format!("unknown source '{}' (expected semantic, openalex or both)", other)),
        }
    }
}

/// Parameters for one source fetch
#[derive(Debug, Clone, PartialEq)]
pub struct FetchQuery {
    pub query: String,
    pub year_start: i32,
    pub year_end: i32,
    pub min_citations: u64,
    /// Maximum records returned
    pub limit: usize,
}

impl FetchQuery {
    /// Pages worth fetching for `limit`, capped at [`MAX_PAGES`].
    pub fn page_budget(&self) -> usize {
        MAX_PAGES.min(self.limit / PER_PAGE + 1)
    }
}

/// A capability yielding candidate records for a query.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    fn id(&self) -> SourceId;

    /// Tag stored in `CandidateRecord::source_name`
    fn name(&self) -> &'static str;

    /// Fetch up to `query.limit` records. Never fails; errors yield fewer records.
    async fn fetch(&self, query: &FetchQuery) -> Vec<CandidateRecord>;
}

/// Apply the citation floor and the record limit shared by all adapters.
pub(crate) fn finish_records(mut records: Vec<CandidateRecord>, query: &FetchQuery) -> Vec<CandidateRecord> {
    if query.min_citations > 0 {
        records.retain(|r| r.citation_count >= query.min_citations);
    }
    records.truncate(query.limit);
    records
}

static HTML_TAG: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"<[^>]+>").ok());

/// Strip inline markup (`<i>`, `<sub>`, ...) that some sources leave in titles.
pub(crate) fn strip_html_tags(text: &str) -> String {
    match HTML_TAG.as_ref() {
        Some(re) => re.replace_all(text, "").trim().to_string(),
        None => text.trim().to_string(),
    }
}
