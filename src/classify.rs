//! Relevance classification of candidate records.
//!
//! Decision table, first match wins:
//!
//! | target venue | keyword | context | strict | result         |
//! |--------------|---------|---------|--------|----------------|
//! | yes          | yes     | -       | -      | Core Journal   |
//! | -            | yes     | yes     | -      | Discovery      |
//! | -            | yes     | -       | no     | Keyword Match  |
//! | otherwise    |         |         |        | dropped        |

use crate::record::{CandidateRecord, Relevance};
use crate::venue::VenueMatcher;

/// Context terms used when the caller supplies none.
pub const DEFAULT_CONTEXT_KEYWORDS: &[&str] = &[
    "tourism",
    "travel",
    "hospitality",
    "hotel",
    "tourist",
    "visitor",
    "destination",
    "leisure",
    "service",
    "robot",
    "ai",
    "artificial intelligence",
    "technology",
    "digital",
];

/// Classifier bound to one search: keywords, target venues and context terms.
///
/// `classify` is a pure function of the record for a fixed classifier.
pub struct RelevanceClassifier<'a> {
    matcher: &'a VenueMatcher,
    keywords: Vec<String>,
    target_journals: &'a [String],
    context_keywords: Vec<String>,
    strict_journal_filter: bool,
}

impl<'a> RelevanceClassifier<'a> {
    /// Blank keywords are discarded; an empty string would match every text.
    /// Other keywords are kept verbatim, padding included.
    pub fn new(matcher: &'a VenueMatcher, keywords: &[String], target_journals: &'a [String]) -> Self {
        Self {
            matcher,
            keywords: lowered(keywords),
            target_journals,
            context_keywords: lowered(DEFAULT_CONTEXT_KEYWORDS),
            strict_journal_filter: false,
        }
    }

    /// Replace the context terms; an empty list keeps the defaults.
    pub fn with_context_keywords<S: AsRef<str>>(mut self, context: &[S]) -> Self {
        let context = lowered(context);
        if !context.is_empty() {
            self.context_keywords = context;
        }
        self
    }

    pub fn strict_journal_filter(mut self, strict: bool) -> Self {
        self.strict_journal_filter = strict;
        self
    }

    /// Classify a record, or `None` when it should be dropped.
    pub fn classify(&self, record: &CandidateRecord) -> Option<Relevance> {
        let text = record.search_text();

        // No keyword, no inclusion, whatever the venue says.
        if !self.keywords.iter().any(|k| text.contains(k.as_str())) {
            return None;
        }

        if self.matcher.matches(&record.venue_name, self.target_journals) {
            return Some(Relevance::CoreJournal);
        }

        if self.context_keywords.iter().any(|c| text.contains(c.as_str())) {
            return Some(Relevance::Discovery);
        }

        if !self.strict_journal_filter {
            return Some(Relevance::KeywordMatch);
        }

        None
    }
}

fn lowered<S: AsRef<str>>(terms: &[S]) -> Vec<String> {
    terms
        .iter()
        .filter(|t| !t.as_ref().trim().is_empty())
        .map(|t| t.as_ref().to_lowercase())
        .collect()
}
