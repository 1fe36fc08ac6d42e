//! Search orchestration: fetch → dedupe → classify → rank → truncate.
//!
//! The pipeline holds no per-search state. Every call receives its
//! parameters explicitly and returns a [`SearchOutcome`] owned by the caller.

use crate::classify::RelevanceClassifier;
use crate::config::Catalog;
use crate::dedupe::Deduplicator;
use crate::error::Result;
use crate::rank::{rank, sort_results, SortOrder};
use crate::record::ClassifiedRecord;
use crate::sources::{
    FetchQuery, MetadataSource, OpenAlexSource, SemanticScholarSource, SourceSelection,
};
use crate::venue::VenueMatcher;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Hard ceiling on raw candidates requested from a single source
pub const MAX_RAW_PER_SOURCE: usize = 200;

/// Parameters for one search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub keywords: Vec<String>,
    pub target_journals: Vec<String>,
    pub extended_journals: Vec<String>,
    pub year_start: i32,
    pub year_end: i32,
    pub min_citations: u64,
    pub include_extended: bool,
    pub limit: usize,
    pub strict_journal_filter: bool,
    pub source: SourceSelection,
    /// Display order of the returned records
    pub sort: SortOrder,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            target_journals: Vec::new(),
            extended_journals: Vec::new(),
            year_start: 2015,
            year_end: current_year(),
            min_citations: 0,
            include_extended: false,
            limit: 50,
            strict_journal_filter: false,
            source: SourceSelection::Both,
            sort: SortOrder::Priority,
        }
    }
}

impl SearchRequest {
    /// Non-blank keywords, as given. Padding is kept for the substring test.
    pub fn effective_keywords(&self) -> Vec<String> {
        self.keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .cloned()
            .collect()
    }

    /// Target journals, plus the extended list when requested.
    pub fn effective_targets(&self) -> Vec<String> {
        let mut targets = self.target_journals.clone();
        if self.include_extended {
            targets.extend(self.extended_journals.iter().cloned());
        }
        targets
    }

    /// Raw candidates requested per source, allowing for filter attrition.
    pub fn per_source_limit(&self) -> usize {
        self.limit.saturating_mul(2).min(MAX_RAW_PER_SOURCE)
    }
}

/// Caller-owned result of one search
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchOutcome {
    /// Ranked, truncated results
    pub records: Vec<ClassifiedRecord>,
    /// Raw candidates returned by all sources
    pub fetched: usize,
    /// Candidates left after deduplication
    pub unique: usize,
}

impl SearchOutcome {
    /// True for "zero matches"; not an error.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// OR-joined query string sent to the sources.
pub fn build_query(keywords: &[String]) -> String {
    keywords
        .iter()
        .map(|k| k.trim())
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// The classification and merge pipeline over a set of sources
pub struct Pipeline {
    sources: Vec<Arc<dyn MetadataSource>>,
    matcher: VenueMatcher,
    deduplicator: Deduplicator,
    context_keywords: Vec<String>,
}

impl Pipeline {
    pub fn new(sources: Vec<Arc<dyn MetadataSource>>, matcher: VenueMatcher) -> Self {
        Self {
            sources,
            matcher,
            deduplicator: Deduplicator::default(),
            context_keywords: Vec::new(),
        }
    }

    /// Pipeline over the live Semantic Scholar and OpenAlex APIs, configured
    /// from the catalog.
    pub fn from_catalog(catalog: &Catalog) -> Result<Self> {
        let mut sources: Vec<Arc<dyn MetadataSource>> = Vec::new();
        sources.push(Arc::new(SemanticScholarSource::new()?));
        sources.push(Arc::new(OpenAlexSource::new()?));
        Ok(Self::new(sources, catalog.venue_matcher())
            .with_deduplicator(Deduplicator::new(catalog.matching.title_key_len))
            .with_context_keywords(catalog.context_keywords.clone()))
    }

    pub fn with_deduplicator(mut self, deduplicator: Deduplicator) -> Self {
        self.deduplicator = deduplicator;
        self
    }

    /// Context terms for the Discovery track; empty keeps the built-in list.
    pub fn with_context_keywords(mut self, context_keywords: Vec<String>) -> Self {
        self.context_keywords = context_keywords;
        self
    }

    pub fn matcher(&self) -> &VenueMatcher {
        &self.matcher
    }

    /// Run one search end to end.
    pub async fn search_and_filter(&self, request: &SearchRequest) -> SearchOutcome {
        let keywords = request.effective_keywords();
        if keywords.is_empty() {
            warn!("Search requested without keywords");
            return SearchOutcome::default();
        }

        let fetch_query = FetchQuery {
            query: build_query(&keywords),
            year_start: request.year_start,
            year_end: request.year_end,
            min_citations: request.min_citations,
            limit: request.per_source_limit(),
        };

        let selected: Vec<&Arc<dyn MetadataSource>> = self
            .sources
            .iter()
            .filter(|s| request.source.includes(s.id()))
            .collect();

        info!(
            query = %fetch_query.query,
            sources = selected.len(),
            per_source = fetch_query.limit,
            "Starting search"
        );

        // Sources are independent; join in fixed order before deduplication.
        let batches = join_all(selected.iter().map(|s| s.fetch(&fetch_query))).await;

        let mut raw = Vec::new();
        for (source, batch) in selected.iter().zip(batches) {
            debug!(source = source.name(), count = batch.len(), "Source returned");
            raw.extend(batch);
        }
        let fetched = raw.len();

        let unique = self.deduplicator.dedupe(raw);
        let unique_count = unique.len();
        if unique.is_empty() {
            info!(fetched = fetched, "No candidates returned");
            return SearchOutcome {
                records: Vec::new(),
                fetched,
                unique: 0,
            };
        }

        let targets = request.effective_targets();
        let classifier = RelevanceClassifier::new(&self.matcher, &keywords, &targets)
            .with_context_keywords(&self.context_keywords)
            .strict_journal_filter(request.strict_journal_filter);

        let classified: Vec<ClassifiedRecord> = unique
            .into_iter()
            .filter_map(|record| {
                classifier
                    .classify(&record)
                    .map(|relevance| ClassifiedRecord::new(record, relevance))
            })
            .collect();
        let classified_count = classified.len();

        // Truncate in ranking order; `sort` only reorders what is kept.
        let mut records = rank(classified);
        records.truncate(request.limit);
        let records = sort_results(records, request.sort);

        info!(
            fetched = fetched,
            unique = unique_count,
            classified = classified_count,
            returned = records.len(),
            "Search complete"
        );

        SearchOutcome {
            records,
            fetched,
            unique: unique_count,
        }
    }
}

/// Current calendar year (local time)
pub fn current_year() -> i32 {
    use chrono::Datelike;
    chrono::Local::now().year()
}
