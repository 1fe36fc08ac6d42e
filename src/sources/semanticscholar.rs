//! Semantic Scholar paper search adapter.
//!
//! API Details:
//! - Search endpoint: GET /graph/v1/paper/search
//! - Offset pagination, up to 100 papers per page
//! - Year filter expressed as `start-end`
//! - Rate limit: 1 req/s unauthenticated; a 429 ends the search for this source

use super::{
    finish_records, strip_html_tags, FetchQuery, MetadataSource, SourceId, MAX_AUTHORS, PER_PAGE,
    REQUEST_TIMEOUT,
};
use crate::error::{OptionExt, Result, TrackerError};
use crate::record::CandidateRecord;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Semantic Scholar API base URL
const SS_API_BASE: &str = "https://api.semanticscholar.org/graph/v1";

/// Fields requested for every paper
const SEARCH_FIELDS: &str = "paperId,title,abstract,year,citationCount,authors,venue,url,openAccessPdf";

/// Source tag stored on each record
pub const SOURCE_NAME: &str = "Semantic Scholar";

#[derive(Debug, Deserialize)]
struct SSSearchResponse {
    data: Option<Vec<SSPaper>>,
}

#[derive(Debug, Deserialize)]
struct SSPaper {
    #[serde(rename = "paperId")]
    paper_id: Option<String>,
    title: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    year: Option<i64>,
    #[serde(rename = "citationCount")]
    citation_count: Option<i64>,
    authors: Option<Vec<SSAuthor>>,
    venue: Option<String>,
    url: Option<String>,
    #[serde(rename = "openAccessPdf")]
    oa_pdf: Option<SSOpenAccessPdf>,
}

#[derive(Debug, Deserialize)]
struct SSAuthor {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SSOpenAccessPdf {
    url: Option<String>,
}

/// Semantic Scholar search client
pub struct SemanticScholarSource {
    client: Client,
    base_url: String,
}

impl SemanticScholarSource {
    pub fn new() -> Result<Self> {
        Self::with_base_url(SS_API_BASE)
    }

    /// Client against an alternative API root (mirrors, test servers)
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("papertracker/0.1")
            .build()
            .map_err(|e| TrackerError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch a single page of search results
    async fn fetch_page(&self, query: &FetchQuery, offset: usize) -> Result<Vec<CandidateRecord>> {
        let url = format!("{}/paper/search", self.base_url);
        let year = format!("{}-{}", query.year_start, query.year_end);
        let limit = PER_PAGE.to_string();
        let offset = offset.to_string();

        debug!(url = %url, offset = %offset, "Fetching Semantic Scholar page");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("query", query.query.as_str()),
                ("year", year.as_str()),
                ("limit", limit.as_str()),
                ("offset", offset.as_str()),
                ("fields", SEARCH_FIELDS),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::Api {
                code: status.as_u16(),
                message: format!("Semantic Scholar API error: {}", status),
            });
        }

        let body = response.text().await?;
        parse_search_response(&body)
    }
}

#[async_trait]
impl MetadataSource for SemanticScholarSource {
    fn id(&self) -> SourceId {
        SourceId::SemanticScholar
    }

    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch(&self, query: &FetchQuery) -> Vec<CandidateRecord> {
        let pages = query.page_budget();
        info!(
            query = %query.query,
            year_start = query.year_start,
            year_end = query.year_end,
            pages = pages,
            "Starting Semantic Scholar search"
        );

        let mut records = Vec::new();
        for page in 0..pages {
            match self.fetch_page(query, page * PER_PAGE).await {
                Ok(batch) if batch.is_empty() => break,
                Ok(batch) => {
                    debug!(page = page + 1, count = batch.len(), "Parsed Semantic Scholar page");
                    records.extend(batch);
                    if records.len() >= query.limit {
                        break;
                    }
                }
                Err(e) => {
                    warn!(page = page + 1, error = %e, "Semantic Scholar fetch failed");
                    break;
                }
            }
        }

        let records = finish_records(records, query);
        info!(total = records.len(), "Semantic Scholar search complete");
        records
    }
}

/// Parse a `/paper/search` response body into records
fn parse_search_response(json_str: &str) -> Result<Vec<CandidateRecord>> {
    let response: SSSearchResponse = serde_json::from_str(json_str)
        .map_err(|e| TrackerError::Parse(format!("Failed to parse Semantic Scholar response: {}", e)))?;

    let papers = response.data.ok_or_parse("Semantic Scholar response has no data array")?;

    Ok(papers.into_iter().map(paper_to_record).collect())
}

fn paper_to_record(paper: SSPaper) -> CandidateRecord {
    let author_names = paper
        .authors
        .unwrap_or_default()
        .into_iter()
        .filter_map(|a| a.name)
        .filter(|n| !n.trim().is_empty())
        .take(MAX_AUTHORS)
        .collect();

    CandidateRecord {
        identifier: paper.paper_id.unwrap_or_default(),
        title: strip_html_tags(&paper.title.unwrap_or_default()),
        abstract_text: paper.abstract_text.filter(|a| !a.trim().is_empty()),
        year: CandidateRecord::checked_year(paper.year),
        citation_count: paper.citation_count.unwrap_or(0).max(0) as u64,
        author_names,
        venue_name: paper.venue.unwrap_or_default(),
        url: paper.url.unwrap_or_default(),
        pdf_url: paper.oa_pdf.and_then(|p| p.url).unwrap_or_default(),
        source_name: SOURCE_NAME.to_string(),
    }
}
