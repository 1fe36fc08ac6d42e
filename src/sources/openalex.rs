//! OpenAlex works search adapter.
//!
//! API Best Practices (per OpenAlex docs):
//! - Use `mailto:email` parameter for polite pool (10 req/s vs 1 req/s)
//! - Use cursor pagination (`cursor=*`, then `meta.next_cursor`)
//! - Results sorted by citation count so the page cap keeps the most cited works

use super::{
    finish_records, strip_html_tags, FetchQuery, MetadataSource, SourceId, MAX_AUTHORS, PER_PAGE,
    REQUEST_TIMEOUT,
};
use crate::error::{Result, TrackerError};
use crate::record::CandidateRecord;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// OpenAlex API base URL
const OPENALEX_API_BASE: &str = "https://api.openalex.org";

/// Email for polite pool access
const POLITE_EMAIL: &str = "papertracker@example.com";

/// Source tag stored on each record
pub const SOURCE_NAME: &str = "OpenAlex";

/// OpenAlex API response structures
#[derive(Debug, Deserialize)]
struct OpenAlexResponse {
    meta: Option<OpenAlexMeta>,
    results: Vec<OpenAlexWork>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexMeta {
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexWork {
    id: Option<String>,
    title: Option<String>,
    display_name: Option<String>,
    publication_year: Option<i64>,
    doi: Option<String>,
    cited_by_count: Option<i64>,
    #[serde(rename = "abstract_inverted_index")]
    abstract_index: Option<serde_json::Value>,
    authorships: Option<Vec<OpenAlexAuthorship>>,
    primary_location: Option<OpenAlexLocation>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexAuthorship {
    author: Option<OpenAlexAuthor>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexAuthor {
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexLocation {
    source: Option<OpenAlexVenue>,
    pdf_url: Option<String>,
    is_oa: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexVenue {
    display_name: Option<String>,
}

/// One parsed page: records plus the cursor for the next page
struct OpenAlexPage {
    records: Vec<CandidateRecord>,
    next_cursor: Option<String>,
}

/// OpenAlex works client
pub struct OpenAlexSource {
    client: Client,
    base_url: String,
    mailto: String,
}

impl OpenAlexSource {
    pub fn new() -> Result<Self> {
        Self::with_base_url(OPENALEX_API_BASE)
    }

    /// Client against an alternative API root (mirrors, test servers)
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(format!("papertracker/0.1 (mailto:{})", POLITE_EMAIL))
            .build()
            .map_err(|e| TrackerError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            mailto: POLITE_EMAIL.to_string(),
        })
    }

    /// Use a different polite-pool contact address
    pub fn with_mailto(mut self, mailto: &str) -> Self {
        self.mailto = mailto.to_string();
        self
    }

    /// Fetch page content from OpenAlex API
    async fn fetch_page(&self, url: &str) -> Result<OpenAlexPage> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(TrackerError::Api {
                code: status.as_u16(),
                message: format!("OpenAlex API error: {}", status),
            });
        }

        let body = response.text().await?;
        parse_response(&body)
    }
}

#[async_trait]
impl MetadataSource for OpenAlexSource {
    fn id(&self) -> SourceId {
        SourceId::OpenAlex
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
            "Starting OpenAlex query"
        );

        let mut records = Vec::new();
        let mut cursor = "*".to_string();

        for page in 0..pages {
            let url = build_search_url(&self.base_url, &self.mailto, query, &cursor);
            debug!(url = %url, page = page + 1, "Fetching OpenAlex page");

            match self.fetch_page(&url).await {
                Ok(parsed) if parsed.records.is_empty() => break,
                Ok(parsed) => {
                    debug!(page = page + 1, count = parsed.records.len(), "Parsed OpenAlex results");
                    records.extend(parsed.records);
                    match parsed.next_cursor {
                        Some(next) if records.len() < query.limit => cursor = next,
                        _ => break,
                    }
                }
                Err(e) => {
                    warn!(page = page + 1, error = %e, "Failed to fetch OpenAlex page");
                    break;
                }
            }
        }

        let records = finish_records(records, query);
        info!(total = records.len(), "OpenAlex query complete");
        records
    }
}

/// Build OpenAlex API search URL
fn build_search_url(base_url: &str, mailto: &str, query: &FetchQuery, cursor: &str) -> String {
    format!(
        "{}/works?search={}&filter=publication_year:{}-{}&sort=cited_by_count:desc&per_page={}&cursor={}&mailto={}",
        base_url,
        urlencoding::encode(&query.query),
        query.year_start,
        query.year_end,
        PER_PAGE,
        urlencoding::encode(cursor),
        urlencoding::encode(mailto)
    )
}

/// Parse OpenAlex API response
fn parse_response(json_str: &str) -> Result<OpenAlexPage> {
    let response: OpenAlexResponse = serde_json::from_str(json_str)
        .map_err(|e| TrackerError::Parse(format!("Failed to parse OpenAlex response: {}", e)))?;

    let records = response.results.into_iter().map(work_to_record).collect();
    let next_cursor = response.meta.and_then(|m| m.next_cursor);

    Ok(OpenAlexPage { records, next_cursor })
}

fn work_to_record(work: OpenAlexWork) -> CandidateRecord {
    // First three named authors
    let author_names = work
        .authorships
        .unwrap_or_default()
        .into_iter()
        .filter_map(|a| a.author)
        .filter_map(|a| a.display_name)
        .filter(|n| !n.trim().is_empty())
        .take(MAX_AUTHORS)
        .collect();

    let (venue_name, pdf_url) = match work.primary_location {
        Some(location) => {
            let venue = location
                .source
                .and_then(|s| s.display_name)
                .unwrap_or_default();
            // PDF links only count for open-access locations
            let pdf = if location.is_oa.unwrap_or(false) {
                location.pdf_url.unwrap_or_default()
            } else {
                String::new()
            };
            (venue, pdf)
        }
        None => (String::new(), String::new()),
    };

    let identifier = work.id.unwrap_or_default();
    let url = work
        .doi
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| identifier.clone());

    let abstract_text = work
        .abstract_index
        .map(|index| reconstruct_abstract(&index))
        .filter(|a| !a.is_empty());

    CandidateRecord {
        identifier,
        title: strip_html_tags(&work.title.or(work.display_name).unwrap_or_default()),
        abstract_text,
        year: CandidateRecord::checked_year(work.publication_year),
        citation_count: work.cited_by_count.unwrap_or(0).max(0) as u64,
        author_names,
        venue_name,
        url,
        pdf_url,
        source_name: SOURCE_NAME.to_string(),
    }
}

/// Reconstruct abstract text from inverted index
/// OpenAlex provides abstract as inverted index for legal reasons.
fn reconstruct_abstract(inverted_index: &serde_json::Value) -> String {
    let Some(obj) = inverted_index.as_object() else {
        return String::new();
    };

    let mut words: Vec<(i64, &str)> = Vec::new();
    for (word, positions) in obj {
        if let Some(pos_array) = positions.as_array() {
            words.extend(
                pos_array
                    .iter()
                    .filter_map(|p| p.as_i64())
                    .map(|p| (p, word.as_str())),
            );
        }
    }

    words.sort_by_key(|(pos, _)| *pos);
    words.iter().map(|(_, w)| *w).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::stub;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::Router;
    use std::collections::HashMap;

    const SAMPLE: &str = r#"{
        "meta": {"count": 2, "per_page": 100, "next_cursor": "IlsxMDBd"},
        "results": [
            {
                "id": "https://openalex.org/W1",
                "title": "Robot Concierges and <i>Guest</i> Trust",
                "display_name": "Robot Concierges and Guest Trust",
                "publication_year": 2021,
                "doi": "https://doi.org/10.1016/j.tourman.2021.1",
                "cited_by_count": 15,
                "abstract_inverted_index": {"Hotel": [0], "robots": [1]},
                "authorships": [
                    {"author": {"display_name": "A. One"}},
                    {"author": {"display_name": "B. Two"}},
                    {"author": {}},
                    {"author": {"display_name": "C. Three"}},
                    {"author": {"display_name": "D. Four"}}
                ],
                "primary_location": {
                    "is_oa": false,
                    "pdf_url": "https://example.org/closed.pdf",
                    "source": {"display_name": "Tourism Management"}
                }
            },
            {
                "id": "https://openalex.org/W2",
                "title": null,
                "display_name": "Fallback Title",
                "publication_year": 21,
                "doi": null,
                "cited_by_count": 0,
                "abstract_inverted_index": null,
                "authorships": [],
                "primary_location": {
                    "is_oa": true,
                    "pdf_url": "https://example.org/open.pdf",
                    "source": null
                }
            }
        ]
    }"#;

    fn query() -> FetchQuery {
        FetchQuery {
            query: "social robot OR hotel".to_string(),
            year_start: 2015,
            year_end: 2025,
            min_citations: 0,
            limit: 100,
        }
    }

    #[test]
    fn test_build_search_url() {
        let url = build_search_url(OPENALEX_API_BASE, POLITE_EMAIL, &query(), "*");
        assert!(url.starts_with("https://api.openalex.org/works?"));
        assert!(url.contains("search=social%20robot%20OR%20hotel"));
        assert!(url.contains("filter=publication_year:2015-2025"));
        assert!(url.contains("sort=cited_by_count:desc"));
        assert!(url.contains("per_page=100"));
        assert!(url.contains("cursor=%2A"));
        assert!(url.contains("mailto="));
    }

    #[test]
    fn test_reconstruct_abstract() {
        let index = serde_json::json!({
            "robots": [1],
            "Service": [0],
            "delight": [2, 4],
            "and": [3]
        });
        assert_eq!(reconstruct_abstract(&index), "Service robots delight and delight");
        assert_eq!(reconstruct_abstract(&serde_json::Value::Null), "");
    }

    #[test]
    fn test_parse_response() -> Result<()> {
        let page = parse_response(SAMPLE)?;
        assert_eq!(page.next_cursor.as_deref(), Some("IlsxMDBd"));
        assert_eq!(page.records.len(), 2);

        let first = &page.records[0];
        assert_eq!(first.title, "Robot Concierges and Guest Trust");
        assert_eq!(first.abstract_text.as_deref(), Some("Hotel robots"));
        assert_eq!(first.author_names, vec!["A. One", "B. Two", "C. Three"]);
        assert_eq!(first.venue_name, "Tourism Management");
        assert_eq!(first.url, "https://doi.org/10.1016/j.tourman.2021.1");
        assert_eq!(first.pdf_url, "");
        assert_eq!(first.source_name, SOURCE_NAME);

        let second = &page.records[1];
        assert_eq!(second.title, "Fallback Title");
        assert_eq!(second.year, None);
        assert_eq!(second.url, "https://openalex.org/W2");
        assert_eq!(second.pdf_url, "https://example.org/open.pdf");
        assert_eq!(second.venue_name, "");
        assert_eq!(second.abstract_text, None);
        Ok(())
    }

    #[test]
    fn test_parse_response_malformed() {
        assert!(matches!(parse_response("{\"error\": 1}"), Err(TrackerError::Parse(_))));
    }

    async fn source_for(app: Router) -> Result<OpenAlexSource> {
        OpenAlexSource::with_base_url(&stub::serve(app).await?)
    }

    #[tokio::test]
    async fn test_server_error_yields_no_records() -> Result<()> {
        let app = Router::new().route("/works", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));
        let source = source_for(app).await?;
        assert!(source.fetch(&query()).await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_body_yields_no_records() -> Result<()> {
        let app = Router::new().route("/works", get(|| async { "{\"results\": 42" }));
        let source = source_for(app).await?;
        assert!(source.fetch(&query()).await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_later_page_failure_keeps_earlier_records() -> Result<()> {
        async fn paged(Query(params): Query<HashMap<String, String>>) -> Response {
            match params.get("cursor").map(String::as_str) {
                Some("*") => SAMPLE.into_response(),
                _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            }
        }
        let source = source_for(Router::new().route("/works", get(paged))).await?;

        // limit 100 allows two pages; the cursor page fails.
        let records = source.fetch(&query()).await;
        let ids: Vec<&str> = records.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(ids, vec!["https://openalex.org/W1", "https://openalex.org/W2"]);
        Ok(())
    }
}
