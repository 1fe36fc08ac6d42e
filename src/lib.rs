//! # papertracker
//!
//! Research paper discovery pipeline - journal-aware relevance
//! classification over scholarly metadata APIs.
//!
//! ## Modules
//!
//! - [`sources`] - Semantic Scholar and OpenAlex search adapters
//! - [`venue`] - Fuzzy venue-name matching against target journals
//! - [`dedupe`] - Title-prefix deduplication across sources
//! - [`classify`] - Keyword, venue and context relevance classification
//! - [`rank`] - Priority/citation ordering
//! - [`pipeline`] - Fetch, merge, classify, rank and truncate
//! - [`config`] - Journal catalog, aliases, presets and thresholds
//! - [`keywords`] - Synonym expansion and query building
//! - [`export`] - CSV, BibTeX and summary statistics
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use papertracker::config::Catalog;
//! use papertracker::pipeline::{Pipeline, SearchRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let catalog = Catalog::builtin()?;
//!     let pipeline = Pipeline::from_catalog(&catalog)?;
//!     let request = SearchRequest {
//!         keywords: vec!["service robot".to_string()],
//!         target_journals: catalog.target_journals(&[])?,
//!         ..Default::default()
//!     };
//!     let outcome = pipeline.search_and_filter(&request).await;
//!     println!("Found {} papers", outcome.records.len());
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod export;
pub mod keywords;
pub mod pipeline;
pub mod rank;
pub mod record;
pub mod sources;
pub mod venue;

pub use error::{Result, TrackerError};
pub use record::{CandidateRecord, ClassifiedRecord, Priority, Relevance, Track};
