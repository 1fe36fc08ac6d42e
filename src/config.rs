//! Static catalog: journal lists, aliases, keyword synonyms and presets.
//!
//! The catalog is read-only input to the matcher and classifier. A built-in
//! copy is embedded from `config/catalog.toml`; deployments can supply their
//! own file, either explicitly or at `<config_dir>/papertracker/catalog.toml`.

use crate::dedupe::DEFAULT_TITLE_KEY_LEN;
use crate::error::{Result, TrackerError};
use crate::venue::{AliasTable, VenueMatcher, DEFAULT_MIN_TOKEN_OVERLAP, DEFAULT_STOP_WORDS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Built-in catalog shipped with the binary
const BUILTIN_CATALOG: &str = include_str!("../config/catalog.toml");

/// A named group of journals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalCategory {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub journals: Vec<String>,
}

/// A saved keyword combination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchPreset {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub keywords: Vec<String>,
}

/// Descriptive journal metrics shown alongside results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalMetadata {
    pub impact_factor: Option<f64>,
    pub cite_score: Option<f64>,
    #[serde(default = "unknown_label")]
    pub category: String,
    #[serde(default = "unknown_label")]
    pub tier: String,
}

impl JournalMetadata {
    fn unknown() -> Self {
        Self {
            impact_factor: None,
            cite_score: None,
            category: unknown_label(),
            tier: unknown_label(),
        }
    }
}

fn unknown_label() -> String {
    "Unknown".to_string()
}

/// Heuristic constants for venue matching and deduplication
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Meaningful shared tokens required by the token-overlap pass
    pub min_token_overlap: usize,
    /// Title characters forming the dedup key
    pub title_key_len: usize,
    /// Words ignored by the token-overlap pass
    pub stop_words: Vec<String>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            min_token_overlap: DEFAULT_MIN_TOKEN_OVERLAP,
            title_key_len: DEFAULT_TITLE_KEY_LEN,
            stop_words: DEFAULT_STOP_WORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The full configuration catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub matching: MatchingConfig,
    /// Context terms for the Discovery track; empty means the built-in list
    pub context_keywords: Vec<String>,
    pub target_journals: Vec<JournalCategory>,
    pub extended_journals: Vec<JournalCategory>,
    /// Canonical journal name -> known abbreviations
    pub aliases: BTreeMap<String, Vec<String>>,
    /// Keyword -> synonyms and related terms
    pub expansions: BTreeMap<String, Vec<String>>,
    pub presets: Vec<ResearchPreset>,
    pub journal_metadata: BTreeMap<String, JournalMetadata>,
}

impl Catalog {
    /// Parse the embedded catalog.
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_CATALOG)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let catalog: Catalog = toml::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_toml(&content)?;
        info!(
            path = %path.display(),
            categories = catalog.target_journals.len(),
            presets = catalog.presets.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    /// Explicit path, else the per-user file if it exists, else built-in.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Some(path) = default_catalog_path().filter(|p| p.exists()) {
            return Self::load(&path);
        }
        debug!("Using built-in catalog");
        Self::builtin()
    }

    fn validate(&self) -> Result<()> {
        if self.matching.min_token_overlap == 0 {
            return Err(TrackerError::Config(
                "matching.min_token_overlap must be at least 1".to_string(),
            ));
        }
        if self.matching.title_key_len == 0 {
            return Err(TrackerError::Config(
                "matching.title_key_len must be at least 1".to_string(),
            ));
        }
        for preset in &self.presets {
            if preset.keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(TrackerError::Config(format!(
                    "preset '{}' has no keywords",
                    preset.name
                )));
            }
        }
        Ok(())
    }

    /// Build the venue matcher described by this catalog.
    pub fn venue_matcher(&self) -> VenueMatcher {
        VenueMatcher::new(
            AliasTable::new(self.aliases.iter()),
            self.matching.min_token_overlap,
            &self.matching.stop_words,
        )
    }

    /// Journals from the selected target categories; no selection means all.
    pub fn target_journals(&self, categories: &[String]) -> Result<Vec<String>> {
        if categories.is_empty() {
            return Ok(flatten(&self.target_journals));
        }
        let mut journals = Vec::new();
        for name in categories {
            let category = self
                .target_journals
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(name))
                .ok_or_else(|| TrackerError::Validation(format!("unknown journal category '{}'", name)))?;
            journals.extend(category.journals.iter().cloned());
        }
        Ok(journals)
    }

    pub fn extended_journals(&self) -> Vec<String> {
        flatten(&self.extended_journals)
    }

    pub fn preset(&self, name: &str) -> Option<&ResearchPreset> {
        self.presets.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Metrics for a journal, or an "Unknown" record.
    pub fn journal_metadata(&self, name: &str) -> JournalMetadata {
        self.journal_metadata
            .get(name)
            .cloned()
            .unwrap_or_else(JournalMetadata::unknown)
    }
}

fn flatten(categories: &[JournalCategory]) -> Vec<String> {
    categories
        .iter()
        .flat_map(|c| c.journals.iter().cloned())
        .collect()
}

/// Default per-user catalog path: `<config_dir>/papertracker/catalog.toml`
pub fn default_catalog_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("papertracker").join("catalog.toml"))
}
