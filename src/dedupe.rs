//! Cross-source deduplication by title key.
//!
//! Two records denote the same work when their lower-cased, trimmed titles
//! agree on the first `key_len` characters. This is an approximate identity
//! test: long titles that differ only after the prefix collide, and small
//! edits inside the prefix keep records apart.

use crate::record::CandidateRecord;
use std::collections::HashSet;

/// Default number of title characters forming the key.
pub const DEFAULT_TITLE_KEY_LEN: usize = 50;

/// Stable, first-occurrence-wins deduplicator.
#[derive(Debug, Clone, Copy)]
pub struct Deduplicator {
    key_len: usize,
}

impl Deduplicator {
    pub fn new(key_len: usize) -> Self {
        Self { key_len }
    }

    pub fn key_len(&self) -> usize {
        self.key_len
    }

    /// Title key: lower-cased, trimmed, truncated to `key_len` characters.
    pub fn title_key(&self, title: &str) -> String {
        title.to_lowercase().trim().chars().take(self.key_len).collect()
    }

    /// Keep the first record for each title key, preserving input order.
    ///
    /// Records with an empty key are always kept; a missing title says
    /// nothing about identity.
    pub fn dedupe(&self, records: Vec<CandidateRecord>) -> Vec<CandidateRecord> {
        let mut seen: HashSet<String> = HashSet::new();
        records
            .into_iter()
            .filter(|record| {
                let key = self.title_key(&record.title);
                key.is_empty() || seen.insert(key)
            })
            .collect()
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE_KEY_LEN)
    }
}
