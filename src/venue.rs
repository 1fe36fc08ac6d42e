//! Venue matching against a target journal set.
//!
//! Venue strings coming back from scholarly APIs are abbreviated and
//! punctuated inconsistently, so matching degrades from exact comparison to
//! heuristics. The matcher runs an ordered list of [`MatchPass`]es per
//! target and stops at the first pass that accepts. Stricter strategies
//! (edit distance, ISSN lookup) plug in by supplying a different pass list.

use std::collections::{BTreeMap, HashSet};
use tracing::trace;

/// Words ignored by the token-overlap pass.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "of",
    "the",
    "and",
    "in",
    "for",
    "a",
    "an",
    "journal",
    "international",
];

/// Minimum number of meaningful shared tokens for the token-overlap pass.
pub const DEFAULT_MIN_TOKEN_OVERLAP: usize = 2;

/// Normalize a venue or journal name for comparison.
///
/// Lower-cases, replaces `. , : ; &` with spaces and collapses whitespace.
pub fn normalize_venue(venue: &str) -> String {
    let lowered: String = venue
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '.' | ',' | ':' | ';' | '&' => ' ',
            other => other,
        })
        .collect();
    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One named matching strategy. Both arguments are already normalized.
pub trait MatchPass: Send + Sync {
    fn name(&self) -> &'static str;

    fn matches(&self, venue: &str, target: &str) -> bool;
}

/// Pass 1: normalized strings are equal.
pub struct ExactPass;

impl MatchPass for ExactPass {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn matches(&self, venue: &str, target: &str) -> bool {
        venue == target
    }
}

/// Pass 2: either normalized string contains the other.
pub struct ContainmentPass;

impl MatchPass for ContainmentPass {
    fn name(&self) -> &'static str {
        "containment"
    }

    fn matches(&self, venue: &str, target: &str) -> bool {
        contains_either(venue, target)
    }
}

/// Pass 3: enough shared tokens remain after removing stop words.
pub struct TokenOverlapPass {
    min_shared: usize,
    stop_words: HashSet<String>,
}

impl TokenOverlapPass {
    pub fn new<I, S>(min_shared: usize, stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            min_shared,
            stop_words: stop_words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }
}

impl Default for TokenOverlapPass {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_TOKEN_OVERLAP, DEFAULT_STOP_WORDS.iter())
    }
}

impl MatchPass for TokenOverlapPass {
    fn name(&self) -> &'static str {
        "token-overlap"
    }

    fn matches(&self, venue: &str, target: &str) -> bool {
        let venue_tokens: HashSet<&str> = venue.split_whitespace().collect();
        let shared = target
            .split_whitespace()
            .collect::<HashSet<&str>>()
            .into_iter()
            .filter(|t| venue_tokens.contains(t) && !self.stop_words.contains(*t))
            .count();
        shared >= self.min_shared
    }
}

/// Known abbreviations keyed by normalized canonical journal name.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: BTreeMap<String, Vec<String>>,
}

impl AliasTable {
    /// Build a table from raw names; keys and aliases are normalized, and
    /// keys colliding after normalization merge their alias lists.
    pub fn new<'a, I>(raw: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a Vec<String>)>,
    {
        let mut entries: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, aliases) in raw {
            let slot = entries.entry(normalize_venue(name)).or_default();
            for alias in aliases {
                let alias = normalize_venue(alias);
                if !alias.is_empty() && !slot.contains(&alias) {
                    slot.push(alias);
                }
            }
        }
        Self { entries }
    }

    /// Aliases registered for a normalized journal name.
    pub fn get(&self, normalized_target: &str) -> &[String] {
        self.entries
            .get(normalized_target)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Pass 4: any alias of the target passes the containment test.
pub struct AliasPass {
    aliases: AliasTable,
}

impl AliasPass {
    pub fn new(aliases: AliasTable) -> Self {
        Self { aliases }
    }
}

impl MatchPass for AliasPass {
    fn name(&self) -> &'static str {
        "alias"
    }

    fn matches(&self, venue: &str, target: &str) -> bool {
        self.aliases
            .get(target)
            .iter()
            .any(|alias| contains_either(venue, alias))
    }
}

fn contains_either(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

/// Decides whether a venue plausibly names one of a set of target journals.
pub struct VenueMatcher {
    passes: Vec<Box<dyn MatchPass>>,
}

impl VenueMatcher {
    /// Exact, containment, token-overlap and alias passes, in that order.
    pub fn new(aliases: AliasTable, min_token_overlap: usize, stop_words: &[String]) -> Self {
        Self::with_passes(vec![
            Box::new(ExactPass),
            Box::new(ContainmentPass),
            Box::new(TokenOverlapPass::new(min_token_overlap, stop_words)),
            Box::new(AliasPass::new(aliases)),
        ])
    }

    /// Matcher running the given passes in order.
    pub fn with_passes(passes: Vec<Box<dyn MatchPass>>) -> Self {
        Self { passes }
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// True when any pass accepts the venue for any target.
    pub fn matches<S: AsRef<str>>(&self, venue: &str, targets: &[S]) -> bool {
        self.first_match(venue, targets).is_some()
    }

    /// Name of the first accepting pass, or `None` if nothing matched.
    pub fn first_match<S: AsRef<str>>(&self, venue: &str, targets: &[S]) -> Option<&'static str> {
        let venue_norm = normalize_venue(venue);
        if venue_norm.is_empty() {
            return None;
        }

        for target in targets {
            let target_norm = normalize_venue(target.as_ref());
            // An empty target would be contained in every venue.
            if target_norm.is_empty() {
                continue;
            }
            for pass in &self.passes {
                if pass.matches(&venue_norm, &target_norm) {
                    trace!(
                        venue = venue,
                        target = target.as_ref(),
                        pass = pass.name(),
                        "Venue matched"
                    );
                    return Some(pass.name());
                }
            }
        }

        None
    }
}

impl Default for VenueMatcher {
    fn default() -> Self {
        let stop_words: Vec<String> = DEFAULT_STOP_WORDS.iter().map(|s| s.to_string()).collect();
        Self::new(AliasTable::default(), DEFAULT_MIN_TOKEN_OVERLAP, &stop_words)
    }
}
