//! Canonical record shapes shared by every stage of the pipeline.
//!
//! Source adapters produce [`CandidateRecord`]s; the classifier turns the
//! survivors into [`ClassifiedRecord`]s. Priority and track are never stored
//! separately: both derive from a single [`Relevance`] value, so a record can
//! only carry one of the defined pairings.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// One bibliographic item as returned by a source adapter, pre-classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Source-scoped identifier (Semantic Scholar paper id, OpenAlex work id)
    pub identifier: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    /// Four-digit publication year; `None` when the source did not supply one
    pub year: Option<i32>,
    pub citation_count: u64,
    /// First three authors, in source order
    pub author_names: Vec<String>,
    pub venue_name: String,
    pub url: String,
    pub pdf_url: String,
    /// Which provider produced the record
    pub source_name: String,
}

impl CandidateRecord {
    /// Accept a year only when it is a four-digit integer.
    pub fn checked_year(year: Option<i64>) -> Option<i32> {
        year.filter(|y| (1000..=9999).contains(y))
            .and_then(|y| i32::try_from(y).ok())
    }

    /// Year as display text; unknown years render as an empty string.
    pub fn year_label(&self) -> String {
        self.year.map(|y| y.to_string()).unwrap_or_default()
    }

    /// Authors joined with ", " as shown in tables and CSV.
    pub fn authors_label(&self) -> String {
        self.author_names.join(", ")
    }

    /// Lower-cased "title abstract" text used for keyword tests.
    ///
    /// Missing fields count as empty strings, so the result always contains
    /// at least the joining space.
    pub fn search_text(&self) -> String {
        format!(
            "{} {}",
            self.title,
            self.abstract_text.as_deref().unwrap_or_default()
        )
        .to_lowercase()
    }
}

/// Ordinal relevance tier driving display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
    Unknown,
}

impl Priority {
    /// Sort rank: lower sorts first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
            Priority::Unknown => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
            Priority::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label explaining why a record was included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Track {
    #[serde(rename = "Core Journal")]
    CoreJournal,
    Discovery,
    #[serde(rename = "Keyword Match")]
    KeywordMatch,
    Unknown,
}

impl Track {
    pub fn as_str(self) -> &'static str {
        match self {
            Track::CoreJournal => "Core Journal",
            Track::Discovery => "Discovery",
            Track::KeywordMatch => "Keyword Match",
            Track::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The classification outcome; priority and track are projections of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relevance {
    /// Target venue and keyword match
    CoreJournal,
    /// Keyword plus domain-context match outside the target venues
    Discovery,
    /// Keyword match only, allowed when the journal filter is not strict
    KeywordMatch,
    /// Placeholder for records whose classification is not known
    Unclassified,
}

impl Relevance {
    pub fn priority(self) -> Priority {
        match self {
            Relevance::CoreJournal => Priority::High,
            Relevance::Discovery => Priority::Medium,
            Relevance::KeywordMatch => Priority::Low,
            Relevance::Unclassified => Priority::Unknown,
        }
    }

    pub fn track(self) -> Track {
        match self {
            Relevance::CoreJournal => Track::CoreJournal,
            Relevance::Discovery => Track::Discovery,
            Relevance::KeywordMatch => Track::KeywordMatch,
            Relevance::Unclassified => Track::Unknown,
        }
    }

    /// Rebuild a relevance from an externally supplied pair.
    ///
    /// Returns `None` for any pairing other than the defined ones.
    pub fn from_parts(priority: Priority, track: Track) -> Option<Self> {
        match (priority, track) {
            (Priority::High, Track::CoreJournal) => Some(Relevance::CoreJournal),
            (Priority::Medium, Track::Discovery) => Some(Relevance::Discovery),
            (Priority::Low, Track::KeywordMatch) => Some(Relevance::KeywordMatch),
            (Priority::Unknown, Track::Unknown) => Some(Relevance::Unclassified),
            _ => None,
        }
    }
}

/// A candidate record augmented with its relevance classification.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRecord {
    pub record: CandidateRecord,
    pub relevance: Relevance,
}

impl ClassifiedRecord {
    pub fn new(record: CandidateRecord, relevance: Relevance) -> Self {
        Self { record, relevance }
    }

    pub fn priority(&self) -> Priority {
        self.relevance.priority()
    }

    pub fn track(&self) -> Track {
        self.relevance.track()
    }
}

/// Flat wire view: record fields followed by priority and track.
#[derive(Serialize)]
struct ClassifiedView<'a> {
    #[serde(flatten)]
    record: &'a CandidateRecord,
    priority: Priority,
    track: Track,
}

impl Serialize for ClassifiedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        ClassifiedView {
            record: &self.record,
            priority: self.priority(),
            track: self.track(),
        }
        .serialize(serializer)
    }
}
