//! CSV and BibTeX projections of a result set, plus summary statistics.

use crate::error::{Result, TrackerError};
use crate::record::{ClassifiedRecord, Priority};
use chrono::Local;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Abstracts are cut to this many characters in CSV output
pub const CSV_ABSTRACT_LIMIT: usize = 500;

/// Number of venues reported in [`SummaryStats::top_venues`]
const TOP_VENUES: usize = 5;

/// CSV column order
pub const CSV_COLUMNS: &[&str] = &[
    "title", "authors", "year", "venue", "citations", "priority", "track", "source", "url", "abstract",
];

/// One CSV row, fields in [`CSV_COLUMNS`] order
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    title: &'a str,
    authors: String,
    year: String,
    venue: &'a str,
    citations: u64,
    priority: &'static str,
    track: &'static str,
    source: &'a str,
    url: &'a str,
    #[serde(rename = "abstract")]
    abstract_text: String,
}

impl<'a> From<&'a ClassifiedRecord> for CsvRow<'a> {
    fn from(r: &'a ClassifiedRecord) -> Self {
        let record = &r.record;
        Self {
            title: &record.title,
            authors: record.authors_label(),
            year: record.year_label(),
            venue: &record.venue_name,
            citations: record.citation_count,
            priority: r.priority().as_str(),
            track: r.track().as_str(),
            source: &record.source_name,
            url: &record.url,
            abstract_text: record
                .abstract_text
                .as_deref()
                .unwrap_or_default()
                .chars()
                .take(CSV_ABSTRACT_LIMIT)
                .collect(),
        }
    }
}

/// Render records as CSV with a header row; no records gives an empty string.
pub fn to_csv(records: &[ClassifiedRecord]) -> Result<String> {
    if records.is_empty() {
        return Ok(String::new());
    }

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(Vec::new());

    for record in records {
        wtr.serialize(CsvRow::from(record))?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| TrackerError::Parse(format!("Failed to flush CSV: {}", e.error())))?;
    String::from_utf8(bytes).map_err(|e| TrackerError::Parse(e.to_string()))
}

/// Render records as `@article` BibTeX entries separated by blank lines.
pub fn to_bibtex(records: &[ClassifiedRecord]) -> String {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| bibtex_entry(r, i + 1))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn bibtex_entry(r: &ClassifiedRecord, index: usize) -> String {
    let record = &r.record;
    let mut entry = format!(
        "@article{{{},\n  title = {{{}}},\n  author = {{{}}},\n  year = {{{}}},\n  journal = {{{}}}",
        bibtex_key(r, index),
        record.title,
        record.author_names.join(" and "),
        record.year_label(),
        record.venue_name,
    );
    if !record.url.is_empty() {
        entry.push_str(&format!(",\n  url = {{{}}}", record.url));
    }
    if record.citation_count > 0 {
        entry.push_str(&format!(",\n  note = {{Citations: {}}}", record.citation_count));
    }
    entry.push_str("\n}");
    entry
}

/// `{lastNameOfFirstAuthor}{year}_{index}` with everything but
/// alphanumerics and underscores removed.
pub fn bibtex_key(r: &ClassifiedRecord, index: usize) -> String {
    let last_name = r
        .record
        .author_names
        .first()
        .and_then(|name| name.split_whitespace().last())
        .unwrap_or("Unknown");
    format!("{}{}_{}", last_name, r.record.year_label(), index)
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// Aggregate figures for a result set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total: usize,
    pub high_priority: usize,
    pub medium_priority: usize,
    pub avg_citations: f64,
    /// "min-max" over known years, or "N/A"
    pub year_range: String,
    /// Most frequent venues with their counts
    pub top_venues: Vec<(String, usize)>,
}

pub fn summary_stats(records: &[ClassifiedRecord]) -> SummaryStats {
    if records.is_empty() {
        return SummaryStats {
            total: 0,
            high_priority: 0,
            medium_priority: 0,
            avg_citations: 0.0,
            year_range: "N/A".to_string(),
            top_venues: Vec::new(),
        };
    }

    let count_priority = |p: Priority| records.iter().filter(|r| r.priority() == p).count();

    let total_citations: u64 = records.iter().map(|r| r.record.citation_count).sum();
    let avg = total_citations as f64 / records.len() as f64;

    let years: Vec<i32> = records.iter().filter_map(|r| r.record.year).collect();
    let year_range = match (years.iter().min(), years.iter().max()) {
        (Some(min), Some(max)) => format!("{}-{}", min, max),
        _ => "N/A".to_string(),
    };

    // Count venues, remembering first appearance for stable tie order.
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (pos, r) in records.iter().enumerate() {
        let venue = if r.record.venue_name.is_empty() {
            "Unknown"
        } else {
            r.record.venue_name.as_str()
        };
        counts.entry(venue).or_insert((0, pos)).0 += 1;
    }
    let mut venues: Vec<(&str, (usize, usize))> = counts.into_iter().collect();
    venues.sort_by_key(|(_, (count, first))| (std::cmp::Reverse(*count), *first));

    SummaryStats {
        total: records.len(),
        high_priority: count_priority(Priority::High),
        medium_priority: count_priority(Priority::Medium),
        avg_citations: (avg * 10.0).round() / 10.0,
        year_range,
        top_venues: venues
            .into_iter()
            .take(TOP_VENUES)
            .map(|(v, (count, _))| (v.to_string(), count))
            .collect(),
    }
}

/// Timestamped file name, e.g. `papers_20250101_120000.csv`
pub fn generate_filename(prefix: &str, extension: &str) -> String {
    format!("{}_{}.{}", prefix, Local::now().format("%Y%m%d_%H%M%S"), extension)
}

/// Write rendered export text to disk
pub fn save_export(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)?;
    info!(path = %path.display(), bytes = content.len(), "Saved export");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CandidateRecord, Relevance};

    fn classified(
        title: &str,
        authors: &[&str],
        year: Option<i32>,
        venue: &str,
        citations: u64,
        relevance: Relevance,
    ) -> ClassifiedRecord {
        ClassifiedRecord::new(
            CandidateRecord {
                title: title.to_string(),
                author_names: authors.iter().map(|a| a.to_string()).collect(),
                year,
                venue_name: venue.to_string(),
                citation_count: citations,
                source_name: "OpenAlex".to_string(),
                ..Default::default()
            },
            relevance,
        )
    }

    #[test]
    fn test_csv_header_and_empty_values() -> Result<()> {
        let mut record = classified("Robots, hotels", &["Ana Kim", "Ben Lee"], None, "", 0, Relevance::Discovery);
        record.record.abstract_text = Some("x".repeat(600));

        let csv = to_csv(&[record])?;
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(CSV_COLUMNS.join(",").as_str()));

        let row = lines.next().unwrap_or_default();
        assert!(row.starts_with("\"Robots, hotels\",\"Ana Kim, Ben Lee\",,,0,Medium,Discovery,OpenAlex,,"));
        assert!(!row.contains("None"));
        assert!(row.ends_with(&"x".repeat(CSV_ABSTRACT_LIMIT)));
        assert!(!row.contains(&"x".repeat(CSV_ABSTRACT_LIMIT + 1)));
        Ok(())
    }

    #[test]
    fn test_csv_empty_input() -> Result<()> {
        assert_eq!(to_csv(&[])?, "");
        Ok(())
    }

    #[test]
    fn test_bibtex_key() {
        let r = classified("T", &["Mary-Jane O'Neil", "B"], Some(2021), "", 0, Relevance::CoreJournal);
        assert_eq!(bibtex_key(&r, 3), "ONeil2021_3");

        let anon = classified("T", &[], None, "", 0, Relevance::CoreJournal);
        assert_eq!(bibtex_key(&anon, 1), "Unknown_1");
    }

    #[test]
    fn test_bibtex_optional_fields() {
        let mut cited = classified("Robot Hotels", &["Ana Kim", "Ben Lee"], Some(2020), "Tourism Management", 12, Relevance::CoreJournal);
        cited.record.url = "https://doi.org/10.1/x".to_string();
        let uncited = classified("Quiet Paper", &["Cy Park"], Some(2019), "Cities", 0, Relevance::KeywordMatch);

        let bib = to_bibtex(&[cited, uncited]);
        let entries: Vec<&str> = bib.split("\n\n").collect();
        assert_eq!(entries.len(), 2);

        assert!(entries[0].starts_with("@article{Kim2020_1,"));
        assert!(entries[0].contains("author = {Ana Kim and Ben Lee}"));
        assert!(entries[0].contains("journal = {Tourism Management}"));
        assert!(entries[0].contains("url = {https://doi.org/10.1/x}"));
        assert!(entries[0].contains("note = {Citations: 12}"));

        assert!(entries[1].starts_with("@article{Park2019_2,"));
        assert!(entries[1].contains("title = {Quiet Paper}"));
        assert!(entries[1].contains("year = {2019}"));
        assert!(!entries[1].contains("url ="));
        assert!(!entries[1].contains("note ="));
        assert!(entries[1].ends_with('}'));
    }

    #[test]
    fn test_summary_stats() {
        let records = vec![
            classified("a", &[], Some(2018), "Tourism Management", 10, Relevance::CoreJournal),
            classified("b", &[], Some(2023), "Cities", 5, Relevance::Discovery),
            classified("c", &[], None, "Tourism Management", 0, Relevance::KeywordMatch),
            classified("d", &[], Some(2020), "", 1, Relevance::Discovery),
        ];
        let stats = summary_stats(&records);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.high_priority, 1);
        assert_eq!(stats.medium_priority, 2);
        assert_eq!(stats.avg_citations, 4.0);
        assert_eq!(stats.year_range, "2018-2023");
        assert_eq!(
            stats.top_venues,
            vec![
                ("Tourism Management".to_string(), 2),
                ("Cities".to_string(), 1),
                ("Unknown".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_summary_stats_empty() {
        let stats = summary_stats(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.year_range, "N/A");
        assert!(stats.top_venues.is_empty());
    }

    #[test]
    fn test_generate_filename() {
        let name = generate_filename("papers", "bib");
        assert!(name.starts_with("papers_"));
        assert!(name.ends_with(".bib"));
        assert_eq!(name.len(), "papers_20250101_120000.bib".len());
    }
}
