//! End-to-end search over an in-memory source using the built-in catalog.

use async_trait::async_trait;
use papertracker::config::Catalog;
use papertracker::export;
use papertracker::pipeline::{Pipeline, SearchRequest};
use papertracker::sources::{FetchQuery, MetadataSource, SourceId};
use papertracker::{CandidateRecord, Priority, Result, Track};
use std::sync::Arc;

struct FixtureSource {
    records: Vec<CandidateRecord>,
}

#[async_trait]
impl MetadataSource for FixtureSource {
    fn id(&self) -> SourceId {
        SourceId::OpenAlex
    }

    fn name(&self) -> &'static str {
        "Fixture"
    }

    async fn fetch(&self, query: &FetchQuery) -> Vec<CandidateRecord> {
        self.records.iter().take(query.limit).cloned().collect()
    }
}

fn paper(title: &str, venue: &str, citations: u64, authors: &[&str]) -> CandidateRecord {
    CandidateRecord {
        identifier: title.to_lowercase(),
        title: title.to_string(),
        year: Some(2022),
        citation_count: citations,
        author_names: authors.iter().map(|a| a.to_string()).collect(),
        venue_name: venue.to_string(),
        source_name: "Fixture".to_string(),
        ..Default::default()
    }
}

fn pipeline(catalog: &Catalog, records: Vec<CandidateRecord>) -> Pipeline {
    let sources: Vec<Arc<dyn MetadataSource>> = vec![Arc::new(FixtureSource { records })];
    Pipeline::new(sources, catalog.venue_matcher())
}

#[tokio::test]
async fn core_journal_ranks_ahead_of_discovery() -> Result<()> {
    let catalog = Catalog::builtin()?;
    let records = vec![
        paper("Social Robot concierges at the hotel desk", "Robotics Letters", 300, &["Dee Cho"]),
        paper("Social Robots in Hotel Lobbies", "Tourism Management", 42, &["Ana Kim", "Ben Lee"]),
        paper("Social Robot gait control", "Robotics Letters", 900, &["Eli Park"]),
        paper("Hotel pricing dynamics", "Tourism Management", 80, &["Fay Wu"]),
    ];
    let request = SearchRequest {
        keywords: vec!["Social Robot".to_string()],
        target_journals: vec!["Tourism Management".to_string()],
        year_start: 2015,
        year_end: 2025,
        strict_journal_filter: true,
        ..Default::default()
    };

    let outcome = pipeline(&catalog, records).search_and_filter(&request).await;

    assert_eq!(outcome.fetched, 4);
    assert_eq!(outcome.unique, 4);
    let titles: Vec<&str> = outcome.records.iter().map(|r| r.record.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Social Robots in Hotel Lobbies",
            "Social Robot gait control",
            "Social Robot concierges at the hotel desk",
        ]
    );
    assert_eq!(outcome.records[0].priority(), Priority::High);
    assert_eq!(outcome.records[0].track(), Track::CoreJournal);
    for r in &outcome.records[1..] {
        assert_eq!(r.priority(), Priority::Medium);
        assert_eq!(r.track(), Track::Discovery);
    }

    let stats = export::summary_stats(&outcome.records);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.high_priority, 1);
    assert_eq!(stats.medium_priority, 2);
    assert_eq!(stats.avg_citations, 414.0);
    assert_eq!(stats.year_range, "2022-2022");
    Ok(())
}

#[tokio::test]
async fn abbreviated_venue_matches_through_alias() -> Result<()> {
    let catalog = Catalog::builtin()?;
    let records = vec![paper("Service robot adoption", "Ann. Tour. Res.", 5, &["Gus Moe"])];
    let request = SearchRequest {
        keywords: vec!["service robot".to_string()],
        target_journals: catalog.target_journals(&[])?,
        year_start: 2015,
        year_end: 2025,
        ..Default::default()
    };

    let outcome = pipeline(&catalog, records).search_and_filter(&request).await;

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].track(), Track::CoreJournal);
    Ok(())
}

#[tokio::test]
async fn exports_written_for_ranked_results() -> Result<()> {
    let catalog = Catalog::builtin()?;
    let records = vec![paper("Social Robots in Hotel Lobbies", "Tourism Management", 42, &["Ana Kim"])];
    let request = SearchRequest {
        keywords: vec!["Social Robot".to_string()],
        target_journals: vec!["Tourism Management".to_string()],
        year_start: 2015,
        year_end: 2025,
        ..Default::default()
    };
    let outcome = pipeline(&catalog, records).search_and_filter(&request).await;

    let dir = tempfile::tempdir()?;
    let csv_path = dir.path().join(export::generate_filename("papers", "csv"));
    let bib_path = dir.path().join(export::generate_filename("papers", "bib"));
    export::save_export(&csv_path, &export::to_csv(&outcome.records)?)?;
    export::save_export(&bib_path, &export::to_bibtex(&outcome.records))?;

    let csv = std::fs::read_to_string(&csv_path)?;
    assert_eq!(csv.lines().count(), 2);
    assert!(csv.contains("High,Core Journal"));

    let bib = std::fs::read_to_string(&bib_path)?;
    assert!(bib.starts_with("@article{Kim2022_1,"));
    assert!(bib.contains("note = {Citations: 42}"));
    Ok(())
}
