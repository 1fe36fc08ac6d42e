//! papertracker - Research Paper Discovery Pipeline
//!
//! Searches Semantic Scholar and OpenAlex, merges and de-duplicates the
//! results, classifies them against a journal catalog, and writes ranked
//! CSV/BibTeX exports.
//!
//! ## Usage
//!
//! ### CLI Mode
//! ```bash
//! papertracker search "service robot, hotel" --category Tourism_Top3
//! papertracker search --preset "social robots in tourism" --expand
//! ```
//!
//! ### HTTP Server Mode
//! ```bash
//! papertracker serve --port 3000
//! ```

use anyhow::{Context, Result};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use clap::{Parser, Subcommand, ValueEnum};
use papertracker::{
    config::{Catalog, ResearchPreset},
    export,
    keywords,
    pipeline::{current_year, Pipeline, SearchOutcome, SearchRequest},
    rank::SortOrder,
    sources::SourceSelection,
    ClassifiedRecord,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Research paper discovery - journal-aware search over scholarly APIs
#[derive(Parser)]
#[command(name = "papertracker")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Catalog file (defaults to the per-user catalog, then the built-in one)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search papers and classify them against the target journals
    Search {
        /// Comma-separated keywords
        keywords: Option<String>,

        /// Use the keywords of a named research preset
        #[arg(long, conflicts_with = "keywords")]
        preset: Option<String>,

        /// Expand keywords with catalog synonyms
        #[arg(long)]
        expand: bool,

        /// Target journal category (repeatable; default: all categories)
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Also match the extended journal list
        #[arg(long)]
        include_extended: bool,

        /// First publication year
        #[arg(long, default_value = "2015")]
        year_start: i32,

        /// Last publication year (default: current year)
        #[arg(long)]
        year_end: Option<i32>,

        /// Minimum citation count
        #[arg(long, default_value = "0")]
        min_citations: u64,

        /// Maximum results returned
        #[arg(long, default_value = "50")]
        limit: usize,

        /// Drop keyword-only matches outside the target journals
        #[arg(long)]
        strict: bool,

        /// Sources to query: semantic, openalex or both
        #[arg(long, default_value = "both")]
        source: SourceSelection,

        /// Result order: priority, citations, year-desc or year-asc
        #[arg(long, default_value = "priority")]
        sort: SortOrder,

        /// Output directory
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Export format
        #[arg(long, value_enum, default_value = "both")]
        format: ExportFormat,
    },

    /// List research presets
    Presets,

    /// List target and extended journals
    Journals,

    /// Run as HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Csv,
    Bibtex,
    Both,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    if cli.json_logs {
        fmt().json().with_env_filter(filter).with_target(true).init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .init();
    }

    let catalog = Catalog::resolve(cli.config.as_deref()).context("Failed to load catalog")?;

    match cli.command {
        Commands::Search {
            keywords,
            preset,
            expand,
            categories,
            include_extended,
            year_start,
            year_end,
            min_citations,
            limit,
            strict,
            source,
            sort,
            output,
            format,
        } => {
            let keywords = resolve_keywords(&catalog, keywords.as_deref(), preset.as_deref(), expand)?;
            let request = SearchRequest {
                keywords,
                target_journals: catalog.target_journals(&categories)?,
                extended_journals: catalog.extended_journals(),
                year_start,
                year_end: year_end.unwrap_or_else(current_year),
                min_citations,
                include_extended,
                limit,
                strict_journal_filter: strict,
                source,
                sort,
            };
            run_search(&catalog, request, output, format).await
        }
        Commands::Presets => {
            print_presets(&catalog.presets);
            Ok(())
        }
        Commands::Journals => {
            print_journals(&catalog);
            Ok(())
        }
        Commands::Serve { port, host } => run_server(catalog, host, port).await,
    }
}

// ============================================================================
// Search
// ============================================================================

/// Keywords from the positional list or a preset, optionally expanded.
fn resolve_keywords(
    catalog: &Catalog,
    keywords: Option<&str>,
    preset: Option<&str>,
    expand: bool,
) -> Result<Vec<String>> {
    let base = match (keywords, preset) {
        (_, Some(name)) => catalog
            .preset(name)
            .map(|p| p.keywords.clone())
            .with_context(|| format!("Unknown preset '{}' (see `papertracker presets`)", name))?,
        (Some(list), None) => keywords::parse_keyword_list(list),
        (None, None) => anyhow::bail!("Provide keywords or --preset"),
    };
    if base.is_empty() {
        anyhow::bail!("No keywords given");
    }

    if expand {
        let expanded = keywords::all_expanded_terms(&base, &catalog.expansions);
        info!(original = base.len(), expanded = expanded.len(), "Expanded keywords");
        Ok(expanded)
    } else {
        Ok(base)
    }
}

fn validate_request(request: &SearchRequest) -> Result<()> {
    if request.year_start > request.year_end {
        anyhow::bail!(
            "year_start ({}) is after year_end ({})",
            request.year_start,
            request.year_end
        );
    }
    if request.limit == 0 {
        anyhow::bail!("limit must be at least 1");
    }
    Ok(())
}

async fn run_search(
    catalog: &Catalog,
    request: SearchRequest,
    output_dir: PathBuf,
    format: ExportFormat,
) -> Result<()> {
    validate_request(&request)?;
    let pipeline = Pipeline::from_catalog(catalog).context("Failed to build pipeline")?;

    println!("\n--- Searching: {} ---", request.keywords.join(", "));
    println!(
        "Years {}-{}, {} target journals{}",
        request.year_start,
        request.year_end,
        request.target_journals.len(),
        if request.include_extended { " (+ extended)" } else { "" }
    );

    let outcome = pipeline.search_and_filter(&request).await;
    println!(
        "Fetched {} records, {} unique after deduplication",
        outcome.fetched, outcome.unique
    );

    if outcome.is_empty() {
        println!("\nNo matching papers found.");
        return Ok(());
    }

    print_results(catalog, &outcome);
    print_summary(&export::summary_stats(&outcome.records));

    std::fs::create_dir_all(&output_dir).context("Failed to create output directory")?;
    write_exports(&outcome.records, &output_dir, format)?;

    println!("\n✓ Search complete. Results in: {}", output_dir.display());
    Ok(())
}

fn write_exports(records: &[ClassifiedRecord], output_dir: &std::path::Path, format: ExportFormat) -> Result<()> {
    if matches!(format, ExportFormat::Csv | ExportFormat::Both) {
        let path = output_dir.join(export::generate_filename("papers", "csv"));
        let csv = export::to_csv(records).context("Failed to render CSV")?;
        export::save_export(&path, &csv).context("Failed to write CSV")?;
        println!("Saved: {}", path.display());
    }
    if matches!(format, ExportFormat::Bibtex | ExportFormat::Both) {
        let path = output_dir.join(export::generate_filename("papers", "bib"));
        export::save_export(&path, &export::to_bibtex(records)).context("Failed to write BibTeX")?;
        println!("Saved: {}", path.display());
    }
    Ok(())
}

fn print_results(catalog: &Catalog, outcome: &SearchOutcome) {
    println!("\n--- {} papers ---", outcome.records.len());
    for (i, r) in outcome.records.iter().enumerate() {
        let record = &r.record;
        println!(
            "{:>3}. [{}] {} ({})",
            i + 1,
            r.priority(),
            record.title,
            if record.year_label().is_empty() { "n.d.".to_string() } else { record.year_label() }
        );
        println!(
            "     {} | {} | {} citations | {}",
            r.track(),
            if record.venue_name.is_empty() { "Unknown venue" } else { record.venue_name.as_str() },
            record.citation_count,
            record.source_name
        );
        if !record.author_names.is_empty() {
            println!("     {}", record.authors_label());
        }
        let meta = catalog.journal_metadata(&record.venue_name);
        if let Some(impact) = meta.impact_factor {
            println!("     IF {:.1} | {}", impact, meta.tier);
        }
    }
}

fn print_summary(stats: &export::SummaryStats) {
    println!("\n--- Summary ---");
    println!("Total: {}", stats.total);
    println!("High priority: {}", stats.high_priority);
    println!("Medium priority: {}", stats.medium_priority);
    println!("Average citations: {:.1}", stats.avg_citations);
    println!("Years: {}", stats.year_range);
    if !stats.top_venues.is_empty() {
        println!("Top venues:");
        for (venue, count) in &stats.top_venues {
            println!("  {} ({})", venue, count);
        }
    }
}

fn print_presets(presets: &[ResearchPreset]) {
    for preset in presets {
        println!("{}", preset.name);
        if !preset.description.is_empty() {
            println!("  {}", preset.description);
        }
        println!("  keywords: {}", preset.keywords.join(", "));
    }
}

fn print_journals(catalog: &Catalog) {
    println!("Target journals:");
    for category in &catalog.target_journals {
        println!("\n[{}] {}", category.name, category.description);
        for journal in &category.journals {
            let meta = catalog.journal_metadata(journal);
            match meta.impact_factor {
                Some(impact) => println!("  {} (IF {:.1}, {})", journal, impact, meta.tier),
                None => println!("  {}", journal),
            }
        }
    }
    println!("\nExtended journals:");
    for category in &catalog.extended_journals {
        println!("\n[{}] {}", category.name, category.description);
        for journal in &category.journals {
            println!("  {}", journal);
        }
    }
}

// ============================================================================
// HTTP Server
// ============================================================================

struct AppState {
    pipeline: Pipeline,
    catalog: Catalog,
}

async fn run_server(catalog: Catalog, host: String, port: u16) -> Result<()> {
    info!(host = %host, port = port, "Starting HTTP server");

    let pipeline = Pipeline::from_catalog(&catalog).context("Failed to build pipeline")?;
    let app_state = Arc::new(AppState { pipeline, catalog });

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/presets", get(presets_handler))
        .route("/search", post(search_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .context("Invalid host:port")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}

async fn presets_handler(State(state): State<Arc<AppState>>) -> Json<Vec<ResearchPreset>> {
    Json(state.catalog.presets.clone())
}

/// Search response
#[derive(Debug, Serialize)]
struct SearchResponse {
    status: String,
    count: usize,
    stats: Option<export::SummaryStats>,
    results: Vec<ClassifiedRecord>,
}

impl SearchResponse {
    fn failed(message: String) -> Self {
        Self {
            status: format!("error: {}", message),
            count: 0,
            stats: None,
            results: Vec::new(),
        }
    }
}

/// Search endpoint handler; journal lists left empty come from the catalog.
async fn search_handler(
    State(state): State<Arc<AppState>>,
    Json(mut req): Json<SearchRequest>,
) -> Json<SearchResponse> {
    info!(keywords = ?req.keywords, source = ?req.source, "Search request");

    if req.target_journals.is_empty() {
        req.target_journals = match state.catalog.target_journals(&[]) {
            Ok(journals) => journals,
            Err(e) => return Json(SearchResponse::failed(e.to_string())),
        };
    }
    if req.extended_journals.is_empty() {
        req.extended_journals = state.catalog.extended_journals();
    }
    if let Err(e) = validate_request(&req) {
        error!(error = %e, "Rejected search request");
        return Json(SearchResponse::failed(e.to_string()));
    }

    let outcome = state.pipeline.search_and_filter(&req).await;
    Json(SearchResponse {
        status: "success".to_string(),
        count: outcome.records.len(),
        stats: Some(export::summary_stats(&outcome.records)),
        results: outcome.records,
    })
}
