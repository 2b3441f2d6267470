//! Newsdesk main entry point
//!
//! This is the command-line interface for the Newsdesk ingestion pipeline.

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use newsdesk_ingest::config::{load_config_with_hash, Config, EngineConfig, ALL_SOURCES_KEY};
use newsdesk_ingest::output::{load_statistics, print_articles, print_statistics};
use newsdesk_ingest::retention::RetentionSweeper;
use newsdesk_ingest::scheduler::spawn_periodic;
use newsdesk_ingest::trigger::trigger_source;
use newsdesk_ingest::IngestContext;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Newsdesk: a resilient multi-source news ingester
///
/// Newsdesk pulls headlines from news front pages and RSS/Atom feeds,
/// deduplicates them and keeps a rolling window of articles in SQLite.
#[derive(Parser, Debug)]
#[command(name = "newsdesk")]
#[command(version = "1.0.0")]
#[command(about = "A resilient multi-source news ingester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Scrape a single source now (or "all") and print the JSON response
    #[arg(long, value_name = "KEY", conflicts_with_all = ["watch", "sweep", "stats", "latest", "dry_run"])]
    source: Option<String>,

    /// Run once, then keep running on the configured schedule until Ctrl-C
    #[arg(long, conflicts_with_all = ["sweep", "stats", "latest", "dry_run"])]
    watch: bool,

    /// Delete articles older than the retention window and exit
    #[arg(long, conflicts_with_all = ["stats", "latest", "dry_run"])]
    sweep: bool,

    /// Show store statistics and exit
    #[arg(long, conflicts_with_all = ["latest", "dry_run"])]
    stats: bool,

    /// Print the latest N articles and exit
    #[arg(long, value_name = "N", conflicts_with = "dry_run")]
    latest: Option<usize>,

    /// Validate config and show the resolved sources without fetching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let context = IngestContext::open(config, config_hash).context("failed to open article store")?;

    if let Some(key) = cli.source.as_deref() {
        handle_source(&context, key).await
    } else if cli.watch {
        handle_watch(&context).await
    } else if cli.sweep {
        handle_sweep(&context)
    } else if cli.stats {
        handle_stats(&context)
    } else if let Some(limit) = cli.latest {
        handle_latest(&context, limit)
    } else {
        handle_run(&context).await;
        Ok(())
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("newsdesk_ingest=info,warn"),
            1 => EnvFilter::new("newsdesk_ingest=debug,info"),
            2 => EnvFilter::new("newsdesk_ingest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the resolved configuration
fn handle_dry_run(config: &Config) {
    println!("=== Newsdesk Dry Run ===\n");

    println!("Ingest Settings:");
    println!("  Request timeout: {}s", config.ingest.request_timeout_secs);
    println!(
        "  Attempts per page: {} ({} soft)",
        config.ingest.max_attempts, config.ingest.soft_retry_attempts
    );
    println!("  Time unit: {}ms", config.ingest.time_unit_ms);
    println!("  Retention: {} days", config.ingest.retention_days);
    println!("  Schedule: every {} minutes", config.ingest.schedule_interval_mins);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nSources ({}):", config.sources.len());
    for source in &config.sources {
        let engine = match &source.engine {
            EngineConfig::Html { selectors, stop_after, .. } => {
                let mut desc = format!("html, {} selectors", selectors.len());
                if selectors.is_empty() {
                    desc = "html, generic extraction".to_string();
                }
                if let Some(threshold) = stop_after {
                    desc.push_str(&format!(", stop after {}", threshold));
                }
                desc
            }
            EngineConfig::Feed { freshness, delay, .. } => {
                let mut desc = format!("feed, freshness {:?}", freshness);
                if let Some([min, max]) = delay {
                    desc.push_str(&format!(", delay {}-{} units", min, max));
                }
                desc
            }
        };
        println!(
            "  - {} [{}] ({}; {:?})",
            source.name, source.key, engine, source.persistence
        );
        for url in source.urls() {
            println!("    * {}", url);
        }
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would ingest {} URLs from {} sources",
        config.sources.iter().map(|s| s.urls().len()).sum::<usize>(),
        config.sources.len()
    );
}

/// Handles the --source mode: one source (or all) with a JSON response
async fn handle_source(context: &IngestContext, key: &str) -> anyhow::Result<()> {
    if key == ALL_SOURCES_KEY {
        tracing::info!("Triggering every source");
    } else {
        tracing::info!("Triggering source: {}", key);
    }
    let response = trigger_source(&context.orchestrator(), key).await;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Handles the --watch mode: run now, then on schedule until Ctrl-C
async fn handle_watch(context: &IngestContext) -> anyhow::Result<()> {
    let orchestrator = context.orchestrator();
    let interval = context.config.ingest.schedule_interval();

    handle_run(context).await;

    tracing::info!("Scheduling runs every {} minutes", interval.as_secs() / 60);
    let handle = spawn_periodic(orchestrator, interval);

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;

    tracing::info!("Shutting down scheduler");
    handle.stop();
    Ok(())
}

/// Handles the --sweep mode
fn handle_sweep(context: &IngestContext) -> anyhow::Result<()> {
    let sweeper = RetentionSweeper::new(
        context.store.clone(),
        context.config.ingest.retention_window(),
    );
    let deleted = sweeper.sweep(Utc::now())?;
    println!("✓ Deleted {} expired articles", deleted);
    Ok(())
}

/// Handles the --stats mode
fn handle_stats(context: &IngestContext) -> anyhow::Result<()> {
    println!("Database: {}\n", context.config.output.database_path);
    let stats = load_statistics(context.store.as_ref())?;
    print_statistics(&stats);
    Ok(())
}

/// Handles the --latest mode
fn handle_latest(context: &IngestContext, limit: usize) -> anyhow::Result<()> {
    let articles = context.store.latest(Utc::now(), limit)?;
    print_articles(&articles);
    Ok(())
}

/// Handles the default mode: one full run
async fn handle_run(context: &IngestContext) {
    let orchestrator = context.orchestrator();
    tracing::info!("Sources: {}", orchestrator.keys().join(", "));

    let articles = orchestrator.run_all().await;
    tracing::info!("Run completed with {} articles persisted", articles.len());
}
