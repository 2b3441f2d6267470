//! Store statistics
//!
//! This module provides functionality for extracting and displaying
//! service status from the article store.

use crate::storage::{ArticleStore, RunRecord, StorageResult};
use std::fmt::Write;

/// Service status summary
#[derive(Debug, Clone)]
pub struct StoreStatistics {
    /// Total number of stored articles
    pub total_articles: u64,

    /// Article count per source, sorted by source name
    pub by_source: Vec<(String, u64)>,

    /// Most recent ingestion run, if any
    pub last_run: Option<RunRecord>,
}

/// Loads statistics from the store
///
/// # Returns
///
/// * `Ok(StoreStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(store: &dyn ArticleStore) -> StorageResult<StoreStatistics> {
    Ok(StoreStatistics {
        total_articles: store.count_articles()?,
        by_source: store.count_by_source()?,
        last_run: store.get_latest_run()?,
    })
}

/// Renders statistics as a human-readable report
pub fn format_statistics(stats: &StoreStatistics) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Newsdesk Status ===\n");
    let _ = writeln!(out, "Articles stored: {}", stats.total_articles);
    let _ = writeln!(out);

    if !stats.by_source.is_empty() {
        let _ = writeln!(out, "By Source:");
        for (source, count) in &stats.by_source {
            let percentage = if stats.total_articles > 0 {
                (*count as f64 / stats.total_articles as f64) * 100.0
            } else {
                0.0
            };
            let _ = writeln!(out, "  {}: {} ({:.1}%)", source, count, percentage);
        }
        let _ = writeln!(out);
    }

    match &stats.last_run {
        Some(run) => {
            let _ = writeln!(out, "Last Run (#{}):", run.id);
            let _ = writeln!(out, "  Status: {}", run.status);
            let _ = writeln!(out, "  Started: {}", run.started_at.format("%Y-%m-%d %H:%M:%S UTC"));
            if let Some(finished) = run.finished_at {
                let elapsed = finished - run.started_at;
                let _ = writeln!(
                    out,
                    "  Finished: {} ({}s)",
                    finished.format("%Y-%m-%d %H:%M:%S UTC"),
                    elapsed.num_seconds()
                );
            }
            let _ = writeln!(out, "  Persisted: {}", run.persisted);
            let _ = writeln!(out, "  Swept: {}", run.swept);
        }
        None => {
            let _ = writeln!(out, "No ingestion runs recorded yet.");
        }
    }

    out
}

pub fn print_statistics(stats: &StoreStatistics) {
    print!("{}", format_statistics(stats));
}
