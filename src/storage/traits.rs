//! Storage traits and error types
//!
//! This module defines the trait interface for article store backends and
//! associated error types.

use crate::article::Article;
use crate::storage::{InsertOutcome, RunRecord, RunStatus, SearchQuery, UpsertAction, UpsertCounts};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for article store implementations
///
/// Stores are shared between concurrently running adapters, so every method
/// takes `&self` and implementations synchronize internally. Uniqueness of
/// `link` is enforced by the store itself.
pub trait ArticleStore: Send + Sync {
    // ===== Writes =====

    /// Inserts every article, one statement each
    ///
    /// A link that is already stored yields [`InsertOutcome::Duplicate`];
    /// any other failure yields [`InsertOutcome::Failed`]. Neither stops the
    /// rest of the batch. Outcomes are returned in input order.
    fn insert_ignore(&self, articles: &[Article]) -> StorageResult<Vec<InsertOutcome>>;

    /// Upserts every article by link in a single transaction
    ///
    /// A stored row is only overwritten when the incoming `published_at` is
    /// newer than or equal to the stored one (or either is missing). Any
    /// failure rolls back the whole batch.
    fn upsert_batch(&self, articles: &[Article]) -> StorageResult<UpsertCounts>;

    /// Upserts a single article by link, outside any batch transaction
    fn upsert_one(&self, article: &Article) -> StorageResult<UpsertAction>;

    /// Deletes every article scraped strictly before `cutoff`
    ///
    /// # Returns
    ///
    /// The number of deleted rows
    fn delete_scraped_before(&self, cutoff: DateTime<Utc>) -> StorageResult<u64>;

    // ===== Queries =====

    /// Gets an article by its link
    fn get_by_link(&self, link: &str) -> StorageResult<Option<Article>>;

    /// Gets total article count
    fn count_articles(&self) -> StorageResult<u64>;

    /// Gets article counts per source, sorted by source name
    fn count_by_source(&self) -> StorageResult<Vec<(String, u64)>>;

    /// Articles scraped today (UTC, relative to `now`), newest first
    ///
    /// Falls back to the most recently scraped articles overall when nothing
    /// was scraped today.
    fn latest(&self, now: DateTime<Utc>, limit: usize) -> StorageResult<Vec<Article>>;

    /// Most recently scraped articles from one source
    fn by_source(&self, source: &str, limit: usize) -> StorageResult<Vec<Article>>;

    /// Keyword and date-range search, newest first
    fn search(&self, query: &SearchQuery) -> StorageResult<Vec<Article>>;

    // ===== Run Management =====

    /// Creates a new ingestion run
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&self, config_hash: &str) -> StorageResult<i64>;

    /// Marks a run as finished with its final status and counters
    fn finish_run(
        &self,
        run_id: i64,
        status: RunStatus,
        persisted: u64,
        swept: u64,
    ) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;
}
