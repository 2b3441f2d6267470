//! Retention sweeping
//!
//! Articles are kept for a fixed window after they were scraped. The sweep
//! is a single predicate delete, so running it twice (or concurrently with
//! ingestion) is harmless.

use crate::storage::{ArticleStore, StorageResult};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Deletes articles that fell out of the retention window
#[derive(Clone)]
pub struct RetentionSweeper {
    store: Arc<dyn ArticleStore>,
    window: Duration,
}

impl RetentionSweeper {
    pub fn new(store: Arc<dyn ArticleStore>, window: Duration) -> Self {
        Self { store, window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Deletes every article with `scraped_at` strictly before `now - window`
    ///
    /// # Returns
    ///
    /// The number of deleted articles
    pub fn sweep(&self, now: DateTime<Utc>) -> StorageResult<u64> {
        let cutoff = now - self.window;
        let deleted = self.store.delete_scraped_before(cutoff)?;
        if deleted > 0 {
            tracing::info!(deleted, cutoff = %cutoff, "Swept expired articles");
        } else {
            tracing::debug!(cutoff = %cutoff, "Nothing to sweep");
        }
        Ok(deleted)
    }
}
