//! Fan-out orchestration
//!
//! Every adapter runs as its own tokio task. A failing or panicking adapter
//! is logged and left out of the result; it never cancels or delays its
//! siblings. The retention sweep runs once all adapters have settled.

use crate::article::Article;
use crate::config::Config;
use crate::retention::RetentionSweeper;
use crate::sources::{build_adapters, Adapter, AdapterError, AdapterReport};
use crate::storage::{ArticleStore, RunStatus};
use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Runs adapters concurrently and aggregates their results
#[derive(Clone)]
pub struct Orchestrator {
    adapters: Vec<Arc<dyn Adapter>>,
    store: Arc<dyn ArticleStore>,
    sweeper: RetentionSweeper,
    config_hash: String,
}

impl Orchestrator {
    pub fn new(
        adapters: Vec<Arc<dyn Adapter>>,
        store: Arc<dyn ArticleStore>,
        sweeper: RetentionSweeper,
        config_hash: impl Into<String>,
    ) -> Self {
        Self {
            adapters,
            store,
            sweeper,
            config_hash: config_hash.into(),
        }
    }

    /// Builds adapters and a sweeper from configuration
    pub fn from_config(
        config: &Config,
        store: Arc<dyn ArticleStore>,
        config_hash: impl Into<String>,
    ) -> Self {
        let adapters = build_adapters(config, Arc::clone(&store));
        let sweeper = RetentionSweeper::new(Arc::clone(&store), config.ingest.retention_window());
        Self::new(adapters, store, sweeper, config_hash)
    }

    /// Registry keys of every adapter, in configuration order
    pub fn keys(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.key()).collect()
    }

    pub fn store(&self) -> &Arc<dyn ArticleStore> {
        &self.store
    }

    /// Runs every adapter, then sweeps expired articles
    ///
    /// Returns the concatenation of every successful adapter's persisted
    /// articles. Never fails: adapter errors, panics and bookkeeping failures
    /// are logged.
    pub async fn run_all(&self) -> Vec<Article> {
        let run_id = match self.store.create_run(&self.config_hash) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(error = %e, "Could not record run start");
                None
            }
        };

        tracing::info!(adapters = self.adapters.len(), run_id = ?run_id, "Starting ingestion run");

        let handles: Vec<(String, JoinHandle<Result<AdapterReport, AdapterError>>)> = self
            .adapters
            .iter()
            .map(|adapter| (adapter.key().to_string(), spawn_adapter(Arc::clone(adapter))))
            .collect();

        let mut persisted = Vec::new();
        let mut succeeded = 0usize;

        for (key, handle) in handles {
            if let Some(report) = settle(&key, handle).await {
                succeeded += 1;
                persisted.extend(report.persisted);
            }
        }

        let swept = match self.sweeper.sweep(Utc::now()) {
            Ok(deleted) => deleted,
            Err(e) => {
                tracing::error!(error = %e, "Retention sweep failed");
                0
            }
        };

        let status = if succeeded == 0 && !self.adapters.is_empty() {
            RunStatus::Failed
        } else {
            RunStatus::Completed
        };

        if let Some(run_id) = run_id {
            if let Err(e) = self
                .store
                .finish_run(run_id, status, persisted.len() as u64, swept)
            {
                tracing::warn!(run_id, error = %e, "Could not record run completion");
            }
        }

        tracing::info!(
            run_id = ?run_id,
            succeeded,
            failed = self.adapters.len() - succeeded,
            persisted = persisted.len(),
            swept,
            %status,
            "Ingestion run finished"
        );

        persisted
    }

    /// Runs a single adapter by registry key
    ///
    /// # Returns
    ///
    /// * `None` - No adapter has that key
    /// * `Some(articles)` - The adapter's persisted articles (empty if it failed)
    pub async fn run_one(&self, key: &str) -> Option<Vec<Article>> {
        let adapter = self.adapters.iter().find(|a| a.key() == key)?;
        let report = settle(key, spawn_adapter(Arc::clone(adapter))).await;
        Some(report.map(|r| r.persisted).unwrap_or_default())
    }
}

fn spawn_adapter(adapter: Arc<dyn Adapter>) -> JoinHandle<Result<AdapterReport, AdapterError>> {
    tokio::spawn(async move { adapter.run().await })
}

/// Awaits one adapter task, logging anything other than a report
async fn settle(
    key: &str,
    handle: JoinHandle<Result<AdapterReport, AdapterError>>,
) -> Option<AdapterReport> {
    match handle.await {
        Ok(Ok(report)) => Some(report),
        Ok(Err(e)) => {
            tracing::error!(source = key, error = %e, "Adapter failed");
            None
        }
        Err(e) if e.is_panic() => {
            tracing::error!(source = key, "Adapter panicked");
            None
        }
        Err(e) => {
            tracing::error!(source = key, error = %e, "Adapter task was cancelled");
            None
        }
    }
}
