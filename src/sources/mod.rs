//! News sources
//!
//! A source is a configuration record (URLs, engine, persistence strategy)
//! turned into an [`Adapter`] that fetches, extracts and persists articles
//! for one upstream.

mod adapter;
mod persist;
mod registry;

pub use adapter::SourceAdapter;
pub use persist::{insert_ignore, merge_upsert, Persisted, WriteSummary};
pub use registry::builtin_sources;

use crate::article::Article;
use crate::config::Config;
use crate::storage::{ArticleStore, StorageError};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Trait implemented by every source adapter
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Registry key, e.g. `the-hindu`
    fn key(&self) -> &str;

    /// Display name stamped on stored articles
    fn name(&self) -> &str;

    /// Fetches, extracts and persists this source's articles
    async fn run(&self) -> Result<AdapterReport, AdapterError>;
}

/// Result of one successful adapter run
#[derive(Debug, Clone)]
pub struct AdapterReport {
    pub key: String,
    pub source: String,
    /// Candidates gathered before persistence
    pub found: usize,
    /// Articles present in the store after the run
    pub persisted: Vec<Article>,
    pub writes: WriteSummary,
}

/// Failures that end an adapter run
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{name}: could not build HTTP client: {error}")]
    Client {
        name: String,
        #[source]
        error: reqwest::Error,
    },

    #[error("{name}: storage failure: {error}")]
    Storage {
        name: String,
        #[source]
        error: StorageError,
    },
}

/// Builds one adapter per configured source, in configuration order
pub fn build_adapters(config: &Config, store: Arc<dyn ArticleStore>) -> Vec<Arc<dyn Adapter>> {
    config
        .sources
        .iter()
        .map(|source| {
            Arc::new(SourceAdapter::new(
                source.clone(),
                config.ingest.clone(),
                Arc::clone(&store),
            )) as Arc<dyn Adapter>
        })
        .collect()
}
