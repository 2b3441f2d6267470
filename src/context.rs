//! Shared ingestion context
//!
//! Built once at startup and handed to the orchestrator, the triggers and
//! the scheduler.

use crate::config::{load_config_with_hash, Config};
use crate::orchestrator::Orchestrator;
use crate::storage::{ArticleStore, SqliteStore};
use crate::Result;
use std::path::Path;
use std::sync::Arc;

/// Configuration, store handle and config hash for one process
#[derive(Clone)]
pub struct IngestContext {
    pub config: Arc<Config>,
    pub store: Arc<dyn ArticleStore>,
    pub config_hash: String,
}

impl IngestContext {
    /// Opens the SQLite store named by the configuration
    pub fn open(config: Config, config_hash: impl Into<String>) -> Result<Self> {
        let store = SqliteStore::new(Path::new(&config.output.database_path))?;
        Ok(Self::with_store(config, Arc::new(store), config_hash))
    }

    /// Uses an already opened store
    pub fn with_store(
        config: Config,
        store: Arc<dyn ArticleStore>,
        config_hash: impl Into<String>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            config_hash: config_hash.into(),
        }
    }

    /// Loads, validates and hashes a config file, then opens its store
    pub fn from_path(path: &Path) -> Result<Self> {
        let (config, hash) = load_config_with_hash(path)?;
        Self::open(config, hash)
    }

    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::from_config(&self.config, Arc::clone(&self.store), self.config_hash.clone())
    }
}
