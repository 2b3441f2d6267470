//! Newsdesk-Ingest: a resilient multi-source news ingestion pipeline
//!
//! This crate fetches headlines from HTML front pages and RSS/Atom feeds,
//! normalizes and deduplicates them, and persists them into a SQLite article
//! store. Every source runs as an isolated task so that one misbehaving
//! upstream never affects the others.

pub mod article;
pub mod config;
pub mod context;
pub mod dedup;
pub mod fetch;
pub mod orchestrator;
pub mod output;
pub mod retention;
pub mod scheduler;
pub mod sources;
pub mod storage;
pub mod trigger;
pub mod url;

use thiserror::Error;

/// Main error type for Newsdesk-Ingest operations
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Newsdesk-Ingest operations
pub type Result<T> = std::result::Result<T, IngestError>;

// Re-export commonly used types
pub use article::Article;
pub use config::Config;
pub use context::IngestContext;
pub use orchestrator::Orchestrator;
pub use storage::{ArticleStore, SqliteStore};
