//! Configuration module for Newsdesk-Ingest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use newsdesk_ingest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("newsdesk.toml")).unwrap();
//! println!("Retention window: {} days", config.ingest.retention_days);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, EngineConfig, Freshness, HeaderOverrides, IngestSettings, OutputConfig,
    PersistenceStrategy, SourceConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate, ALL_SOURCES_KEY};
