use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is recorded with every ingestion run so a run can be traced back
/// to the registry that produced it.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(hash_content(&content))
}

fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, hash_content(&content)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineConfig, Freshness, PersistenceStrategy};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_minimal_config_uses_builtin_sources() {
        let file = create_temp_config(
            r#"
[output]
database-path = "./news.db"
"#,
        );
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.ingest.max_attempts, 5);
        assert_eq!(config.ingest.request_timeout_secs, 30);
        assert_eq!(config.ingest.retention_days, 7);
        assert_eq!(
            config.source_keys(),
            vec!["the-hindu", "times-of-india", "ani", "ndtv"]
        );
    }

    #[test]
    fn test_load_config_with_custom_sources() {
        let file = create_temp_config(
            r#"
[ingest]
time-unit-ms = 5
max-attempts = 3

[output]
database-path = "./news.db"

[[source]]
key = "wire"
name = "Wire Desk"
persistence = "merge-upsert"

[source.engine]
kind = "feed"
urls = ["https://wire.example.com/rss"]
freshness = "today"
delay = [1.0, 2.0]

[[source]]
key = "front"
name = "Front Page"
persistence = "insert-ignore"

[source.headers]
host = "front.example.com"
referer = "https://front.example.com/"

[source.engine]
kind = "html"
urls = ["https://front.example.com/"]
selectors = ["h2 a", ".story a"]
stop-after = 20
"#,
        );
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.ingest.time_unit_ms, 5);
        assert_eq!(config.ingest.max_attempts, 3);
        // Unspecified settings keep their defaults
        assert_eq!(config.ingest.soft_retry_attempts, 2);
        assert_eq!(config.sources.len(), 2);

        let wire = config.source("wire").unwrap();
        assert_eq!(wire.persistence, PersistenceStrategy::MergeUpsert);
        assert_eq!(
            wire.engine,
            EngineConfig::Feed {
                urls: vec!["https://wire.example.com/rss".to_string()],
                freshness: Freshness::Today,
                delay: Some([1.0, 2.0]),
            }
        );

        let front = config.source("front").unwrap();
        let headers = front.headers.as_ref().unwrap();
        assert_eq!(headers.host.as_deref(), Some("front.example.com"));
        assert_eq!(headers.origin, None);
        match &front.engine {
            EngineConfig::Html {
                selectors,
                stop_after,
                ..
            } => {
                assert_eq!(selectors.len(), 2);
                assert_eq!(*stop_after, Some(20));
            }
            other => panic!("expected html engine, got {:?}", other),
        }
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/newsdesk.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_infinite_delay_is_rejected() {
        let result = parse_config(
            r#"
[output]
database-path = "./news.db"

[[source]]
key = "wire"
name = "Wire"
persistence = "merge-upsert"

[source.engine]
kind = "feed"
urls = ["https://wire.example.com/rss"]
delay = [0.0, inf]
"#,
        );
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_unknown_engine_kind_is_rejected() {
        let result = parse_config(
            r#"
[output]
database-path = "./news.db"

[[source]]
key = "x"
name = "X"
persistence = "insert-ignore"

[source.engine]
kind = "carrier-pigeon"
urls = ["https://x.example.com/"]
"#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let result = parse_config(
            r#"
[ingest]
max-attempts = 0

[output]
database-path = "./news.db"
"#,
        );
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_config_hash_is_stable_and_content_sensitive() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        assert_eq!(hash1, compute_config_hash(file1.path()).unwrap());
        assert_eq!(hash1.len(), 64);
        assert_ne!(hash1, compute_config_hash(file2.path()).unwrap());
    }

    #[test]
    fn test_load_config_with_hash_matches_file_hash() {
        let file = create_temp_config(
            r#"
[output]
database-path = "./news.db"
"#,
        );
        let (_, hash) = load_config_with_hash(file.path()).unwrap();
        assert_eq!(hash, compute_config_hash(file.path()).unwrap());
    }
}
