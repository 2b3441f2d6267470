use crate::config::types::{Config, EngineConfig, IngestSettings, OutputConfig, SourceConfig};
use crate::fetch::MAX_DELAY_UNITS;
use crate::ConfigError;
use scraper::Selector;
use std::collections::HashSet;
use url::Url;

/// Key reserved for the "every source" trigger
pub const ALL_SOURCES_KEY: &str = "all";

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_ingest_settings(&config.ingest)?;
    validate_output_config(&config.output)?;
    validate_sources(&config.sources)?;
    Ok(())
}

/// Validates pacing, retry and retention settings
fn validate_ingest_settings(settings: &IngestSettings) -> Result<(), ConfigError> {
    if settings.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if settings.max_attempts < 1 || settings.max_attempts > 20 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and 20, got {}",
            settings.max_attempts
        )));
    }

    if settings.soft_retry_attempts > settings.max_attempts {
        return Err(ConfigError::Validation(format!(
            "soft_retry_attempts ({}) cannot exceed max_attempts ({})",
            settings.soft_retry_attempts, settings.max_attempts
        )));
    }

    if settings.retention_days < 1 {
        return Err(ConfigError::Validation(
            "retention_days must be >= 1".to_string(),
        ));
    }

    if settings.schedule_interval_mins < 1 {
        return Err(ConfigError::Validation(
            "schedule_interval_mins must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates the source registry
fn validate_sources(sources: &[SourceConfig]) -> Result<(), ConfigError> {
    if sources.is_empty() {
        return Err(ConfigError::Validation(
            "at least one source must be configured".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for source in sources {
        validate_source_key(&source.key)?;

        if !seen.insert(source.key.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source key '{}'",
                source.key
            )));
        }

        if source.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "source '{}' must have a display name",
                source.key
            )));
        }

        validate_source_engine(source)?;
    }

    Ok(())
}

/// Source keys are lowercase slugs; `all` is reserved
fn validate_source_key(key: &str) -> Result<(), ConfigError> {
    if key.is_empty() {
        return Err(ConfigError::Validation(
            "source key cannot be empty".to_string(),
        ));
    }

    if key == ALL_SOURCES_KEY {
        return Err(ConfigError::Validation(format!(
            "source key '{}' is reserved",
            ALL_SOURCES_KEY
        )));
    }

    if !key
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "source key must contain only lowercase letters, digits and hyphens, got '{}'",
            key
        )));
    }

    Ok(())
}

fn validate_source_engine(source: &SourceConfig) -> Result<(), ConfigError> {
    if source.urls().is_empty() {
        return Err(ConfigError::Validation(format!(
            "source '{}' must list at least one URL",
            source.key
        )));
    }

    for url in source.urls() {
        validate_http_url(url)?;
    }

    match &source.engine {
        EngineConfig::Html {
            selectors,
            stop_after,
            ..
        } => {
            for selector in selectors {
                Selector::parse(selector).map_err(|e| {
                    ConfigError::InvalidSelector(format!(
                        "'{}' in source '{}': {:?}",
                        selector, source.key, e
                    ))
                })?;
            }

            if *stop_after == Some(0) {
                return Err(ConfigError::Validation(format!(
                    "stop_after for source '{}' must be >= 1",
                    source.key
                )));
            }
        }
        EngineConfig::Feed { delay, .. } => {
            if let Some([min, max]) = delay {
                let in_bounds = min.is_finite()
                    && max.is_finite()
                    && *min >= 0.0
                    && min <= max
                    && *max <= MAX_DELAY_UNITS;
                if !in_bounds {
                    return Err(ConfigError::Validation(format!(
                        "delay range for source '{}' must satisfy 0 <= min <= max <= {}, got [{}, {}]",
                        source.key, MAX_DELAY_UNITS, min, max
                    )));
                }
            }
        }
    }

    Ok(())
}

/// Validates that a configured URL is absolute HTTP(S)
fn validate_http_url(raw: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid source URL '{}': {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Source URL '{}' must use HTTP or HTTPS",
            raw
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Source URL '{}' has no host",
            raw
        )));
    }

    Ok(())
}
