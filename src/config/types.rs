use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Newsdesk-Ingest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ingest: IngestSettings,
    pub output: OutputConfig,
    /// Source registry; the built-in sources are used when none are listed
    #[serde(rename = "source", default = "crate::sources::builtin_sources")]
    pub sources: Vec<SourceConfig>,
}

impl Config {
    /// Looks up a source record by its key (e.g. `"the-hindu"`)
    pub fn source(&self, key: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.key == key)
    }

    /// Returns all registered source keys in registry order
    pub fn source_keys(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.key.as_str()).collect()
    }
}

/// Pipeline-wide pacing, retry and retention settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Maximum number of attempts per HTML page
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Number of attempts during which transport and non-403 HTTP errors
    /// are retried; after that the page is abandoned
    #[serde(rename = "soft-retry-attempts")]
    pub soft_retry_attempts: u32,

    /// Length of one pacing "time unit" in milliseconds
    #[serde(rename = "time-unit-ms")]
    pub time_unit_ms: u64,

    /// Articles scraped longer ago than this are swept
    #[serde(rename = "retention-days")]
    pub retention_days: u32,

    /// Interval between scheduled ingestion passes in minutes
    #[serde(rename = "schedule-interval-mins")]
    pub schedule_interval_mins: u64,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            max_attempts: 5,
            soft_retry_attempts: 2,
            time_unit_ms: 1000,
            retention_days: 7,
            schedule_interval_mins: 60,
        }
    }
}

impl IngestSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn time_unit(&self) -> Duration {
        Duration::from_millis(self.time_unit_ms)
    }

    pub fn retention_window(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.retention_days))
    }

    pub fn schedule_interval(&self) -> Duration {
        Duration::from_secs(self.schedule_interval_mins * 60)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// One upstream news source
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceConfig {
    /// Trigger key, e.g. `"times-of-india"`
    pub key: String,

    /// Display name stored on every article, e.g. `"Times of India"`
    pub name: String,

    /// How extracted articles are written to the store
    pub persistence: PersistenceStrategy,

    /// Host/Origin/Referer overrides sent with HTML requests
    #[serde(default)]
    pub headers: Option<HeaderOverrides>,

    /// Which engine fetches this source, and with what parameters
    pub engine: EngineConfig,
}

impl SourceConfig {
    pub fn urls(&self) -> &[String] {
        match &self.engine {
            EngineConfig::Html { urls, .. } | EngineConfig::Feed { urls, .. } => urls,
        }
    }
}

/// Engine selection for a source
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EngineConfig {
    /// Scrape HTML pages with a selector cascade
    Html {
        urls: Vec<String>,
        /// Ordered, non-exclusive CSS selectors yielding link elements
        #[serde(default)]
        selectors: Vec<String>,
        /// Stop visiting further URLs once this many candidates are gathered
        #[serde(default, rename = "stop-after")]
        stop_after: Option<usize>,
    },

    /// Read RSS/Atom feeds
    Feed {
        urls: Vec<String>,
        #[serde(default)]
        freshness: Freshness,
        /// Random pause before each feed request, in time units
        #[serde(default)]
        delay: Option<[f64; 2]>,
    },
}

/// Persistence strategy for a source's batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersistenceStrategy {
    /// Insert every article; links already stored are skipped
    InsertIgnore,
    /// Keep the latest version per link and upsert by link
    MergeUpsert,
}

/// Feed entry freshness filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Freshness {
    /// Accept every entry
    #[default]
    Any,
    /// Accept only entries published on or after the current UTC date
    Today,
}

/// Upstream-specific header overrides
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct HeaderOverrides {
    pub host: Option<String>,
    pub origin: Option<String>,
    pub referer: Option<String>,
    #[serde(rename = "accept-language")]
    pub accept_language: Option<String>,
}

impl HeaderOverrides {
    /// Overrides pointing every identity header at one upstream site
    pub fn for_site(host: &str) -> Self {
        Self {
            host: Some(host.to_string()),
            origin: Some(format!("https://{}", host)),
            referer: Some(format!("https://{}/", host)),
            accept_language: Some("en-IN,en-GB;q=0.9,en-US;q=0.8,en;q=0.7".to_string()),
        }
    }
}
