//! Manual triggers
//!
//! Triggers never fail: they answer with an acknowledgment or a structured
//! status payload that serializes straight to JSON.

use crate::article::Article;
use crate::config::ALL_SOURCES_KEY;
use crate::orchestrator::Orchestrator;
use serde::Serialize;

/// How many articles a per-source response previews
pub const PREVIEW_LEN: usize = 5;

/// Acknowledgment for a fire-and-forget run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerAck {
    pub message: String,
}

/// Response to a per-source trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SourceTriggerResponse {
    Success {
        source: String,
        articles_found: usize,
        /// The first few persisted articles
        articles: Vec<Article>,
    },
    Error {
        message: String,
    },
}

impl SourceTriggerResponse {
    fn success(source: &str, articles: Vec<Article>) -> Self {
        let articles_found = articles.len();
        Self::Success {
            source: source.to_string(),
            articles_found,
            articles: articles.into_iter().take(PREVIEW_LEN).collect(),
        }
    }
}

/// Starts a full run in the background and returns immediately
///
/// Must be called from within a tokio runtime.
pub fn trigger_all(orchestrator: &Orchestrator) -> TriggerAck {
    let orchestrator = orchestrator.clone();
    tokio::spawn(async move {
        let articles = orchestrator.run_all().await;
        tracing::info!(persisted = articles.len(), "Background run finished");
    });

    TriggerAck {
        message: "Scraping started in background".to_string(),
    }
}

/// Runs one source (or every source for `all`) and reports what it found
pub async fn trigger_source(orchestrator: &Orchestrator, key: &str) -> SourceTriggerResponse {
    let key = key.trim().to_lowercase();

    if key == ALL_SOURCES_KEY {
        let articles = orchestrator.run_all().await;
        return SourceTriggerResponse::success(ALL_SOURCES_KEY, articles);
    }

    match orchestrator.run_one(&key).await {
        Some(articles) => SourceTriggerResponse::success(&key, articles),
        None => {
            let mut valid = orchestrator.keys();
            valid.push(ALL_SOURCES_KEY);
            tracing::warn!(source = %key, "Trigger for unknown source");
            SourceTriggerResponse::Error {
                message: format!(
                    "Invalid source '{}'. Valid options are: {}",
                    key,
                    valid.join(", ")
                ),
            }
        }
    }
}
