//! HTML fetch-and-extract engine
//!
//! This module drives one page fetch end to end:
//! - Randomized pre-request pacing
//! - Client construction with HTTP/2 preference and HTTP/1.1 fallback
//! - A bounded retry loop with a fresh identity and cache buster per attempt
//! - Failure classification (404 aborts, 403 rotates identity, other errors
//!   get a short soft-retry window)
//! - Headline extraction once an HTML body arrives
//!
//! The engine never returns an error: every outcome is folded into a
//! [`FetchReport`] carrying a classified status and the attempt count.

use super::client::build_http_client;
use super::extract::extract_articles;
use super::identity::next_identity;
use super::pacing::RetryPolicy;
use crate::article::Article;
use crate::config::{HeaderOverrides, IngestSettings};
use crate::url::cache_busted_url;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// What to fetch and how to extract from it
#[derive(Debug, Clone, Copy)]
pub struct HtmlTarget<'a> {
    /// Display name stamped on every extracted article
    pub name: &'a str,
    /// Ordered selector cascade
    pub selectors: &'a [String],
    /// Optional Host/Origin/Referer overrides for the upstream
    pub headers: Option<&'a HeaderOverrides>,
}

/// Classified outcome of a fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    /// An HTML body was received and extraction ran (possibly finding nothing)
    Extracted,

    /// The upstream answered 404; no retry was attempted
    NotFound,

    /// Every attempt was used up
    Exhausted {
        /// Description of the last failure seen
        last_error: String,
    },

    /// The fetch was abandoned before the attempt budget ran out
    Aborted {
        /// Why the fetch stopped
        error: String,
    },
}

/// Result of [`HtmlEngine::fetch_and_extract`]
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub url: String,
    pub status: FetchStatus,
    /// Number of HTTP requests sent
    pub attempts: u32,
    /// Deduplicated candidates; empty unless `status` is `Extracted`
    pub articles: Vec<Article>,
}

impl FetchReport {
    fn empty(url: &str, status: FetchStatus, attempts: u32) -> Self {
        Self {
            url: url.to_string(),
            status,
            attempts,
            articles: Vec::new(),
        }
    }

    pub fn is_extracted(&self) -> bool {
        self.status == FetchStatus::Extracted
    }
}

/// Why a single attempt failed
#[derive(Debug, Error)]
enum AttemptError {
    #[error("HTTP {}", .0.as_u16())]
    Status(StatusCode),

    #[error("non-HTML content type '{0}'")]
    NotHtml(String),

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
}

/// Fetches HTML pages with retries and extracts headline candidates
#[derive(Debug, Clone)]
pub struct HtmlEngine {
    policy: RetryPolicy,
    timeout: Duration,
}

impl HtmlEngine {
    pub fn new(policy: RetryPolicy, timeout: Duration) -> Self {
        Self { policy, timeout }
    }

    pub fn from_settings(settings: &IngestSettings) -> Self {
        Self::new(RetryPolicy::from_settings(settings), settings.request_timeout())
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches `url` and extracts article candidates from it
    ///
    /// # Request Flow
    ///
    /// 1. Sleep a randomized pre-request delay
    /// 2. Build a client for this operation
    /// 3. Up to `max_attempts` GETs, each with a fresh identity and cache
    ///    buster, backing off exponentially from the second attempt on
    /// 4. Extract from the first HTML body received
    ///
    /// # Failure Policy
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 404 | Abort immediately, `NotFound` |
    /// | HTTP 403 | Rotate identity, next attempt |
    /// | Non-HTML content type | Cooldown, next attempt |
    /// | Other HTTP error / transport error | Cooldown and retry during the soft window, then `Aborted` |
    /// | Client cannot be built | `Aborted` |
    pub async fn fetch_and_extract(&self, target: &HtmlTarget<'_>, url: &str) -> FetchReport {
        let page_url = match Url::parse(url) {
            Ok(u) => u,
            Err(e) => {
                tracing::warn!(source = target.name, url, error = %e, "Invalid page URL");
                return FetchReport::empty(url, FetchStatus::Aborted { error: e.to_string() }, 0);
            }
        };

        tokio::time::sleep(self.policy.pre_request_delay()).await;

        let client = match build_http_client(self.timeout) {
            Ok((client, transport)) => {
                tracing::trace!(source = target.name, ?transport, "Built HTTP client");
                client
            }
            Err(e) => {
                tracing::error!(source = target.name, url, error = %e, "Could not build HTTP client");
                return FetchReport::empty(url, FetchStatus::Aborted { error: e.to_string() }, 0);
            }
        };

        let mut last_error = String::from("no attempts made");
        let mut attempts = 0u32;

        for attempt in 0..self.policy.max_attempts {
            if attempt > 0 {
                tokio::time::sleep(self.policy.backoff(attempt)).await;
            }

            attempts += 1;
            tracing::debug!(source = target.name, url, attempt = attempts, "Fetching page");

            match self.attempt(&client, target, url).await {
                Ok(body) => {
                    let articles = extract_articles(
                        &body,
                        &page_url,
                        target.name,
                        target.selectors,
                        Utc::now(),
                    );
                    tracing::info!(
                        source = target.name,
                        url,
                        attempt = attempts,
                        found = articles.len(),
                        "Extracted articles"
                    );
                    return FetchReport {
                        url: url.to_string(),
                        status: FetchStatus::Extracted,
                        attempts,
                        articles,
                    };
                }
                Err(AttemptError::Status(StatusCode::NOT_FOUND)) => {
                    tracing::warn!(source = target.name, url, status = 404, "Page not found, giving up");
                    return FetchReport::empty(url, FetchStatus::NotFound, attempts);
                }
                Err(e @ AttemptError::Status(StatusCode::FORBIDDEN)) => {
                    tracing::warn!(source = target.name, url, attempt = attempts, status = 403, "Blocked, rotating identity");
                    last_error = e.to_string();
                }
                Err(e @ AttemptError::NotHtml(_)) => {
                    tracing::warn!(source = target.name, url, attempt = attempts, error = %e, "Unexpected content type");
                    last_error = e.to_string();
                    tokio::time::sleep(self.policy.non_html_cooldown()).await;
                }
                Err(e) => {
                    last_error = e.to_string();
                    if !self.policy.allows_soft_retry(attempt) {
                        tracing::warn!(source = target.name, url, attempt = attempts, error = %e, "Fetch failed, giving up");
                        return FetchReport::empty(
                            url,
                            FetchStatus::Aborted { error: last_error },
                            attempts,
                        );
                    }
                    tracing::warn!(source = target.name, url, attempt = attempts, error = %e, "Fetch failed, cooling down");
                    tokio::time::sleep(self.policy.error_cooldown()).await;
                }
            }
        }

        tracing::warn!(source = target.name, url, attempts, error = %last_error, "Attempts exhausted");
        FetchReport::empty(url, FetchStatus::Exhausted { last_error }, attempts)
    }

    /// Sends one GET and returns the body if it is a successful HTML response
    async fn attempt(
        &self,
        client: &Client,
        target: &HtmlTarget<'_>,
        url: &str,
    ) -> Result<String, AttemptError> {
        let identity = next_identity(target.headers);
        let response = client
            .get(cache_busted_url(url))
            .headers(identity.into_header_map())
            .send()
            .await
            .map_err(AttemptError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status(status));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html(&content_type) {
            return Err(AttemptError::NotHtml(content_type));
        }

        response.text().await.map_err(AttemptError::Transport)
    }
}

fn is_html(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.contains("text/html") || content_type.contains("application/xhtml+xml")
}
