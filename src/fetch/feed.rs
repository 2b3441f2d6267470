//! RSS/Atom feed engine
//!
//! Feeds are fetched once per run with no retry; a failing feed is reported
//! back to the adapter, which logs it and moves on to the next feed.

use super::client::build_http_client;
use super::identity::feed_identity;
use crate::article::Article;
use crate::config::{Freshness, HeaderOverrides};
use chrono::{DateTime, SubsecRound, Utc};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors for a single feed URL
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Feed returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Invalid feed URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to parse feed: {0}")]
    Parse(String),
}

/// Fetches and parses feeds
#[derive(Debug, Clone)]
pub struct FeedEngine {
    client: Client,
}

impl FeedEngine {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let (client, _) = build_http_client(timeout)?;
        Ok(Self { client })
    }

    /// Fetches one feed and converts its entries into articles
    ///
    /// Entries without a title or link, or with a title that is too short,
    /// are skipped individually.
    pub async fn fetch_feed(&self, source: &str, feed_url: &str) -> Result<Vec<Article>, FeedError> {
        self.fetch_feed_with(source, feed_url, None).await
    }

    /// Like [`FeedEngine::fetch_feed`], sending the source's header overrides
    pub async fn fetch_feed_with(
        &self,
        source: &str,
        feed_url: &str,
        overrides: Option<&HeaderOverrides>,
    ) -> Result<Vec<Article>, FeedError> {
        let url = Url::parse(feed_url)?;

        let response = self
            .client
            .get(url.clone())
            .headers(feed_identity(overrides).into_header_map())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::HttpStatus(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        let articles = parse_feed(&bytes, &url, source, Utc::now())?;

        tracing::debug!(source, url = feed_url, found = articles.len(), "Parsed feed");
        Ok(articles)
    }
}

/// Converts a raw RSS/Atom document into articles
///
/// `published_at` comes from the entry's published timestamp, then its
/// updated timestamp, truncated to whole seconds. Entries with neither get
/// `scraped_at`.
pub fn parse_feed(
    bytes: &[u8],
    feed_url: &Url,
    source: &str,
    scraped_at: DateTime<Utc>,
) -> Result<Vec<Article>, FeedError> {
    let feed = feed_rs::parser::parse(bytes).map_err(|e| FeedError::Parse(e.to_string()))?;

    let mut articles = Vec::with_capacity(feed.entries.len());
    let mut skipped = 0usize;

    for entry in feed.entries {
        let title = entry.title.map(|t| t.content).unwrap_or_default();
        let link = entry
            .links
            .first()
            .and_then(|l| feed_url.join(l.href.trim()).ok())
            .filter(|u| matches!(u.scheme(), "http" | "https"))
            .map(String::from)
            .unwrap_or_default();

        let Some(article) = Article::candidate(&title, &link, source, scraped_at) else {
            skipped += 1;
            continue;
        };

        let published_at = entry
            .published
            .or(entry.updated)
            .map(|dt| dt.trunc_subsecs(0))
            .unwrap_or(scraped_at);

        let article = article
            .with_published_at(published_at)
            .with_summary(entry.summary.map(|s| s.content))
            .with_category(entry.categories.first().map(|c| c.term.clone()));

        articles.push(article);
    }

    if skipped > 0 {
        tracing::debug!(source, url = %feed_url, skipped, "Skipped malformed feed entries");
    }

    Ok(articles)
}

/// Whether an article passes a source's freshness filter
///
/// `Today` keeps entries whose published date (UTC) is on or after the
/// current UTC date. Articles without a published date count as fresh.
pub fn is_fresh(article: &Article, freshness: Freshness, now: DateTime<Utc>) -> bool {
    match freshness {
        Freshness::Any => true,
        Freshness::Today => article
            .published_at
            .map(|published| published.date_naive() >= now.date_naive())
            .unwrap_or(true),
    }
}
