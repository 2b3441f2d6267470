//! Configuration-driven source adapter
//!
//! One [`SourceAdapter`] serves every source: the engine variant and the
//! persistence strategy in its [`SourceConfig`] decide what it does.

use super::persist::{self, Persisted};
use super::{Adapter, AdapterError, AdapterReport};
use crate::article::Article;
use crate::config::{EngineConfig, Freshness, IngestSettings, PersistenceStrategy, SourceConfig};
use crate::fetch::{is_fresh, FeedEngine, HtmlEngine, HtmlTarget, RetryPolicy};
use crate::storage::ArticleStore;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

/// Adapter built from a source configuration record
pub struct SourceAdapter {
    source: SourceConfig,
    settings: IngestSettings,
    store: Arc<dyn ArticleStore>,
}

impl SourceAdapter {
    pub fn new(source: SourceConfig, settings: IngestSettings, store: Arc<dyn ArticleStore>) -> Self {
        Self {
            source,
            settings,
            store,
        }
    }

    pub fn config(&self) -> &SourceConfig {
        &self.source
    }

    /// Visits HTML pages in order until the list or the stop-after threshold
    /// runs out
    async fn gather_html(
        &self,
        urls: &[String],
        selectors: &[String],
        stop_after: Option<usize>,
    ) -> Vec<Article> {
        let engine = HtmlEngine::from_settings(&self.settings);
        let target = HtmlTarget {
            name: &self.source.name,
            selectors,
            headers: self.source.headers.as_ref(),
        };

        let mut gathered = Vec::new();
        for url in urls {
            if let Some(threshold) = stop_after {
                if gathered.len() >= threshold {
                    tracing::debug!(
                        source = %self.source.name,
                        gathered = gathered.len(),
                        threshold,
                        "Enough candidates gathered, skipping remaining pages"
                    );
                    break;
                }
            }

            let report = engine.fetch_and_extract(&target, url).await;
            if !report.is_extracted() {
                tracing::debug!(
                    source = %self.source.name,
                    url = %report.url,
                    status = ?report.status,
                    attempts = report.attempts,
                    "Page yielded nothing"
                );
            }
            gathered.extend(report.articles);
        }

        gathered
    }

    /// Reads feeds in order, skipping feeds that fail
    async fn gather_feeds(
        &self,
        urls: &[String],
        freshness: Freshness,
        delay: Option<[f64; 2]>,
    ) -> Result<Vec<Article>, AdapterError> {
        let engine = FeedEngine::new(self.settings.request_timeout()).map_err(|error| {
            AdapterError::Client {
                name: self.source.name.clone(),
                error,
            }
        })?;
        let pacing = RetryPolicy::from_settings(&self.settings);

        let mut gathered = Vec::new();
        for url in urls {
            if let Some([min, max]) = delay {
                tokio::time::sleep(pacing.units_between(min, max)).await;
            }

            match engine
                .fetch_feed_with(&self.source.name, url, self.source.headers.as_ref())
                .await
            {
                Ok(articles) => {
                    let now = Utc::now();
                    let total = articles.len();
                    let fresh: Vec<Article> = articles
                        .into_iter()
                        .filter(|a| is_fresh(a, freshness, now))
                        .collect();
                    tracing::info!(
                        source = %self.source.name,
                        url = %url,
                        found = total,
                        fresh = fresh.len(),
                        "Read feed"
                    );
                    gathered.extend(fresh);
                }
                Err(e) => {
                    tracing::warn!(source = %self.source.name, url = %url, error = %e, "Feed failed, continuing");
                }
            }
        }

        Ok(gathered)
    }

    fn persist(&self, articles: Vec<Article>) -> Result<Persisted, AdapterError> {
        let store = self.store.as_ref();
        let result = match self.source.persistence {
            PersistenceStrategy::InsertIgnore => {
                persist::insert_ignore(store, &self.source.name, articles)
            }
            PersistenceStrategy::MergeUpsert => {
                persist::merge_upsert(store, &self.source.name, articles)
            }
        };
        result.map_err(|error| AdapterError::Storage {
            name: self.source.name.clone(),
            error,
        })
    }
}

#[async_trait]
impl Adapter for SourceAdapter {
    fn key(&self) -> &str {
        &self.source.key
    }

    fn name(&self) -> &str {
        &self.source.name
    }

    async fn run(&self) -> Result<AdapterReport, AdapterError> {
        tracing::info!(source = %self.source.name, "Scraping source");

        let gathered = match &self.source.engine {
            EngineConfig::Html {
                urls,
                selectors,
                stop_after,
            } => self.gather_html(urls, selectors, *stop_after).await,
            EngineConfig::Feed {
                urls,
                freshness,
                delay,
            } => self.gather_feeds(urls, *freshness, *delay).await?,
        };

        let found = gathered.len();
        let persisted = self.persist(gathered)?;

        tracing::info!(
            source = %self.source.name,
            found,
            inserted = persisted.summary.inserted,
            updated = persisted.summary.updated,
            duplicates = persisted.summary.duplicates,
            failed = persisted.summary.failed,
            "Source finished"
        );

        Ok(AdapterReport {
            key: self.source.key.clone(),
            source: self.source.name.clone(),
            found,
            persisted: persisted.articles,
            writes: persisted.summary,
        })
    }
}
