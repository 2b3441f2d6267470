//! Persistence strategies
//!
//! Both strategies tolerate per-article failures: a bad row is logged and
//! counted, and the rest of the batch still lands.

use crate::article::Article;
use crate::dedup::{dedup_by_title_link, merge_latest_by_link};
use crate::storage::{ArticleStore, InsertOutcome, StorageResult, UpsertAction};
use std::collections::HashSet;

/// What a persistence pass did with a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Articles offered after in-batch dedup/merge
    pub offered: usize,
    pub inserted: usize,
    /// Links that were already stored (insert-ignore only)
    pub duplicates: usize,
    pub updated: usize,
    /// Stored rows that were newer than the incoming version (upsert only)
    pub unchanged: usize,
    pub failed: usize,
}

/// Articles that are in the store after a write pass, plus the tally
#[derive(Debug, Clone, Default)]
pub struct Persisted {
    pub articles: Vec<Article>,
    pub summary: WriteSummary,
}

/// Insert-ignore: dedup by `(title, link)` and insert each article
///
/// Duplicates (links already stored) are counted as persisted since the
/// store holds them after the pass. They are reported as the stored row, and
/// a link repeated within the batch is reported once.
pub fn insert_ignore(
    store: &dyn ArticleStore,
    source: &str,
    articles: Vec<Article>,
) -> StorageResult<Persisted> {
    let batch = dedup_by_title_link(articles);
    let outcomes = store.insert_ignore(&batch)?;

    let mut persisted = Persisted {
        articles: Vec::with_capacity(batch.len()),
        summary: WriteSummary {
            offered: batch.len(),
            ..Default::default()
        },
    };

    let mut reported = HashSet::new();
    for (article, outcome) in batch.into_iter().zip(outcomes) {
        match outcome {
            InsertOutcome::Inserted => {
                persisted.summary.inserted += 1;
                reported.insert(article.link.clone());
                persisted.articles.push(article);
            }
            InsertOutcome::Duplicate => {
                persisted.summary.duplicates += 1;
                if !reported.insert(article.link.clone()) {
                    continue;
                }
                match store.get_by_link(&article.link) {
                    Ok(Some(stored)) => persisted.articles.push(stored),
                    Ok(None) => {
                        tracing::debug!(source, link = %article.link, "Duplicate link vanished before lookup");
                    }
                    Err(e) => {
                        tracing::warn!(source, link = %article.link, error = %e, "Could not load stored duplicate");
                    }
                }
            }
            InsertOutcome::Failed(reason) => {
                tracing::warn!(source, link = %article.link, error = %reason, "Failed to store article");
                persisted.summary.failed += 1;
            }
        }
    }

    if persisted.summary.duplicates > 0 {
        tracing::debug!(source, duplicates = persisted.summary.duplicates, "Skipped already stored links");
    }

    Ok(persisted)
}

/// Merge-upsert: keep the latest version per link and upsert by link
///
/// The batch is written in one transaction. If that fails, the same upserts
/// are replayed one at a time and individual failures are skipped.
pub fn merge_upsert(
    store: &dyn ArticleStore,
    source: &str,
    articles: Vec<Article>,
) -> StorageResult<Persisted> {
    let batch = merge_latest_by_link(articles);
    let mut summary = WriteSummary {
        offered: batch.len(),
        ..Default::default()
    };

    if batch.is_empty() {
        return Ok(Persisted {
            articles: batch,
            summary,
        });
    }

    match store.upsert_batch(&batch) {
        Ok(counts) => {
            summary.inserted = counts.inserted;
            summary.updated = counts.updated;
            summary.unchanged = counts.unchanged;
            return Ok(Persisted {
                articles: batch,
                summary,
            });
        }
        Err(e) => {
            tracing::warn!(source, error = %e, size = batch.len(), "Batch upsert failed, retrying one at a time");
        }
    }

    let mut articles = Vec::with_capacity(batch.len());
    for article in batch {
        match store.upsert_one(&article) {
            Ok(action) => {
                match action {
                    UpsertAction::Inserted => summary.inserted += 1,
                    UpsertAction::Updated => summary.updated += 1,
                    UpsertAction::Unchanged => summary.unchanged += 1,
                }
                articles.push(article);
            }
            Err(e) => {
                tracing::warn!(source, link = %article.link, error = %e, "Failed to upsert article");
                summary.failed += 1;
            }
        }
    }

    Ok(Persisted { articles, summary })
}
