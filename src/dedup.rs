//! Batch deduplication
//!
//! Two flavours, one per persistence strategy:
//! - [`dedup_by_title_link`] drops repeated `(title, link)` pairs, keeping the
//!   first occurrence and the original order.
//! - [`merge_latest_by_link`] keeps one article per link (the most recently
//!   published) and sorts the result newest first.

use crate::article::Article;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Removes repeated `(title, link)` pairs; first occurrence wins
pub fn dedup_by_title_link(articles: Vec<Article>) -> Vec<Article> {
    let mut seen = HashSet::with_capacity(articles.len());
    articles
        .into_iter()
        .filter(|a| seen.insert((a.title.clone(), a.link.clone())))
        .collect()
}

/// Keeps the most recently published article per link, newest first
///
/// On equal (or missing) `published_at` the later occurrence in the batch
/// wins. Articles without a publication date sort after dated ones.
pub fn merge_latest_by_link(articles: Vec<Article>) -> Vec<Article> {
    let mut by_link: HashMap<String, Article> = HashMap::with_capacity(articles.len());

    for article in articles {
        match by_link.get(&article.link) {
            Some(existing) if existing.published_at > article.published_at => {}
            _ => {
                by_link.insert(article.link.clone(), article);
            }
        }
    }

    let mut merged: Vec<Article> = by_link.into_values().collect();
    merged.sort_by(|a, b| newest_first(a, b).then_with(|| a.link.cmp(&b.link)));
    merged
}

fn newest_first(a: &Article, b: &Article) -> Ordering {
    match (a.published_at, b.published_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
