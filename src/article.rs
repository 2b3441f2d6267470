//! The article record shared by every stage of the pipeline
//!
//! An [`Article`] starts life as a candidate produced by one of the fetch
//! engines and becomes a stored document once a persistence strategy accepts
//! it. The acceptance rules for candidates live here so the HTML and feed
//! engines apply exactly the same title policy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Titles must be strictly longer than this many characters
pub const MIN_TITLE_LENGTH: usize = 10;

/// A news article, either as an extracted candidate or as a stored document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Whitespace-normalized headline
    pub title: String,

    /// Absolute URL, unique across the store
    pub link: String,

    /// Display name of the source that produced this article
    pub source: String,

    /// When the article was ingested (UTC)
    pub scraped_at: DateTime<Utc>,

    /// When the upstream published the article, if known
    pub published_at: Option<DateTime<Utc>>,

    /// Feed description, if any
    pub summary: Option<String>,

    /// Feed category, if any
    pub category: Option<String>,
}

impl Article {
    /// Builds a candidate from raw extracted text
    ///
    /// The title is whitespace-normalized before the length check, so a
    /// candidate that passes always satisfies the stored-title invariants.
    /// Returns `None` when the title or link is empty or the title is too
    /// short to be a headline.
    pub fn candidate(
        raw_title: &str,
        link: &str,
        source: &str,
        scraped_at: DateTime<Utc>,
    ) -> Option<Self> {
        let title = normalize_title(raw_title);
        let link = link.trim();

        if link.is_empty() || !is_acceptable_title(&title) {
            return None;
        }

        Some(Self {
            title,
            link: link.to_string(),
            source: source.to_string(),
            scraped_at,
            published_at: None,
            summary: None,
            category: None,
        })
    }

    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    pub fn with_summary(mut self, summary: Option<String>) -> Self {
        self.summary = summary.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category.filter(|c| !c.trim().is_empty());
        self
    }
}

/// Collapses every run of whitespace (including newlines and tabs) into a
/// single space and trims both ends
pub fn normalize_title(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns true if a normalized title is long enough to be kept
pub fn is_acceptable_title(title: &str) -> bool {
    !title.is_empty() && title.chars().count() > MIN_TITLE_LENGTH
}
