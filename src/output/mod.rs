//! Output module for terminal reports
//!
//! This module handles:
//! - Service status summaries
//! - Article listings

pub mod stats;

pub use stats::{format_statistics, load_statistics, print_statistics, StoreStatistics};

use crate::article::Article;
use std::fmt::Write;

/// Renders articles as a numbered listing, one article per block
pub fn format_articles(articles: &[Article]) -> String {
    let mut out = String::new();
    for (i, article) in articles.iter().enumerate() {
        let when = article.published_at.unwrap_or(article.scraped_at);
        let _ = writeln!(out, "{:>3}. {}", i + 1, article.title);
        let _ = write!(
            out,
            "     {} | {}",
            article.source,
            when.format("%Y-%m-%d %H:%M UTC")
        );
        if let Some(category) = &article.category {
            let _ = write!(out, " | {}", category);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "     {}", article.link);
    }
    out
}

pub fn print_articles(articles: &[Article]) {
    if articles.is_empty() {
        println!("No articles stored.");
        return;
    }
    print!("{}", format_articles(articles));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_format_articles() {
        let at = Utc.with_ymd_and_hms(2024, 5, 14, 8, 30, 0).unwrap();
        let article = Article::candidate("Budget session opens today", "https://e.com/b", "The Hindu", at)
            .unwrap()
            .with_category(Some("National".to_string()));

        let listing = format_articles(&[article]);
        assert_eq!(
            listing,
            "  1. Budget session opens today\n     The Hindu | 2024-05-14 08:30 UTC | National\n     https://e.com/b\n"
        );
    }
}
