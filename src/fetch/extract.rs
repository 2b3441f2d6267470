//! Headline extraction from HTML pages
//!
//! Extraction runs in two layers:
//!
//! 1. The source's **selector cascade**: every selector is tried in order and
//!    all matches are kept. Selectors are not mutually exclusive, so a hit on
//!    one never stops the next from running.
//! 2. A **generic fallback**, used only when the cascade found nothing: scan
//!    `article`/`div`/`section` containers whose class mentions one of
//!    [`CONTAINER_KEYWORDS`] and take the nearest anchor of each heading or
//!    link inside them.
//!
//! Each match becomes a candidate only if its link resolves to an absolute
//! URL and its normalized title passes the length threshold. Candidates are
//! deduplicated by `(title, link)` before being returned.

use crate::article::Article;
use crate::dedup::dedup_by_title_link;
use crate::url::resolve_link;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Class keywords that mark a container as holding news items
pub const CONTAINER_KEYWORDS: &[&str] = &["article", "story", "news", "content"];

const CONTAINER_SELECTOR: &str = "article[class], div[class], section[class]";
const HEADLINE_SELECTOR: &str = "h1, h2, h3, h4, a";
const ANCHOR_SELECTOR: &str = "a[href]";

/// Extracts deduplicated article candidates from an HTML page
///
/// # Arguments
///
/// * `html` - The page body
/// * `page_url` - URL the page was fetched from, used to resolve relative links
/// * `source` - Display name stamped on every candidate
/// * `selectors` - The source's ordered selector cascade
/// * `scraped_at` - Ingestion timestamp stamped on every candidate
pub fn extract_articles(
    html: &str,
    page_url: &Url,
    source: &str,
    selectors: &[String],
    scraped_at: DateTime<Utc>,
) -> Vec<Article> {
    let document = Html::parse_document(html);

    let mut articles = run_selector_cascade(&document, page_url, source, selectors, scraped_at);

    if articles.is_empty() {
        tracing::debug!(source, url = %page_url, "Selector cascade found nothing, trying generic extraction");
        articles = extract_generic(&document, page_url, source, scraped_at);
    }

    dedup_by_title_link(articles)
}

/// Runs every selector in order and unions the results
fn run_selector_cascade(
    document: &Html,
    page_url: &Url,
    source: &str,
    selectors: &[String],
    scraped_at: DateTime<Utc>,
) -> Vec<Article> {
    let anchor_selector = match Selector::parse(ANCHOR_SELECTOR) {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let mut articles = Vec::new();

    for raw in selectors {
        let selector = match Selector::parse(raw) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(source, selector = %raw, error = ?e, "Skipping unparsable selector");
                continue;
            }
        };

        let mut matched = 0usize;
        for element in document.select(&selector) {
            matched += 1;
            if let Some(article) =
                nearest_anchor(element, &anchor_selector)
                    .and_then(|anchor| candidate_from_anchor(anchor, page_url, source, scraped_at))
            {
                articles.push(article);
            }
        }

        tracing::debug!(source, selector = %raw, matched, "Selector matched elements");
    }

    articles
}

/// Generic fallback for pages whose markup drifted away from the cascade
fn extract_generic(
    document: &Html,
    page_url: &Url,
    source: &str,
    scraped_at: DateTime<Utc>,
) -> Vec<Article> {
    let (Ok(containers), Ok(headlines), Ok(anchors)) = (
        Selector::parse(CONTAINER_SELECTOR),
        Selector::parse(HEADLINE_SELECTOR),
        Selector::parse(ANCHOR_SELECTOR),
    ) else {
        return Vec::new();
    };

    let mut articles = Vec::new();

    for container in document
        .select(&containers)
        .filter(|c| has_news_class(c))
    {
        for headline in container.select(&headlines) {
            if let Some(article) = nearest_anchor(headline, &anchors)
                .and_then(|anchor| candidate_from_anchor(anchor, page_url, source, scraped_at))
            {
                articles.push(article);
            }
        }
    }

    articles
}

/// Returns true if the element's class attribute mentions a news keyword
fn has_news_class(element: &ElementRef) -> bool {
    element
        .value()
        .attr("class")
        .map(|class| {
            let class = class.to_lowercase();
            CONTAINER_KEYWORDS.iter().any(|keyword| class.contains(keyword))
        })
        .unwrap_or(false)
}

/// The element itself if it carries an href, otherwise its first descendant
/// anchor with one
fn nearest_anchor<'a>(element: ElementRef<'a>, anchors: &Selector) -> Option<ElementRef<'a>> {
    if element.value().attr("href").is_some() {
        return Some(element);
    }
    element.select(anchors).next()
}

fn candidate_from_anchor(
    anchor: ElementRef,
    page_url: &Url,
    source: &str,
    scraped_at: DateTime<Utc>,
) -> Option<Article> {
    let href = anchor.value().attr("href")?;
    let link = resolve_link(href, page_url)?;
    let title: String = anchor.text().collect();
    Article::candidate(&title, &link, source, scraped_at)
}
