//! Built-in source registry
//!
//! Used whenever a configuration file declares no `[[source]]` tables.

use crate::config::{EngineConfig, Freshness, HeaderOverrides, PersistenceStrategy, SourceConfig};

const THE_HINDU_FEEDS: &[&str] = &[
    "https://www.thehindu.com/news/feeder/default.rss",
    "https://www.thehindu.com/news/national/?service=rss",
    "https://www.thehindu.com/news/international/?service=rss",
    "https://www.thehindu.com/business/?service=rss",
    "https://www.thehindu.com/sport/?service=rss",
];

const TIMES_OF_INDIA_PAGES: &[&str] = &[
    "https://timesofindia.indiatimes.com/",
    "https://timesofindia.indiatimes.com/india",
    "https://timesofindia.indiatimes.com/world",
    "https://timesofindia.indiatimes.com/city",
    "https://timesofindia.indiatimes.com/india/politics",
    "https://timesofindia.indiatimes.com/business",
    "https://timesofindia.indiatimes.com/tech",
    "https://timesofindia.indiatimes.com/entertainment",
    "https://timesofindia.indiatimes.com/sports",
    "https://timesofindia.indiatimes.com/education",
    "https://timesofindia.indiatimes.com/astrology",
    "https://timesofindia.indiatimes.com/life-style",
];

const TIMES_OF_INDIA_SELECTORS: &[&str] = &[
    ".article[data-highlight=\"true\"] a",
    ".article-box h2 a",
    ".article-box h3 a",
    ".top-stories .article a",
    ".latest-news .article a",
    ".news-card .headline a",
    ".list-view-item h2 a",
    ".list-view-item h3 a",
    ".featured-news h2 a",
    ".featured-news h3 a",
];

const ANI_FEEDS: &[&str] = &[
    "https://www.aninews.in/feed/",
    "https://www.aninews.in/feed/category/national/",
    "https://www.aninews.in/feed/category/world/",
    "https://www.aninews.in/feed/category/business/",
    "https://www.aninews.in/feed/category/sports/",
    "https://www.aninews.in/feed/category/entertainment/",
];

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// The four upstreams the pipeline ingests out of the box
pub fn builtin_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig {
            key: "the-hindu".to_string(),
            name: "The Hindu".to_string(),
            persistence: PersistenceStrategy::InsertIgnore,
            headers: Some(HeaderOverrides::for_site("www.thehindu.com")),
            engine: EngineConfig::Feed {
                urls: owned(THE_HINDU_FEEDS),
                freshness: Freshness::Any,
                delay: None,
            },
        },
        SourceConfig {
            key: "times-of-india".to_string(),
            name: "Times of India".to_string(),
            persistence: PersistenceStrategy::InsertIgnore,
            headers: None,
            engine: EngineConfig::Html {
                urls: owned(TIMES_OF_INDIA_PAGES),
                selectors: owned(TIMES_OF_INDIA_SELECTORS),
                stop_after: Some(10),
            },
        },
        SourceConfig {
            key: "ani".to_string(),
            name: "ANI".to_string(),
            persistence: PersistenceStrategy::MergeUpsert,
            headers: Some(HeaderOverrides::for_site("www.aninews.in")),
            engine: EngineConfig::Feed {
                urls: owned(ANI_FEEDS),
                freshness: Freshness::Today,
                delay: Some([2.0, 5.0]),
            },
        },
        SourceConfig {
            key: "ndtv".to_string(),
            name: "NDTV".to_string(),
            persistence: PersistenceStrategy::InsertIgnore,
            headers: None,
            engine: EngineConfig::Html {
                urls: vec!["https://www.ndtv.com/india".to_string()],
                selectors: Vec::new(),
                stop_after: None,
            },
        },
    ]
}
