//! Feed engine against a mock server

use chrono::{Duration, Utc};
use newsdesk_ingest::config::HeaderOverrides;
use newsdesk_ingest::fetch::{FeedEngine, FeedError};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn rss(items: &[(&str, &str, Option<chrono::DateTime<Utc>>)]) -> String {
    let mut body = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>Mock Feed</title><link>https://mock.example.com/</link>"#,
    );
    for (title, link, published) in items {
        body.push_str("<item>");
        body.push_str(&format!("<title>{}</title><link>{}</link>", title, link));
        if let Some(published) = published {
            body.push_str(&format!("<pubDate>{}</pubDate>", published.to_rfc2822()));
        }
        body.push_str("<category>National</category></item>");
    }
    body.push_str("</channel></rss>");
    body
}

pub fn rss_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "application/rss+xml")
}

#[tokio::test]
async fn test_fetch_feed_parses_entries() {
    let server = MockServer::start().await;
    let published = Utc::now() - Duration::hours(1);
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(rss_response(rss(&[
            ("Cabinet approves new rail corridor", "https://mock.example.com/rail", Some(published)),
            ("Tiny", "https://mock.example.com/tiny", Some(published)),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let engine = FeedEngine::new(std::time::Duration::from_secs(5)).unwrap();
    let articles = engine
        .fetch_feed("Mock Wire", &format!("{}/feed", server.uri()))
        .await
        .unwrap();

    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].source, "Mock Wire");
    assert_eq!(articles[0].category.as_deref(), Some("National"));
    assert_eq!(
        articles[0].published_at.map(|t| t.timestamp()),
        Some(published.timestamp())
    );
}

#[tokio::test]
async fn test_fetch_feed_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let engine = FeedEngine::new(std::time::Duration::from_secs(5)).unwrap();
    let result = engine
        .fetch_feed("Mock Wire", &format!("{}/feed", server.uri()))
        .await;

    assert!(matches!(result, Err(FeedError::HttpStatus(503))));
}

#[tokio::test]
async fn test_fetch_feed_unparsable_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"this is not a feed".to_vec(), "text/plain"),
        )
        .mount(&server)
        .await;

    let engine = FeedEngine::new(std::time::Duration::from_secs(5)).unwrap();
    let result = engine
        .fetch_feed("Mock Wire", &format!("{}/feed", server.uri()))
        .await;

    assert!(matches!(result, Err(FeedError::Parse(_))));
}

#[tokio::test]
async fn test_fetch_feed_sends_site_overrides() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .and(header("referer", "https://wire.example.com/"))
        .and(header("origin", "https://wire.example.com"))
        .respond_with(rss_response(rss(&[(
            "Overrides reach the feed server",
            "https://wire.example.com/overrides",
            None,
        )])))
        .expect(1)
        .mount(&server)
        .await;

    let overrides = HeaderOverrides {
        origin: Some("https://wire.example.com".to_string()),
        referer: Some("https://wire.example.com/".to_string()),
        ..Default::default()
    };
    let engine = FeedEngine::new(std::time::Duration::from_secs(5)).unwrap();
    let articles = engine
        .fetch_feed_with(
            "Mock Wire",
            &format!("{}/feed", server.uri()),
            Some(&overrides),
        )
        .await
        .unwrap();

    assert_eq!(articles.len(), 1);
}
