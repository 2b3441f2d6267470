//! Adapters, orchestrator, retention and triggers end-to-end

use crate::feed_engine::{rss, rss_response};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use newsdesk_ingest::config::parse_config;
use newsdesk_ingest::retention::RetentionSweeper;
use newsdesk_ingest::sources::{build_adapters, Adapter, AdapterError, AdapterReport};
use newsdesk_ingest::storage::{ArticleStore, RunStatus, SqliteStore};
use newsdesk_ingest::trigger::{trigger_source, SourceTriggerResponse};
use newsdesk_ingest::{Article, IngestContext, Orchestrator};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FRONT_PAGE: &str = r#"<html><body>
    <div class="top-stories"><div class="article"><a href="/news/one">First front page story of the day</a></div></div>
    <div class="top-stories"><div class="article"><a href="/news/two">Second front page story of the day</a></div></div>
</body></html>"#;

const SECTION_PAGE: &str = r#"<html><body>
    <div class="top-stories"><div class="article"><a href="/news/three">Third story from a section page</a></div></div>
</body></html>"#;

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html")
}

fn config_toml(server: &str, db_path: &str) -> String {
    format!(
        r#"
[ingest]
time-unit-ms = 1
request-timeout-secs = 5

[output]
database-path = "{db}"

[[source]]
key = "front"
name = "Mock Front"
persistence = "insert-ignore"

[source.engine]
kind = "html"
urls = ["{s}/front", "{s}/section", "{s}/never-visited"]
selectors = [".top-stories .article a"]
stop-after = 3

[[source]]
key = "wire"
name = "Mock Wire"
persistence = "merge-upsert"

[source.engine]
kind = "feed"
urls = ["{s}/wire/missing", "{s}/wire/national"]
freshness = "today"
delay = [1.0, 2.0]
"#,
        s = server,
        db = db_path
    )
}

struct Fixture {
    server: MockServer,
    _dir: TempDir,
    context: IngestContext,
}

async fn fixture() -> Fixture {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("news.db");

    Mock::given(method("GET"))
        .and(path("/front"))
        .respond_with(html(FRONT_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/section"))
        .respond_with(html(SECTION_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/never-visited"))
        .respond_with(html(SECTION_PAGE))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wire/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let now = Utc::now();
    Mock::given(method("GET"))
        .and(path("/wire/national"))
        .respond_with(rss_response(rss(&[
            ("Wire story published this morning", "https://wire.example.com/today", Some(now)),
            ("Wire story from two days ago", "https://wire.example.com/old", Some(now - Duration::days(2))),
        ])))
        .mount(&server)
        .await;

    let config = parse_config(&config_toml(&server.uri(), &db_path.to_string_lossy())).unwrap();
    let context = IngestContext::open(config, "test-hash").unwrap();

    Fixture {
        server,
        _dir: dir,
        context,
    }
}

#[tokio::test]
async fn test_run_all_persists_every_source() {
    let fixture = fixture().await;
    let orchestrator = fixture.context.orchestrator();

    let articles = orchestrator.run_all().await;
    let mut links: Vec<_> = articles.iter().map(|a| a.link.clone()).collect();
    links.sort();

    let base = fixture.server.uri();
    let mut expected = vec![
        format!("{}/news/one", base),
        format!("{}/news/two", base),
        format!("{}/news/three", base),
        "https://wire.example.com/today".to_string(),
    ];
    expected.sort();
    assert_eq!(links, expected);

    let store = &fixture.context.store;
    assert_eq!(store.count_articles().unwrap(), 4);
    assert!(store.get_by_link("https://wire.example.com/old").unwrap().is_none());

    let run = store.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.persisted, 4);
    assert_eq!(run.config_hash, "test-hash");
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let fixture = fixture().await;
    let orchestrator = fixture.context.orchestrator();

    orchestrator.run_all().await;
    let second = orchestrator.run_all().await;

    assert_eq!(second.len(), 4);
    assert_eq!(fixture.context.store.count_articles().unwrap(), 4);
    assert_eq!(fixture.context.store.by_source("Mock Front", 10).unwrap().len(), 3);
}

#[tokio::test]
async fn test_trigger_source_reports_and_rejects_unknown_keys() {
    let fixture = fixture().await;
    let orchestrator = fixture.context.orchestrator();

    match trigger_source(&orchestrator, "front").await {
        SourceTriggerResponse::Success {
            source,
            articles_found,
            articles,
        } => {
            assert_eq!(source, "front");
            assert_eq!(articles_found, 3);
            assert_eq!(articles.len(), 3);
        }
        other => panic!("unexpected response {:?}", other),
    }

    match trigger_source(&orchestrator, "bbc").await {
        SourceTriggerResponse::Error { message } => {
            assert!(message.contains("bbc"));
            assert!(message.contains("front, wire, all"));
        }
        other => panic!("unexpected response {:?}", other),
    }
}

struct PanickingAdapter;

#[async_trait]
impl Adapter for PanickingAdapter {
    fn key(&self) -> &str {
        "panicky"
    }

    fn name(&self) -> &str {
        "Panicky"
    }

    async fn run(&self) -> Result<AdapterReport, AdapterError> {
        panic!("upstream parser exploded");
    }
}

#[tokio::test]
async fn test_panicking_adapter_does_not_affect_siblings() {
    let fixture = fixture().await;
    let store = Arc::clone(&fixture.context.store);

    let mut adapters = build_adapters(&fixture.context.config, Arc::clone(&store));
    adapters.insert(0, Arc::new(PanickingAdapter));

    let orchestrator = Orchestrator::new(
        adapters,
        Arc::clone(&store),
        RetentionSweeper::new(Arc::clone(&store), Duration::days(7)),
        "test-hash",
    );

    let articles = orchestrator.run_all().await;
    assert_eq!(articles.len(), 4);
}

#[tokio::test]
async fn test_run_all_sweeps_expired_articles() {
    let fixture = fixture().await;
    let store = &fixture.context.store;

    let now = Utc::now();
    store
        .insert_ignore(&[
            Article::candidate(
                "Article scraped eight days ago",
                "https://archive.example.com/eight",
                "Archive",
                now - Duration::days(8),
            )
            .unwrap(),
            Article::candidate(
                "Article scraped six days ago",
                "https://archive.example.com/six",
                "Archive",
                now - Duration::days(6),
            )
            .unwrap(),
        ])
        .unwrap();

    fixture.context.orchestrator().run_all().await;

    assert!(store.get_by_link("https://archive.example.com/eight").unwrap().is_none());
    assert!(store.get_by_link("https://archive.example.com/six").unwrap().is_some());
    assert_eq!(store.get_latest_run().unwrap().unwrap().swept, 1);
}

#[tokio::test]
async fn test_merge_upsert_source_keeps_later_version() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let now = Utc::now();

    Mock::given(method("GET"))
        .and(path("/wire"))
        .respond_with(rss_response(rss(&[
            ("Developing story first report", "https://wire.example.com/dev", Some(now - Duration::minutes(30))),
            ("Developing story latest update", "https://wire.example.com/dev", Some(now)),
        ])))
        .mount(&server)
        .await;

    let toml = format!(
        r#"
[ingest]
time-unit-ms = 1

[output]
database-path = "{db}"

[[source]]
key = "wire"
name = "Mock Wire"
persistence = "merge-upsert"

[source.engine]
kind = "feed"
urls = ["{s}/wire"]
"#,
        s = server.uri(),
        db = dir.path().join("news.db").to_string_lossy()
    );
    let config = parse_config(&toml).unwrap();
    let store: Arc<dyn ArticleStore> = Arc::new(SqliteStore::new_in_memory().unwrap());
    let context = IngestContext::with_store(config, Arc::clone(&store), "hash");

    let articles = context.orchestrator().run_all().await;
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].title, "Developing story latest update");

    let stored = store.get_by_link("https://wire.example.com/dev").unwrap().unwrap();
    assert_eq!(stored.title, "Developing story latest update");
}
