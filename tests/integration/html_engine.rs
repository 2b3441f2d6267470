//! HTML fetch-and-extract engine against a mock server

use newsdesk_ingest::fetch::{FetchStatus, HtmlEngine, HtmlTarget, RetryPolicy};
use std::collections::HashSet;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FRONT_PAGE: &str = r#"<html><head><title>Front</title></head><body>
    <div class="lead-story"><h2><a href="/india/budget-session">
        Budget session of parliament
        opens with heated debate
    </a></h2></div>
    <div class="lead-story"><h3><a href="/india/short">Tiny</a></h3></div>
    <div class="other-article"><h3><a href="https://elsewhere.example.org/world/summit">Leaders gather for the regional summit</a></h3></div>
    <div class="other-article"><h3><a href="/india/budget-session">Budget session of parliament opens with heated debate</a></h3></div>
    <div class="other-article"><h3><a href="javascript:void(0)">Script links never become articles</a></h3></div>
</body></html>"#;

fn engine() -> HtmlEngine {
    HtmlEngine::new(
        RetryPolicy {
            max_attempts: 5,
            soft_retry_attempts: 2,
            unit: Duration::from_millis(1),
        },
        Duration::from_secs(5),
    )
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8")
}

fn selectors() -> Vec<String> {
    vec![".lead-story h2 a".to_string(), ".other-article h3 a".to_string()]
}

#[tokio::test]
async fn test_extracts_with_selector_cascade() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/front"))
        .respond_with(html(FRONT_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let selectors = selectors();
    let target = HtmlTarget {
        name: "Mock Times",
        selectors: &selectors,
        headers: None,
    };
    let report = engine()
        .fetch_and_extract(&target, &format!("{}/front", server.uri()))
        .await;

    assert_eq!(report.status, FetchStatus::Extracted);
    assert_eq!(report.attempts, 1);

    let links: Vec<_> = report.articles.iter().map(|a| a.link.clone()).collect();
    assert_eq!(
        links,
        vec![
            format!("{}/india/budget-session", server.uri()),
            "https://elsewhere.example.org/world/summit".to_string(),
        ]
    );

    for article in &report.articles {
        assert!(article.title.chars().count() > 10);
        assert!(!article.title.contains('\n'));
        assert!(!article.title.contains('\t'));
        assert_eq!(article.source, "Mock Times");
    }
    assert_eq!(
        report.articles[0].title,
        "Budget session of parliament opens with heated debate"
    );
}

#[tokio::test]
async fn test_generic_extraction_fallback() {
    let server = MockServer::start().await;
    let body = r#"<html><body>
        <section class="main-content">
            <h2><a href="/a">A generic headline found by fallback</a></h2>
            <h4><a href="/b">Another generic headline found too</a></h4>
        </section>
        <footer><a href="/c">Footer links are not inside news containers</a></footer>
    </body></html>"#;
    Mock::given(method("GET"))
        .and(path("/india"))
        .respond_with(html(body))
        .mount(&server)
        .await;

    let target = HtmlTarget {
        name: "Mock TV",
        selectors: &[],
        headers: None,
    };
    let report = engine()
        .fetch_and_extract(&target, &format!("{}/india", server.uri()))
        .await;

    let pairs: HashSet<_> = report
        .articles
        .iter()
        .map(|a| (a.title.clone(), a.link.clone()))
        .collect();
    assert_eq!(report.articles.len(), 2);
    assert_eq!(pairs.len(), 2);
}

#[tokio::test]
async fn test_not_found_makes_exactly_one_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let target = HtmlTarget {
        name: "Mock",
        selectors: &[],
        headers: None,
    };
    let report = engine()
        .fetch_and_extract(&target, &format!("{}/gone", server.uri()))
        .await;

    assert_eq!(report.status, FetchStatus::NotFound);
    assert_eq!(report.attempts, 1);
    assert!(report.articles.is_empty());
}

#[tokio::test]
async fn test_server_error_gives_up_after_soft_window() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let target = HtmlTarget {
        name: "Mock",
        selectors: &[],
        headers: None,
    };
    let report = engine()
        .fetch_and_extract(&target, &format!("{}/broken", server.uri()))
        .await;

    assert_eq!(report.attempts, 3);
    assert!(matches!(report.status, FetchStatus::Aborted { .. }));
    assert!(report.articles.is_empty());
}

#[tokio::test]
async fn test_forbidden_rotates_identity_until_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/guarded"))
        .respond_with(ResponseTemplate::new(403))
        .expect(5)
        .mount(&server)
        .await;

    let target = HtmlTarget {
        name: "Mock",
        selectors: &[],
        headers: None,
    };
    let report = engine()
        .fetch_and_extract(&target, &format!("{}/guarded", server.uri()))
        .await;

    assert_eq!(report.attempts, 5);
    assert_eq!(
        report.status,
        FetchStatus::Exhausted {
            last_error: "HTTP 403".to_string()
        }
    );

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 5);
    for request in &requests {
        let query = request.url.query().unwrap();
        assert!(query.starts_with("_="));
        assert!(query.contains("&r="));
    }
}

#[tokio::test]
async fn test_forbidden_then_success_recovers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/front"))
        .respond_with(ResponseTemplate::new(403))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/front"))
        .respond_with(html(FRONT_PAGE))
        .mount(&server)
        .await;

    let selectors = selectors();
    let target = HtmlTarget {
        name: "Mock",
        selectors: &selectors,
        headers: None,
    };
    let report = engine()
        .fetch_and_extract(&target, &format!("{}/front", server.uri()))
        .await;

    assert_eq!(report.status, FetchStatus::Extracted);
    assert_eq!(report.attempts, 3);
    assert_eq!(report.articles.len(), 2);
}

#[tokio::test]
async fn test_non_html_response_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/front"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"{\"ok\":true}".to_vec(), "application/json"),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/front"))
        .respond_with(html(FRONT_PAGE))
        .mount(&server)
        .await;

    let selectors = selectors();
    let target = HtmlTarget {
        name: "Mock",
        selectors: &selectors,
        headers: None,
    };
    let report = engine()
        .fetch_and_extract(&target, &format!("{}/front", server.uri()))
        .await;

    assert_eq!(report.status, FetchStatus::Extracted);
    assert_eq!(report.attempts, 2);
    assert!(!report.articles.is_empty());
}

#[tokio::test]
async fn test_timeouts_are_retried_then_abort() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html(FRONT_PAGE).set_delay(Duration::from_millis(500)))
        .expect(3)
        .mount(&server)
        .await;

    let engine = HtmlEngine::new(
        RetryPolicy {
            max_attempts: 5,
            soft_retry_attempts: 2,
            unit: Duration::from_millis(1),
        },
        Duration::from_millis(50),
    );
    let selectors = selectors();
    let target = HtmlTarget {
        name: "Mock",
        selectors: &selectors,
        headers: None,
    };
    let report = engine
        .fetch_and_extract(&target, &format!("{}/slow", server.uri()))
        .await;

    assert_eq!(report.attempts, 3);
    assert!(report.articles.is_empty());
    match &report.status {
        FetchStatus::Aborted { error } => assert!(error.starts_with("transport error")),
        other => panic!("expected aborted fetch, got {:?}", other),
    }
}
