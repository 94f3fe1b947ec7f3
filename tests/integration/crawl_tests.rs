//! Integration tests for the crawl decision core
//!
//! These tests use wiremock to create mock HTTP servers and exercise the
//! HTTP fetcher, robots.txt handling and a full crawl session end-to-end.

use std::sync::Arc;
use std::time::{Duration, Instant};
use sumi_sieve::config::{FetchConfig, ScopeConfig, UserAgentConfig};
use sumi_sieve::crawler::{CrawlSession, Fetcher, HtmlParser, HttpFetcher, PageVerdict};
use sumi_sieve::output::{load_latest_report, ReportSink, SqliteReportSink, TextReportSink};
use sumi_sieve::robots::{fetch_robots, RobotsOutcome};
use sumi_sieve::{Admission, RejectReason};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    }
}

fn http_fetcher() -> Arc<HttpFetcher> {
    Arc::new(HttpFetcher::new(&user_agent(), &FetchConfig::default()).expect("Failed to build client"))
}

/// Scope containing only the loopback host the mock server listens on
fn local_scope() -> ScopeConfig {
    ScopeConfig {
        allowed_domains: vec!["127.0.0.1".to_string()],
        excluded_hosts: vec![],
    }
}

/// HTML page with `count` distinct words starting with `topic`
fn page_body(title: &str, topic: &str, count: usize, links: &[String]) -> String {
    let words: Vec<String> = (0..count)
        .map(|i| {
            let suffix: String = format!("{:03}", i)
                .chars()
                .map(|d| (b'a' + d.to_digit(10).unwrap_or(0) as u8) as char)
                .collect();
            format!("{}{}", topic, suffix)
        })
        .collect();
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">more</a>"#, href))
        .collect();

    format!(
        "<html><head><title>{}</title><script>var ignored = 1;</script></head>\
         <body><p>{}</p>{}</body></html>",
        title,
        words.join(" "),
        anchors
    )
}

async fn mount_robots(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_http_fetcher_follows_redirects() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/new", "<html><body>moved</body></html>".to_string()).await;

    let response = http_fetcher()
        .fetch(&format!("{}/old", base_url))
        .await
        .expect("Fetch failed");

    assert_eq!(response.status, 200);
    assert_eq!(response.requested_url, format!("{}/old", base_url));
    assert_eq!(response.final_url, format!("{}/new", base_url));
    assert_eq!(
        response.body.as_deref(),
        Some("<html><body>moved</body></html>".as_bytes())
    );
}

#[tokio::test]
async fn test_http_fetcher_returns_error_statuses() {
    let mock_server = MockServer::start().await;

    let response = http_fetcher()
        .fetch(&format!("{}/nowhere", mock_server.uri()))
        .await
        .expect("A 404 is still a completed fetch");

    assert_eq!(response.status, 404);
}

#[tokio::test]
async fn test_robots_outcomes_over_http() {
    let parsed = MockServer::start().await;
    mount_robots(&parsed, 200, "User-agent: *\nDisallow: /private/\nCrawl-delay: 1").await;

    let missing = MockServer::start().await;
    mount_robots(&missing, 404, "").await;

    let broken = MockServer::start().await;
    mount_robots(&broken, 500, "").await;

    let fetcher = http_fetcher();

    let outcome = fetch_robots(fetcher.as_ref(), &parsed.uri()).await;
    assert!(matches!(outcome, RobotsOutcome::Parsed(_)));
    assert!(!outcome.is_allowed(&format!("{}/private/x", parsed.uri())));
    assert_eq!(outcome.crawl_delay(), Some(Duration::from_secs(1)));

    let outcome = fetch_robots(fetcher.as_ref(), &missing.uri()).await;
    assert!(matches!(outcome, RobotsOutcome::NotFound));

    let outcome = fetch_robots(fetcher.as_ref(), &broken.uri()).await;
    assert!(matches!(outcome, RobotsOutcome::FetchFailed(_)));
    assert!(outcome.is_allowed(&format!("{}/anything", broken.uri())));
}

#[tokio::test]
async fn test_robots_fetched_once_per_session() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = CrawlSession::new(&local_scope(), http_fetcher(), Arc::new(HtmlParser));
    for page in ["a", "b", "c"] {
        let admission = session.admit(&format!("{}/{}", base_url, page)).await;
        assert_eq!(admission, Ok(Admission::Admitted));
    }
}

#[tokio::test]
async fn test_crawl_delay_spaces_out_admissions() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_robots(&mock_server, 200, "User-agent: *\nCrawl-delay: 1").await;

    let session = CrawlSession::new(&local_scope(), http_fetcher(), Arc::new(HtmlParser));

    session
        .admit(&format!("{}/first", base_url))
        .await
        .expect("Valid URL");
    let first_done = Instant::now();

    session
        .admit(&format!("{}/second", base_url))
        .await
        .expect("Valid URL");

    // Timer granularity allows the wait to end a hair early
    assert!(first_done.elapsed() >= Duration::from_millis(900));
}

#[tokio::test]
async fn test_full_session_end_to_end() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, 200, "User-agent: *\nDisallow: /private/").await;

    mount_page(
        &mock_server,
        "/",
        page_body(
            "Home",
            "home",
            40,
            &[
                "/page1#top".to_string(),
                "/private/notes".to_string(),
                "/files/report.pdf".to_string(),
                "/login".to_string(),
                "https://example.com/".to_string(),
                "mailto:someone@example.com".to_string(),
            ],
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/page1",
        page_body(
            "Research",
            "research",
            60,
            &[format!("{}/", base_url), "/page2".to_string()],
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/page2",
        page_body("Research", "research", 60, &["/page3".to_string()]),
    )
    .await;
    mount_page(
        &mock_server,
        "/missing",
        page_body("404 Not Found", "lost", 40, &[]),
    )
    .await;

    let fetcher = http_fetcher();
    let session = CrawlSession::new(&local_scope(), fetcher.clone(), Arc::new(HtmlParser));

    // Index: only the in-scope, robots-allowed, non-trap link survives
    let index = fetcher.fetch(&format!("{}/", base_url)).await.unwrap();
    let links = session.scrape(&index).await;
    assert_eq!(links, vec![format!("{}/page1", base_url)]);

    // Page 1: the index is already visited
    let page1 = fetcher.fetch(&links[0]).await.unwrap();
    let links = session.scrape(&page1).await;
    assert_eq!(links, vec![format!("{}/page2", base_url)]);

    // Page 2 repeats page 1's content
    let page2 = fetcher.fetch(&links[0]).await.unwrap();
    let processed = session.process_page(&page2);
    assert!(matches!(processed.verdict, PageVerdict::Skipped(_)));
    assert!(processed.links.is_empty());

    // Error page served with status 200
    let missing = fetcher
        .fetch(&format!("{}/missing", base_url))
        .await
        .unwrap();
    assert!(session.scrape(&missing).await.is_empty());

    // Robots-disallowed URLs are rejected by name
    let admission = session
        .admit(&format!("{}/private/notes", base_url))
        .await
        .unwrap();
    assert_eq!(admission, Admission::Rejected(RejectReason::RobotsDisallowed));

    let dir = TempDir::new().unwrap();
    let report_path = dir.path().join("crawl_report.txt");
    let db_path = dir.path().join("crawl_report.db");
    let sinks: Vec<Box<dyn ReportSink>> = vec![
        Box::new(TextReportSink::new(&report_path)),
        Box::new(SqliteReportSink::new(&db_path).with_config_hash("test-hash")),
    ];

    let report = session.finish(&sinks).expect("Failed to write report");

    assert_eq!(report.unique_pages, 2);
    assert_eq!(
        report.longest_page.as_ref().map(|p| p.url.clone()),
        Some(format!("{}/page1", base_url))
    );
    assert_eq!(report.hosts, vec![("127.0.0.1".to_string(), 2)]);
    assert_eq!(report.top_words.len(), 50);

    let text = std::fs::read_to_string(&report_path).unwrap();
    assert!(text.starts_with("Q1: 2 unique pages"));
    assert!(text.contains("127.0.0.1, 2"));
    assert!(!text.contains("ignored"));

    let stored = load_latest_report(&db_path).unwrap().expect("Report stored");
    assert_eq!(stored.config_hash.as_deref(), Some("test-hash"));
    assert_eq!(stored.report, report);
}
