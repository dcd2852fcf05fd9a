//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a paginated timeline and run the
//! full crawl loop against a temporary page store.

use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tweet_harvest::config::{Config, CrawlConfig, OutputConfig, RequestConfig};
use tweet_harvest::crawler::Coordinator;
use tweet_harvest::state::{Cursor, StopReason};
use tweet_harvest::TimelineError;
use wiremock::matchers::{header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const TIMELINE_PATH: &str = "/i/api/graphql/abc/Likes";

/// Matches requests whose `variables` carry the given cursor (or none)
struct CursorIs(Option<&'static str>);

impl Match for CursorIs {
    fn matches(&self, request: &Request) -> bool {
        let Some(raw) = request
            .url
            .query_pairs()
            .find(|(k, _)| k == "variables")
            .map(|(_, v)| v.into_owned())
        else {
            return false;
        };
        let Ok(variables) = serde_json::from_str::<Value>(&raw) else {
            return false;
        };
        variables.get("cursor").and_then(Value::as_str) == self.0
    }
}

/// Creates a test configuration pointing at the mock server
fn create_test_config(server: &MockServer, dir: &Path) -> Config {
    let mut headers = BTreeMap::new();
    headers.insert("authorization".to_string(), "Bearer TOKEN123".to_string());
    headers.insert("x-csrf-token".to_string(), "xyz789".to_string());

    Config {
        request: RequestConfig {
            url: format!("{}{}", server.uri(), TIMELINE_PATH),
            variables: r#"{"userId":"42","count":20}"#.to_string(),
            features: r#"{"rweb_video_timestamps_enabled":true}"#.to_string(),
            headers,
        },
        crawl: CrawlConfig {
            cutoff_year: Some(2025),
            politeness_interval_ms: 0,
            retry_delays_secs: vec![],
            request_timeout_secs: 5,
        },
        output: OutputConfig {
            directory: dir.to_string_lossy().into_owned(),
            file_prefix: "likes".to_string(),
        },
    }
}

fn tweet(id: &str, created_at: &str) -> Value {
    json!({
        "entryId": format!("tweet-{}", id),
        "content": {
            "entryType": "TimelineTimelineItem",
            "itemContent": {
                "itemType": "TimelineTweet",
                "tweet_results": {
                    "result": {
                        "rest_id": id,
                        "core": { "user_results": { "result": {
                            "legacy": { "screen_name": "alice", "name": "Alice", "followed_by": true }
                        } } },
                        "legacy": {
                            "created_at": created_at,
                            "full_text": format!("tweet {}", id),
                            "favorite_count": 3,
                            "is_quote_status": false
                        }
                    }
                }
            }
        }
    })
}

fn cursor_entry(kind: &str, value: &str) -> Value {
    json!({
        "entryId": format!("cursor-{}-{}", kind.to_lowercase(), value),
        "content": {
            "entryType": "TimelineTimelineCursor",
            "cursorType": kind,
            "value": value
        }
    })
}

/// Builds a raw page body; pretty-printed so byte fidelity is observable
fn page(entries: Vec<Value>) -> Vec<u8> {
    serde_json::to_vec_pretty(&json!({
        "data": { "user": { "result": { "timeline_v2": { "timeline": {
            "instructions": [ { "type": "TimelineAddEntries", "entries": entries } ]
        } } } } }
    }))
    .unwrap()
}

fn ok_page(body: &[u8]) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_raw(body.to_vec(), "application/json")
        .insert_header("x-rate-limit-limit", "500")
        .insert_header("x-rate-limit-remaining", "499")
        .insert_header("x-rate-limit-reset", "1700000000")
}

/// Three pages: recent, mixed, and entirely before the cutoff year
fn three_page_timeline() -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    let first = page(vec![
        cursor_entry("Top", "TOP0"),
        tweet("103", "Mon Mar 03 08:00:00 +0000 2025"),
        tweet("102", "Sun Jan 19 09:52:29 +0000 2025"),
        cursor_entry("Bottom", "P2"),
    ]);
    let second = page(vec![
        tweet("101", "Sun Jan 19 09:00:00 +0000 2025"),
        tweet("100", "Tue Dec 31 23:00:00 +0000 2024"),
        cursor_entry("Bottom", "P3"),
    ]);
    let third = page(vec![
        tweet("99", "Sat Jun 01 12:00:00 +0000 2024"),
        tweet("98", "Mon Jan 01 00:00:00 +0000 2024"),
        cursor_entry("Bottom", "P4"),
    ]);
    (first, second, third)
}

async fn mount_page(server: &MockServer, cursor: Option<&'static str>, body: &[u8], times: u64) {
    Mock::given(method("GET"))
        .and(path(TIMELINE_PATH))
        .and(CursorIs(cursor))
        .respond_with(ok_page(body))
        .expect(times)
        .mount(server)
        .await;
}

fn saved_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_full_crawl_stops_at_cutoff_year() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (first, second, third) = three_page_timeline();

    mount_page(&server, None, &first, 1).await;
    mount_page(&server, Some("P2"), &second, 1).await;
    mount_page(&server, Some("P3"), &third, 1).await;
    mount_page(&server, Some("P4"), &page(vec![]), 0).await;

    let config = create_test_config(&server, dir.path());
    let mut coordinator = Coordinator::new(&config, Cursor::Initial).unwrap();
    let summary = coordinator.run().await.expect("Crawl failed");

    assert_eq!(
        summary.stop_reason,
        StopReason::ReachedCutoff { cutoff_year: 2025 }
    );
    assert_eq!(summary.final_cursor, Cursor::At("P3".to_string()));
    assert_eq!(summary.pages_fetched, 3);
    assert_eq!(summary.pages_loaded, 0);

    assert_eq!(
        saved_files(dir.path()),
        vec!["likes-P2.json", "likes-P3.json", "likes-initial.json"]
    );

    // Bodies are stored byte for byte
    assert_eq!(std::fs::read(dir.path().join("likes-initial.json")).unwrap(), first);
    assert_eq!(std::fs::read(dir.path().join("likes-P2.json")).unwrap(), second);
    assert_eq!(std::fs::read(dir.path().join("likes-P3.json")).unwrap(), third);
}

#[tokio::test]
async fn test_template_headers_are_sent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(TIMELINE_PATH))
        .and(header("authorization", "Bearer TOKEN123"))
        .and(header("x-csrf-token", "xyz789"))
        .respond_with(ok_page(&page(vec![tweet(
            "1",
            "Sun Jan 19 09:52:29 +0000 2025",
        )])))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, dir.path());
    let mut coordinator = Coordinator::new(&config, Cursor::Initial).unwrap();
    let summary = coordinator.run().await.expect("Crawl failed");

    assert_eq!(summary.stop_reason, StopReason::TimelineExhausted);
}

#[tokio::test]
async fn test_rerun_is_idempotent_and_fetches_nothing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (first, second, third) = three_page_timeline();

    // Each page may be requested exactly once across both runs
    mount_page(&server, None, &first, 1).await;
    mount_page(&server, Some("P2"), &second, 1).await;
    mount_page(&server, Some("P3"), &third, 1).await;

    let config = create_test_config(&server, dir.path());

    let first_run = Coordinator::new(&config, Cursor::Initial)
        .unwrap()
        .run()
        .await
        .expect("First crawl failed");
    let files_after_first = saved_files(dir.path());
    let requests_after_first = server.received_requests().await.unwrap().len();

    let second_run = Coordinator::new(&config, Cursor::Initial)
        .unwrap()
        .run()
        .await
        .expect("Second crawl failed");

    assert_eq!(saved_files(dir.path()), files_after_first);
    assert_eq!(server.received_requests().await.unwrap().len(), requests_after_first);

    assert_eq!(second_run.pages_fetched, 0);
    assert_eq!(second_run.pages_loaded, 3);
    assert_eq!(second_run.stop_reason, first_run.stop_reason);
    assert_eq!(second_run.final_cursor, first_run.final_cursor);
}

#[tokio::test]
async fn test_stops_without_bottom_cursor() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // Recent tweets, but nothing further back
    let only = page(vec![
        cursor_entry("Top", "TOP0"),
        tweet("2", "Mon Mar 03 08:00:00 +0000 2025"),
        tweet("1", "Sun Jan 19 09:52:29 +0000 2025"),
    ]);
    mount_page(&server, None, &only, 1).await;

    let config = create_test_config(&server, dir.path());
    let summary = Coordinator::new(&config, Cursor::Initial)
        .unwrap()
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(summary.stop_reason, StopReason::TimelineExhausted);
    assert_eq!(summary.pages_fetched, 1);
    assert_eq!(saved_files(dir.path()), vec!["likes-initial.json"]);
}

#[tokio::test]
async fn test_starts_from_given_cursor() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (first, _, third) = three_page_timeline();

    mount_page(&server, None, &first, 0).await;
    mount_page(&server, Some("P3"), &third, 1).await;

    let config = create_test_config(&server, dir.path());
    let summary = Coordinator::new(&config, Cursor::At("P3".to_string()))
        .unwrap()
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(summary.pages_fetched, 1);
    assert_eq!(saved_files(dir.path()), vec!["likes-P3.json"]);
}

#[tokio::test]
async fn test_non_200_aborts_without_writing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // Error statuses are never retried
    Mock::given(method("GET"))
        .and(path(TIMELINE_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string(r#"{"errors":[]}"#))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, dir.path());
    config.crawl.retry_delays_secs = vec![0, 0];
    let mut coordinator = Coordinator::new(&config, Cursor::Initial).unwrap();
    let result = coordinator.run().await;

    match result {
        Err(TimelineError::UnexpectedStatus { cursor, status }) => {
            assert_eq!(status, 403);
            assert_eq!(cursor, "initial");
        }
        other => panic!("Expected UnexpectedStatus, got {:?}", other),
    }
    assert!(saved_files(dir.path()).is_empty());
    assert_eq!(coordinator.state().pages_fetched(), 0);
}

#[tokio::test]
async fn test_error_status_midway_keeps_earlier_pages() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (first, _, _) = three_page_timeline();

    mount_page(&server, None, &first, 1).await;
    Mock::given(method("GET"))
        .and(path(TIMELINE_PATH))
        .and(CursorIs(Some("P2")))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, dir.path());
    let result = Coordinator::new(&config, Cursor::Initial).unwrap().run().await;

    assert!(matches!(
        result,
        Err(TimelineError::UnexpectedStatus { ref cursor, status: 401 }) if cursor == "P2"
    ));
    assert_eq!(saved_files(dir.path()), vec!["likes-initial.json"]);
}

#[tokio::test]
async fn test_malformed_page_is_not_persisted() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(TIMELINE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"data":{"user":{"result":{}}}}"#, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, dir.path());
    let result = Coordinator::new(&config, Cursor::Initial).unwrap().run().await;

    assert!(matches!(result, Err(TimelineError::Page { .. })));
    assert!(saved_files(dir.path()).is_empty());
}

#[tokio::test]
async fn test_interruption_during_wait_loses_nothing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (first, second, third) = three_page_timeline();

    // The first page is fetched once, even though the run is interrupted
    mount_page(&server, None, &first, 1).await;
    mount_page(&server, Some("P2"), &second, 1).await;
    mount_page(&server, Some("P3"), &third, 1).await;

    let mut config = create_test_config(&server, dir.path());
    config.crawl.politeness_interval_ms = 60_000;

    let mut interrupted = Coordinator::new(&config, Cursor::Initial).unwrap();
    let outcome = tokio::time::timeout(Duration::from_secs(3), interrupted.run()).await;
    assert!(outcome.is_err(), "Crawl should still be waiting");
    assert_eq!(saved_files(dir.path()), vec!["likes-initial.json"]);

    config.crawl.politeness_interval_ms = 0;
    let summary = Coordinator::new(&config, Cursor::Initial)
        .unwrap()
        .run()
        .await
        .expect("Resumed crawl failed");

    assert_eq!(summary.pages_loaded, 1);
    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(
        saved_files(dir.path()),
        vec!["likes-P2.json", "likes-P3.json", "likes-initial.json"]
    );
}

#[tokio::test]
async fn test_exhausted_quota_waits_until_reset() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (first, _, third) = three_page_timeline();

    let reset = chrono::Utc::now().timestamp() + 2;
    Mock::given(method("GET"))
        .and(path(TIMELINE_PATH))
        .and(CursorIs(None))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(first.clone(), "application/json")
                .insert_header("x-rate-limit-limit", "500")
                .insert_header("x-rate-limit-remaining", "0")
                .insert_header("x-rate-limit-reset", reset.to_string().as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;
    // The next page is entirely old, ending the crawl
    mount_page(&server, Some("P2"), &third, 1).await;

    let config = create_test_config(&server, dir.path());
    let started = Instant::now();
    let summary = Coordinator::new(&config, Cursor::Initial)
        .unwrap()
        .run()
        .await
        .expect("Crawl failed");

    assert!(
        started.elapsed() >= Duration::from_millis(900),
        "Expected a wait until reset, finished in {:?}",
        started.elapsed()
    );
    assert_eq!(summary.pages_fetched, 2);
}

#[tokio::test]
async fn test_transport_timeout_is_retried() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // First attempt outlives the client timeout, the retry succeeds
    Mock::given(method("GET"))
        .and(path(TIMELINE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(page(vec![]), "application/json")
                .set_delay(Duration::from_secs(3)),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(TIMELINE_PATH))
        .respond_with(ok_page(&page(vec![tweet(
            "1",
            "Sun Jan 19 09:52:29 +0000 2025",
        )])))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, dir.path());
    config.crawl.request_timeout_secs = 1;
    config.crawl.retry_delays_secs = vec![0];

    let summary = Coordinator::new(&config, Cursor::Initial)
        .unwrap()
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(summary.stop_reason, StopReason::TimelineExhausted);
    assert_eq!(summary.pages_fetched, 1);
}

#[tokio::test]
async fn test_transport_failure_is_fatal_after_retries() {
    let dir = TempDir::new().unwrap();

    // Reserve a port, then close it so every connection is refused
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let server = MockServer::start().await;
    let mut config = create_test_config(&server, dir.path());
    config.request.url = format!("http://127.0.0.1:{}{}", port, TIMELINE_PATH);
    config.crawl.retry_delays_secs = vec![0, 0, 0];

    let result = Coordinator::new(&config, Cursor::Initial).unwrap().run().await;

    assert!(matches!(
        result,
        Err(TimelineError::Transport { ref cursor, .. }) if cursor == "initial"
    ));
    assert!(saved_files(dir.path()).is_empty());
}
