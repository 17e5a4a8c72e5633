//! Retry, backoff, and timeout behavior of a single fetch

use crate::common::{fetcher, html_page, TEST_BACKOFF};
use std::time::{Duration, Instant};
use sumi_sift::pipeline::{AttemptFailure, FetchResult};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_success_on_first_attempt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/article"))
        .and(header(
            "user-agent",
            "TestSifter/1.0.0 (+https://example.com/contact; test@example.com)",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page("Hello")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = fetcher(3, Duration::from_secs(5));
    let result = fetcher
        .fetch(&format!("{}/article", mock_server.uri()))
        .await;

    match result {
        FetchResult::Success {
            body,
            status_code,
            attempts,
            backoff,
        } => {
            assert!(body.contains("<h1>Hello</h1>"));
            assert_eq!(status_code, 200);
            assert_eq!(attempts, 1);
            assert_eq!(backoff, Duration::ZERO);
        }
        other => panic!("Expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_always_failing_url_uses_full_budget() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let fetcher = fetcher(3, Duration::from_secs(5));
    let start = Instant::now();
    let result = fetcher.fetch(&format!("{}/broken", mock_server.uri())).await;
    let elapsed = start.elapsed();

    // 2^0 + 2^1 backoff units
    let expected_backoff = TEST_BACKOFF * 3;

    match result {
        FetchResult::Failed {
            last_failure,
            attempts,
            backoff,
        } => {
            assert_eq!(last_failure, AttemptFailure::Status(500));
            assert_eq!(attempts, 3);
            assert_eq!(backoff, expected_backoff);
        }
        other => panic!("Expected failure, got {:?}", other),
    }
    assert!(elapsed >= expected_backoff);
}

#[tokio::test]
async fn test_single_attempt_has_no_backoff() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = fetcher(1, Duration::from_secs(5));
    let result = fetcher.fetch(&format!("{}/once", mock_server.uri())).await;

    assert!(!result.is_success());
    assert_eq!(result.attempts(), 1);
    assert_eq!(result.backoff(), Duration::ZERO);
}

#[tokio::test]
async fn test_not_found_is_retried_like_any_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&mock_server)
        .await;

    let fetcher = fetcher(3, Duration::from_secs(5));
    let result = fetcher.fetch(&format!("{}/missing", mock_server.uri())).await;

    assert!(matches!(
        result,
        FetchResult::Failed {
            last_failure: AttemptFailure::Status(404),
            attempts: 3,
            ..
        }
    ));
}

#[tokio::test]
async fn test_recovers_after_transient_failures() {
    let mock_server = MockServer::start().await;

    // First two requests fail, then the page is served
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page("Back")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = fetcher(3, Duration::from_secs(5));
    let result = fetcher.fetch(&format!("{}/flaky", mock_server.uri())).await;

    assert!(result.is_success());
    assert_eq!(result.attempts(), 3);
    assert_eq!(result.backoff(), TEST_BACKOFF * 3);
}

#[tokio::test]
async fn test_slow_response_times_out_each_attempt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_page("Slow"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let fetcher = fetcher(2, Duration::from_millis(100));
    let start = Instant::now();
    let result = fetcher.fetch(&format!("{}/slow", mock_server.uri())).await;

    assert!(matches!(
        result,
        FetchResult::Failed {
            last_failure: AttemptFailure::Timeout,
            attempts: 2,
            ..
        }
    ));
    assert!(start.elapsed() < Duration::from_secs(2));
}
