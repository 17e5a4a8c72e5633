//! Batch coordination: fan-out, failure isolation, statistics, and pacing

use crate::common::{coordinator, html_page, policy, user_agent};
use std::time::{Duration, Instant};
use sumi_sift::config::Config;
use sumi_sift::extract::{ExtractError, Extractor};
use sumi_sift::pipeline::{build_http_client, harvest, Coordinator};
use sumi_sift::RunStatus;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts a page that always succeeds
async fn mount_page(server: &MockServer, route: &str, title: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page(title)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_one_failing_url_does_not_poison_batch() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/b", "Page B").await;
    mount_page(&mock_server, "/c", "Page C").await;

    let urls = vec![
        format!("{}/a", base),
        format!("{}/b", base),
        format!("{}/c", base),
    ];

    let outcome = coordinator(50.0, 3).run(&urls).await;

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.statistics.total_items, 3);
    assert_eq!(outcome.statistics.successful_items, 2);
    assert_eq!(outcome.statistics.failed_items, 1);
    assert_eq!(outcome.statistics.status, RunStatus::Completed);

    let mut titles: Vec<_> = outcome.records.iter().map(|a| a.title.clone()).collect();
    titles.sort();
    assert_eq!(titles, vec!["Page B", "Page C"]);
    assert_eq!(
        outcome.records[0].author.as_deref(),
        Some("Test Author")
    );
}

#[tokio::test]
async fn test_empty_batch_makes_no_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let outcome = coordinator(2.0, 3).run(&[]).await;

    assert!(outcome.records.is_empty());
    assert_eq!(outcome.statistics.total_items, 0);
    assert_eq!(outcome.statistics.items_per_second, 0.0);
    assert_eq!(outcome.statistics.status, RunStatus::Completed);
}

#[tokio::test]
async fn test_all_urls_failing_still_completes() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(4)
        .mount(&mock_server)
        .await;

    let urls: Vec<String> = (0..2).map(|i| format!("{}/gone/{}", base, i)).collect();
    let outcome = coordinator(100.0, 2).run(&urls).await;

    assert!(outcome.records.is_empty());
    assert_eq!(outcome.statistics.successful_items, 0);
    assert_eq!(outcome.statistics.failed_items, 2);
    assert_eq!(outcome.statistics.items_per_second, 0.0);
    assert_eq!(outcome.statistics.status, RunStatus::Completed);
}

#[tokio::test]
async fn test_extraction_failure_counts_as_failed_item() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    // Fetched successfully but empty; extraction is not retried
    Mock::given(method("GET"))
        .and(path("/blank"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/full", "Full").await;

    let urls = vec![format!("{}/blank", base), format!("{}/full", base)];
    let outcome = coordinator(50.0, 3).run(&urls).await;

    assert_eq!(outcome.statistics.successful_items, 1);
    assert_eq!(outcome.statistics.failed_items, 1);
    assert_eq!(
        outcome.statistics.successful_items + outcome.statistics.failed_items,
        outcome.statistics.total_items
    );
}

/// Extractor returning the body length, to check the extractor is pluggable
struct LengthExtractor;

impl Extractor for LengthExtractor {
    type Record = (String, usize);

    fn extract(&self, html: &str, source_url: &str) -> Result<Self::Record, ExtractError> {
        if html.contains("reject") {
            return Err(ExtractError::Parse {
                url: source_url.to_string(),
                message: "rejected".to_string(),
            });
        }
        Ok((source_url.to_string(), html.len()))
    }
}

#[tokio::test]
async fn test_custom_extractor() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/short"))
        .respond_with(ResponseTemplate::new(200).set_body_string("12345"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bad"))
        .respond_with(ResponseTemplate::new(200).set_body_string("reject me"))
        .mount(&mock_server)
        .await;

    let client = build_http_client(&user_agent(), false).unwrap();
    let coordinator =
        Coordinator::new(client, policy(1, Duration::from_secs(5)), 50.0, LengthExtractor).unwrap();

    let urls = vec![format!("{}/short", base), format!("{}/bad", base)];
    let outcome = coordinator.run(&urls).await;

    assert_eq!(outcome.records, vec![(format!("{}/short", base), 5)]);
    assert_eq!(outcome.statistics.failed_items, 1);
}

/// Panics on any page containing "boom"
struct PanickingExtractor;

impl Extractor for PanickingExtractor {
    type Record = String;

    fn extract(&self, html: &str, source_url: &str) -> Result<Self::Record, ExtractError> {
        if html.contains("boom") {
            panic!("extractor blew up on {}", source_url);
        }
        Ok(source_url.to_string())
    }
}

#[tokio::test]
async fn test_panicking_extractor_counts_as_one_failed_item() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/fine"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fine"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/boom"))
        .respond_with(ResponseTemplate::new(200).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let client = build_http_client(&user_agent(), false).unwrap();
    let coordinator = Coordinator::new(
        client,
        policy(1, Duration::from_secs(5)),
        50.0,
        PanickingExtractor,
    )
    .unwrap();

    let urls = vec![format!("{}/fine", base), format!("{}/boom", base)];
    let outcome = coordinator.run(&urls).await;

    assert_eq!(outcome.records, vec![format!("{}/fine", base)]);
    assert_eq!(outcome.statistics.total_items, 2);
    assert_eq!(outcome.statistics.successful_items, 1);
    assert_eq!(outcome.statistics.failed_items, 1);
    assert_eq!(outcome.statistics.status, RunStatus::Completed);
}

#[tokio::test]
async fn test_rate_limit_applies_across_the_whole_batch() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_page("Paced"))
                .set_delay(Duration::from_millis(500)),
        )
        .expect(20)
        .mount(&mock_server)
        .await;

    let urls: Vec<String> = (0..20).map(|i| format!("{}/page/{}", base, i)).collect();

    let start = Instant::now();
    let outcome = coordinator(5.0, 1).run(&urls).await;
    let elapsed = start.elapsed();

    assert_eq!(outcome.statistics.successful_items, 20);
    // 19 gaps of 1/5 s between the 20 grants
    assert!(
        elapsed >= Duration::from_millis(3800),
        "batch finished too fast: {:?}",
        elapsed
    );
    // Sequential fetching would need at least 20 * 500ms
    assert!(
        elapsed < Duration::from_secs(10),
        "batch was not concurrent: {:?}",
        elapsed
    );
    assert!(outcome.statistics.total_time >= 3.8);
    assert!(outcome.statistics.items_per_second > 0.0);
}

#[tokio::test]
async fn test_dropping_the_batch_cancels_pipelines() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let urls: Vec<String> = (0..5).map(|i| format!("{}/hang/{}", base, i)).collect();
    let coordinator = coordinator(100.0, 3);

    let start = Instant::now();
    let result = tokio::time::timeout(Duration::from_millis(300), coordinator.run(&urls)).await;

    assert!(result.is_err());
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_harvest_with_config() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_page(&mock_server, "/one", "One").await;

    let mut config = Config::default();
    config.scraper.requests_per_second = 20.0;
    config.scraper.max_retries = 1;

    let outcome = harvest(&config, &[format!("{}/one", base)])
        .await
        .expect("valid configuration");

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].title, "One");
    assert_eq!(outcome.records[0].url, format!("{}/one", base));
}

#[tokio::test]
async fn test_harvest_rejects_invalid_rate_before_fetching() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = Config::default();
    config.scraper.requests_per_second = 0.0;

    let result = harvest(&config, &[format!("{}/x", mock_server.uri())]).await;
    assert!(result.is_err());
}
