//! Integration tests for the tracker
//!
//! These tests use wiremock to serve downloadable URLs and drive the full
//! submit -> fetch -> completion -> store cycle end-to-end.

use std::sync::Arc;
use std::time::Duration;
use urlstats::config::{Config, EngineConfig, RecheckConfig};
use urlstats::engine::{build_http_client, FetchEngine};
use urlstats::store::{MemoryStore, OrderKey, StatsStore, UrlRecord};
use urlstats::tracker::{spawn_completion_listener, RecheckScheduler};
use urlstats::{Submission, Tracker, UrlError, UrlStatsError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with short timeouts and no re-check ticks
/// during a test run
fn create_test_config(workers: u32) -> Config {
    Config {
        engine: EngineConfig {
            max_parallel_downloads: workers,
            queue_size: 200,
            request_timeout_ms: 2_000,
            connect_timeout_ms: 500,
        },
        recheck: RecheckConfig {
            interval_secs: 3_600,
            top_n: 10,
        },
        ..Config::default()
    }
}

/// Polls the store until `url` satisfies `predicate` or two seconds pass
async fn wait_for_record<F>(store: &dyn StatsStore, url: &str, predicate: F) -> UrlRecord
where
    F: Fn(&UrlRecord) -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if let Some(record) = store.get(url) {
            if predicate(&record) {
                return record;
            }
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {}",
            url
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

async fn mount_body(server: &MockServer, route: &str, status: u16, bytes: usize) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_bytes(vec![b'x'; bytes]))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_new_url_is_registered_after_successful_download() {
    let server = MockServer::start().await;
    mount_body(&server, "/page", 200, 1000).await;
    let url = format!("{}/page", server.uri());

    let runtime = Tracker::start(&create_test_config(3)).unwrap();
    let tracker = runtime.tracker();

    let submission = tracker.submit(&url).await.unwrap();
    assert_eq!(submission, Submission::Queued);

    let record = wait_for_record(tracker.store().as_ref(), &url, |_| true).await;
    assert_eq!(record.hit_count, 1);
    assert_eq!(record.download_success_count, 1);
    assert_eq!(record.download_failure_count, 0);
    assert_eq!(record.last_bytes, 1000);

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_resubmission_counts_hit_without_download() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .expect(1)
        .mount(&server)
        .await;
    let url = format!("{}/page", server.uri());

    let runtime = Tracker::start(&create_test_config(3)).unwrap();
    let tracker = runtime.tracker();

    tracker.submit(&url).await.unwrap();
    wait_for_record(tracker.store().as_ref(), &url, |_| true).await;

    let submission = tracker.submit(&url).await.unwrap();
    assert_eq!(submission, Submission::Counted { hit_count: 2 });

    let record = tracker.store().get(&url).unwrap();
    assert_eq!(record.hit_count, 2);
    assert_eq!(record.download_success_count, 1);

    runtime.shutdown().await;
    // Dropping the server verifies the single expected download
}

#[tokio::test]
async fn test_double_submit_counts_both_hits_when_second_download_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/once"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![b'x'; 100])
                .set_delay(Duration::from_millis(100)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_body(&server, "/once", 500, 0).await;
    let url = format!("{}/once", server.uri());

    let runtime = Tracker::start(&create_test_config(1)).unwrap();
    let tracker = runtime.tracker();

    // Both submissions land before the first download completes
    assert_eq!(tracker.submit(&url).await.unwrap(), Submission::Queued);
    assert_eq!(tracker.submit(&url).await.unwrap(), Submission::Queued);

    let record = wait_for_record(tracker.store().as_ref(), &url, |r| {
        r.download_failure_count == 1
    })
    .await;
    assert_eq!(record.hit_count, 2);
    assert_eq!(record.download_success_count, 1);

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_failed_new_url_is_not_registered() {
    let server = MockServer::start().await;
    mount_body(&server, "/missing", 404, 10).await;
    let url = format!("{}/missing", server.uri());

    let runtime = Tracker::start(&create_test_config(1)).unwrap();
    let tracker = runtime.tracker();

    tracker.submit(&url).await.unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tracker.engine().stats().completed() < 1 {
        assert!(tokio::time::Instant::now() < deadline, "fetch never completed");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let store = Arc::clone(tracker.store());
    runtime.shutdown().await;

    assert!(!store.exists(&url));
    assert!(store.is_empty());
    assert_eq!(tracker.engine().stats().failed, 1);
}

#[tokio::test]
async fn test_failed_recheck_counts_failure_and_keeps_hits() {
    let server = MockServer::start().await;
    // Only the first download succeeds
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 64]))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_body(&server, "/flaky", 500, 0).await;
    let url = format!("{}/flaky", server.uri());

    let config = create_test_config(2);
    let store: Arc<dyn StatsStore> = Arc::new(MemoryStore::new());
    let client = build_http_client(&config.engine, &config.user_agent).unwrap();
    let (engine, completions) = FetchEngine::start(&config.engine, client);
    let listener = spawn_completion_listener(Arc::clone(&store), completions);

    engine.handle().submit_new(&url).await.unwrap();
    wait_for_record(store.as_ref(), &url, |r| r.download_success_count == 1).await;
    store.increment_hit(&url).unwrap();

    let scheduler =
        RecheckScheduler::new(Arc::clone(&store), engine.handle(), Duration::from_secs(60), 10);
    assert_eq!(scheduler.run_tick().await.unwrap(), 1);

    let record = wait_for_record(store.as_ref(), &url, |r| r.download_failure_count == 1).await;
    assert_eq!(record.hit_count, 2);
    assert_eq!(record.download_success_count, 1);
    assert_eq!(record.last_bytes, 0);
    assert_eq!(record.last_download_time, Duration::ZERO);

    engine.shutdown().await;
    assert_eq!(listener.await.unwrap(), 2);
}

#[tokio::test]
async fn test_successful_recheck_updates_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/growing"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 10]))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_body(&server, "/growing", 200, 250).await;
    let url = format!("{}/growing", server.uri());

    let config = create_test_config(1);
    let store: Arc<dyn StatsStore> = Arc::new(MemoryStore::new());
    let client = build_http_client(&config.engine, &config.user_agent).unwrap();
    let (engine, completions) = FetchEngine::start(&config.engine, client);
    let listener = spawn_completion_listener(Arc::clone(&store), completions);

    engine.handle().submit_new(&url).await.unwrap();
    wait_for_record(store.as_ref(), &url, |r| r.last_bytes == 10).await;

    RecheckScheduler::new(Arc::clone(&store), engine.handle(), Duration::from_secs(60), 10)
        .run_tick()
        .await
        .unwrap();

    let record = wait_for_record(store.as_ref(), &url, |r| r.download_success_count == 2).await;
    assert_eq!(record.last_bytes, 250);
    assert_eq!(record.hit_count, 1);

    engine.shutdown().await;
    listener.await.unwrap();
}

#[tokio::test]
async fn test_concurrency_never_exceeds_worker_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("ok")
                .set_delay(Duration::from_millis(20)),
        )
        .mount(&server)
        .await;

    let runtime = Tracker::start(&create_test_config(3)).unwrap();
    let tracker = runtime.tracker();

    for i in 0..100 {
        tracker
            .submit(&format!("{}/page/{}", server.uri(), i))
            .await
            .unwrap();
    }

    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    while tracker.store().len() < 100 {
        assert!(tokio::time::Instant::now() < deadline, "downloads did not finish");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let stats = tracker.engine().stats();
    assert_eq!(stats.submitted, 100);
    assert_eq!(stats.succeeded, 100);
    assert!(stats.peak_in_flight <= 3);
    assert!(stats.peak_in_flight >= 2);

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_list_orders_registered_urls() {
    let server = MockServer::start().await;
    mount_body(&server, "/small", 200, 10).await;
    mount_body(&server, "/large", 200, 500).await;
    let small = format!("{}/small", server.uri());
    let large = format!("{}/large", server.uri());

    let runtime = Tracker::start(&create_test_config(2)).unwrap();
    let tracker = runtime.tracker();

    tracker.submit(&small).await.unwrap();
    tracker.submit(&large).await.unwrap();
    wait_for_record(tracker.store().as_ref(), &small, |_| true).await;
    wait_for_record(tracker.store().as_ref(), &large, |_| true).await;
    tracker.submit(&small).await.unwrap();

    let by_hits = tracker.list(&[OrderKey::HitCountDesc], 10);
    assert_eq!(by_hits[0].url, small);
    assert_eq!(by_hits[0].hit_count, 2);

    let by_bytes = tracker.list(&[OrderKey::LastBytesDesc], 10);
    assert_eq!(by_bytes[0].url, large);

    assert_eq!(tracker.list(&[], 1).len(), 1);

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_invalid_url_is_rejected() {
    let runtime = Tracker::start(&create_test_config(1)).unwrap();
    let tracker = runtime.tracker();

    let result = tracker.submit("ftp://files.example/archive").await;
    assert!(matches!(
        result,
        Err(UrlStatsError::Url(UrlError::InvalidScheme(_)))
    ));

    let result = tracker.submit("not a url").await;
    assert!(matches!(result, Err(UrlStatsError::Url(UrlError::Parse(_)))));

    assert_eq!(tracker.engine().stats().submitted, 0);
    runtime.shutdown().await;
}
