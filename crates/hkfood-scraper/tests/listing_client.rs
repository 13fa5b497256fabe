//! Integration tests for `ListingClient::fetch_listings`.
//!
//! Each test stands up a local `wiremock` server in place of the listing
//! API, so no real network traffic is made. Mocks are keyed on the `offset`
//! query parameter and use `.expect(n)` to pin down exactly which pages are
//! requested.

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{header, headers, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hkfood_core::{ApiProfile, Coordinate};
use hkfood_scraper::{CancelToken, FetchPlan, ListingClient, StopReason};

fn profile_for(server: &MockServer) -> ApiProfile {
    ApiProfile {
        endpoint: format!("{}/vendors", server.uri()),
        ..ApiProfile::default()
    }
}

fn test_client(server: &MockServer) -> ListingClient {
    ListingClient::new(&profile_for(server), 5, 0, 0).expect("failed to build test ListingClient")
}

fn central() -> Coordinate {
    Coordinate::new(114.1578, 22.2842, "Central")
}

/// `{"data": {"items": [...]}}` with `count` valid vendors coded
/// `{prefix}0`, `{prefix}1`, ...
fn page_of(prefix: &str, count: usize) -> Value {
    let items: Vec<Value> = (0..count)
        .map(|i| json!({"code": format!("{prefix}{i}"), "name": format!("Vendor {prefix}{i}")}))
        .collect();
    json!({"data": {"items": items}})
}

fn empty_page() -> Value {
    json!({"data": {"items": []}})
}

async fn mount_page(server: &MockServer, offset: &str, body: Value, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/vendors"))
        .and(query_param("offset", offset))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected)
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Termination
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stops_after_empty_page_without_further_requests() {
    let server = MockServer::start().await;
    mount_page(&server, "0", page_of("a", 48), 1).await;
    mount_page(&server, "48", empty_page(), 1).await;
    mount_page(&server, "96", page_of("c", 48), 0).await;

    let client = test_client(&server);
    let harvest = client
        .fetch_listings(&central(), &FetchPlan::new(150), &CancelToken::new())
        .await;

    assert_eq!(harvest.stop, StopReason::Exhausted);
    assert_eq!(harvest.records.len(), 48);
    assert_eq!(harvest.pages_fetched, 2);
    assert!(harvest.records.iter().all(|r| r.area == "Central"));
}

#[tokio::test]
async fn empty_first_page_yields_no_records() {
    let server = MockServer::start().await;
    mount_page(&server, "0", empty_page(), 1).await;

    let client = test_client(&server);
    let harvest = client
        .fetch_listings(&central(), &FetchPlan::new(150), &CancelToken::new())
        .await;

    assert_eq!(harvest.stop, StopReason::Exhausted);
    assert!(harvest.records.is_empty());
}

#[tokio::test]
async fn page_without_usable_vendors_stops_pagination() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "0",
        json!({"data": {"items": [{"name": "no code"}, {"code": "x"}, "junk"]}}),
        1,
    )
    .await;
    mount_page(&server, "48", page_of("b", 48), 0).await;

    let client = test_client(&server);
    let harvest = client
        .fetch_listings(&central(), &FetchPlan::new(150), &CancelToken::new())
        .await;

    assert_eq!(harvest.stop, StopReason::NoUsableRecords);
    assert!(harvest.records.is_empty());
}

// ---------------------------------------------------------------------------
// Limit and sort order
// ---------------------------------------------------------------------------

#[tokio::test]
async fn paginates_to_result_limit_and_switches_sort_at_offset_one_hundred() {
    let server = MockServer::start().await;
    for (offset, prefix) in [("0", "a"), ("48", "b"), ("96", "c")] {
        Mock::given(method("GET"))
            .and(path("/vendors"))
            .and(query_param("offset", offset))
            .and(query_param("sort", "rating_desc"))
            .and(query_param("limit", "48"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_of(prefix, 48)))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/vendors"))
        .and(query_param("offset", "144"))
        .and(query_param("sort", "distance_asc"))
        .and(query_param("limit", "6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of("d", 6)))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let harvest = client
        .fetch_listings(&central(), &FetchPlan::new(150), &CancelToken::new())
        .await;

    assert_eq!(harvest.stop, StopReason::LimitReached);
    assert_eq!(harvest.records.len(), 150);
    assert_eq!(harvest.pages_fetched, 4);
    assert_eq!(harvest.records[0].id, "a0");
    assert_eq!(harvest.records[149].id, "d5");
}

#[tokio::test]
async fn oversized_page_is_truncated_to_limit() {
    let server = MockServer::start().await;
    mount_page(&server, "0", page_of("a", 30), 1).await;

    let client = test_client(&server);
    let harvest = client
        .fetch_listings(&central(), &FetchPlan::new(10), &CancelToken::new())
        .await;

    assert_eq!(harvest.stop, StopReason::LimitReached);
    assert_eq!(harvest.records.len(), 10);
}

#[tokio::test]
async fn sends_coordinate_and_browser_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vendors"))
        .and(query_param("longitude", "114.1578"))
        .and(query_param("latitude", "22.2842"))
        .and(query_param("country", "hk"))
        .and(header("x-disco-client-id", "web"))
        .and(header("referer", "https://www.foodpanda.hk/"))
        .and(header("origin", "https://www.foodpanda.hk"))
        .and(headers("accept-language", vec!["zh-HK", "zh;q=0.9", "en;q=0.8"]))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_page()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let harvest = client
        .fetch_listings(&central(), &FetchPlan::new(150), &CancelToken::new())
        .await;
    assert_eq!(harvest.stop, StopReason::Exhausted);
}

// ---------------------------------------------------------------------------
// Inter-page delay
// ---------------------------------------------------------------------------

#[tokio::test]
async fn inter_page_delay_applies_between_pages_only() {
    let server = MockServer::start().await;
    mount_page(&server, "0", page_of("a", 3), 1).await;
    mount_page(&server, "3", page_of("b", 3), 1).await;

    let delay = Duration::from_millis(400);
    let plan = FetchPlan::new(6)
        .with_page_size(3)
        .with_inter_page_delay(delay);
    let client = test_client(&server);
    let started = std::time::Instant::now();
    let harvest = client
        .fetch_listings(&central(), &plan, &CancelToken::new())
        .await;
    let elapsed = started.elapsed();

    assert_eq!(harvest.stop, StopReason::LimitReached);
    assert_eq!(harvest.pages_fetched, 2);
    assert!(elapsed >= delay, "expected one pause, took {elapsed:?}");
    assert!(elapsed < delay * 2, "paused after the last page, took {elapsed:?}");
}

#[tokio::test]
async fn single_page_plan_never_waits() {
    let server = MockServer::start().await;
    mount_page(&server, "0", page_of("a", 3), 1).await;

    let plan = FetchPlan::new(3)
        .with_page_size(3)
        .with_inter_page_delay(Duration::from_secs(5));
    let client = test_client(&server);
    let started = std::time::Instant::now();
    let harvest = client
        .fetch_listings(&central(), &plan, &CancelToken::new())
        .await;

    assert_eq!(harvest.stop, StopReason::LimitReached);
    assert!(started.elapsed() < Duration::from_secs(2));
}

// ---------------------------------------------------------------------------
// Failures keep partial results
// ---------------------------------------------------------------------------

#[tokio::test]
async fn server_error_on_second_page_keeps_first_page() {
    let server = MockServer::start().await;
    mount_page(&server, "0", page_of("a", 48), 1).await;
    Mock::given(method("GET"))
        .and(path("/vendors"))
        .and(query_param("offset", "48"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "96", page_of("c", 48), 0).await;

    let client = test_client(&server);
    let harvest = client
        .fetch_listings(&central(), &FetchPlan::new(150), &CancelToken::new())
        .await;

    assert_eq!(harvest.stop, StopReason::Failed);
    assert_eq!(harvest.records.len(), 48);
    assert!(harvest.stop.is_failure());
}

#[tokio::test]
async fn response_without_items_is_malformed() {
    let server = MockServer::start().await;
    mount_page(&server, "0", json!({"data": {"total": 0}}), 1).await;

    let client = test_client(&server);
    let harvest = client
        .fetch_listings(&central(), &FetchPlan::new(150), &CancelToken::new())
        .await;

    assert_eq!(harvest.stop, StopReason::Malformed);
    assert!(harvest.records.is_empty());
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vendors"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let harvest = client
        .fetch_listings(&central(), &FetchPlan::new(150), &CancelToken::new())
        .await;

    assert_eq!(harvest.stop, StopReason::Malformed);
}

#[tokio::test]
async fn request_timeout_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vendors"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_of("a", 1))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client =
        ListingClient::new(&profile_for(&server), 1, 0, 0).expect("failed to build test client");
    let harvest = client
        .fetch_listings(&central(), &FetchPlan::new(150), &CancelToken::new())
        .await;

    assert_eq!(harvest.stop, StopReason::Failed);
    assert!(harvest.records.is_empty());
}

// ---------------------------------------------------------------------------
// Rate limiting
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rate_limited_page_is_retried_when_enabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vendors"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "0", page_of("a", 5), 1).await;
    mount_page(&server, "48", empty_page(), 0).await;

    let client = ListingClient::new(&profile_for(&server), 5, 1, 0)
        .expect("failed to build test client");
    let harvest = client
        .fetch_listings(
            &central(),
            &FetchPlan::new(5).with_page_size(5),
            &CancelToken::new(),
        )
        .await;

    assert_eq!(harvest.stop, StopReason::LimitReached);
    assert_eq!(harvest.records.len(), 5);
}

#[tokio::test]
async fn rate_limited_page_without_retries_ends_coordinate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vendors"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let harvest = client
        .fetch_listings(&central(), &FetchPlan::new(150), &CancelToken::new())
        .await;

    assert_eq!(harvest.stop, StopReason::Failed);
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cancelled_token_prevents_any_request() {
    let server = MockServer::start().await;
    mount_page(&server, "0", page_of("a", 48), 0).await;

    let cancel = CancelToken::new();
    cancel.cancel();
    let client = test_client(&server);
    let harvest = client
        .fetch_listings(&central(), &FetchPlan::new(150), &cancel)
        .await;

    assert_eq!(harvest.stop, StopReason::Cancelled);
    assert_eq!(harvest.pages_fetched, 0);
}
