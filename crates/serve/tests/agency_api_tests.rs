//! End-to-end tests for the agency endpoints
//!
//! Requests go through the full router, middleware included, over a store
//! wrapper that can be switched into failure.

use agency_core::{
    AgencyRecord, AgencyStore, FilterSet, InMemoryStore, ListingService, ManualClock, PageQuery,
    StoreError,
};
use agency_serve::{create_app, AppState, ServerConfig};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

struct SwitchableStore {
    inner: InMemoryStore,
    failing: AtomicBool,
    calls: AtomicU64,
}

impl SwitchableStore {
    fn check(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::unavailable(
                "projects/demo: connection reset by peer",
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AgencyStore for SwitchableStore {
    async fn count(&self, filters: &FilterSet) -> Result<u64, StoreError> {
        self.check()?;
        self.inner.count(filters).await
    }

    async fn fetch(&self, query: &PageQuery) -> Result<Vec<AgencyRecord>, StoreError> {
        self.check()?;
        self.inner.fetch(query).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<AgencyRecord>, StoreError> {
        self.check()?;
        self.inner.get_by_id(id).await
    }

    fn backend(&self) -> &'static str {
        "switchable"
    }
}

fn setup(count: usize) -> (Router, Arc<SwitchableStore>, Arc<ManualClock>) {
    let records = (1..=count)
        .map(|i| {
            let tags = if i % 2 == 0 { "seo" } else { "boston" };
            AgencyRecord::new(
                format!("agency-{:02}", i),
                format!("Agency {:02}", i),
                vec![tags.to_string()],
            )
        })
        .collect();
    let store = Arc::new(SwitchableStore {
        inner: InMemoryStore::new(records),
        failing: AtomicBool::new(false),
        calls: AtomicU64::new(0),
    });
    let clock = Arc::new(ManualClock::default());
    let service = ListingService::new(store.clone(), clock.clone(), 100);
    let app = create_app(&ServerConfig::default(), AppState::new(Arc::new(service)));
    (app, store, clock)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

fn json_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

#[tokio::test]
async fn test_listing_payload() {
    let (app, _store, _clock) = setup(12);

    let (status, body) = get(&app, "/agencies?page=2").await;
    assert_eq!(status, StatusCode::OK);

    let body = json_body(&body);
    assert_eq!(body["success"], true);
    assert_eq!(body["currentPage"], 2);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["totalAgencies"], 12);
    let names: Vec<_> = body["agencies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Agency 11", "Agency 12"]);
}

#[tokio::test]
async fn test_or_filtering_over_http() {
    let (app, _store, _clock) = setup(6);

    let (_, only_seo) = get(&app, "/agencies?services=seo").await;
    assert_eq!(json_body(&only_seo)["totalAgencies"], 3);

    let (_, either) = get(&app, "/agencies?services=seo&location=Boston").await;
    assert_eq!(json_body(&either)["totalAgencies"], 6);
}

#[tokio::test]
async fn test_repeated_parameters_use_the_first_value() {
    let (app, _store, _clock) = setup(25);

    let (status, body) = get(&app, "/agencies?page=1&page=2").await;
    assert_eq!(status, StatusCode::OK);
    let body = json_body(&body);
    assert_eq!(body["currentPage"], 1);
    assert_eq!(body["agencies"][0]["name"], "Agency 01");

    let (status, body) = get(&app, "/agencies?services=seo&services=boston").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["totalAgencies"], 12);

    let (status, body) = get(&app, "/agencies?page=abc&page=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body), json!({ "error": "Invalid page number" }));
}

#[tokio::test]
async fn test_repeat_request_is_byte_identical_and_served_from_cache() {
    let (app, store, _clock) = setup(25);

    let (_, first) = get(&app, "/agencies?services=seo&page=2").await;
    let calls = store.calls.load(Ordering::SeqCst);

    let (status, second) = get(&app, "/agencies?page=2&services=SEO").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
    assert_eq!(store.calls.load(Ordering::SeqCst), calls);
}

#[tokio::test]
async fn test_store_failure_returns_generic_500_then_recovers() {
    let (app, store, _clock) = setup(25);

    store.failing.store(true, Ordering::SeqCst);
    let (status, body) = get(&app, "/agencies?page=2").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(&body),
        json!({ "error": "Internal server error", "message": "Please try again later" })
    );

    store.failing.store(false, Ordering::SeqCst);
    let (status, body) = get(&app, "/agencies?page=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["totalAgencies"], 25);
}

#[tokio::test]
async fn test_validation_errors_skip_the_store() {
    let (app, store, _clock) = setup(25);

    let (status, body) = get(&app, "/agencies?page=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body), json!({ "error": "Invalid page number" }));

    let (status, body) = get(&app, "/agencies?page=101").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body), json!({ "error": "Page number too high" }));

    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_last_allowed_page_is_empty_not_an_error() {
    let (app, _store, _clock) = setup(25);

    let (status, body) = get(&app, "/agencies?page=100").await;
    assert_eq!(status, StatusCode::OK);
    let body = json_body(&body);
    assert_eq!(body["agencies"], json!([]));
    assert_eq!(body["currentPage"], 100);
    assert_eq!(body["totalPages"], 3);
}

#[tokio::test]
async fn test_expired_cache_hits_store_again() {
    let (app, store, clock) = setup(5);

    get(&app, "/agencies").await;
    let calls = store.calls.load(Ordering::SeqCst);

    clock.advance(chrono::Duration::minutes(6));
    get(&app, "/agencies").await;
    assert!(store.calls.load(Ordering::SeqCst) > calls);
}

#[tokio::test]
async fn test_agency_detail() {
    let (app, store, _clock) = setup(3);

    let (status, body) = get(&app, "/agencies/agency-02").await;
    assert_eq!(status, StatusCode::OK);
    let body = json_body(&body);
    assert_eq!(body["success"], true);
    assert_eq!(body["agency"]["id"], "agency-02");

    let (status, body) = get(&app, "/agencies/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json_body(&body), json!({ "error": "Agency not found" }));

    store.failing.store(true, Ordering::SeqCst);
    let (status, body) = get(&app, "/agencies/agency-02").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(&body)["error"], "Internal server error");
}

#[tokio::test]
async fn test_concurrent_requests() {
    let (app, _store, _clock) = setup(30);

    let requests = (1..=3).map(|page| {
        let app = app.clone();
        async move { get(&app, &format!("/agencies?page={}", page)).await }
    });

    for (i, (status, body)) in futures::future::join_all(requests)
        .await
        .into_iter()
        .enumerate()
    {
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&body);
        assert_eq!(body["currentPage"], i as u64 + 1);
        assert_eq!(body["agencies"].as_array().unwrap().len(), 10);
    }
}

#[tokio::test]
async fn test_health() {
    let (app, _store, _clock) = setup(0);

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let body = json_body(&body);
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
}
