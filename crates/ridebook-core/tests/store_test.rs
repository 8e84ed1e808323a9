#![allow(clippy::unwrap_used)]
// Integration tests for the resource and statistics stores using wiremock.

use std::time::Duration;

use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ridebook_core::api::resources::affiliates::CreateAffiliateRequest;
use ridebook_core::api::resources::{Affiliates, Payouts, Users};
use ridebook_core::api::{ApiClient, FilterSet, FilterValue, LifecycleAction, MemoryTokenStore};
use ridebook_core::{Phase, RecordingSink, ResourceStore, Session};
use tokio_util::sync::CancellationToken;

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Session) {
    let server = MockServer::start().await;
    let client = ApiClient::with_client(
        reqwest::Client::new(),
        &server.uri(),
        MemoryTokenStore::with_token("tok").shared(),
    )
    .unwrap();
    (server, Session::new(client))
}

fn payout(id: &str) -> serde_json::Value {
    json!({ "id": id, "affiliateId": "a1", "amount": "10.00", "status": "pending" })
}

fn affiliate(id: &str) -> serde_json::Value {
    json!({ "id": id, "name": id, "email": format!("{id}@x.test"), "status": "approved" })
}

// ── Fetching ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_mount_fetches_and_normalizes_bare_array() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/payouts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([payout("1"), payout("2")])))
        .expect(1)
        .mount(&server)
        .await;

    let store = session.mount::<Payouts>(FilterSet::new()).await;
    let state = store.snapshot();

    assert_eq!(state.phase(), Phase::Ready);
    let page = state.data.as_ref().unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.page, 1);
    assert!(!state.loading);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_update_filters_merges_and_fetches_once() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/affiliates"))
        .and(query_param("status", "approved"))
        .and(query_param("search", "acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([affiliate("acme")])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/affiliates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let store = session
        .mount::<Affiliates>(FilterSet::new().with("status", "approved"))
        .await;
    let state = store
        .update_filters(&FilterSet::new().with("search", "acme"))
        .await;

    assert_eq!(state.items().len(), 1);
    assert_eq!(
        state.filters.get("status"),
        Some(&FilterValue::Text("approved".into()))
    );
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_empty_update_still_fetches_same_query() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;

    let store = session
        .mount::<Users>(FilterSet::new().with("role", "admin"))
        .await;
    let before = store.filters();
    store.update_filters(&FilterSet::new()).await;

    assert_eq!(store.filters(), before);
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), requests[1].url.query());
}

#[tokio::test]
async fn test_error_keeps_last_good_data() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/payouts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([payout("1")])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/payouts"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({ "message": "Maintenance window" })),
        )
        .mount(&server)
        .await;

    let store = session.mount::<Payouts>(FilterSet::new()).await;
    let state = store.refresh().await;

    assert_eq!(state.phase(), Phase::Failed);
    assert_eq!(state.error.as_deref(), Some("Maintenance window"));
    assert_eq!(state.items().len(), 1);
}

#[tokio::test]
async fn test_stale_response_is_discarded() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/affiliates"))
        .and(query_param("search", "slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([affiliate("slow")]))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/affiliates"))
        .and(query_param("search", "fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([affiliate("fast")])))
        .mount(&server)
        .await;

    let store =
        ResourceStore::new(session.api::<Affiliates>(), FilterSet::new(), CancellationToken::new());

    let slow = store.fetch(Some(FilterSet::new().with("search", "slow")));
    let fast = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        store.fetch(Some(FilterSet::new().with("search", "fast"))).await
    };
    tokio::join!(slow, fast);

    let state = store.snapshot();
    assert_eq!(state.items()[0].id, "fast");
    assert!(!state.loading);
    assert_eq!(
        state.filters.get("search"),
        Some(&FilterValue::Text("fast".into()))
    );
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_refetches_without_item() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/payouts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([payout("41"), payout("42")])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/payouts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([payout("41")])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/payouts/42"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let store = session.mount::<Payouts>(FilterSet::new()).await;
    assert!(store.snapshot().items().iter().any(|p| p.id == "42"));

    let outcome = store.delete("42").await;

    assert!(outcome.success);
    assert!(outcome.error.is_none());
    assert!(store.snapshot().items().iter().all(|p| p.id != "42"));
}

#[tokio::test]
async fn test_create_returns_entity_and_refetches() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/affiliates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/affiliates"))
        .respond_with(ResponseTemplate::new(201).set_body_json(affiliate("new")))
        .mount(&server)
        .await;

    let store = session.mount::<Affiliates>(FilterSet::new()).await;
    let outcome = store
        .create(&CreateAffiliateRequest {
            name: "new".into(),
            email: "new@x.test".into(),
            phone: None,
            company_name: None,
            commission_rate: None,
        })
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.data.unwrap().id, "new");
}

#[tokio::test]
async fn test_failed_mutation_reports_message_and_skips_refetch() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/affiliates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([affiliate("a1")])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/affiliates/a1/approve"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = session.mount::<Affiliates>(FilterSet::new()).await;
    let outcome = store.perform("a1", LifecycleAction::Approve, None).await;

    assert!(!outcome.success);
    let message = outcome.error.unwrap();
    assert!(!message.is_empty());
    assert_eq!(store.snapshot().error.as_deref(), Some(message.as_str()));
    assert_eq!(store.snapshot().items().len(), 1);
}

#[tokio::test]
async fn test_undeclared_action_fails_without_request() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let store = session.mount::<Users>(FilterSet::new()).await;
    let outcome = store
        .perform_bulk(&["u1".into()], LifecycleAction::Approve)
        .await;

    assert!(!outcome.success);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

// ── Export ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_inline_export_delivers_exactly_one_download() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/affiliates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/affiliates/export"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": "a,b\n1,2",
            "filename": "x.csv",
            "totalRecords": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = session.mount::<Affiliates>(FilterSet::new()).await;
    let sink = RecordingSink::new();
    let outcome = store.export_report(None, &sink).await;

    assert!(outcome.success);
    let downloads = sink.downloads();
    assert_eq!(downloads.len(), 1);
    assert_eq!(downloads[0].filename, "x.csv");
    assert_eq!(&downloads[0].bytes[..], b"a,b\n1,2");
    assert_eq!(outcome.data.unwrap().total_records, Some(1));
}

#[tokio::test]
async fn test_blob_export_without_name_is_date_stamped() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/payouts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/payouts/export"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"id\n1\n".to_vec()))
        .mount(&server)
        .await;

    let store = session.mount::<Payouts>(FilterSet::new()).await;
    let dir = tempfile::tempdir().unwrap();
    let sink = ridebook_core::DirectorySink::new(dir.path());
    let outcome = store.export_report(None, &sink).await;

    let receipt = outcome.data.unwrap();
    let today = chrono::Utc::now().date_naive();
    assert_eq!(receipt.filename, ridebook_core::fallback_filename("payouts", today));
    assert_eq!(
        std::fs::read(receipt.location.unwrap()).unwrap(),
        b"id\n1\n".to_vec()
    );
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_unmount_discards_in_flight_response() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/payouts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([payout("1")]))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let store = ResourceStore::new(
        session.api::<Payouts>(),
        FilterSet::new(),
        CancellationToken::new(),
    );
    let mut stream = store.subscribe();

    let background = store.clone();
    let task = tokio::spawn(async move { background.refresh().await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(stream.changed().await.unwrap().loading);

    store.unmount();
    task.await.unwrap();

    assert!(!stream.has_pending());
    assert!(store.snapshot().data.is_none());
    assert!(store.snapshot().loading);

    let outcome = store.delete("1").await;
    assert!(!outcome.success);
}

#[tokio::test]
async fn test_session_shutdown_unmounts_stores() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/dashboard/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "bookings": 5 })))
        .mount(&server)
        .await;

    let stats = session.dashboard().await;
    assert_eq!(stats.snapshot().data.as_ref().unwrap()["bookings"], 5);

    session.shutdown();
    assert!(!stats.is_mounted());
}

#[tokio::test]
async fn test_state_stream_yields_loading_then_ready() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/payouts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([payout("1")])))
        .mount(&server)
        .await;

    let store = ResourceStore::new(
        session.api::<Payouts>(),
        FilterSet::new(),
        CancellationToken::new(),
    );
    let stream = store.subscribe().into_stream();
    store.refresh().await;
    store.unmount();
    drop(store);

    let states: Vec<_> = stream.take(1).collect().await;
    assert!(!states[0].loading);
    assert_eq!(states[0].items().len(), 1);
}
