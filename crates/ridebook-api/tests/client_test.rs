#![allow(clippy::unwrap_used, clippy::float_cmp)]
// Integration tests for `ApiClient` and `ResourceApi` using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ridebook_api::resources::{
    Affiliates, AffiliateStatus, Commissions, Payouts, Users, dashboard_stats,
};
use ridebook_api::{
    ApiClient, DateRange, Error, FilterSet, FilterValue, LifecycleAction, MemoryTokenStore,
    ResourceApi, SessionState, TokenStore, TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(token: Option<&str>) -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let tokens = match token {
        Some(t) => MemoryTokenStore::with_token(t),
        None => MemoryTokenStore::new(),
    };
    let client = ApiClient::with_client(reqwest::Client::new(), &server.uri(), tokens.shared())
        .unwrap()
        .with_login_path("/admin/login");
    (server, client)
}

fn affiliate(id: &str, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": format!("Affiliate {id}"),
        "email": format!("{id}@partners.test"),
        "status": status,
        "commissionRate": "10",
        "totalEarnings": "0.00",
        "totalBookings": 0
    })
}

// ── Query normalization ─────────────────────────────────────────────

#[tokio::test]
async fn test_list_omits_empty_filters() {
    let (server, client) = setup(Some("tok")).await;

    Mock::given(method("GET"))
        .and(path("/affiliates"))
        .and(query_param("status", "approved"))
        .and(query_param_is_missing("search"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let filters = FilterSet::new()
        .with("search", "")
        .with("status", "approved")
        .with("page", FilterValue::Unset);

    let page = ResourceApi::<Affiliates>::new(client)
        .list(&filters)
        .await
        .unwrap();
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_list_sends_numbers_and_period() {
    let (server, client) = setup(Some("tok")).await;

    Mock::given(method("GET"))
        .and(path("/commissions"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "25"))
        .and(query_param("dateRange", "month"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [],
            "total": 0,
            "page": 2,
            "limit": 25
        })))
        .expect(1)
        .mount(&server)
        .await;

    let filters = FilterSet::new()
        .with("page", 2_u32)
        .with("limit", 25_u32)
        .with("dateRange", DateRange::Month);

    let page = ResourceApi::<Commissions>::new(client)
        .list(&filters)
        .await
        .unwrap();
    assert_eq!(page.page, 2);
    assert_eq!(page.page_size, 25);
}

// ── Response normalization ──────────────────────────────────────────

#[tokio::test]
async fn test_bare_array_becomes_single_page() {
    let (server, client) = setup(Some("tok")).await;

    Mock::given(method("GET"))
        .and(path("/affiliates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            affiliate("1", "approved"),
            affiliate("2", "pending"),
        ])))
        .mount(&server)
        .await;

    let page = ResourceApi::<Affiliates>::new(client)
        .list(&FilterSet::new())
        .await
        .unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total, 2);
    assert_eq!(page.page, 1);
    assert_eq!(page.page_size, 2);
    assert_eq!(page.items[1].status, AffiliateStatus::Pending);
}

#[tokio::test]
async fn test_envelope_counters_are_coerced() {
    let (server, client) = setup(Some("tok")).await;

    Mock::given(method("GET"))
        .and(path("/payouts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "p1",
                "affiliateId": "a1",
                "amount": "99.90",
                "status": "pending"
            }],
            "total": "41",
            "page": "3",
            "limit": "20"
        })))
        .mount(&server)
        .await;

    let page = ResourceApi::<Payouts>::new(client)
        .list(&FilterSet::new())
        .await
        .unwrap();

    assert_eq!(page.total, 41);
    assert_eq!(page.page, 3);
    assert_eq!(page.page_size, 20);
    assert_eq!(page.total_pages(), 3);
    assert_eq!(page.items[0].amount, 99.9);
}

#[tokio::test]
async fn test_non_numeric_amount_is_deserialization_error() {
    let (server, client) = setup(Some("tok")).await;

    Mock::given(method("GET"))
        .and(path("/payouts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "p1",
            "affiliateId": "a1",
            "amount": "lots",
            "status": "pending"
        }])))
        .mount(&server)
        .await;

    let err = ResourceApi::<Payouts>::new(client)
        .list(&FilterSet::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }), "{err:?}");
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_bearer_token_attached() {
    let (server, client) = setup(Some("secret-token")).await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    ResourceApi::<Users>::new(client)
        .list(&FilterSet::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unauthorized_evicts_token_and_requires_login() {
    let (server, client) = setup(Some("expired")).await;
    let mut session = client.session();
    assert_eq!(*session.borrow(), SessionState::Authenticated);

    Mock::given(method("GET"))
        .and(path("/payouts"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Token expired" })),
        )
        .mount(&server)
        .await;

    let err = ResourceApi::<Payouts>::new(client.clone())
        .list(&FilterSet::new())
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert!(err.to_string().contains("Token expired"));
    assert!(client.tokens().load().is_none());
    assert!(session.has_changed().unwrap());
    assert_eq!(
        *session.borrow_and_update(),
        SessionState::LoginRequired {
            login_path: "/admin/login".into()
        }
    );
}

#[tokio::test]
async fn test_set_token_and_logout() {
    let (_server, client) = setup(None).await;
    assert_eq!(client.session_state(), SessionState::Anonymous);

    client.set_token(SecretString::from("fresh")).unwrap();
    assert_eq!(client.session_state(), SessionState::Authenticated);
    assert!(client.tokens().load().is_some());

    client.logout().unwrap();
    assert_eq!(client.session_state(), SessionState::Anonymous);
    assert!(client.tokens().load().is_none());
}

// ── Error extraction ────────────────────────────────────────────────

#[tokio::test]
async fn test_server_message_is_surfaced() {
    let (server, client) = setup(Some("tok")).await;

    Mock::given(method("DELETE"))
        .and(path("/affiliates/7"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": { "message": "Affiliate has unpaid commissions" },
            "code": "AFFILIATE_IN_USE"
        })))
        .mount(&server)
        .await;

    let err = ResourceApi::<Affiliates>::new(client)
        .delete("7")
        .await
        .unwrap_err();

    match err {
        Error::Api {
            status,
            message,
            code,
        } => {
            assert_eq!(status, 409);
            assert_eq!(message, "Affiliate has unpaid commissions");
            assert_eq!(code.as_deref(), Some("AFFILIATE_IN_USE"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_message_falls_back_to_generic() {
    let (server, client) = setup(Some("tok")).await;

    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = ResourceApi::<Users>::new(client).get("u1").await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(err.is_transient());
    assert!(err.to_string().contains("Request failed with status 500"), "{err}");
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/affiliates"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let transport = TransportConfig::default().with_timeout(Duration::from_millis(200));
    let client = ApiClient::new(&server.uri(), &transport, MemoryTokenStore::new().shared()).unwrap();

    let err = ResourceApi::<Affiliates>::new(client)
        .list(&FilterSet::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Timeout { timeout } if timeout == Duration::from_millis(200)));
    assert!(err.is_transient());
    assert_eq!(err.to_string(), "Request timed out after 200ms");
}

// ── Mutations and lifecycle actions ─────────────────────────────────

#[tokio::test]
async fn test_create_posts_camel_case_body() {
    let (server, client) = setup(Some("tok")).await;

    Mock::given(method("POST"))
        .and(path("/affiliates"))
        .and(body_json(json!({
            "name": "Northwind",
            "email": "hi@northwind.test",
            "commissionRate": 12.5
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": affiliate("n1", "pending")
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = ResourceApi::<Affiliates>::new(client)
        .create(&ridebook_api::resources::affiliates::CreateAffiliateRequest {
            name: "Northwind".into(),
            email: "hi@northwind.test".into(),
            phone: None,
            company_name: None,
            commission_rate: Some(12.5),
        })
        .await
        .unwrap();
    assert_eq!(created.id, "n1");
}

#[tokio::test]
async fn test_lifecycle_action_paths() {
    let (server, client) = setup(Some("tok")).await;

    Mock::given(method("PATCH"))
        .and(path("/affiliates/a1/approve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(affiliate("a1", "approved")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/payouts/p1/process"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/affiliates/bulk-approve"))
        .and(body_json(json!({ "ids": ["a1", "a2"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "updated": 2 })))
        .expect(1)
        .mount(&server)
        .await;

    let affiliates = ResourceApi::<Affiliates>::new(client.clone());
    let updated = affiliates
        .perform("a1", LifecycleAction::Approve, None)
        .await
        .unwrap();
    assert_eq!(updated.unwrap().status, AffiliateStatus::Approved);

    affiliates
        .perform_bulk(&["a1".into(), "a2".into()], LifecycleAction::Approve)
        .await
        .unwrap();

    let processed = ResourceApi::<Payouts>::new(client)
        .perform("p1", LifecycleAction::ProcessPayment, None)
        .await
        .unwrap();
    assert!(processed.is_none());
}

#[tokio::test]
async fn test_action_response_with_unexpected_entity_shape_is_an_error() {
    let (server, client) = setup(Some("tok")).await;

    Mock::given(method("PATCH"))
        .and(path("/affiliates/a1/approve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "a1",
            "status": "approved",
            "commissionRate": "ten percent"
        })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/affiliates/a2/approve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Affiliate approved"
        })))
        .mount(&server)
        .await;

    let affiliates = ResourceApi::<Affiliates>::new(client);
    let err = affiliates
        .perform("a1", LifecycleAction::Approve, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }));

    let acknowledged = affiliates
        .perform("a2", LifecycleAction::Approve, None)
        .await
        .unwrap();
    assert!(acknowledged.is_none());
}

#[tokio::test]
async fn test_undeclared_action_sends_nothing() {
    let (server, client) = setup(Some("tok")).await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = ResourceApi::<Users>::new(client)
        .perform("u1", LifecycleAction::Approve, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::UnsupportedOperation {
            resource: "users",
            ..
        }
    ));
}

// ── Exports and statistics ──────────────────────────────────────────

#[tokio::test]
async fn test_inline_csv_export() {
    let (server, client) = setup(Some("tok")).await;

    Mock::given(method("GET"))
        .and(path("/affiliates/export"))
        .and(query_param("status", "approved"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": "a,b\n1,2",
            "filename": "x.csv",
            "totalRecords": "1"
        })))
        .mount(&server)
        .await;

    let export = ResourceApi::<Affiliates>::new(client)
        .export(&FilterSet::new().with("status", "approved"))
        .await
        .unwrap();

    assert_eq!(&export.bytes[..], b"a,b\n1,2");
    assert_eq!(export.filename.as_deref(), Some("x.csv"));
    assert_eq!(export.total_records, Some(1));
}

#[tokio::test]
async fn test_inline_export_failure_is_error() {
    let (server, client) = setup(Some("tok")).await;

    Mock::given(method("GET"))
        .and(path("/affiliates/export"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "No records match"
        })))
        .mount(&server)
        .await;

    let err = ResourceApi::<Affiliates>::new(client)
        .export(&FilterSet::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Export(ref m) if m == "No records match"), "{err:?}");
}

#[tokio::test]
async fn test_blob_export_reads_disposition() {
    let (server, client) = setup(Some("tok")).await;

    Mock::given(method("GET"))
        .and(path("/commissions/export"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/csv")
                .insert_header(
                    "content-disposition",
                    "attachment; filename=\"commissions-march.csv\"",
                )
                .set_body_bytes(b"id,amount\nc1,10\n".to_vec()),
        )
        .mount(&server)
        .await;

    let export = ResourceApi::<Commissions>::new(client)
        .export(&FilterSet::new())
        .await
        .unwrap();

    assert_eq!(export.filename.as_deref(), Some("commissions-march.csv"));
    assert_eq!(export.content_type.as_deref(), Some("text/csv"));
    assert_eq!(&export.bytes[..], b"id,amount\nc1,10\n");
}

#[tokio::test]
async fn test_stats_pass_through_unmodified() {
    let (server, client) = setup(Some("tok")).await;
    let body = json!({ "pending": 3, "totalEarnings": "1200.50", "nested": { "x": [1, 2] } });

    Mock::given(method("GET"))
        .and(path("/dashboard/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .mount(&server)
        .await;

    let stats = dashboard_stats(client).fetch().await.unwrap();
    assert_eq!(serde_json::Value::Object(stats), body);
}
