//! API integration tests.
//!
//! These tests drive the router end to end against mock databases, one per
//! table, so each test states exactly which lookups a request performs.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use peptalk_api::{middleware::AppState, router as api_router};
use peptalk_common::{AppError, AppResult, BillingConfig};
use peptalk_core::{AccountService, BillingService, SubscriberResponse, SubscriberSource};
use peptalk_db::{
    entities::{
        account_deletion_request::{self, DeletionRequestStatus},
        billing_entitlement, billing_webhook_event, identity, profile,
    },
    repositories::{
        BillingEntitlementRepository, BillingWebhookEventRepository, DeletionRequestRepository,
        IdentityRepository, ProfileRepository,
    },
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use serde_json::{Value, json};
use tower::ServiceExt;

struct NoSubscribers;

#[async_trait]
impl SubscriberSource for NoSubscribers {
    async fn fetch_subscriber(&self, _app_user_id: &str) -> AppResult<SubscriberResponse> {
        Err(AppError::ExternalService("not reachable in tests".to_string()))
    }
}

fn empty_db() -> Arc<DatabaseConnection> {
    Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
}

/// One mock connection per table.
struct Dbs {
    identity: Arc<DatabaseConnection>,
    profile: Arc<DatabaseConnection>,
    entitlement: Arc<DatabaseConnection>,
    event: Arc<DatabaseConnection>,
    deletion: Arc<DatabaseConnection>,
}

impl Default for Dbs {
    fn default() -> Self {
        Self {
            identity: empty_db(),
            profile: empty_db(),
            entitlement: empty_db(),
            event: empty_db(),
            deletion: empty_db(),
        }
    }
}

fn identity_db(rows: Vec<identity::Model>) -> Arc<DatabaseConnection> {
    Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([rows])
            .into_connection(),
    )
}

fn test_identity(id: &str) -> identity::Model {
    identity::Model {
        id: id.to_string(),
        email: Some("reader@example.com".to_string()),
        access_token: Some("tok".to_string()),
        created_at: Utc::now().into(),
    }
}

fn test_profile(user_id: &str, is_admin: bool, is_pro: bool) -> profile::Model {
    profile::Model {
        user_id: user_id.to_string(),
        display_name: Some("Reader".to_string()),
        initials: Some("RE".to_string()),
        avatar_url: None,
        is_admin,
        is_pro,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn test_request(id: &str) -> account_deletion_request::Model {
    account_deletion_request::Model {
        id: id.to_string(),
        user_id: "u1".to_string(),
        status: DeletionRequestStatus::Requested,
        reason: None,
        created_at: Utc::now().into(),
        resolved_at: None,
    }
}

/// Profile and entitlement lookups for a viewer with the given flags.
fn viewer_dbs(is_admin: bool, is_pro: bool) -> Dbs {
    Dbs {
        identity: identity_db(vec![test_identity("u1")]),
        profile: Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_profile("u1", is_admin, is_pro)]])
                .into_connection(),
        ),
        entitlement: Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<billing_entitlement::Model>::new()])
                .into_connection(),
        ),
        ..Dbs::default()
    }
}

fn create_test_state(dbs: Dbs) -> AppState {
    let identity_repo = IdentityRepository::new(dbs.identity);
    let profile_repo = ProfileRepository::new(dbs.profile);
    let entitlement_repo = BillingEntitlementRepository::new(dbs.entitlement);
    let event_repo = BillingWebhookEventRepository::new(dbs.event);
    let deletion_repo = DeletionRequestRepository::new(dbs.deletion);

    let account_service = AccountService::new(
        identity_repo.clone(),
        profile_repo.clone(),
        entitlement_repo.clone(),
        event_repo.clone(),
        deletion_repo,
        false,
    );
    let billing_service = BillingService::new(
        identity_repo,
        profile_repo,
        entitlement_repo,
        event_repo,
        Arc::new(NoSubscribers),
        BillingConfig {
            webhook_auth: Some("whsec".to_string()),
            ..BillingConfig::default()
        },
    );

    AppState {
        account_service,
        billing_service,
    }
}

fn create_test_app(dbs: Dbs) -> Router {
    let state = create_test_state(dbs);
    Router::new()
        .nest("/api", api_router(state.clone()))
        .with_state(state)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, authorization: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(authorization) = authorization {
        builder = builder.header(header::AUTHORIZATION, authorization);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// === Account ===

#[tokio::test]
async fn test_account_anonymous() {
    let app = create_test_app(Dbs::default());

    let response = app.oneshot(get("/api/account", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["isAuthed"], false);
    assert!(body["user"].is_null());
    assert_eq!(body["plan"]["isPro"], false);
}

#[tokio::test]
async fn test_account_signed_in() {
    let mut dbs = viewer_dbs(false, true);
    dbs.event = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![billing_webhook_event::Model {
                event_id: "evt_1".to_string(),
                event_type: "RENEWAL".to_string(),
                rc_app_user_id: "u1".to_string(),
                payload: json!({}),
                created_at: Utc::now().into(),
            }]])
            .into_connection(),
    );
    let app = create_test_app(dbs);

    let response = app.oneshot(get("/api/account", Some("tok"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["isAuthed"], true);
    assert_eq!(body["user"]["id"], "u1");
    assert_eq!(body["profile"]["display_name"], "Reader");
    assert_eq!(body["plan"]["isPro"], true);
    assert!(body["entitlement"].is_null());
    assert_eq!(body["events"][0]["id"], "evt_1");
}

#[tokio::test]
async fn test_unknown_token_is_anonymous() {
    let app = create_test_app(Dbs {
        identity: identity_db(Vec::new()),
        ..Dbs::default()
    });

    let response = app.oneshot(get("/api/account", Some("stale"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["isAuthed"], false);
}

#[tokio::test]
async fn test_session_lookup_failure_is_server_error() {
    // No query results queued: the identity lookup fails.
    let app = create_test_app(Dbs::default());

    let response = app.oneshot(get("/api/account", Some("tok"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"]["code"], "DATABASE_ERROR");
}

#[tokio::test]
async fn test_delete_request_requires_session() {
    let app = create_test_app(Dbs::default());

    let response = app
        .oneshot(post_json("/api/account/delete-request", None, &json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_delete_request_rejects_long_reason() {
    let app = create_test_app(Dbs {
        identity: identity_db(vec![test_identity("u1")]),
        ..Dbs::default()
    });

    let response = app
        .oneshot(post_json(
            "/api/account/delete-request",
            Some("Bearer tok"),
            &json!({ "reason": "x".repeat(1001) }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_delete_request_creates_request() {
    let app = create_test_app(Dbs {
        identity: identity_db(vec![test_identity("u1")]),
        deletion: Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<account_deletion_request::Model>::new()])
                .append_query_results([[test_request("req1")]])
                .into_connection(),
        ),
        ..Dbs::default()
    });

    let response = app
        .oneshot(post_json(
            "/api/account/delete-request",
            Some("Bearer tok"),
            &json!({ "reason": "  moving on  " }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "ok": true }));
}

// === Viewer ===

#[tokio::test]
async fn test_viewer_anonymous() {
    let app = create_test_app(Dbs::default());

    let response = app.oneshot(get("/api/viewer", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "ok": true, "isAuthed": false, "isPro": false, "isAdmin": false })
    );
}

#[tokio::test]
async fn test_viewer_signed_in_admin() {
    let app = create_test_app(viewer_dbs(true, false));

    let response = app.oneshot(get("/api/viewer", Some("tok"))).await.unwrap();

    assert_eq!(
        json_body(response).await,
        json!({ "ok": true, "isAuthed": true, "isPro": false, "isAdmin": true })
    );
}

// === Admin ===

#[tokio::test]
async fn test_admin_requires_session() {
    let app = create_test_app(Dbs::default());

    let response = app.oneshot(get("/api/admin/billing", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_rejects_non_admin() {
    let app = create_test_app(viewer_dbs(false, true));

    let response = app
        .oneshot(get("/api/admin/billing", Some("tok")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_lists_open_deletion_requests() {
    let mut dbs = viewer_dbs(true, false);
    dbs.deletion = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![test_request("req1"), test_request("req2")]])
            .into_connection(),
    );
    let app = create_test_app(dbs);

    let response = app
        .oneshot(get("/api/admin/deletion-requests", Some("tok")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["requests"][0]["id"], "req1");
    assert_eq!(body["requests"][0]["status"], "requested");
    assert_eq!(body["requests"][1]["userId"], "u1");
}

#[tokio::test]
async fn test_admin_complete_unknown_request_is_not_found() {
    let mut dbs = viewer_dbs(true, false);
    dbs.deletion = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<account_deletion_request::Model>::new()])
            .into_connection(),
    );
    let app = create_test_app(dbs);

    let request = Request::builder()
        .method("POST")
        .uri("/api/admin/deletion-requests/missing/complete")
        .header(header::AUTHORIZATION, "Bearer tok")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_complete_closed_request_is_conflict() {
    let mut closed = test_request("req1");
    closed.status = DeletionRequestStatus::Completed;

    let mut dbs = viewer_dbs(true, false);
    dbs.deletion = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[closed]])
            .into_connection(),
    );
    let app = create_test_app(dbs);

    let request = Request::builder()
        .method("POST")
        .uri("/api/admin/deletion-requests/req1/complete")
        .header(header::AUTHORIZATION, "Bearer tok")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(response).await["error"]["code"], "CONFLICT");
}

// === Billing webhook ===

#[tokio::test]
async fn test_webhook_probe() {
    let app = create_test_app(Dbs::default());

    let response = app
        .oneshot(get("/api/billing/revenuecat/webhook", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "ok": true, "route": "revenuecat_webhook" })
    );
}

#[tokio::test]
async fn test_webhook_rejects_wrong_secret() {
    let app = create_test_app(Dbs::default());

    let response = app
        .oneshot(post_json(
            "/api/billing/revenuecat/webhook",
            Some("Bearer nope"),
            &json!({ "event": { "id": "evt_1", "app_user_id": "u1" } }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        json_body(response).await,
        json!({ "ok": false, "error": "unauthorized" })
    );
}

#[tokio::test]
async fn test_webhook_bypasses_session_lookup() {
    // The identity mock has nothing queued; a session lookup would fail.
    let app = create_test_app(Dbs::default());

    let response = app
        .oneshot(post_json(
            "/api/billing/revenuecat/webhook",
            Some("Bearer whsec"),
            &json!({ "event": { "app_user_id": "u1" } }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "ok": false, "error": "missing_event_id" })
    );
}

#[tokio::test]
async fn test_webhook_rejects_invalid_json() {
    let app = create_test_app(Dbs::default());

    let request = Request::builder()
        .method("POST")
        .uri("/api/billing/revenuecat/webhook")
        .header(header::AUTHORIZATION, "whsec")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "ok": false, "error": "bad_json" })
    );
}

// === Auth callback ===

#[tokio::test]
async fn test_auth_callback_redirects_to_safe_path() {
    let app = create_test_app(Dbs::default());

    let response = app
        .oneshot(get("/api/auth/callback?next=%2Faccount", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/account");
}

#[tokio::test]
async fn test_auth_callback_refuses_login_loop() {
    let app = create_test_app(Dbs::default());

    let response = app
        .oneshot(get("/api/auth/callback?next=%2Flogin%3Ffoo", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = create_test_app(Dbs::default());

    let response = app.oneshot(get("/api/nonexistent", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
