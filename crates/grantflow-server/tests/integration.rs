#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tower::ServiceExt;

use grantflow_core::approvals::StaticApprovals;
use grantflow_core::{
    ApprovalQueue, AuthorizationEngine, DigestTokenGenerator, EngineDeps, EngineSettings,
    StaticDirectory,
};
use grantflow_proto::methods::{
    ROUTE_APPROVE_AUTHZ, ROUTE_DELEGATED_ACTION, ROUTE_HEALTH, ROUTE_ISSUE_ACCESS_TOKEN,
    ROUTE_REFRESH_ACCESS_TOKEN, ROUTE_REQUEST_AUTHZ,
};
use grantflow_proto::{
    AccessTokenRequest, AccessTokenResponse, ApproveRequest, AuthzRequest, AuthzResponse,
    DelegatedActionRequest, DelegatedActionResponse, RefreshTokenRequest, status,
};
use grantflow_server::routes::{AppState, build_router};

const ALICE: &str = "123456789012345";
const BOB: &str = "543210987654321";

fn app(approvals: &[&str], lifetime: u32) -> Router {
    let deps = EngineDeps {
        users: Arc::new(StaticDirectory::new([ALICE, BOB])),
        resources: Arc::new(StaticDirectory::new(["Files", "Invoices"])),
        approvals: ApprovalQueue::new(Arc::new(
            approvals.iter().map(|s| (*s).to_string()).collect::<StaticApprovals>(),
        )),
        tokens: Arc::new(DigestTokenGenerator::new("test-salt")),
    };
    let settings = EngineSettings {
        token_lifetime: lifetime,
        ..EngineSettings::default()
    };
    build_router(AppState {
        engine: Arc::new(AuthorizationEngine::new(deps, settings)),
    })
}

/// POST a JSON body and decode the JSON reply.
async fn post<B: Serialize, R: DeserializeOwned>(app: &Router, uri: &str, body: &B) -> R {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn request_authz(app: &Router, user: &str) -> AuthzResponse {
    post(app, ROUTE_REQUEST_AUTHZ, &AuthzRequest { user_id: user.into() }).await
}

async fn approve(app: &Router, user: &str, token: &str) -> AuthzResponse {
    post(
        app,
        ROUTE_APPROVE_AUTHZ,
        &ApproveRequest {
            user_id: user.into(),
            token: token.into(),
        },
    )
    .await
}

async fn issue(app: &Router, user: &str, authz: &str, auto_refresh: bool) -> AccessTokenResponse {
    post(
        app,
        ROUTE_ISSUE_ACCESS_TOKEN,
        &AccessTokenRequest {
            user_id: user.into(),
            authz_token: authz.into(),
            auto_refresh,
        },
    )
    .await
}

async fn act(app: &Router, user: &str, token: &str, op: &str, res: &str) -> DelegatedActionResponse {
    post(
        app,
        ROUTE_DELEGATED_ACTION,
        &DelegatedActionRequest {
            user_id: user.into(),
            access_token: token.into(),
            operation: op.into(),
            resource: res.into(),
        },
    )
    .await
}

/// Run request, approve and issue; returns the access response.
async fn login(app: &Router, user: &str, auto_refresh: bool) -> AccessTokenResponse {
    let authz = request_authz(app, user).await;
    assert!(authz.is_success(), "{authz:?}");
    let approved = approve(app, user, &authz.token).await;
    assert!(approved.is_success(), "{approved:?}");
    issue(app, user, &approved.token, auto_refresh).await
}

#[tokio::test]
async fn health_returns_ok() {
    let resp = app(&[], 5)
        .oneshot(Request::builder().uri(ROUTE_HEALTH).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn request_authz_grants_token() {
    let app = app(&[], 5);
    let resp = request_authz(&app, ALICE).await;
    assert_eq!(resp.error_code, status::OK);
    assert_eq!(resp.message, status::AUTHZ_REQUEST_GRANTED);
    assert_eq!(resp.user_id, ALICE);
    assert_eq!(resp.token.len(), 15);
}

#[tokio::test]
async fn request_authz_rejects_bad_users() {
    let app = app(&[], 5);

    let short = request_authz(&app, "123").await;
    assert_eq!(short.error_code, 1);
    assert_eq!(short.message, status::INVALID_USER_ID);
    assert!(short.token.is_empty());

    let unknown = request_authz(&app, "999999999999999").await;
    assert_eq!(unknown.error_code, 2);
    assert_eq!(unknown.message, status::USER_NOT_FOUND);
}

#[tokio::test]
async fn full_flow_permits_then_expires() {
    let app = app(&["Files,RM"], 2);

    let access = login(&app, ALICE, false).await;
    assert_eq!(access.message, status::ACCESS_REQUEST_GRANTED);
    assert_eq!(access.ttl, 2);
    assert!(access.refresh_token.is_empty());

    let token = access.access_token.as_str();
    let read = act(&app, ALICE, token, "READ", "Files").await;
    assert_eq!(read.error_code, status::OK);
    assert_eq!(read.message, status::PERMISSION_GRANTED);

    let delete = act(&app, ALICE, token, "DELETE", "Files").await;
    assert_eq!(delete.error_code, 1);
    assert_eq!(delete.message, status::OPERATION_NOT_PERMITTED);

    let expired = act(&app, ALICE, token, "READ", "Files").await;
    assert_eq!(expired.error_code, -1);
    assert_eq!(expired.message, status::TOKEN_EXPIRED);

    let after = act(&app, ALICE, token, "READ", "Files").await;
    assert_eq!(after.error_code, 3);
    assert_eq!(after.message, status::PERMISSION_DENIED);
}

#[tokio::test]
async fn unknown_resource_is_reported() {
    let app = app(&["Files,R"], 5);
    let access = login(&app, ALICE, false).await;

    let resp = act(&app, ALICE, &access.access_token, "READ", "Photos").await;
    assert_eq!(resp.error_code, 2);
    assert_eq!(resp.message, status::RESOURCE_NOT_FOUND);
}

#[tokio::test]
async fn denied_approval_blocks_issuance() {
    let app = app(&["*,-"], 5);

    let authz = request_authz(&app, ALICE).await;
    let denied = approve(&app, ALICE, &authz.token).await;
    assert_eq!(denied.error_code, -2);
    assert_eq!(denied.message, status::REQUEST_DENIED);
    assert!(denied.token.is_empty());

    let access = issue(&app, ALICE, &authz.token, false).await;
    assert_eq!(access.error_code, -1);
    assert_eq!(access.message, status::PERMISSION_DENIED);
    assert!(access.access_token.is_empty());
}

#[tokio::test]
async fn exhausted_approvals_report_not_found() {
    let app = app(&[], 5);
    let authz = request_authz(&app, ALICE).await;
    let resp = approve(&app, ALICE, &authz.token).await;
    assert_eq!(resp.error_code, -1);
    assert_eq!(resp.message, status::APPROVAL_NOT_FOUND);
}

#[tokio::test]
async fn refresh_rotates_tokens() {
    let app = app(&["Files,R"], 1);
    let access = login(&app, ALICE, true).await;
    assert!(!access.refresh_token.is_empty());

    let refreshed: AccessTokenResponse = post(
        &app,
        ROUTE_REFRESH_ACCESS_TOKEN,
        &RefreshTokenRequest {
            user_id: ALICE.into(),
            refresh_token: access.refresh_token.clone(),
        },
    )
    .await;
    assert_eq!(refreshed.message, status::ACCESS_REFRESHED);
    assert_eq!(refreshed.ttl, 1);
    assert_ne!(refreshed.access_token, access.access_token);
    assert_ne!(refreshed.refresh_token, access.refresh_token);

    // the old pair is gone
    let stale = act(&app, ALICE, &access.access_token, "READ", "Files").await;
    assert_eq!(stale.message, status::PERMISSION_DENIED);
    let reused: AccessTokenResponse = post(
        &app,
        ROUTE_REFRESH_ACCESS_TOKEN,
        &RefreshTokenRequest {
            user_id: ALICE.into(),
            refresh_token: access.refresh_token,
        },
    )
    .await;
    assert_eq!(reused.error_code, -1);

    let fresh = act(&app, ALICE, &refreshed.access_token, "READ", "Files").await;
    assert!(fresh.is_success());
}

#[tokio::test]
async fn tokens_are_bound_to_their_user() {
    let app = app(&["Files,R", "Files,R"], 5);
    let alice = login(&app, ALICE, false).await;
    let bob = login(&app, BOB, false).await;
    assert!(bob.is_success());

    let resp = act(&app, BOB, &alice.access_token, "READ", "Files").await;
    assert_eq!(resp.message, status::PERMISSION_DENIED);
}

#[tokio::test]
async fn missing_token_is_denied() {
    let app = app(&[], 5);
    let resp: DelegatedActionResponse = post(
        &app,
        ROUTE_DELEGATED_ACTION,
        &serde_json::json!({ "user_id": ALICE, "operation": "READ", "resource": "Files" }),
    )
    .await;
    assert_eq!(resp.error_code, 3);
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let req = Request::builder()
        .method("POST")
        .uri(ROUTE_REQUEST_AUTHZ)
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app(&[], 5).oneshot(req).await.unwrap();
    assert!(resp.status().is_client_error());
}
