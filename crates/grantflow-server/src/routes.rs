use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;
use tracing::instrument;

use grantflow_core::{AccessGrant, AuthError, AuthorizationEngine, DelegatedAction};
use grantflow_proto::methods::{
    ROUTE_APPROVE_AUTHZ, ROUTE_DELEGATED_ACTION, ROUTE_HEALTH, ROUTE_ISSUE_ACCESS_TOKEN,
    ROUTE_REFRESH_ACCESS_TOKEN, ROUTE_REQUEST_AUTHZ,
};
use grantflow_proto::{
    AccessTokenRequest, AccessTokenResponse, ApproveRequest, AuthzRequest, AuthzResponse,
    DelegatedActionRequest, DelegatedActionResponse, RefreshTokenRequest, status,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AuthorizationEngine>,
}

/// Build the HTTP router for the authorization and resource server.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(ROUTE_HEALTH, get(health))
        .route(ROUTE_REQUEST_AUTHZ, post(request_authz))
        .route(ROUTE_APPROVE_AUTHZ, post(approve_authz))
        .route(ROUTE_ISSUE_ACCESS_TOKEN, post(issue_access_token))
        .route(ROUTE_REFRESH_ACCESS_TOKEN, post(refresh_access_token))
        .route(ROUTE_DELEGATED_ACTION, post(delegated_action))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}

/// `POST /v1/authz/request`
#[instrument(skip_all, fields(rpc = "RequestAuthz"))]
pub async fn request_authz(
    State(state): State<AppState>,
    Json(req): Json<AuthzRequest>,
) -> Json<AuthzResponse> {
    let result = state.engine.request_authorization(&req.user_id).await;
    Json(authz_response(req.user_id, result, status::AUTHZ_REQUEST_GRANTED))
}

/// `POST /v1/authz/approve`
#[instrument(skip_all, fields(rpc = "ApproveAuthz"))]
pub async fn approve_authz(
    State(state): State<AppState>,
    Json(req): Json<ApproveRequest>,
) -> Json<AuthzResponse> {
    let result = state.engine.approve(&req.user_id, &req.token).await;
    Json(authz_response(req.user_id, result, status::AUTHZ_VALIDATION_DONE))
}

/// `POST /v1/token`
#[instrument(skip_all, fields(rpc = "IssueAccessToken"))]
pub async fn issue_access_token(
    State(state): State<AppState>,
    Json(req): Json<AccessTokenRequest>,
) -> Json<AccessTokenResponse> {
    let result = state
        .engine
        .issue_access_token(&req.user_id, &req.authz_token, req.auto_refresh)
        .await;
    Json(access_response(result, status::ACCESS_REQUEST_GRANTED))
}

/// `POST /v1/token/refresh`
#[instrument(skip_all, fields(rpc = "RefreshAccessToken"))]
pub async fn refresh_access_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> Json<AccessTokenResponse> {
    let result = state
        .engine
        .refresh_access_token(&req.user_id, &req.refresh_token)
        .await;
    Json(access_response(result, status::ACCESS_REFRESHED))
}

/// `POST /v1/actions`
#[instrument(skip_all, fields(rpc = "DelegatedAction"))]
pub async fn delegated_action(
    State(state): State<AppState>,
    Json(req): Json<DelegatedActionRequest>,
) -> Json<DelegatedActionResponse> {
    let result = state
        .engine
        .authorize_action(&DelegatedAction {
            user_id: &req.user_id,
            access_token: &req.access_token,
            operation: &req.operation,
            resource: &req.resource,
        })
        .await;

    Json(match result {
        Ok(_) => DelegatedActionResponse {
            error_code: status::OK,
            message: status::PERMISSION_GRANTED.to_string(),
        },
        Err(e) => DelegatedActionResponse {
            error_code: e.code(),
            message: e.message().to_string(),
        },
    })
}

fn authz_response(
    user_id: String,
    result: Result<String, AuthError>,
    granted: &str,
) -> AuthzResponse {
    match result {
        Ok(token) => AuthzResponse {
            user_id,
            token,
            error_code: status::OK,
            message: granted.to_string(),
        },
        Err(e) => AuthzResponse {
            user_id,
            token: String::new(),
            error_code: e.code(),
            message: e.message().to_string(),
        },
    }
}

fn access_response(result: Result<AccessGrant, AuthError>, granted: &str) -> AccessTokenResponse {
    match result {
        Ok(grant) => AccessTokenResponse {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token.unwrap_or_default(),
            ttl: grant.ttl,
            error_code: status::OK,
            message: granted.to_string(),
        },
        Err(e) => AccessTokenResponse {
            access_token: String::new(),
            refresh_token: String::new(),
            ttl: 0,
            error_code: e.code(),
            message: e.message().to_string(),
        },
    }
}
