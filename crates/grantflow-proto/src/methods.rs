//! Named constants for the HTTP routes of the authorization API.
//!
//! Shared between the server (router) and the client so that paths stay in
//! sync without duplicating string literals.

// ---------------------------------------------------------------------------
// Authorization server
// ---------------------------------------------------------------------------

/// `POST` an [`AuthzRequest`](crate::AuthzRequest).
pub const ROUTE_REQUEST_AUTHZ: &str = "/v1/authz/request";

/// `POST` an [`ApproveRequest`](crate::ApproveRequest).
pub const ROUTE_APPROVE_AUTHZ: &str = "/v1/authz/approve";

/// `POST` an [`AccessTokenRequest`](crate::AccessTokenRequest).
pub const ROUTE_ISSUE_ACCESS_TOKEN: &str = "/v1/token";

/// `POST` a [`RefreshTokenRequest`](crate::RefreshTokenRequest).
pub const ROUTE_REFRESH_ACCESS_TOKEN: &str = "/v1/token/refresh";

// ---------------------------------------------------------------------------
// Resource server
// ---------------------------------------------------------------------------

/// `POST` a [`DelegatedActionRequest`](crate::DelegatedActionRequest).
pub const ROUTE_DELEGATED_ACTION: &str = "/v1/actions";

/// `GET` liveness probe.
pub const ROUTE_HEALTH: &str = "/health";
