//! grantflow wire protocol
//!
//! JSON request/response bodies shared by the grantflow server and client.
//!
//! This crate contains:
//! - request/response types for the five authorization operations
//! - route path constants (see [`methods`])
//! - wire status codes and messages (see [`status`])

pub mod methods;
pub mod status;

use serde::{Deserialize, Serialize};

/// Ask the authorization server for an authorization token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthzRequest {
    pub user_id: String,
}

/// Hand an authorization token to the (simulated) end user for approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveRequest {
    pub user_id: String,
    pub token: String,
}

/// Response to both authorization request and approval.
///
/// `token` is empty whenever `error_code` is non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthzResponse {
    pub user_id: String,
    pub token: String,
    pub error_code: i32,
    pub message: String,
}

/// Exchange an approved authorization token for an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenRequest {
    pub user_id: String,
    pub authz_token: String,
    #[serde(default)]
    pub auto_refresh: bool,
}

/// Exchange a refresh token for a new access/refresh pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub user_id: String,
    pub refresh_token: String,
}

/// Response to access token issuance and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    /// Empty unless auto-refresh was requested.
    pub refresh_token: String,
    /// Number of delegated actions the access token may still authorize.
    pub ttl: u32,
    pub error_code: i32,
    pub message: String,
}

/// An operation a client wants to perform on a resource on behalf of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegatedActionRequest {
    pub user_id: String,
    #[serde(default)]
    pub access_token: String,
    pub operation: String,
    pub resource: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegatedActionResponse {
    pub error_code: i32,
    pub message: String,
}

impl AuthzResponse {
    pub fn is_success(&self) -> bool {
        self.error_code == status::OK
    }
}

impl AccessTokenResponse {
    pub fn is_success(&self) -> bool {
        self.error_code == status::OK
    }

    /// The refresh token, if one was issued.
    pub fn refresh_token(&self) -> Option<&str> {
        (!self.refresh_token.is_empty()).then_some(self.refresh_token.as_str())
    }
}

impl DelegatedActionResponse {
    pub fn is_success(&self) -> bool {
        self.error_code == status::OK
    }
}
