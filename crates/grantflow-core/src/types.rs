//! Request and result types of the authorization engine.

use std::fmt;

/// The five operations the engine implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rpc {
    RequestAuthorization,
    Approve,
    IssueAccessToken,
    RefreshAccessToken,
    DelegatedAction,
}

impl Rpc {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RequestAuthorization => "request_authorization",
            Self::Approve => "approve",
            Self::IssueAccessToken => "issue_access_token",
            Self::RefreshAccessToken => "refresh_access_token",
            Self::DelegatedAction => "delegated_action",
        }
    }
}

impl fmt::Display for Rpc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tokens handed out by issuance or refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrant {
    pub access_token: String,
    /// Present only when auto-refresh was requested at issuance.
    pub refresh_token: Option<String>,
    pub ttl: u32,
}

/// An operation on a resource, performed on behalf of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegatedAction<'a> {
    pub user_id: &'a str,
    /// Empty when the client holds no access token.
    pub access_token: &'a str,
    /// Operation name (`"READ"`, `"MODIFY"`, ...).
    pub operation: &'a str,
    pub resource: &'a str,
}

/// A permitted delegated action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionGrant {
    /// Actions left on the access token after this one.
    pub ttl_remaining: u32,
}
