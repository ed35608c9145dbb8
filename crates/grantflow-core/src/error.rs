//! Error types for grantflow.

use grantflow_proto::status;
use thiserror::Error;

/// Result type alias using grantflow [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Startup and configuration errors.
///
/// These are fatal: they abort the process before any request is served.
/// Per-request failures are [`AuthError`]s instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data file (users, resources, approvals) could not be parsed
    #[error("Invalid data file {path}: {reason}")]
    DataFile { path: String, reason: String },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of a failed authorization operation.
///
/// Every variant is recoverable from the caller's point of view; a failed
/// call never leaves the session store half-updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// User id absent or not of the configured length.
    #[error("INVALID_USER_ID")]
    InvalidUserId,

    #[error("USER_NOT_FOUND")]
    UserNotFound,

    /// The approval queue had no usable record for this call.
    #[error("APPROVAL_NOT_FOUND")]
    ApprovalNotFound,

    /// The simulated end user denied the request.
    #[error("REQUEST_DENIED")]
    RequestDenied,

    /// A new session would exceed the configured capacity.
    #[error("SESSION_LIMIT_REACHED (limit {limit})")]
    SessionLimitReached { limit: usize },

    /// Authorization or refresh token does not belong to the user.
    #[error("PERMISSION_DENIED")]
    PermissionDenied,

    /// Access token missing, or not bound to the user.
    #[error("PERMISSION_DENIED (access token rejected)")]
    AccessDenied,

    #[error("TOKEN_EXPIRED")]
    TokenExpired,

    #[error("RESOURCE_NOT_FOUND")]
    ResourceNotFound,

    #[error("OPERATION_NOT_PERMITTED")]
    OperationNotPermitted,
}

impl AuthError {
    /// Wire message for this error.
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvalidUserId => status::INVALID_USER_ID,
            Self::UserNotFound => status::USER_NOT_FOUND,
            Self::ApprovalNotFound => status::APPROVAL_NOT_FOUND,
            Self::RequestDenied => status::REQUEST_DENIED,
            Self::SessionLimitReached { .. } => status::SESSION_LIMIT_REACHED,
            Self::PermissionDenied | Self::AccessDenied => status::PERMISSION_DENIED,
            Self::TokenExpired => status::TOKEN_EXPIRED,
            Self::ResourceNotFound => status::RESOURCE_NOT_FOUND,
            Self::OperationNotPermitted => status::OPERATION_NOT_PERMITTED,
        }
    }

    /// Wire status code for this error.
    ///
    /// Codes are only unique within one operation.
    pub const fn code(self) -> i32 {
        match self {
            Self::InvalidUserId | Self::OperationNotPermitted => 1,
            Self::UserNotFound | Self::ResourceNotFound => 2,
            Self::AccessDenied => 3,
            Self::ApprovalNotFound | Self::PermissionDenied | Self::TokenExpired => -1,
            Self::RequestDenied => -2,
            Self::SessionLimitReached { .. } => -3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_codes_differ_by_server() {
        assert_eq!(AuthError::PermissionDenied.message(), AuthError::AccessDenied.message());
        assert_eq!(AuthError::PermissionDenied.code(), -1);
        assert_eq!(AuthError::AccessDenied.code(), 3);
    }

    #[test]
    fn request_denied_is_minus_two() {
        assert_eq!(AuthError::RequestDenied.code(), -2);
        assert_eq!(AuthError::RequestDenied.message(), "REQUEST_DENIED");
    }
}
