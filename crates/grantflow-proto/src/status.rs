//! Status codes and messages as they appear on the wire.
//!
//! Codes are scoped per operation: the same number means different things
//! for different routes (e.g. `-1` is `TOKEN_EXPIRED` for a delegated action
//! but `PERMISSION_DENIED` for token issuance).

pub const OK: i32 = 0;

pub const AUTHZ_REQUEST_GRANTED: &str = "AUTHZ_REQUEST_GRANTED";
pub const AUTHZ_VALIDATION_DONE: &str = "AUTHZ_VALIDATION_DONE";
pub const ACCESS_REQUEST_GRANTED: &str = "ACCESS_REQUEST_GRANTED";
pub const ACCESS_REFRESHED: &str = "ACCESS_REFRESHED";
pub const PERMISSION_GRANTED: &str = "PERMISSION_GRANTED";

pub const INVALID_USER_ID: &str = "INVALID_USER_ID";
pub const USER_NOT_FOUND: &str = "USER_NOT_FOUND";
pub const APPROVAL_NOT_FOUND: &str = "APPROVAL_NOT_FOUND";
pub const REQUEST_DENIED: &str = "REQUEST_DENIED";
pub const SESSION_LIMIT_REACHED: &str = "SESSION_LIMIT_REACHED";
pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
pub const TOKEN_EXPIRED: &str = "TOKEN_EXPIRED";
pub const RESOURCE_NOT_FOUND: &str = "RESOURCE_NOT_FOUND";
pub const OPERATION_NOT_PERMITTED: &str = "OPERATION_NOT_PERMITTED";
