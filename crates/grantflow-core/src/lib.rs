//! grantflow core library
//!
//! The session/token lifecycle engine of a simulated OAuth-style flow:
//! - Approval queue replaying recorded end-user decisions
//! - Permission sets parsed from approval records
//! - Session store binding tokens to users
//! - Authorization engine implementing the five operations
//! - Directories, token derivation, audit sinks, configuration

pub mod approvals;
pub mod audit;
pub mod config;
pub mod directory;
pub mod engine;
pub mod error;
pub mod permissions;
pub mod session;
pub mod token;
pub mod tracing_init;
pub mod types;

pub use approvals::{ApprovalQueue, ApprovalRecord, ApprovalSource, FileApprovalSource};
pub use config::Config;
pub use directory::{Directory, StaticDirectory};
pub use engine::{AuthorizationEngine, EngineDeps, EngineSettings};
pub use error::{AuthError, Error, Result};
pub use permissions::{Operation, OperationSet, PermissionSet};
pub use token::{DigestTokenGenerator, TokenGenerator};
pub use types::{AccessGrant, ActionGrant, DelegatedAction, Rpc};
