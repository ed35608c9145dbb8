//! grantflow client library
//!
//! Scripted client for the authorization API:
//! - [`api`]: the five calls, over HTTP
//! - [`scenario`]: scenario file parsing
//! - [`runner`]: per-user token bookkeeping while replaying a scenario

pub mod api;
pub mod error;
pub mod runner;
pub mod scenario;

pub use api::{HttpApi, OAuthApi};
pub use error::ClientError;
pub use runner::Runner;
pub use scenario::{Step, parse_scenario};
