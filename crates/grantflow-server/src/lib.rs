//! grantflow server library
//!
//! HTTP front end for the authorization engine: JSON routes plus the
//! startup wiring that turns a [`grantflow_core::Config`] into an engine.

pub mod bootstrap;
pub mod routes;
