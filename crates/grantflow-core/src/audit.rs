//! Audit trail.
//!
//! The engine emits exactly one [`AuditEvent`] per operation call. Sinks
//! decide what to do with it; a failing sink never fails the operation.

use std::fs::File;
use std::io::{LineWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::error::AuthError;
use crate::types::{AccessGrant, Rpc};

/// What happened during one operation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub rpc: Rpc,
    pub user_id: String,
    pub outcome: AuditOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditOutcome {
    /// Authorization token handed out or approved.
    Token(String),
    /// Access token issued or refreshed.
    Issued(AccessGrant),
    /// Delegated action decided.
    Action(ActionRecord),
    /// Token operation failed.
    Failed(AuthError),
}

/// Decision on one delegated action, with the token state after the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    pub operation: String,
    pub resource: String,
    /// Access token still bound to the session; empty once cleared.
    pub access_token: String,
    pub ttl: u32,
    pub result: Result<(), AuthError>,
}

/// Receiver of audit events.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent);
}

/// Emits audit events as structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAudit;

impl AuditSink for TracingAudit {
    fn record(&self, event: &AuditEvent) {
        let rpc = event.rpc.as_str();
        let user_id = event.user_id.as_str();
        match &event.outcome {
            AuditOutcome::Token(token) => info!(rpc, user_id, token = %token, "Authorization token"),
            AuditOutcome::Issued(grant) => info!(
                rpc,
                user_id,
                access_token = %grant.access_token,
                refresh_token = grant.refresh_token.as_deref().unwrap_or_default(),
                ttl = grant.ttl,
                "Access token issued"
            ),
            AuditOutcome::Action(action) => match action.result {
                Ok(()) => info!(
                    rpc,
                    user_id,
                    operation = %action.operation,
                    resource = %action.resource,
                    ttl = action.ttl,
                    "PERMIT"
                ),
                Err(e) => warn!(
                    rpc,
                    user_id,
                    operation = %action.operation,
                    resource = %action.resource,
                    ttl = action.ttl,
                    reason = e.message(),
                    "DENY"
                ),
            },
            AuditOutcome::Failed(e) => warn!(rpc, user_id, reason = e.message(), "Request failed"),
        }
    }
}

/// Appends audit lines to a file in the classic server log layout:
///
/// ```text
/// BEGIN 123456789012345 AUTHZ
///   RequestToken = kT3nQ0e4FjLmPzA
///   AccessToken = 8bWv2cXyHq1Rr0s
/// PERMIT (READ,Files,8bWv2cXyHq1Rr0s,1)
/// ```
pub struct FileAudit {
    out: Mutex<LineWriter<File>>,
}

const INDENT: &str = "  ";

impl FileAudit {
    /// Create (or truncate) the audit file.
    pub fn create(path: &Path) -> std::io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            out: Mutex::new(LineWriter::new(file)),
        })
    }

    fn render(event: &AuditEvent) -> Vec<String> {
        let user = &event.user_id;
        match (event.rpc, &event.outcome) {
            (Rpc::RequestAuthorization, AuditOutcome::Token(token)) => vec![
                format!("BEGIN {user} AUTHZ"),
                format!("{INDENT}RequestToken = {token}"),
            ],
            (Rpc::RequestAuthorization, _) => vec![format!("BEGIN {user} AUTHZ")],
            (Rpc::IssueAccessToken, AuditOutcome::Issued(grant)) => Self::token_lines(grant),
            (Rpc::RefreshAccessToken, outcome) => {
                let mut lines = vec![format!("BEGIN {user} AUTHZ REFRESH")];
                if let AuditOutcome::Issued(grant) = outcome {
                    lines.extend(Self::token_lines(grant));
                }
                lines
            }
            (_, AuditOutcome::Action(action)) => {
                let verdict = if action.result.is_ok() { "PERMIT" } else { "DENY" };
                vec![format!(
                    "{verdict} ({},{},{},{})",
                    action.operation, action.resource, action.access_token, action.ttl
                )]
            }
            _ => Vec::new(),
        }
    }

    fn token_lines(grant: &AccessGrant) -> Vec<String> {
        let mut lines = vec![format!("{INDENT}AccessToken = {}", grant.access_token)];
        if let Some(refresh) = &grant.refresh_token {
            lines.push(format!("{INDENT}RefreshToken = {refresh}"));
        }
        lines
    }
}

impl AuditSink for FileAudit {
    fn record(&self, event: &AuditEvent) {
        let lines = Self::render(event);
        if lines.is_empty() {
            return;
        }
        let Ok(mut out) = self.out.lock() else {
            warn!("Audit file lock poisoned, dropping event");
            return;
        };
        for line in lines {
            if let Err(e) = writeln!(out, "{line}") {
                warn!(error = %e, "Failed to write audit line");
                return;
            }
        }
    }
}

/// Forwards every event to each inner sink.
#[derive(Default, Clone)]
pub struct FanoutAudit {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl FanoutAudit {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl AuditSink for FanoutAudit {
    fn record(&self, event: &AuditEvent) {
        for sink in &self.sinks {
            sink.record(event);
        }
    }
}
