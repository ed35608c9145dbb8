//! Simulated end-user approvals.
//!
//! The end user answers approval prompts in submission order: the Nth
//! approval call on the server consumes the Nth recorded decision, whichever
//! user the call is for. Records are loaded lazily on the first call.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error};

/// Raw record that denies the request.
pub const DENY_RECORD: &str = "*,-";

/// One recorded end-user decision.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ApprovalRecord {
    Deny,
    /// Raw `resource,ops,...` grant string.
    Grant(String),
}

impl ApprovalRecord {
    fn from_raw(raw: &str) -> Self {
        if raw == DENY_RECORD {
            Self::Deny
        } else {
            Self::Grant(raw.to_string())
        }
    }
}

/// Why no record could be delivered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApprovalError {
    #[error("approval queue exhausted")]
    Exhausted,

    /// The record at this position is empty. The position is still consumed.
    #[error("approval record {position} is empty")]
    Blank { position: usize },

    /// The backing source could not be loaded.
    #[error("approval source unavailable: {0}")]
    Unavailable(String),
}

/// Backing sequence for an [`ApprovalQueue`].
pub trait ApprovalSource: Send + Sync {
    fn load(&self) -> std::io::Result<Vec<String>>;
}

/// Approvals read from a file, one record per line.
#[derive(Debug, Clone)]
pub struct FileApprovalSource {
    path: PathBuf,
}

impl FileApprovalSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ApprovalSource for FileApprovalSource {
    fn load(&self) -> std::io::Result<Vec<String>> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(content.lines().map(|l| l.trim().to_string()).collect())
    }
}

/// In-memory approvals.
#[derive(Debug, Clone, Default)]
pub struct StaticApprovals(pub Vec<String>);

impl<S: Into<String>> FromIterator<S> for StaticApprovals {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl ApprovalSource for StaticApprovals {
    fn load(&self) -> std::io::Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
struct QueueState {
    records: Option<Vec<String>>,
    cursor: usize,
}

/// FIFO of recorded decisions shared by every session.
pub struct ApprovalQueue {
    source: Arc<dyn ApprovalSource>,
    state: Mutex<QueueState>,
}

impl ApprovalQueue {
    pub fn new(source: Arc<dyn ApprovalSource>) -> Self {
        Self {
            source,
            state: Mutex::new(QueueState::default()),
        }
    }

    /// Consume the next decision.
    ///
    /// Loading, reading and advancing happen under one lock, so concurrent
    /// callers never receive the same record.
    #[allow(clippy::significant_drop_tightening)]
    pub async fn next(&self) -> Result<ApprovalRecord, ApprovalError> {
        let mut state = self.state.lock().await;

        if state.records.is_none() {
            let records = self.source.load().map_err(|e| {
                error!(error = %e, "Failed to load approvals");
                ApprovalError::Unavailable(e.to_string())
            })?;
            debug!(records = records.len(), "Loaded approval records");
            state.records = Some(records);
        }

        let position = state.cursor;
        let raw = state
            .records
            .as_ref()
            .and_then(|records| records.get(position))
            .cloned()
            .ok_or(ApprovalError::Exhausted)?;
        state.cursor += 1;

        if raw.is_empty() {
            return Err(ApprovalError::Blank { position });
        }
        Ok(ApprovalRecord::from_raw(&raw))
    }

    /// Number of records consumed so far.
    pub async fn position(&self) -> usize {
        self.state.lock().await.cursor
    }
}
