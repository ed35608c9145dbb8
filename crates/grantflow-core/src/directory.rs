//! Fixed user and resource lists.
//!
//! Both lists are loaded once at startup and only ever answer membership
//! questions afterwards.

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

/// Membership test over a fixed set of names.
pub trait Directory: Send + Sync {
    fn exists(&self, name: &str) -> bool;
}

/// Set-backed [`Directory`].
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    entries: HashSet<String>,
}

impl StaticDirectory {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Load a user list.
    ///
    /// The first line is a count header; exactly that many ids follow. A file
    /// that ends early yields the ids it has.
    pub fn load_users(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let dir = Self::parse_users(&content).map_err(|reason| Error::DataFile {
            path: path.display().to_string(),
            reason,
        })?;
        debug!(path = %path.display(), users = dir.len(), "Loaded user directory");
        Ok(dir)
    }

    /// Load a resource list, one name per line.
    ///
    /// A leading numeric line is treated as a count header and skipped.
    pub fn load_resources(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let dir = Self::parse_resources(&content);
        debug!(path = %path.display(), resources = dir.len(), "Loaded resource directory");
        Ok(dir)
    }

    fn parse_users(content: &str) -> std::result::Result<Self, String> {
        let mut lines = content.lines().map(str::trim);
        let header = lines.next().unwrap_or_default();
        if header.is_empty() {
            return Ok(Self::default());
        }
        let count: usize = header
            .parse()
            .map_err(|_| format!("expected user count on first line, got {header:?}"))?;
        Ok(Self::new(lines.filter(|l| !l.is_empty()).take(count)))
    }

    fn parse_resources(content: &str) -> Self {
        let mut lines = content.lines().map(str::trim).filter(|l| !l.is_empty()).peekable();
        if lines.peek().is_some_and(|first| first.parse::<usize>().is_ok()) {
            lines.next();
        }
        Self::new(lines)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Directory for StaticDirectory {
    fn exists(&self, name: &str) -> bool {
        self.entries.contains(name)
    }
}
