//! Per-user authorization state.
//!
//! One [`Session`] per user that has passed at least one approval. Records
//! are never removed; tokens are cleared instead.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::error::AuthError;
use crate::permissions::PermissionSet;

/// Authorization state of one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    /// Token the end user approved.
    pub authz_token: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Delegated actions the access token may still authorize.
    pub ttl: u32,
    pub permissions: PermissionSet,
}

impl Session {
    fn approved(user_id: &str, authz_token: &str, permissions: PermissionSet) -> Self {
        Self {
            user_id: user_id.to_string(),
            authz_token: authz_token.to_string(),
            access_token: None,
            refresh_token: None,
            ttl: 0,
            permissions,
        }
    }

    /// Install a freshly issued access token (and optional refresh token).
    pub fn install_tokens(&mut self, access_token: String, refresh_token: Option<String>, ttl: u32) {
        self.access_token = Some(access_token);
        self.refresh_token = refresh_token;
        self.ttl = ttl;
    }

    /// Drop the access token for good. The ttl stays at zero.
    pub fn expire(&mut self) {
        self.access_token = None;
    }

    pub const fn is_active(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Which token a lookup is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Authorization,
    Access,
    Refresh,
}

/// All sessions, keyed by user id.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<String, Session>,
    capacity: Option<usize>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that refuses to create more than `capacity` sessions.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: HashMap::with_capacity(capacity),
            capacity: Some(capacity),
        }
    }

    /// Record an approval for `user_id`.
    ///
    /// Creates the session if needed. An existing session is reset: the new
    /// authorization token and permissions replace the old ones and any
    /// access/refresh tokens are cleared.
    pub fn approve(
        &mut self,
        user_id: &str,
        authz_token: &str,
        permissions: PermissionSet,
    ) -> Result<&Session, AuthError> {
        if let Some(limit) = self.capacity {
            if !self.sessions.contains_key(user_id) && self.sessions.len() >= limit {
                return Err(AuthError::SessionLimitReached { limit });
            }
        }

        let session = Session::approved(user_id, authz_token, permissions);
        let slot = match self.sessions.entry(user_id.to_string()) {
            Entry::Occupied(entry) => {
                let slot = entry.into_mut();
                *slot = session;
                slot
            }
            Entry::Vacant(entry) => entry.insert(session),
        };
        Ok(slot)
    }

    /// Session of `user_id` whose token of `kind` equals `presented`.
    ///
    /// Both fields must match. A cleared token matches nothing, and neither
    /// does an empty presented token.
    pub fn find_mut(
        &mut self,
        user_id: &str,
        kind: TokenKind,
        presented: &str,
    ) -> Option<&mut Session> {
        if presented.is_empty() {
            return None;
        }
        self.sessions.get_mut(user_id).filter(|s| {
            let stored = match kind {
                TokenKind::Authorization => Some(s.authz_token.as_str()),
                TokenKind::Access => s.access_token.as_deref(),
                TokenKind::Refresh => s.refresh_token.as_deref(),
            };
            stored == Some(presented)
        })
    }

    pub fn get(&self, user_id: &str) -> Option<&Session> {
        self.sessions.get(user_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::permissions::Operation;

    const USER: &str = "123456789012345";

    fn approved_store() -> SessionStore {
        let mut store = SessionStore::new();
        store
            .approve(USER, "authz-1", PermissionSet::parse("Files,R"))
            .unwrap();
        store
    }

    #[test]
    fn approve_creates_cleared_session() {
        let store = approved_store();
        let s = store.get(USER).unwrap();
        assert_eq!(s.authz_token, "authz-1");
        assert_eq!(s.access_token, None);
        assert_eq!(s.refresh_token, None);
        assert_eq!(s.ttl, 0);
        assert!(!s.is_active());
    }

    #[test]
    fn reapproval_resets_tokens_and_replaces_permissions() {
        let mut store = approved_store();
        store
            .find_mut(USER, TokenKind::Authorization, "authz-1")
            .unwrap()
            .install_tokens("access-1".into(), Some("refresh-1".into()), 3);

        store
            .approve(USER, "authz-2", PermissionSet::parse("Invoices,D"))
            .unwrap();

        assert_eq!(store.len(), 1);
        let s = store.get(USER).unwrap();
        assert_eq!(s.authz_token, "authz-2");
        assert_eq!(s.access_token, None);
        assert_eq!(s.refresh_token, None);
        assert_eq!(s.ttl, 0);
        assert!(!s.permissions.permits("Files", Operation::Read));
        assert!(s.permissions.permits("Invoices", Operation::Delete));
    }

    #[test]
    fn lookup_requires_user_and_token() {
        let mut store = approved_store();
        assert!(store.find_mut(USER, TokenKind::Authorization, "authz-1").is_some());
        assert!(store.find_mut(USER, TokenKind::Authorization, "authz-x").is_none());
        assert!(store.find_mut("other", TokenKind::Authorization, "authz-1").is_none());
    }

    #[test]
    fn cleared_tokens_never_match() {
        let mut store = approved_store();
        assert!(store.find_mut(USER, TokenKind::Access, "").is_none());
        assert!(store.find_mut(USER, TokenKind::Refresh, "").is_none());
    }

    #[test]
    fn expired_access_token_stops_matching() {
        let mut store = approved_store();
        let s = store.find_mut(USER, TokenKind::Authorization, "authz-1").unwrap();
        s.install_tokens("access-1".into(), None, 0);
        s.expire();
        assert!(store.find_mut(USER, TokenKind::Access, "access-1").is_none());
    }

    #[test]
    fn capacity_bounds_new_sessions_only() {
        let mut store = SessionStore::with_capacity(1);
        store.approve(USER, "a", PermissionSet::default()).unwrap();

        let err = store
            .approve("999999999999999", "b", PermissionSet::default())
            .unwrap_err();
        assert_eq!(err, AuthError::SessionLimitReached { limit: 1 });

        // re-approval of an existing user still fits
        store.approve(USER, "c", PermissionSet::default()).unwrap();
        assert_eq!(store.len(), 1);
    }
}
