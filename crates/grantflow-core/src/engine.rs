//! Authorization engine.
//!
//! Implements the five operations of the flow as transitions over the
//! [`SessionStore`], consulting the approval queue, the directories and the
//! token generator:
//!
//! ```text
//! NoSession --approve--> Approved --issue--> Active(ttl=N) --action--> Active(N-1) ...
//!                                                          --action at 0--> Expired
//! Active | Expired --refresh--> Active(ttl=N)
//! Approved --approve--> Approved (all downstream state reset)
//! ```

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::approvals::{ApprovalError, ApprovalQueue, ApprovalRecord};
use crate::audit::{ActionRecord, AuditEvent, AuditOutcome, AuditSink, TracingAudit};
use crate::config::DEFAULT_USER_ID_LENGTH;
use crate::directory::Directory;
use crate::error::AuthError;
use crate::permissions::{Operation, PermissionSet};
use crate::session::{SessionStore, TokenKind};
use crate::token::TokenGenerator;
use crate::types::{AccessGrant, ActionGrant, DelegatedAction, Rpc};

/// Tunables of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Delegated actions a freshly issued access token authorizes.
    pub token_lifetime: u32,
    /// Exact length of a valid user id.
    pub user_id_length: usize,
    /// Upper bound on stored sessions.
    pub max_sessions: Option<usize>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            token_lifetime: 5,
            user_id_length: DEFAULT_USER_ID_LENGTH,
            max_sessions: None,
        }
    }
}

/// Collaborators the engine consults.
pub struct EngineDeps {
    pub users: Arc<dyn Directory>,
    pub resources: Arc<dyn Directory>,
    pub approvals: ApprovalQueue,
    pub tokens: Arc<dyn TokenGenerator>,
}

/// Authorization server and resource server in one.
pub struct AuthorizationEngine {
    users: Arc<dyn Directory>,
    resources: Arc<dyn Directory>,
    approvals: ApprovalQueue,
    tokens: Arc<dyn TokenGenerator>,
    audit: Arc<dyn AuditSink>,
    sessions: RwLock<SessionStore>,
    settings: EngineSettings,
}

impl AuthorizationEngine {
    /// Create an engine that audits through `tracing`.
    pub fn new(deps: EngineDeps, settings: EngineSettings) -> Self {
        let store = settings
            .max_sessions
            .map_or_else(SessionStore::new, SessionStore::with_capacity);
        Self {
            users: deps.users,
            resources: deps.resources,
            approvals: deps.approvals,
            tokens: deps.tokens,
            audit: Arc::new(TracingAudit),
            sessions: RwLock::new(store),
            settings,
        }
    }

    /// Replace the audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Ask for an authorization token for `user_id`.
    ///
    /// Never touches the session store: the session is created at approval.
    pub async fn request_authorization(&self, user_id: &str) -> Result<String, AuthError> {
        let result = self.check_user(user_id).map(|()| self.tokens.derive(user_id));

        debug!(user_id, ok = result.is_ok(), "Authorization requested");
        self.emit_token_event(Rpc::RequestAuthorization, user_id, &result);
        result
    }

    /// Let the simulated end user decide on `authz_token`.
    ///
    /// Consumes the next approval record regardless of which user asks. A
    /// grant (re)creates the user's session with the record's permissions
    /// and no access state.
    pub async fn approve(&self, user_id: &str, authz_token: &str) -> Result<String, AuthError> {
        let result = self.approve_inner(user_id, authz_token).await;
        self.emit_token_event(Rpc::Approve, user_id, &result);
        result
    }

    async fn approve_inner(&self, user_id: &str, authz_token: &str) -> Result<String, AuthError> {
        let record = self.approvals.next().await.map_err(|e| {
            if !matches!(e, ApprovalError::Unavailable(_)) {
                debug!(user_id, reason = %e, "No approval available");
            }
            AuthError::ApprovalNotFound
        })?;

        let grant = match record {
            ApprovalRecord::Deny => {
                info!(user_id, "End user denied authorization");
                return Err(AuthError::RequestDenied);
            }
            ApprovalRecord::Grant(raw) => raw,
        };

        let permissions = PermissionSet::parse(&grant);
        let resources = permissions.len();
        self.sessions
            .write()
            .await
            .approve(user_id, authz_token, permissions)?;

        info!(user_id, resources, "End user approved authorization");
        Ok(authz_token.to_string())
    }

    /// Exchange an approved authorization token for an access token.
    pub async fn issue_access_token(
        &self,
        user_id: &str,
        authz_token: &str,
        auto_refresh: bool,
    ) -> Result<AccessGrant, AuthError> {
        let result = {
            let mut store = self.sessions.write().await;
            store
                .find_mut(user_id, TokenKind::Authorization, authz_token)
                .map(|session| {
                    let access_token = self.tokens.derive(authz_token);
                    let refresh_token = auto_refresh.then(|| self.tokens.derive(&access_token));
                    let ttl = self.settings.token_lifetime;
                    session.install_tokens(access_token.clone(), refresh_token.clone(), ttl);
                    AccessGrant {
                        access_token,
                        refresh_token,
                        ttl,
                    }
                })
                .ok_or(AuthError::PermissionDenied)
        };

        self.emit_grant_event(Rpc::IssueAccessToken, user_id, &result);
        result
    }

    /// Exchange a refresh token for a new access/refresh pair.
    ///
    /// The presented refresh token is overwritten and cannot be used again.
    pub async fn refresh_access_token(
        &self,
        user_id: &str,
        refresh_token: &str,
    ) -> Result<AccessGrant, AuthError> {
        let result = {
            let mut store = self.sessions.write().await;
            store
                .find_mut(user_id, TokenKind::Refresh, refresh_token)
                .map(|session| {
                    let access_token = self.tokens.derive(refresh_token);
                    let next_refresh = self.tokens.derive(&access_token);
                    let ttl = self.settings.token_lifetime;
                    session.install_tokens(access_token.clone(), Some(next_refresh.clone()), ttl);
                    AccessGrant {
                        access_token,
                        refresh_token: Some(next_refresh),
                        ttl,
                    }
                })
                .ok_or(AuthError::PermissionDenied)
        };

        self.emit_grant_event(Rpc::RefreshAccessToken, user_id, &result);
        result
    }

    /// Decide whether a delegated action may proceed.
    ///
    /// Every call that finds a live session costs one unit of ttl, whether
    /// the action is then permitted or not. A call that finds the ttl at zero
    /// clears the access token instead.
    pub async fn authorize_action(
        &self,
        action: &DelegatedAction<'_>,
    ) -> Result<ActionGrant, AuthError> {
        let (result, access_token, ttl) = self.authorize_inner(action).await;

        self.audit.record(&AuditEvent {
            rpc: Rpc::DelegatedAction,
            user_id: action.user_id.to_string(),
            outcome: AuditOutcome::Action(ActionRecord {
                operation: action.operation.to_string(),
                resource: action.resource.to_string(),
                access_token,
                ttl,
                result: result.map(|_| ()),
            }),
        });
        result
    }

    /// Returns the decision plus the access token and ttl left on the session.
    async fn authorize_inner(
        &self,
        action: &DelegatedAction<'_>,
    ) -> (Result<ActionGrant, AuthError>, String, u32) {
        if action.access_token.is_empty() {
            return (Err(AuthError::AccessDenied), String::new(), 0);
        }

        let mut store = self.sessions.write().await;
        let Some(session) = store.find_mut(action.user_id, TokenKind::Access, action.access_token)
        else {
            return (Err(AuthError::AccessDenied), String::new(), 0);
        };

        if session.ttl == 0 {
            session.expire();
            info!(user_id = action.user_id, "Access token expired");
            return (Err(AuthError::TokenExpired), String::new(), 0);
        }
        session.ttl -= 1;
        let ttl = session.ttl;
        let token = action.access_token.to_string();

        let operation = Operation::from_name(action.operation);
        let result = if !self.resources.exists(action.resource) {
            Err(AuthError::ResourceNotFound)
        } else if session.permissions.permits(action.resource, operation) {
            Ok(ActionGrant { ttl_remaining: ttl })
        } else {
            Err(AuthError::OperationNotPermitted)
        };
        drop(store);

        (result, token, ttl)
    }

    /// Snapshot of a user's session, if one exists.
    pub async fn session(&self, user_id: &str) -> Option<crate::session::Session> {
        self.sessions.read().await.get(user_id).cloned()
    }

    /// Number of stored sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn check_user(&self, user_id: &str) -> Result<(), AuthError> {
        if user_id.len() != self.settings.user_id_length {
            return Err(AuthError::InvalidUserId);
        }
        if !self.users.exists(user_id) {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }

    fn emit_token_event(&self, rpc: Rpc, user_id: &str, result: &Result<String, AuthError>) {
        let outcome = match result {
            Ok(token) => AuditOutcome::Token(token.clone()),
            Err(e) => AuditOutcome::Failed(*e),
        };
        self.audit.record(&AuditEvent {
            rpc,
            user_id: user_id.to_string(),
            outcome,
        });
    }

    fn emit_grant_event(&self, rpc: Rpc, user_id: &str, result: &Result<AccessGrant, AuthError>) {
        let outcome = match result {
            Ok(grant) => AuditOutcome::Issued(grant.clone()),
            Err(e) => AuditOutcome::Failed(*e),
        };
        self.audit.record(&AuditEvent {
            rpc,
            user_id: user_id.to_string(),
            outcome,
        });
    }
}
