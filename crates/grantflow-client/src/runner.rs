//! Scenario replay.
//!
//! The runner keeps what a real client would keep per user: the current
//! access token, the refresh token (if any) and how many actions the access
//! token has left. When that count reaches zero and a refresh token is held,
//! the next action is preceded by a refresh.

use std::collections::HashMap;
use std::io::Write;

use tracing::{debug, info};

use grantflow_proto::{
    AccessTokenRequest, ApproveRequest, AuthzRequest, DelegatedActionRequest,
    RefreshTokenRequest, status,
};

use crate::api::OAuthApi;
use crate::error::ClientError;
use crate::scenario::Step;

/// Tokens the client holds for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub ttl: u32,
}

pub struct Runner<A> {
    api: A,
    credentials: HashMap<String, Credentials>,
}

impl<A: OAuthApi> Runner<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            credentials: HashMap::new(),
        }
    }

    pub fn credentials(&self, user_id: &str) -> Option<&Credentials> {
        self.credentials.get(user_id)
    }

    /// Replay every step, writing one result line per step to `out`.
    pub async fn run_all<W: Write>(&mut self, steps: &[Step], out: &mut W) -> Result<(), ClientError> {
        for step in steps {
            let line = self.run(step).await?;
            writeln!(out, "{line}")?;
        }
        Ok(())
    }

    /// Execute one step and return its result line.
    pub async fn run(&mut self, step: &Step) -> Result<String, ClientError> {
        match step {
            Step::Request {
                user_id,
                auto_refresh,
            } => self.authorize(user_id, *auto_refresh).await,
            Step::Action {
                user_id,
                operation,
                resource,
            } => self.act(user_id, operation, resource).await,
        }
    }

    async fn authorize(&mut self, user_id: &str, auto_refresh: bool) -> Result<String, ClientError> {
        let authz = self
            .api
            .request_authz(&AuthzRequest {
                user_id: user_id.to_string(),
            })
            .await?;
        if !authz.is_success() {
            return Ok(authz.message);
        }

        let approved = self
            .api
            .approve(&ApproveRequest {
                user_id: user_id.to_string(),
                token: authz.token.clone(),
            })
            .await?;
        if !approved.is_success() {
            return Ok(approved.message);
        }

        let access = self
            .api
            .issue_access_token(&AccessTokenRequest {
                user_id: user_id.to_string(),
                authz_token: approved.token,
                auto_refresh,
            })
            .await?;
        if !access.is_success() {
            return Ok(access.message);
        }

        let line = match access.refresh_token() {
            Some(refresh) => format!("{} -> {},{refresh}", authz.token, access.access_token),
            None => format!("{} -> {}", authz.token, access.access_token),
        };
        info!(user_id, ttl = access.ttl, "Access token obtained");
        self.credentials.insert(
            user_id.to_string(),
            Credentials {
                refresh_token: access.refresh_token().map(str::to_string),
                access_token: access.access_token,
                ttl: access.ttl,
            },
        );
        Ok(line)
    }

    async fn act(
        &mut self,
        user_id: &str,
        operation: &str,
        resource: &str,
    ) -> Result<String, ClientError> {
        self.refresh_if_spent(user_id).await?;

        let access_token = self
            .credentials
            .get(user_id)
            .map(|c| c.access_token.clone())
            .unwrap_or_default();
        let resp = self
            .api
            .delegated_action(&DelegatedActionRequest {
                user_id: user_id.to_string(),
                access_token,
                operation: operation.to_string(),
                resource: resource.to_string(),
            })
            .await?;

        // Every outcome past the token check spent one action.
        if matches!(
            resp.message.as_str(),
            status::PERMISSION_GRANTED | status::OPERATION_NOT_PERMITTED | status::RESOURCE_NOT_FOUND
        ) {
            if let Some(creds) = self.credentials.get_mut(user_id) {
                creds.ttl = creds.ttl.saturating_sub(1);
            }
        }
        Ok(resp.message)
    }

    async fn refresh_if_spent(&mut self, user_id: &str) -> Result<(), ClientError> {
        let Some(refresh_token) = self
            .credentials
            .get(user_id)
            .filter(|c| c.ttl == 0)
            .and_then(|c| c.refresh_token.clone())
        else {
            return Ok(());
        };

        let resp = self
            .api
            .refresh_access_token(&RefreshTokenRequest {
                user_id: user_id.to_string(),
                refresh_token,
            })
            .await?;
        if !resp.is_success() {
            debug!(user_id, reason = %resp.message, "Refresh refused");
            return Ok(());
        }

        info!(user_id, ttl = resp.ttl, "Access token refreshed");
        self.credentials.insert(
            user_id.to_string(),
            Credentials {
                refresh_token: resp.refresh_token().map(str::to_string),
                access_token: resp.access_token,
                ttl: resp.ttl,
            },
        );
        Ok(())
    }
}
