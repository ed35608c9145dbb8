//! Authorization API client.

use serde::Serialize;
use serde::de::DeserializeOwned;

use grantflow_proto::methods::{
    ROUTE_APPROVE_AUTHZ, ROUTE_DELEGATED_ACTION, ROUTE_ISSUE_ACCESS_TOKEN,
    ROUTE_REFRESH_ACCESS_TOKEN, ROUTE_REQUEST_AUTHZ,
};
use grantflow_proto::{
    AccessTokenRequest, AccessTokenResponse, ApproveRequest, AuthzRequest, AuthzResponse,
    DelegatedActionRequest, DelegatedActionResponse, RefreshTokenRequest,
};

use crate::error::ClientError;

/// The five calls of the authorization flow.
///
/// Flow-level failures come back inside the response (`error_code`);
/// `Err` is reserved for transport problems.
#[allow(async_fn_in_trait)]
pub trait OAuthApi {
    async fn request_authz(&self, req: &AuthzRequest) -> Result<AuthzResponse, ClientError>;

    async fn approve(&self, req: &ApproveRequest) -> Result<AuthzResponse, ClientError>;

    async fn issue_access_token(
        &self,
        req: &AccessTokenRequest,
    ) -> Result<AccessTokenResponse, ClientError>;

    async fn refresh_access_token(
        &self,
        req: &RefreshTokenRequest,
    ) -> Result<AccessTokenResponse, ClientError>;

    async fn delegated_action(
        &self,
        req: &DelegatedActionRequest,
    ) -> Result<DelegatedActionResponse, ClientError>;
}

/// [`OAuthApi`] over JSON/HTTP.
#[derive(Debug, Clone)]
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    /// Create a client for the server at `base_url` (e.g. `http://127.0.0.1:8080`).
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        if base_url.is_empty() {
            return Err(ClientError::Config("server URL is empty".into()));
        }

        // reqwest is built with rustls-no-provider; Err means one is already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder().build()?;
        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        route: &str,
        body: &B,
    ) -> Result<R, ClientError> {
        let url = format!("{}{route}", self.base_url);
        let resp = self.http.post(&url).json(body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").into(),
            });
        }
        Ok(resp.json().await?)
    }
}

impl OAuthApi for HttpApi {
    async fn request_authz(&self, req: &AuthzRequest) -> Result<AuthzResponse, ClientError> {
        self.post(ROUTE_REQUEST_AUTHZ, req).await
    }

    async fn approve(&self, req: &ApproveRequest) -> Result<AuthzResponse, ClientError> {
        self.post(ROUTE_APPROVE_AUTHZ, req).await
    }

    async fn issue_access_token(
        &self,
        req: &AccessTokenRequest,
    ) -> Result<AccessTokenResponse, ClientError> {
        self.post(ROUTE_ISSUE_ACCESS_TOKEN, req).await
    }

    async fn refresh_access_token(
        &self,
        req: &RefreshTokenRequest,
    ) -> Result<AccessTokenResponse, ClientError> {
        self.post(ROUTE_REFRESH_ACCESS_TOKEN, req).await
    }

    async fn delegated_action(
        &self,
        req: &DelegatedActionRequest,
    ) -> Result<DelegatedActionResponse, ClientError> {
        self.post(ROUTE_DELEGATED_ACTION, req).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let api = HttpApi::new("http://127.0.0.1:8080/").unwrap();
        assert_eq!(api.base_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn empty_url_is_rejected() {
        assert!(matches!(HttpApi::new(""), Err(ClientError::Config(_))));
    }
}
