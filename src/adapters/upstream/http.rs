use super::CredentialIssuer;
use crate::domain::session::{DEFAULT_TOKEN_TYPE, SessionInfo};
use crate::domain::sign_in::SignInForm;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use time::OffsetDateTime;

pub const SIGN_IN_ENDPOINT: &str = "/auth/signin";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    expires_at: Option<OffsetDateTime>,
}

/// Issues credentials by calling the backend API's sign-in endpoint.
#[derive(Clone, Debug)]
pub struct UpstreamIssuer {
    client: reqwest::Client,
    base_url: String,
}

impl UpstreamIssuer {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self { client, base_url: base_url.trim_end_matches('/').to_string() }
    }
}

#[async_trait]
impl CredentialIssuer for UpstreamIssuer {
    #[tracing::instrument(skip(self, form), err(level = "warn"))]
    async fn issue(&self, form: &SignInForm) -> Result<SessionInfo> {
        if self.base_url.is_empty() {
            return Err(AppError::Upstream("API base URL is not configured".to_string()));
        }

        let response = self
            .client
            .post(format!("{}{SIGN_IN_ENDPOINT}", self.base_url))
            .json(form)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        match response.status() {
            s if s.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                tracing::warn!("Sign-in rejected by upstream");
                return Err(AppError::AuthError);
            }
            s => return Err(AppError::Upstream(format!("sign-in endpoint returned {s}"))),
        }

        let body: TokenResponse = response.json().await.map_err(|e| AppError::Upstream(e.to_string()))?;
        if body.access_token.is_empty() {
            return Err(AppError::Upstream("sign-in endpoint returned an empty access token".to_string()));
        }

        let mut info = SessionInfo::new(body.access_token)
            .with_token_type(body.token_type.unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string()));
        info.expires_at = body.expires_at;
        Ok(info)
    }
}
