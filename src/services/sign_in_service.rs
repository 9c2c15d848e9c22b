use crate::adapters::upstream::CredentialIssuer;
use crate::domain::sign_in::SignInForm;
use crate::error::{AppError, Result};
use crate::services::session_codec::SessionCodec;
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::sync::Arc;

#[derive(Clone, Debug)]
struct Metrics {
    sign_in_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("cornerstone");
        Self {
            sign_in_total: meter
                .u64_counter("auth_sign_in_total")
                .with_description("Sign-in attempts by outcome")
                .build(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SignInService {
    issuer: Arc<dyn CredentialIssuer>,
    codec: SessionCodec,
    metrics: Metrics,
}

impl SignInService {
    #[must_use]
    pub fn new(issuer: Arc<dyn CredentialIssuer>, codec: SessionCodec) -> Self {
        Self { issuer, codec, metrics: Metrics::new() }
    }

    /// Validates the form, exchanges it for a credential and signs a session token.
    ///
    /// # Errors
    /// `BadRequest` for an invalid form, `AuthError` when the credentials are rejected,
    /// `Upstream` when the API is unreachable, `Session` when signing fails.
    #[tracing::instrument(skip(self, form), err(level = "warn"))]
    pub async fn sign_in(&self, form: &SignInForm) -> Result<String> {
        let result = self.try_sign_in(form).await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(AppError::BadRequest(_)) => "invalid",
            Err(AppError::AuthError) => "rejected",
            Err(_) => "error",
        };
        self.metrics.sign_in_total.add(1, &[KeyValue::new("outcome", outcome)]);
        result
    }

    async fn try_sign_in(&self, form: &SignInForm) -> Result<String> {
        form.validate().map_err(AppError::BadRequest)?;
        let info = self.issuer.issue(form).await?;
        let token = self.codec.encode(&info)?;
        tracing::info!("Session created");
        Ok(token)
    }
}
