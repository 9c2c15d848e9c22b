use crate::domain::session::SessionInfo;
use crate::domain::sign_in::SignInForm;
use crate::error::Result;
use async_trait::async_trait;

pub mod http;

pub use self::http::UpstreamIssuer;

/// Exchanges sign-in credentials for an access token.
#[async_trait]
pub trait CredentialIssuer: Send + Sync + std::fmt::Debug + 'static {
    async fn issue(&self, form: &SignInForm) -> Result<SessionInfo>;
}
