use crate::adapters::storage::ClientStorage;
use crate::client::ClientContext;
use crate::client::api_client::{ApiClient, FailureInterceptor};
use crate::client::navigator::Navigator;
use crate::client::preferences::PreferenceStore;
use crate::client::session_store::SessionStore;
use crate::config::Config;
use crate::error::ClientError;
use crate::services::session_codec::SessionCodec;
use std::sync::Arc;

/// One-time client start-up. [`run`](Self::run) consumes the bootstrap, so the failure
/// interceptor is registered exactly once per bootstrap.
#[derive(Debug)]
pub struct ClientBootstrap {
    config: Config,
    storage: ClientStorage,
    navigator: Arc<dyn Navigator>,
}

impl ClientBootstrap {
    #[must_use]
    pub fn new(config: Config, storage: ClientStorage, navigator: Arc<dyn Navigator>) -> Self {
        Self { config, storage, navigator }
    }

    /// Rehydrates preferences, drops a stale session, and builds the API client.
    ///
    /// # Errors
    /// Returns `ClientError::Build` if the HTTP client cannot be constructed.
    #[tracing::instrument(skip(self), fields(has_cookie = tracing::field::Empty, session_valid = tracing::field::Empty))]
    pub fn run(self) -> Result<ClientContext, ClientError> {
        let Self { config, storage, navigator } = self;

        let codec = SessionCodec::from_config(&config.session);
        let session_store = SessionStore::new(storage.clone(), &config.session, &config.client);
        let preferences = PreferenceStore::new(storage);
        preferences.rehydrate();

        let cookie = session_store.read();
        let session = codec.decode(cookie.as_deref());

        let span = tracing::Span::current();
        span.record("has_cookie", cookie.is_some());
        span.record("session_valid", session.is_some());

        if cookie.is_some() && session.is_none() {
            tracing::info!("Stored session is invalid; clearing it");
            session_store.clear_then(|| preferences.reset_auth());
        }

        let auth_token = session.as_ref().map(|s| s.auth_token.as_str()).unwrap_or_default();

        let interceptor = FailureInterceptor::new(
            session_store.clone(),
            preferences.clone(),
            Arc::clone(&navigator),
            config.guard.sign_in_path.clone(),
            config.environment,
        );
        let api = ApiClient::new(&config.client.api_base_url, auth_token, &config.client.tunnel_bypass_header, interceptor)?;

        tracing::debug!(base_url = %config.client.api_base_url, "Client bootstrapped");

        Ok(ClientContext {
            api,
            session_store,
            preferences,
            codec,
            navigator,
            home_path: config.guard.home_path,
            sign_in_path: config.guard.sign_in_path,
        })
    }
}
