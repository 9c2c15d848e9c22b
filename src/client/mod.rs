//! The client half: the browser-side session cookie, persisted UI preferences, navigation,
//! and the API client produced by [`ClientBootstrap`].

pub mod api_client;
pub mod bootstrap;
pub mod navigator;
pub mod preferences;
pub mod session_store;

pub use api_client::{ApiClient, FailureInterceptor};
pub use bootstrap::ClientBootstrap;
pub use navigator::{History, Navigator};
pub use preferences::PreferenceStore;
pub use session_store::SessionStore;

use crate::domain::session::{SessionInfo, SessionPayload};
use crate::error::SessionError;
use crate::services::session_codec::SessionCodec;
use std::sync::Arc;

/// Everything a bootstrapped client needs.
#[derive(Clone, Debug)]
pub struct ClientContext {
    api: ApiClient,
    session_store: SessionStore,
    preferences: PreferenceStore,
    codec: SessionCodec,
    navigator: Arc<dyn Navigator>,
    home_path: String,
    sign_in_path: String,
}

impl ClientContext {
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn session_store(&self) -> &SessionStore {
        &self.session_store
    }

    #[must_use]
    pub const fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    /// The verified session, decoded from the cookie on every call.
    #[must_use]
    pub fn session(&self) -> Option<SessionPayload> {
        self.codec.decode(self.session_store.read().as_deref())
    }

    /// Authentication follows the cookie, not the cached `is_auth` preference.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    /// Signs and stores a session, then navigates home.
    ///
    /// # Errors
    /// Returns `SessionError` if signing fails; nothing is stored in that case.
    pub fn sign_in(&self, info: &SessionInfo) -> Result<(), SessionError> {
        let token = self.codec.encode(info)?;
        self.session_store.save(&token);
        self.api.set_authorization(&info.auth_token());
        self.preferences.set_auth(true);
        self.navigator.push(&self.home_path);
        Ok(())
    }

    pub fn sign_out(&self) {
        self.session_store.clear_then(|| {
            self.api.set_authorization("");
            self.preferences.reset_auth();
            self.navigator.push(&self.sign_in_path);
        });
    }
}
