use crate::adapters::storage::ClientStorage;
use crate::config::{ClientConfig, SessionConfig};
use crate::domain::session::expiry_after;
use time::OffsetDateTime;

/// The session cookie in client storage.
#[derive(Clone, Debug)]
pub struct SessionStore {
    storage: ClientStorage,
    cookie_name: String,
    ttl_days: i64,
    clear_namespace: Option<String>,
}

impl SessionStore {
    #[must_use]
    pub fn new(storage: ClientStorage, session: &SessionConfig, client: &ClientConfig) -> Self {
        Self {
            storage,
            cookie_name: session.cookie_name.clone(),
            ttl_days: session.ttl_days,
            clear_namespace: client.storage_namespace.clone(),
        }
    }

    #[must_use]
    pub const fn storage(&self) -> &ClientStorage {
        &self.storage
    }

    /// Stores `token` with the configured retention window.
    pub fn save(&self, token: &str) {
        self.save_for(token, self.ttl_days);
    }

    /// Stores `token` for `ttl_days`. A lifetime past the end of the calendar is not stored.
    pub fn save_for(&self, token: &str, ttl_days: i64) {
        let Some(expires) = expiry_after(OffsetDateTime::now_utc(), ttl_days) else {
            tracing::warn!(ttl_days, "Session lifetime out of range; not saved");
            return;
        };
        self.storage.set_cookie(&self.cookie_name, token, expires);
        tracing::debug!(cookie = %self.cookie_name, %expires, "Session saved");
    }

    #[must_use]
    pub fn read(&self) -> Option<String> {
        self.storage.cookie(&self.cookie_name)
    }

    /// Removes the session cookie and wipes local and session storage.
    pub fn clear(&self) {
        self.clear_then(|| {});
    }

    /// Like [`clear`](Self::clear), then runs `on_cleared` exactly once.
    pub fn clear_then(&self, on_cleared: impl FnOnce()) {
        self.storage.clear_storage(self.clear_namespace.as_deref());
        self.storage.remove_cookie(&self.cookie_name);
        tracing::info!(namespace = ?self.clear_namespace, "Session cleared");
        on_cleared();
    }
}
