use crate::adapters::storage::ClientStorage;
use crate::domain::preferences::{PREFERENCES_STORAGE_KEY, PersistedPreferences, Preferences};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// In-memory UI state written through to local storage.
///
/// Starts from defaults; nothing is read from storage until [`rehydrate`](Self::rehydrate).
#[derive(Clone, Debug)]
pub struct PreferenceStore {
    storage: ClientStorage,
    state: Arc<Mutex<Preferences>>,
}

impl PreferenceStore {
    #[must_use]
    pub fn new(storage: ClientStorage) -> Self {
        Self { storage, state: Arc::new(Mutex::new(Preferences::default())) }
    }

    fn lock(&self) -> MutexGuard<'_, Preferences> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads persisted state. A missing entry keeps the defaults; a malformed one is ignored.
    pub fn rehydrate(&self) {
        let Some(raw) = self.storage.local_item(PREFERENCES_STORAGE_KEY) else {
            return;
        };

        match serde_json::from_str::<PersistedPreferences>(&raw) {
            Ok(persisted) => {
                *self.lock() = persisted.state;
                tracing::debug!(state = ?persisted.state, "Preferences rehydrated");
            }
            Err(e) => tracing::warn!(error = %e, "Ignoring malformed persisted preferences"),
        }
    }

    fn update(&self, f: impl FnOnce(&mut Preferences)) {
        let mut state = self.lock();
        f(&mut state);
        let persisted = PersistedPreferences { state: *state, version: 0 };
        match serde_json::to_string(&persisted) {
            Ok(json) => self.storage.set_local_item(PREFERENCES_STORAGE_KEY, &json),
            Err(e) => tracing::warn!(error = %e, "Failed to serialize preferences"),
        }
    }

    pub fn set_auth(&self, is_auth: bool) {
        self.update(|p| p.is_auth = is_auth);
    }

    pub fn reset_auth(&self) {
        self.set_auth(false);
    }

    pub fn set_sidebar_expand(&self, expanded: bool) {
        self.update(|p| p.is_sidebar_expand = expanded);
    }

    #[must_use]
    pub fn is_auth(&self) -> bool {
        self.lock().is_auth
    }

    #[must_use]
    pub fn is_sidebar_expanded(&self) -> bool {
        self.lock().is_sidebar_expand
    }

    #[must_use]
    pub fn snapshot(&self) -> Preferences {
        *self.lock()
    }
}
