//! Client-side storage: a cookie jar with absolute expiries, persisted local storage and
//! tab-lifetime session storage. Handles are cheap to clone and share one underlying store.

use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use time::OffsetDateTime;

pub mod file;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub value: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires: OffsetDateTime,
}

impl StoredCookie {
    fn is_live_at(&self, now: OffsetDateTime) -> bool {
        now < self.expires
    }
}

/// The part of the store that survives a restart. Session storage never does.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct PersistedState {
    #[serde(default)]
    pub(crate) cookies: BTreeMap<String, StoredCookie>,
    #[serde(default)]
    pub(crate) local: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct Inner {
    persisted: PersistedState,
    session: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct ClientStorage {
    inner: Arc<Mutex<Inner>>,
    path: Option<Arc<PathBuf>>,
}

impl ClientStorage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self { inner: Arc::new(Mutex::new(Inner::default())), path: None }
    }

    /// Opens a file-backed store, loading cookies and local storage if the file exists.
    /// Expired cookies are dropped on load.
    ///
    /// # Errors
    /// Returns `StorageError` if the file exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let mut persisted = file::load(&path)?;
        let now = OffsetDateTime::now_utc();
        persisted.cookies.retain(|_, c| c.is_live_at(now));

        tracing::debug!(path = %path.display(), cookies = persisted.cookies.len(), "Opened client storage");

        Ok(Self {
            inner: Arc::new(Mutex::new(Inner { persisted, session: BTreeMap::new() })),
            path: Some(Arc::new(path)),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn flush(&self, inner: &Inner) {
        if let Some(path) = &self.path
            && let Err(e) = file::save(path, &inner.persisted)
        {
            tracing::warn!(error = %e, path = %path.display(), "Failed to persist client storage");
        }
    }

    /// Value of a live cookie. An expired cookie is evicted and reported absent.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<String> {
        let mut inner = self.lock();
        let cookie = inner.persisted.cookies.get(name)?;
        if cookie.is_live_at(OffsetDateTime::now_utc()) {
            return Some(cookie.value.clone());
        }
        inner.persisted.cookies.remove(name);
        self.flush(&inner);
        None
    }

    pub fn set_cookie(&self, name: &str, value: &str, expires: OffsetDateTime) {
        let mut inner = self.lock();
        inner.persisted.cookies.insert(name.to_string(), StoredCookie { value: value.to_string(), expires });
        self.flush(&inner);
    }

    pub fn remove_cookie(&self, name: &str) {
        let mut inner = self.lock();
        if inner.persisted.cookies.remove(name).is_some() {
            self.flush(&inner);
        }
    }

    #[must_use]
    pub fn local_item(&self, key: &str) -> Option<String> {
        self.lock().persisted.local.get(key).cloned()
    }

    pub fn set_local_item(&self, key: &str, value: &str) {
        let mut inner = self.lock();
        inner.persisted.local.insert(key.to_string(), value.to_string());
        self.flush(&inner);
    }

    pub fn remove_local_item(&self, key: &str) {
        let mut inner = self.lock();
        if inner.persisted.local.remove(key).is_some() {
            self.flush(&inner);
        }
    }

    #[must_use]
    pub fn session_item(&self, key: &str) -> Option<String> {
        self.lock().session.get(key).cloned()
    }

    pub fn set_session_item(&self, key: &str, value: &str) {
        self.lock().session.insert(key.to_string(), value.to_string());
    }

    /// Clears local and session storage; with a prefix, only keys starting with it.
    pub fn clear_storage(&self, prefix: Option<&str>) {
        let mut inner = self.lock();
        match prefix {
            None => {
                inner.persisted.local.clear();
                inner.session.clear();
            }
            Some(prefix) => {
                inner.persisted.local.retain(|k, _| !k.starts_with(prefix));
                inner.session.retain(|k, _| !k.starts_with(prefix));
            }
        }
        self.flush(&inner);
    }

    #[must_use]
    pub fn local_len(&self) -> usize {
        self.lock().persisted.local.len()
    }

    #[must_use]
    pub fn session_len(&self) -> usize {
        self.lock().session.len()
    }
}

impl Default for ClientStorage {
    fn default() -> Self {
        Self::in_memory()
    }
}
