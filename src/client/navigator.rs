use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Client-side navigation.
pub trait Navigator: Send + Sync + Debug {
    fn push(&self, path: &str);
}

/// A navigation history stack; the last entry is the current location.
#[derive(Clone, Debug, Default)]
pub struct History {
    entries: Arc<Mutex<Vec<String>>>,
}

impl History {
    #[must_use]
    pub fn starting_at(path: &str) -> Self {
        Self { entries: Arc::new(Mutex::new(vec![path.to_string()])) }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.lock().last().cloned()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.lock().clone()
    }
}

impl Navigator for History {
    fn push(&self, path: &str) {
        tracing::debug!(path, "Navigating");
        self.lock().push(path.to_string());
    }
}
