use serde::{Deserialize, Serialize};

/// Local storage key holding the persisted UI state.
pub const PREFERENCES_STORAGE_KEY: &str = "app-persisted-storage";

/// Client-side UI state. `is_auth` is a display hint; the session cookie decides authentication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub is_auth: bool,
    pub is_sidebar_expand: bool,
}

/// On-disk envelope, versioned so later layouts can migrate old entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedPreferences {
    pub state: Preferences,
    #[serde(default)]
    pub version: u32,
}
