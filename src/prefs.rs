//! Persisted user preferences: last languages and last source text.

use std::cell::RefCell;
use std::collections::HashMap;

pub const SOURCE_LANGUAGE_KEY: &str = "srcLang";
pub const TARGET_LANGUAGE_KEY: &str = "tgtLang";
pub const LAST_TEXT_KEY: &str = "lastText";

/// Key-value store surviving page reloads.
///
/// Writes are best effort; a store that cannot persist just forgets.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// Non-persistent store for tests and native hosts.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let prefs = Self::new();
        for (key, value) in entries {
            prefs.set(key, value);
        }
        prefs
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

/// `window.localStorage`-backed store.
#[cfg(feature = "wasm")]
#[derive(Debug, Clone)]
pub struct LocalStoragePreferences {
    storage: Option<web_sys::Storage>,
}

#[cfg(feature = "wasm")]
impl LocalStoragePreferences {
    /// Falls back to a store that remembers nothing when storage is
    /// unavailable (private browsing, workers).
    pub fn new() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            tracing::warn!("localStorage unavailable, preferences will not persist");
        }
        Self { storage }
    }
}

#[cfg(feature = "wasm")]
impl Default for LocalStoragePreferences {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "wasm")]
impl PreferenceStore for LocalStoragePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.set_item(key, value) {
                tracing::warn!(key, error = ?e, "failed to persist preference");
            }
        }
    }
}
