//! Key-value persistence
//!
//! Everything the game keeps across sessions is a string stored under a
//! string key. The browser build writes to LocalStorage; native builds and
//! tests use an in-memory map.

use std::cell::RefCell;
use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Storage keys
pub mod keys {
    pub const HIGH_SCORE_LEGACY: &str = "squid-highscore";
    pub const HIGH_SCORE_EASY: &str = "squid-highscore-easy";
    pub const HIGH_SCORE_MEDIUM: &str = "squid-highscore-medium";
    pub const HIGH_SCORE_HARD: &str = "squid-highscore-hard";
    pub const SETTINGS: &str = "squid-settings";
    pub const STATS: &str = "squid-stats";
    pub const WIN_STREAK: &str = "squid-streak";
}

/// String key to string value store.
///
/// Methods take `&self` because the browser's `Storage` object is a shared
/// handle; implementations that need mutation use interior mutability.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory store for native builds and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }
}

/// Browser LocalStorage (WASM only)
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: Option<web_sys::Storage>,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn new() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if storage.is_none() {
            log::warn!("LocalStorage unavailable - progress will not be saved");
        }
        Self { storage }
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = &self.storage {
            if storage.set_item(key, value).is_err() {
                log::warn!("Failed to write '{}' to LocalStorage", key);
            }
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = &self.storage {
            if storage.remove_item(key).is_err() {
                log::warn!("Failed to remove '{}' from LocalStorage", key);
            }
        }
    }
}

/// Load a JSON value, falling back to `T::default()` when the key is
/// missing or the stored text doesn't parse.
pub fn load_json<T>(store: &dyn KeyValueStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match store.get(key) {
        Some(json) => match serde_json::from_str(&json) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Malformed '{}' in storage ({}), using defaults", key, e);
                T::default()
            }
        },
        None => T::default(),
    }
}

/// Serialize a value as JSON under `key`
pub fn save_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => store.set(key, &json),
        Err(e) => log::warn!("Failed to serialize '{}': {}", key, e),
    }
}

/// Load a decimal integer. Returns `None` when the key is missing or malformed.
pub fn load_u64(store: &dyn KeyValueStore, key: &str) -> Option<u64> {
    let text = store.get(key)?;
    match text.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            log::warn!("Malformed integer '{}' under '{}', ignoring", text, key);
            None
        }
    }
}

pub fn save_u64(store: &dyn KeyValueStore, key: &str, value: u64) {
    store.set(key, &value.to_string());
}
