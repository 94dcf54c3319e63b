//! Key-value persistence used for client preferences.
//!
//! The browser implementation lives in the frontend (`localStorage`); this
//! module only defines the seam and an in-memory store for tests. Writes are
//! last-write-wins, there are no transactions.

use std::cell::RefCell;
use std::collections::HashMap;

pub const THEME_KEY: &str = "lia_theme";
pub const SELECTED_MODEL_KEY: &str = "selectedAIModel";
pub const SELECTED_MODEL_NAME_KEY: &str = "selectedAIModelName";
pub const SIDEBAR_COLLAPSED_KEY: &str = "sidebar_collapsed";
pub const ACCORDION_KEY_PREFIX: &str = "accordion_";
pub const PRICE_QUEUE_KEY: &str = "filaPesquisa";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Store backed by a `HashMap`. A fresh handle over the same map simulates a
/// page reload.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

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

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

/// Reads a JSON value, treating absent or corrupt entries as missing.
pub fn get_json<T: serde::de::DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("ignoring corrupt storage entry '{}': {}", key, e);
            None
        }
    }
}

pub fn set_json<T: serde::Serialize>(store: &impl KeyValueStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => store.set(key, &raw),
        Err(e) => log::error!("failed to serialize storage entry '{}': {}", key, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_last_write_wins() {
        let store = MemoryStore::new();
        store.set("k", "1");
        store.set("k", "2");
        assert_eq!(store.get("k").as_deref(), Some("2"));
        store.remove("k");
        assert!(store.get("k").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_corrupt_json_reads_as_missing() {
        let store = MemoryStore::new();
        store.set("fila", "{not json");
        let value: Option<Vec<String>> = get_json(&store, "fila");
        assert!(value.is_none());

        set_json(&store, "fila", &vec!["a".to_string()]);
        let value: Option<Vec<String>> = get_json(&store, "fila");
        assert_eq!(value, Some(vec!["a".to_string()]));
    }
}
