//! Shell state: sidebar collapse, accordion groups, remembered tabs and the open tab strip.

use super::storage::{KeyValueStore, ACCORDION_KEY_PREFIX, SIDEBAR_COLLAPSED_KEY};

fn read_flag(store: &impl KeyValueStore, key: &str) -> bool {
    store.get(key).as_deref() == Some("true")
}

fn write_flag(store: &impl KeyValueStore, key: &str, value: bool) {
    store.set(key, if value { "true" } else { "false" });
}

pub fn sidebar_collapsed(store: &impl KeyValueStore) -> bool {
    read_flag(store, SIDEBAR_COLLAPSED_KEY)
}

pub fn set_sidebar_collapsed(store: &impl KeyValueStore, collapsed: bool) {
    write_flag(store, SIDEBAR_COLLAPSED_KEY, collapsed);
}

/// Toggles the sidebar and returns the new collapsed state.
pub fn toggle_sidebar(store: &impl KeyValueStore) -> bool {
    let collapsed = !sidebar_collapsed(store);
    set_sidebar_collapsed(store, collapsed);
    collapsed
}

pub fn accordion_key(group_id: &str) -> String {
    format!("{}{}", ACCORDION_KEY_PREFIX, group_id)
}

/// A group is open if it was saved open or is open by default.
pub fn accordion_open(store: &impl KeyValueStore, group_id: &str, open_by_default: bool) -> bool {
    read_flag(store, &accordion_key(group_id)) || open_by_default
}

pub fn toggle_accordion(store: &impl KeyValueStore, group_id: &str, currently_open: bool) -> bool {
    let open = !currently_open;
    write_flag(store, &accordion_key(group_id), open);
    open
}

/// Remembers the active tab of a tab group under a caller supplied key.
pub fn remember_tab(store: &impl KeyValueStore, storage_key: &str, tab_id: &str) {
    store.set(storage_key, tab_id);
}

/// Returns the remembered tab if it is still one of `available`.
pub fn restore_tab<'a>(
    store: &impl KeyValueStore,
    storage_key: &str,
    available: &[&'a str],
) -> Option<&'a str> {
    let saved = store.get(storage_key)?;
    available.iter().copied().find(|id| *id == saved)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTab {
    pub key: String,
    pub title: String,
}

/// Open tabs of the center area, in opening order, plus the active key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabStrip {
    tabs: Vec<OpenTab>,
    active: Option<String>,
}

impl TabStrip {
    pub fn tabs(&self) -> &[OpenTab] {
        &self.tabs
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.tabs.iter().any(|tab| tab.key == key)
    }

    /// Opens `key` unless already open, then activates it.
    pub fn open(&mut self, key: &str, title: &str) {
        if !self.contains(key) {
            self.tabs.push(OpenTab {
                key: key.to_string(),
                title: title.to_string(),
            });
        }
        self.active = Some(key.to_string());
    }

    /// Returns false when `key` is not open.
    pub fn activate(&mut self, key: &str) -> bool {
        if !self.contains(key) {
            return false;
        }
        self.active = Some(key.to_string());
        true
    }

    /// Closing the active tab activates the last remaining one.
    pub fn close(&mut self, key: &str) {
        self.tabs.retain(|tab| tab.key != key);
        if self.active.as_deref() == Some(key) {
            self.active = self.tabs.last().map(|tab| tab.key.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::storage::MemoryStore;

    #[test]
    fn test_sidebar_toggle_persists() {
        let store = MemoryStore::new();
        assert!(!sidebar_collapsed(&store));
        assert!(toggle_sidebar(&store));
        assert_eq!(store.get("sidebar_collapsed").as_deref(), Some("true"));
        assert!(!toggle_sidebar(&store));
    }

    #[test]
    fn test_accordion_state_per_group() {
        let store = MemoryStore::new();
        assert!(!accordion_open(&store, "nav-compras", false));
        assert!(accordion_open(&store, "nav-docs", true));
        toggle_accordion(&store, "nav-compras", false);
        assert!(accordion_open(&store, "nav-compras", false));
        assert_eq!(store.get("accordion_nav-compras").as_deref(), Some("true"));
    }

    #[test]
    fn test_restore_tab_ignores_stale_ids() {
        let store = MemoryStore::new();
        remember_tab(&store, "config_tab", "habilidades");
        assert_eq!(
            restore_tab(&store, "config_tab", &["geral", "habilidades"]),
            Some("habilidades")
        );
        assert_eq!(restore_tab(&store, "config_tab", &["geral"]), None);
    }

    #[test]
    fn test_tab_strip_open_is_idempotent() {
        let mut strip = TabStrip::default();
        strip.open("u501_artifact_generation", "Artefato");
        strip.open("p901_price_research", "Pesquisa");
        strip.open("u501_artifact_generation", "Outro titulo");
        assert_eq!(strip.tabs().len(), 2);
        assert_eq!(strip.tabs()[0].title, "Artefato");
        assert_eq!(strip.active(), Some("u501_artifact_generation"));
        assert!(!strip.activate("missing"));
        assert_eq!(strip.active(), Some("u501_artifact_generation"));
    }

    #[test]
    fn test_tab_strip_close_moves_active_to_last() {
        let mut strip = TabStrip::default();
        strip.open("a", "A");
        strip.open("b", "B");
        strip.open("c", "C");
        strip.activate("b");
        strip.close("c");
        assert_eq!(strip.active(), Some("b"));
        strip.close("b");
        assert_eq!(strip.active(), Some("a"));
        strip.close("a");
        assert_eq!(strip.active(), None);
        assert!(strip.tabs().is_empty());
    }
}
