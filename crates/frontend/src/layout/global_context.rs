use contracts::shared::layout_state::{self, TabStrip};
use leptos::prelude::*;
use std::collections::HashMap;
use web_sys::window;

use crate::shared::storage::BrowserStorage;

pub use contracts::shared::layout_state::OpenTab as Tab;

/// Shell state shared through context: the tab strip and the sidebar.
#[derive(Clone, Copy)]
pub struct AppGlobalContext {
    strip: RwSignal<TabStrip>,
    pub opened: Memo<Vec<Tab>>,
    pub active: Memo<Option<String>>,
    pub left_open: RwSignal<bool>,
}

impl AppGlobalContext {
    /// The sidebar starts in its persisted collapse state.
    pub fn new() -> Self {
        let strip = RwSignal::new(TabStrip::default());
        let collapsed = layout_state::sidebar_collapsed(&BrowserStorage);
        Self {
            strip,
            opened: Memo::new(move |_| strip.with(|s| s.tabs().to_vec())),
            active: Memo::new(move |_| strip.with(|s| s.active().map(str::to_string))),
            left_open: RwSignal::new(!collapsed),
        }
    }

    /// Restores the active tab from `?active=` and mirrors it back into the URL.
    pub fn init_router_integration(&self) {
        if let Some(key) = query_params().remove("active") {
            let activated = self.strip.try_update(|s| s.activate(&key)).unwrap_or(false);
            if !activated {
                self.open_tab(&key, crate::layout::tabs::tab_label(&key));
            }
        }

        let active = self.active;
        Effect::new(move |_| {
            let Some(key) = active.get() else {
                return;
            };
            let query = serde_qs::to_string(&HashMap::from([("active", key)])).unwrap_or_default();
            replace_query(&format!("?{}", query));
        });
    }

    pub fn open_tab(&self, key: &str, title: &str) {
        leptos::logging::log!("open tab '{}'", key);
        self.strip.update(|s| s.open(key, title));
    }

    pub fn activate_tab(&self, key: &str) {
        self.strip.update(|s| {
            s.activate(key);
        });
    }

    pub fn close_tab(&self, key: &str) {
        leptos::logging::log!("close tab '{}'", key);
        self.strip.update(|s| s.close(key));
    }

    pub fn toggle_left(&self) {
        let collapsed = layout_state::toggle_sidebar(&BrowserStorage);
        self.left_open.set(!collapsed);
    }
}

impl Default for AppGlobalContext {
    fn default() -> Self {
        Self::new()
    }
}

fn query_params() -> HashMap<String, String> {
    let search = window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default();
    serde_qs::from_str(search.trim_start_matches('?')).unwrap_or_default()
}

fn replace_query(new_search: &str) {
    let Some(w) = window() else {
        return;
    };
    if w.location().search().ok().as_deref() == Some(new_search) {
        return;
    }
    if let Ok(history) = w.history() {
        let _ = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(new_search));
    }
}
