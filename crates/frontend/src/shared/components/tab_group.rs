use contracts::shared::layout_state;
use leptos::prelude::*;

use crate::shared::storage::BrowserStorage;

/// In-page tab strip. With a `storage_key` the active tab survives reloads.
#[component]
pub fn TabGroup(
    /// (id, label) pairs
    tabs: Vec<(&'static str, &'static str)>,
    active: RwSignal<&'static str>,
    #[prop(optional)] storage_key: Option<&'static str>,
) -> impl IntoView {
    if let Some(key) = storage_key {
        let ids: Vec<&'static str> = tabs.iter().map(|(id, _)| *id).collect();
        if let Some(saved) = layout_state::restore_tab(&BrowserStorage, key, &ids) {
            active.set(saved);
        }
    }

    view! {
        <div class="tab-group" role="tablist">
            {tabs
                .into_iter()
                .map(|(id, label)| {
                    view! {
                        <button
                            class="tab-group__tab"
                            class:tab-group__tab--active=move || active.get() == id
                            role="tab"
                            on:click=move |_| {
                                active.set(id);
                                if let Some(key) = storage_key {
                                    layout_state::remember_tab(&BrowserStorage, key, id);
                                }
                            }
                        >
                            {label}
                        </button>
                    }
                })
                .collect_view()}
        </div>
    }
}
