use super::registry::render_tab_content;
use crate::layout::global_context::{AppGlobalContext, Tab as TabData};
use leptos::prelude::*;

/// Content of one open tab. Inactive tabs stay mounted and are hidden.
#[component]
pub fn TabPage(tab: TabData, tabs_store: AppGlobalContext) -> impl IntoView {
    let key = StoredValue::new(tab.key.clone());
    let hidden =
        move || key.with_value(|k| tabs_store.active.with(|a| a.as_deref() != Some(k.as_str())));

    leptos::logging::log!("mount tab page '{}'", tab.key);
    on_cleanup(move || key.with_value(|k| leptos::logging::log!("unmount tab page '{}'", k)));

    view! {
        <div class="tabs__item" class:tabs__item--hidden=hidden data-tab-key=tab.key.clone()>
            {render_tab_content(&tab.key, tabs_store)}
        </div>
    }
}
