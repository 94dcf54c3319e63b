use crate::layout::global_context::{AppGlobalContext, Tab as TabData};
use crate::layout::left::Sidebar;
use crate::layout::tabs::TabPage;
use crate::layout::Shell;
use leptos::prelude::*;

/// Sidebar plus the open tabs. Syncs the active tab with `?active=`.
#[component]
pub fn MainLayout() -> impl IntoView {
    let tabs_store = leptos::context::use_context::<AppGlobalContext>()
        .expect("AppGlobalContext context not found");

    tabs_store.init_router_integration();

    view! {
        <Shell
            left=|| view! { <Sidebar /> }.into_any()
            center=move || {
                view! {
                    <For
                        each=move || tabs_store.opened.get()
                        key=|tab| tab.key.clone()
                        children=move |tab: TabData| {
                            view! { <TabPage tab=tab tabs_store=tabs_store /> }
                        }
                    />
                    <Show when=move || tabs_store.opened.with(|tabs| tabs.is_empty())>
                        <div class="placeholder">
                            "Selecione uma opção no menu para começar."
                        </div>
                    </Show>
                }
                .into_any()
            }
        />
    }
}
