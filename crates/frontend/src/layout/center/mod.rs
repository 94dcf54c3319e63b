pub mod tab;

use crate::layout::global_context::AppGlobalContext;
use leptos::prelude::*;
use tab::Tab;

/// Tab bar over the tab pages.
#[component]
pub fn Center(children: Children) -> impl IntoView {
    let tabs_store = leptos::context::use_context::<AppGlobalContext>()
        .expect("AppGlobalContext context not found");

    view! {
        <div data-zone="center" class="app-tabs">
            <Show when=move || tabs_store.opened.with(|tabs| !tabs.is_empty())>
                <div class="app-tabs__bar">
                    <For
                        each=move || tabs_store.opened.get()
                        key=|tab| tab.key.clone()
                        children=move |tab| view! { <Tab tab=tab /> }
                    />
                </div>
            </Show>
            <div class="app-tabs__content">{children()}</div>
        </div>
    }
}
