//! Sidebar with accordion groups. Each group's open state is persisted.

use crate::layout::global_context::AppGlobalContext;
use crate::layout::tabs::tab_label;
use crate::layout::tabs::tab_labels::{
    ARTIFACT_TAB, PRICE_RESEARCH_TAB, SKILLS_TAB, SKILL_WIZARD_TAB,
};
use crate::shared::icons::icon;
use crate::shared::storage::BrowserStorage;
use contracts::shared::layout_state;
use leptos::prelude::*;

#[derive(Clone, Debug, PartialEq)]
struct MenuGroup {
    id: &'static str,
    label: &'static str,
    icon: &'static str,
    items: Vec<(&'static str, &'static str)>, // (tab key, icon)
    open_by_default: bool,
}

fn get_menu_groups() -> Vec<MenuGroup> {
    vec![
        MenuGroup {
            id: "nav-documentos",
            label: "Documentos",
            icon: "file-text",
            items: vec![(ARTIFACT_TAB, "message-square")],
            open_by_default: true,
        },
        MenuGroup {
            id: "nav-compras",
            label: "Compras",
            icon: "dollar-sign",
            items: vec![(PRICE_RESEARCH_TAB, "search")],
            open_by_default: true,
        },
        MenuGroup {
            id: "nav-configuracoes",
            label: "Configurações",
            icon: "settings",
            items: vec![(SKILLS_TAB, "zap"), (SKILL_WIZARD_TAB, "message-square")],
            open_by_default: false,
        },
    ]
}

#[component]
pub fn Sidebar() -> impl IntoView {
    let ctx = use_context::<AppGlobalContext>().expect("AppGlobalContext not found");

    view! {
        <nav class="app-sidebar__content">
            {get_menu_groups()
                .into_iter()
                .map(|group| {
                    let group_id = group.id;
                    let expanded = RwSignal::new(layout_state::accordion_open(
                        &BrowserStorage,
                        group_id,
                        group.open_by_default,
                    ));
                    let toggle = move |_| {
                        let open = layout_state::toggle_accordion(
                            &BrowserStorage,
                            group_id,
                            expanded.get_untracked(),
                        );
                        expanded.set(open);
                    };
                    let items = StoredValue::new(group.items.clone());

                    view! {
                        <div class="app-sidebar__group">
                            <div class="app-sidebar__item" on:click=toggle>
                                <div class="app-sidebar__item-content">
                                    {icon(group.icon)}
                                    <span>{group.label}</span>
                                </div>
                                <div
                                    class="app-sidebar__chevron"
                                    class:app-sidebar__chevron--expanded=move || expanded.get()
                                >
                                    {icon("chevron-right")}
                                </div>
                            </div>
                            <Show when=move || expanded.get()>
                                <div class="app-sidebar__children">
                                    {items
                                        .get_value()
                                        .into_iter()
                                        .map(|(key, icon_name)| {
                                            let label = tab_label(key);
                                            view! {
                                                <div
                                                    class="app-sidebar__item"
                                                    class:app-sidebar__item--active=move || {
                                                        ctx.active.get().as_deref() == Some(key)
                                                    }
                                                    on:click=move |_| ctx.open_tab(key, label)
                                                >
                                                    <div class="app-sidebar__item-content">
                                                        {icon(icon_name)}
                                                        <span>{label}</span>
                                                    </div>
                                                </div>
                                            }
                                        })
                                        .collect_view()}
                                </div>
                            </Show>
                        </div>
                    }
                })
                .collect_view()}
        </nav>
    }
}
