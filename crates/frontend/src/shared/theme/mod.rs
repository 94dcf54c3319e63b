//! Theme provider, context and selector.
//!
//! The active theme is written to `data-theme` on `<body>`; the stylesheets
//! key their variables off that attribute. The preference is persisted under
//! `lia_theme`.

use contracts::shared::theme::{ThemeId, ThemePreference};
use leptos::prelude::*;
use web_sys::window;

use crate::shared::storage::BrowserStorage;

fn apply_theme(theme: ThemeId) {
    if let Some(body) = window().and_then(|w| w.document()).and_then(|d| d.body()) {
        let _ = body.set_attribute("data-theme", theme.as_str());
    }
}

/// Theme context type.
#[derive(Clone, Copy)]
pub struct ThemeContext {
    pub theme: RwSignal<ThemeId>,
}

impl ThemeContext {
    /// Set the theme and persist to storage.
    pub fn set_theme(&self, theme: ThemeId) {
        ThemePreference::new(BrowserStorage).save(theme);
        apply_theme(theme);
        self.theme.set(theme);
    }

    pub fn cycle_theme(&self) {
        let next = self.theme.get_untracked().next();
        self.set_theme(next);
    }
}

/// Provides theme context to children components.
#[component]
pub fn ThemeProvider(children: Children) -> impl IntoView {
    let initial = ThemePreference::new(BrowserStorage).load();
    apply_theme(initial);
    provide_context(ThemeContext {
        theme: RwSignal::new(initial),
    });

    children()
}

pub fn use_theme() -> ThemeContext {
    use_context::<ThemeContext>().expect("ThemeContext not found. Wrap your app with ThemeProvider.")
}

/// Theme selector dropdown component.
#[component]
pub fn ThemeSelector() -> impl IntoView {
    let ctx = use_theme();
    let is_open = RwSignal::new(false);

    view! {
        <div class="theme-selector">
            <button
                class="top-header__icon-btn"
                title="Alternar tema"
                on:click=move |_| ctx.cycle_theme()
            >
                {move || ctx.theme.get().icon()}
            </button>
            <button
                class="top-header__icon-btn"
                title="Escolher tema"
                on:click=move |_| is_open.update(|v| *v = !*v)
            >
                {crate::shared::icons::icon("palette")}
            </button>

            <Show when=move || is_open.get()>
                <div class="theme-dropdown">
                    {ThemeId::all().into_iter().map(|theme| {
                        view! {
                            <button
                                class="theme-dropdown__item"
                                class:theme-dropdown__item--active=move || ctx.theme.get() == theme
                                on:click=move |_| {
                                    ctx.set_theme(theme);
                                    is_open.set(false);
                                }
                            >
                                <span class="theme-dropdown__icon">{theme.icon()}</span>
                                <span class="theme-dropdown__name">{theme.display_name()}</span>
                                <small class="theme-dropdown__hint">{theme.description()}</small>
                            </button>
                        }
                    }).collect_view()}
                </div>
            </Show>
        </div>
    }
}
