//! Model dropdown shared by the chat header and the per-field panels.

use contracts::domain::a004_ai_model::{ModelPreference, ModelsResponse, SelectedModel};
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::model::fetch_models;
use crate::shared::config::use_config;
use crate::shared::storage::BrowserStorage;

/// Model catalogue loaded once per page.
#[derive(Clone, Copy)]
pub struct ModelCatalog {
    pub models: RwSignal<ModelsResponse>,
    pub loaded: RwSignal<bool>,
}

impl ModelCatalog {
    /// Persisted selection resolved against the loaded catalogue.
    pub fn resolve_preference(&self) -> SelectedModel {
        self.models
            .with_untracked(|catalogue| ModelPreference::new(BrowserStorage).resolve(catalogue))
    }
}

/// Returns the page catalogue, fetching it on first use.
pub fn use_model_catalog() -> ModelCatalog {
    if let Some(catalog) = use_context::<ModelCatalog>() {
        return catalog;
    }
    let catalog = ModelCatalog {
        models: RwSignal::new(ModelsResponse::default()),
        loaded: RwSignal::new(false),
    };
    provide_context(catalog);

    let endpoint = use_config().endpoints.models;
    spawn_local(async move {
        match fetch_models(&endpoint).await {
            Ok(models) => catalog.models.set(models),
            Err(e) => log::warn!("model catalogue unavailable: {}", e),
        }
        catalog.loaded.set(true);
    });
    catalog
}

/// `<select>` over the catalogue. With `persist` the choice becomes the
/// global preference.
#[component]
pub fn ModelSelector(
    #[prop(into)] selected: Signal<SelectedModel>,
    on_change: Callback<SelectedModel>,
    #[prop(optional)] persist: bool,
    #[prop(optional, into)] disabled: Signal<bool>,
) -> impl IntoView {
    let catalog = use_model_catalog();

    let handle_change = move |ev: leptos::ev::Event| {
        let id = event_target_value(&ev);
        let model = catalog.models.with_untracked(|c| {
            c.find(&id)
                .map(|m| SelectedModel::new(&m.id, &m.name))
                .unwrap_or_else(|| SelectedModel::new(id.clone(), id.clone()))
        });
        if persist {
            ModelPreference::new(BrowserStorage).save(&model);
        }
        on_change.run(model);
    };

    view! {
        <select
            class="model-selector"
            title="Modelo de IA"
            prop:disabled=move || disabled.get()
            on:change=handle_change
        >
            {move || {
                let current = selected.get();
                let models = catalog.models.get().models;
                let known = models.iter().any(|m| m.id == current.id);
                let fallback = (!known).then(|| {
                    view! {
                        <option value=current.id.clone() selected=true>
                            {current.name.clone()}
                        </option>
                    }
                });
                view! {
                    {fallback}
                    {models
                        .into_iter()
                        .map(|m| {
                            let is_selected = m.id == current.id;
                            let label = if m.icon.is_empty() {
                                m.name.clone()
                            } else {
                                format!("{} {}", m.icon, m.name)
                            };
                            view! {
                                <option value=m.id.clone() selected=is_selected title=m.description.clone()>
                                    {label}
                                </option>
                            }
                        })
                        .collect_view()}
                }
            }}
        </select>
    }
}
