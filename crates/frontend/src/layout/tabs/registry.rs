//! Maps a tab key to its view. Every tab key is resolved here.

use super::tab_labels::{ARTIFACT_TAB, PRICE_RESEARCH_TAB, SKILLS_TAB, SKILL_WIZARD_TAB};
use crate::domain::a003_skill::ui::SkillSettings;
use crate::layout::global_context::AppGlobalContext;
use crate::projections::p901_price_research::ui::PriceResearchView;
use crate::usecases::u501_artifact_generation::ArtifactWorkspace;
use crate::usecases::u503_skill_wizard::SkillWizardView;
use leptos::logging::log;
use leptos::prelude::*;

pub fn render_tab_content(key: &str, tabs_store: AppGlobalContext) -> AnyView {
    match key {
        ARTIFACT_TAB => view! { <ArtifactWorkspace /> }.into_any(),
        PRICE_RESEARCH_TAB => view! { <PriceResearchView /> }.into_any(),
        SKILLS_TAB => view! { <SkillSettings /> }.into_any(),
        SKILL_WIZARD_TAB => {
            let on_saved = Callback::new(move |_| {
                tabs_store.close_tab(SKILL_WIZARD_TAB);
                tabs_store.open_tab(SKILLS_TAB, super::tab_label(SKILLS_TAB));
            });
            view! { <SkillWizardView on_saved=on_saved /> }.into_any()
        }
        _ => {
            log!("unknown tab key: {}", key);
            view! { <div class="placeholder">"Página não encontrada"</div> }.into_any()
        }
    }
}
