//! Deep research dialog: context prompt, then the live step timeline.

use contracts::usecases::u502_deep_research::ResearchEvent;
use leptos::prelude::*;
use thaw::*;

use super::view_model::ArtifactVm;
use crate::shared::components::Modal;

fn research_step(event: ResearchEvent) -> impl IntoView {
    let queries = event.queries();
    view! {
        <div class=format!("research-step research-step--{}", event.step.css_class())>
            <span class="research-step__icon">{event.step.icon()}</span>
            <div class="research-step__body">
                <div>{event.message.clone()}</div>
                {(!queries.is_empty()).then(|| view! {
                    <ul class="research-step__queries">
                        {queries.into_iter().map(|q| view! { <li>{q}</li> }).collect_view()}
                    </ul>
                })}
            </div>
        </div>
    }
}

#[component]
pub fn DeepResearchDialog(vm: ArtifactVm) -> impl IntoView {
    let started = Memo::new(move |_| {
        vm.research
            .with(|r| r.as_ref().is_some_and(|r| r.progress.is_some()))
    });

    view! {
        <Modal
            title="🔍 Deep Research"
            modal_class="research-modal"
            on_close=Callback::new(move |_| vm.close_research())
        >
            <Show
                when=move || started.get()
                fallback=move || view! {
                    <p>
                        "O Deep Research realizará uma busca aprofundada na web para enriquecer seu documento."
                    </p>
                    <label class="form__label">"Qual o objetivo desta pesquisa? (Contexto)"</label>
                    <textarea
                        class="form__textarea"
                        rows="4"
                        placeholder="Ex: Buscar legislações específicas e preços de referência para o objeto."
                        prop:value=move || vm.research.with(|r| r.as_ref().map(|r| r.context.clone()).unwrap_or_default())
                        on:input=move |ev| {
                            let text = event_target_value(&ev);
                            vm.research.update(|r| {
                                if let Some(r) = r.as_mut() {
                                    r.context = text;
                                }
                            });
                        }
                    ></textarea>
                    {move || vm.research.with(|r| r.as_ref().and_then(|r| r.error.clone())).map(|e| view! {
                        <div class="error-text">"❌ "{e}</div>
                    })}
                    <Flex justify=FlexJustify::End gap=FlexGap::Small>
                        <Button appearance=ButtonAppearance::Secondary on_click=move |_| vm.close_research()>
                            "Cancelar"
                        </Button>
                        <Button appearance=ButtonAppearance::Primary on_click=move |_| vm.run_research()>
                            "Iniciar Pesquisa 🚀"
                        </Button>
                    </Flex>
                }
            >
                <div class="research-progress">
                    <div class="research-progress__status">
                        {move || vm.research.with(|r| {
                            r.as_ref()
                                .and_then(|r| r.progress.as_ref())
                                .map(|p| p.status.clone())
                                .unwrap_or_default()
                        })}
                    </div>
                    <div class="research-progress__steps">
                        {move || {
                            vm.research
                                .with(|r| {
                                    r.as_ref()
                                        .and_then(|r| r.progress.as_ref())
                                        .map(|p| p.steps.clone())
                                        .unwrap_or_default()
                                })
                                .into_iter()
                                .map(research_step)
                                .collect_view()
                        }}
                    </div>
                </div>
            </Show>
        </Modal>
    }
}
