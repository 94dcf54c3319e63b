//! Right-hand workspace: one card per artifact field.

use contracts::domain::a002_artifact::{ArtifactFieldSpec, ArtifactStatus, FieldKind};
use contracts::usecases::u501_artifact_generation::GenerationPhase;
use leptos::prelude::*;
use thaw::*;

use super::regen_panel::RegenPanel;
use super::view_model::ArtifactVm;
use crate::shared::icons::icon;

#[component]
fn FieldCard(vm: ArtifactVm, field: ArtifactFieldSpec) -> impl IntoView {
    let key = StoredValue::new(field.key.clone());
    let kind = field.kind;
    let rows = field.rows.to_string();
    let editing = vm.is_editing();

    let value = Memo::new(move |_| key.with_value(|k| vm.session.with(|s| s.field_value(k))));
    let status = Memo::new(move |_| key.with_value(|k| vm.session.with(|s| s.field_status(k))));
    let panel_open = Memo::new(move |_| key.with_value(|k| vm.session.with(|s| s.regen().is_open(k))));

    let body = match kind {
        FieldKind::Auto => view! {
            <div class="field-card__value field-card__value--locked">
                {icon("settings")}
                <span>{move || value.get()}</span>
            </div>
        }
        .into_any(),
        FieldKind::Riscos | FieldKind::Custom => view! {
            <pre class="field-card__value field-card__value--structured">{move || value.get()}</pre>
        }
        .into_any(),
        _ => view! {
            <textarea
                class="field-card__input"
                rows=rows
                prop:value=move || value.get()
                prop:readonly=move || !editing.get() || vm.session.with(|s| s.is_regenerating())
                on:input=move |ev| {
                    let text = event_target_value(&ev);
                    key.with_value(|k| vm.set_field(k, text));
                }
            ></textarea>
        }
        .into_any(),
    };

    view! {
        <div
            class="field-card"
            class:field-card--generating=move || status.get().css_class() == "generating"
        >
            <div class="field-card__header">
                <span class="field-card__title">{field.icon.clone()}" "{field.label.clone()}</span>
                <span class=move || format!("field-status field-status--{}", status.get().css_class())>
                    {move || status.get().label()}
                </span>
                <Show when=move || kind.is_regenerable() && editing.get()>
                    <button
                        class="field-card__regen"
                        class:active=move || panel_open.get()
                        title="Regenerar com IA"
                        on:click=move |_| key.with_value(|k| vm.toggle_regen_panel(k))
                    >
                        {icon("zap")}
                    </button>
                </Show>
            </div>
            {body}
            <Show when=move || panel_open.get()>
                <RegenPanel vm=vm field_key=key.get_value() />
            </Show>
        </div>
    }
}

#[component]
pub fn FieldsPanel(vm: ArtifactVm) -> impl IntoView {
    let fields: Vec<ArtifactFieldSpec> = vm.session.with_untracked(|s| {
        s.fields()
            .iter()
            .filter(|f| f.kind != FieldKind::Hidden)
            .cloned()
            .collect()
    });
    let label = vm
        .session
        .with_untracked(|s| s.config().artifact_label.clone());
    let label = StoredValue::new(label);
    let editing = vm.is_editing();
    let has_ref = vm.artifact_ref().is_some();
    let saving = Signal::derive(move || vm.saving.get() || vm.session.with(|s| s.is_busy()));

    view! {
        <section class="workspace">
            <div class="workspace__header">
                <h2>{move || vm.session.with(|s| s.workspace_title())}</h2>
                <span class="workspace__badge">{move || vm.session.with(|s| s.status_badge())}</span>
                <span class="workspace__progress">{move || vm.session.with(|s| s.progress_label())}</span>
            </div>
            <Show when=move || vm.session.with(|s| s.phase() == GenerationPhase::Preparation)>
                <div class="workspace__hint">
                    "Converse com a LIA ao lado. Os campos serão preenchidos quando a geração for autorizada."
                </div>
            </Show>

            <div class="workspace__fields">
                {fields
                    .into_iter()
                    .map(|field| view! { <FieldCard vm=vm field=field /> })
                    .collect_view()}
            </div>

            <Show when=move || editing.get()>
                <Flex justify=FlexJustify::SpaceBetween align=FlexAlign::Center class="workspace__actions">
                    <Button appearance=ButtonAppearance::Secondary on_click=move |_| vm.back_to_project()>
                        "Voltar ao projeto"
                    </Button>
                    <Flex gap=FlexGap::Small>
                        <Button
                            appearance=ButtonAppearance::Secondary
                            disabled=saving
                            on_click=move |_| vm.save(ArtifactStatus::Rascunho)
                        >
                            "Salvar rascunho"
                        </Button>
                        <Button
                            appearance=ButtonAppearance::Primary
                            disabled=saving
                            on_click=move |_| vm.save(ArtifactStatus::Aprovado)
                        >
                            {format!("Aprovar {}", label.get_value())}
                        </Button>
                    </Flex>
                </Flex>
                <Show when=move || has_ref>
                    <Flex gap=FlexGap::Small class="workspace__lifecycle">
                        <Button appearance=ButtonAppearance::Subtle on_click=move |_| vm.new_version()>
                            "Nova versão"
                        </Button>
                        <Button appearance=ButtonAppearance::Subtle on_click=move |_| vm.open_pdf()>
                            {icon("download")}
                            " PDF"
                        </Button>
                        <Button appearance=ButtonAppearance::Subtle on_click=move |_| vm.publish_sei()>
                            "Publicar no SEI"
                        </Button>
                        <Button appearance=ButtonAppearance::Subtle on_click=move |_| vm.delete()>
                            {icon("trash")}
                            " Excluir"
                        </Button>
                    </Flex>
                </Show>
            </Show>
        </section>
    }
}
