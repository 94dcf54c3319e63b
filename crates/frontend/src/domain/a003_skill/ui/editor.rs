//! Skill form with length counters, JSON fields and knowledge-base upload.

use contracts::domain::a003_skill::draft::{
    SkillPayload, DESCRIPTION_MAX, INSTRUCTIONS_MAX, NAME_MAX,
};
use contracts::domain::a003_skill::SkillDraft;
use leptos::prelude::*;
use leptos::task::spawn_local;
use thaw::*;
use uuid::Uuid;

use crate::shared::api_utils::upload_file;
use crate::shared::config::use_config;
use crate::shared::dom::{click_element, take_selected_file};
use crate::shared::icons::icon;
use crate::shared::notifications::use_notifications;

fn counter(text: &str, max: usize) -> String {
    format!("{}/{}", text.chars().count(), max)
}

#[component]
pub fn SkillEditor(
    draft: RwSignal<SkillDraft>,
    #[prop(into)] saving: Signal<bool>,
    on_save: Callback<SkillPayload>,
    on_cancel: Callback<()>,
    #[prop(optional, into)] save_label: Option<String>,
) -> impl IntoView {
    let config = use_config();
    let notifications = use_notifications();
    let error = RwSignal::new(None::<String>);
    let uploading = RwSignal::new(false);
    let file_input_id = format!("skill-kb-{}", Uuid::new_v4());
    let save_label = save_label.unwrap_or_else(|| "Salvar".to_string());

    let handle_save = move |_| match draft.with_untracked(|d| d.validate()) {
        Ok(payload) => {
            error.set(None);
            on_save.run(payload);
        }
        Err(e) => error.set(Some(e.user_message().to_string())),
    };

    let upload_endpoint = StoredValue::new(config.endpoints.upload.clone());
    let handle_file = move |ev: leptos::ev::Event| {
        let Some(file) = take_selected_file(&ev) else {
            return;
        };
        uploading.set(true);
        spawn_local(async move {
            let endpoint = upload_endpoint.get_value();
            match upload_file(&endpoint, &file).await {
                Ok(upload) => {
                    let mut outcome = Ok(false);
                    draft.update(|d| outcome = d.append_upload(&upload));
                    match outcome {
                        Ok(true) => notifications
                            .success(format!("Texto extraído de {}", upload.filename)),
                        Ok(false) => notifications
                            .warning(format!("Nenhum texto extraído de {}", upload.filename)),
                        Err(e) => notifications.error(e.user_message().to_string()),
                    };
                }
                Err(e) => {
                    notifications.error(format!("Erro no upload: {}", e));
                }
            }
            uploading.set(false);
        });
    };

    let input_id_for_click = file_input_id.clone();

    view! {
        <div class="skill-editor">
            {move || error.get().map(|e| view! { <div class="form__error">{e}</div> })}

            <label class="form__label">
                "Nome"
                <span class="form__counter">{move || draft.with(|d| counter(&d.nome, NAME_MAX))}</span>
            </label>
            <input
                class="form__input"
                maxlength=NAME_MAX
                prop:value=move || draft.with(|d| d.nome.clone())
                on:input=move |ev| draft.update(|d| d.nome = event_target_value(&ev))
            />

            <label class="form__label">
                "Descrição"
                <span class="form__counter">
                    {move || draft.with(|d| counter(&d.descricao, DESCRIPTION_MAX))}
                </span>
            </label>
            <textarea
                class="form__textarea"
                rows=2
                maxlength=DESCRIPTION_MAX
                prop:value=move || draft.with(|d| d.descricao.clone())
                on:input=move |ev| draft.update(|d| d.descricao = event_target_value(&ev))
            />

            <label class="form__label">
                "Instruções"
                <span class="form__counter">
                    {move || draft.with(|d| counter(&d.instrucoes, INSTRUCTIONS_MAX))}
                </span>
            </label>
            <textarea
                class="form__textarea"
                rows=8
                maxlength=INSTRUCTIONS_MAX
                prop:value=move || draft.with(|d| d.instrucoes.clone())
                on:input=move |ev| draft.update(|d| d.instrucoes = event_target_value(&ev))
            />

            <label class="form__label">"Tools (lista JSON)"</label>
            <textarea
                class="form__textarea form__textarea--code"
                rows=3
                placeholder="[\"web_search\"]"
                prop:value=move || draft.with(|d| d.tools_json.clone())
                on:input=move |ev| draft.update(|d| d.tools_json = event_target_value(&ev))
            />

            <label class="form__label">
                "Base de conhecimento (JSON)"
                <button
                    class="form__inline-btn"
                    type="button"
                    disabled=move || uploading.get()
                    on:click=move |_| click_element(&input_id_for_click)
                >
                    {icon("paperclip")}
                    {move || if uploading.get() { " Extraindo..." } else { " Anexar documento" }}
                </button>
            </label>
            <input type="file" id=file_input_id style="display: none;" on:change=handle_file />
            <textarea
                class="form__textarea form__textarea--code"
                rows=6
                placeholder="[{\"titulo\": \"...\", \"conteudo\": \"...\"}]"
                prop:value=move || draft.with(|d| d.textos_base_json.clone())
                on:input=move |ev| draft.update(|d| d.textos_base_json = event_target_value(&ev))
            />

            <Flex justify=FlexJustify::End style="gap: 8px; margin-top: 12px;">
                <Button appearance=ButtonAppearance::Secondary on_click=move |_| on_cancel.run(())>
                    "Cancelar"
                </Button>
                <Button
                    appearance=ButtonAppearance::Primary
                    disabled=saving
                    on_click=handle_save
                >
                    {move || if saving.get() { "Salvando...".to_string() } else { save_label.clone() }}
                </Button>
            </Flex>
        </div>
    }
}
