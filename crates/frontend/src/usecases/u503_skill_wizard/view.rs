//! Guided skill creation: a streamed conversation that ends in a
//! pre-filled skill form.

use super::model::stream_wizard_turn;
use crate::domain::a003_skill::ui::{create_skill, SkillEditor};
use crate::domain::a004_ai_model::ui::ModelSelector;
use crate::shared::api_utils::upload_file;
use crate::shared::components::{Modal, PageHeader, RichText};
use crate::shared::config::use_config;
use crate::shared::dom::{click_element, take_selected_file};
use crate::shared::icons::icon;
use crate::shared::notifications::use_notifications;
use crate::shared::storage::BrowserStorage;
use contracts::domain::a001_chat_message::ChatRole;
use contracts::domain::a003_skill::draft::SkillPayload;
use contracts::domain::a003_skill::SkillDraft;
use contracts::domain::a004_ai_model::{ModelPreference, SelectedModel};
use contracts::usecases::u503_skill_wizard::WizardSession;
use leptos::prelude::*;
use leptos::task::spawn_local;
use thaw::*;

const WIZARD_FILE_INPUT_ID: &str = "skill-wizard-file";
const WIZARD_INTRO: &str = "Olá! Vou te ajudar a criar uma nova **skill**. Conte qual tarefa você quer que a LIA execute e em que tipo de documento ela deve ser usada.";

#[component]
pub fn SkillWizardView(on_saved: Callback<()>) -> impl IntoView {
    let config = use_config();
    let notifications = use_notifications();
    let session = RwSignal::new(WizardSession::new());
    let input = RwSignal::new(String::new());
    let model = RwSignal::new(ModelPreference::new(BrowserStorage).load());
    let file_label = RwSignal::new(None::<String>);
    let uploading = RwSignal::new(false);
    let draft = RwSignal::new(SkillDraft::default());
    let preview_open = RwSignal::new(false);
    let saving = RwSignal::new(false);
    let messages_ref = NodeRef::<leptos::html::Div>::new();

    let chat_endpoint = StoredValue::new(config.endpoints.skills_chat.clone());
    let skills_endpoint = StoredValue::new(config.endpoints.skills.clone());
    let upload_endpoint = StoredValue::new(config.endpoints.upload.clone());
    let idle_timeout = config.chat.stream_idle_timeout_secs;

    let scroll_to_bottom = move || {
        if let Some(container) = messages_ref.get() {
            request_animation_frame(move || container.set_scroll_top(container.scroll_height()));
        }
    };

    let send = move || {
        let content = input.get_untracked();
        let model_id = model.with_untracked(|m| m.id.clone());
        let mut request = None;
        session.update(|s| request = s.begin_send(&content, &model_id));
        let Some(request) = request else {
            return;
        };
        input.set(String::new());
        file_label.set(None);
        scroll_to_bottom();

        spawn_local(async move {
            let result = stream_wizard_turn(
                &chat_endpoint.get_value(),
                &request,
                idle_timeout,
                |event| {
                    let mut ready = false;
                    session.update(|s| ready = s.apply_event(event));
                    if ready {
                        if let Some(proposal) = session.with_untracked(|s| s.proposal().cloned()) {
                            draft.set(proposal);
                            preview_open.set(true);
                        }
                    }
                    scroll_to_bottom();
                },
            )
            .await;
            match result {
                Ok(()) => session.update(|s| s.finish()),
                Err(e) => {
                    log::error!("skill wizard turn failed: {}", e);
                    session.update(|s| s.fail());
                }
            }
            scroll_to_bottom();
        });
    };

    let handle_file = move |ev: leptos::ev::Event| {
        let Some(file) = take_selected_file(&ev) else {
            return;
        };
        uploading.set(true);
        spawn_local(async move {
            match upload_file(&upload_endpoint.get_value(), &file).await {
                Ok(upload) => {
                    let mut label = String::new();
                    session.update(|s| label = s.attach_file(&upload));
                    file_label.set(Some(label));
                }
                Err(e) => {
                    notifications.error(format!("Erro no upload: {}", e));
                }
            }
            uploading.set(false);
        });
    };

    let handle_save = Callback::new(move |payload: SkillPayload| {
        saving.set(true);
        spawn_local(async move {
            match create_skill(&skills_endpoint.get_value(), &payload).await {
                Ok(skill) => {
                    notifications.success(format!("Skill \"{}\" criada com sucesso", skill.nome));
                    preview_open.set(false);
                    session.update(|s| {
                        s.take_proposal();
                    });
                    on_saved.run(());
                }
                Err(e) => {
                    notifications.error(format!("Erro ao salvar skill: {}", e));
                }
            }
            saving.set(false);
        });
    });

    let is_sending = Signal::derive(move || session.with(|s| s.is_sending()));

    view! {
        <div class="page skill-wizard">
            <PageHeader title="Assistente de Skills" subtitle="Descreva a tarefa e a LIA monta a skill">
                <ModelSelector
                    selected=model
                    on_change=Callback::new(move |m: SelectedModel| model.set(m))
                    persist=true
                    disabled=is_sending
                />
                <Show when=move || session.with(|s| s.proposal().is_some())>
                    <Button appearance=ButtonAppearance::Primary on_click=move |_| preview_open.set(true)>
                        "Revisar skill"
                    </Button>
                </Show>
            </PageHeader>

            <div class="chat__messages" node_ref=messages_ref>
                <div class="chat__message chat__message--assistant">
                    <RichText text=WIZARD_INTRO.to_string() />
                </div>
                {move || {
                    session.with(|s| {
                        s.transcript()
                            .iter()
                            .map(|line| {
                                let class = match line.role {
                                    ChatRole::User => "chat__message chat__message--user",
                                    _ => "chat__message chat__message--assistant",
                                };
                                view! {
                                    <div class=class>
                                        <RichText text=line.text.clone() />
                                    </div>
                                }
                            })
                            .collect_view()
                    })
                }}
                <Show when=move || is_sending.get()>
                    <div class="chat__message chat__message--assistant chat__message--streaming">
                        {move || {
                            let text = session.with(|s| s.reply_display());
                            if text.is_empty() {
                                view! { <span class="chat__typing">"..."</span> }.into_any()
                            } else {
                                view! { <RichText text=text /> }.into_any()
                            }
                        }}
                    </div>
                </Show>
            </div>

            {move || file_label.get().map(|label| view! {
                <div class="chat__chip">
                    <span>{label}</span>
                    <button
                        title="Remover"
                        on:click=move |_| {
                            session.update(|s| s.clear_file());
                            file_label.set(None);
                        }
                    >
                        {icon("x")}
                    </button>
                </div>
            })}

            <Flex style="gap: 8px; align-items: flex-end;">
                <input
                    type="file"
                    id=WIZARD_FILE_INPUT_ID
                    style="display: none;"
                    on:change=handle_file
                />
                <div style="flex: 1;">
                    <Textarea
                        value=input
                        placeholder="Descreva a skill... (Ctrl+Enter para enviar)"
                        attr:style="width: 100%; min-height: 60px;"
                        disabled=is_sending
                        on:keydown=move |ev: web_sys::KeyboardEvent| {
                            if ev.key() == "Enter" && ev.ctrl_key() {
                                ev.prevent_default();
                                send();
                            }
                        }
                    />
                </div>
                <Button
                    appearance=ButtonAppearance::Secondary
                    disabled=Signal::derive(move || is_sending.get() || uploading.get())
                    on_click=move |_| click_element(WIZARD_FILE_INPUT_ID)
                >
                    {icon("paperclip")}
                </Button>
                <Button
                    appearance=ButtonAppearance::Primary
                    disabled=is_sending
                    on_click=move |_| send()
                >
                    {icon("send")}
                    {move || if is_sending.get() { " Enviando..." } else { " Enviar" }}
                </Button>
            </Flex>

            <Show when=move || preview_open.get()>
                <Modal
                    title="Revisar skill"
                    on_close=Callback::new(move |_| preview_open.set(false))
                >
                    <SkillEditor
                        draft=draft
                        saving=saving
                        on_save=handle_save
                        on_cancel=Callback::new(move |_| preview_open.set(false))
                        save_label="Criar skill"
                    />
                </Modal>
            </Show>
        </div>
    }
}
