use contracts::domain::a001_chat_message::ChatRole;
use contracts::domain::a004_ai_model::SelectedModel;
use contracts::usecases::u501_artifact_generation::intent::display_text;
use leptos::prelude::*;
use thaw::*;

use super::deep_research::DeepResearchDialog;
use super::fields_panel::FieldsPanel;
use super::model::load_artifact_config;
use super::view_model::ArtifactVm;
use crate::domain::a004_ai_model::ui::{use_model_catalog, ModelSelector};
use crate::shared::components::RichText;
use crate::shared::config::use_config;
use crate::shared::dom::{click_element, take_selected_file};
use crate::shared::icons::icon;
use crate::shared::notifications::use_notifications;

const CHAT_FILE_INPUT_ID: &str = "artifact-chat-file";

/// Artifact page hosted in a tab; shows a notice when the page embeds no
/// artifact configuration.
#[component]
pub fn ArtifactWorkspace() -> impl IntoView {
    match load_artifact_config() {
        Ok(config) => {
            let vm = ArtifactVm::new(config, &use_config(), use_notifications());
            vm.init();
            view! { <ArtifactChat vm=vm /> }.into_any()
        }
        Err(e) => {
            log::warn!("artifact workspace unavailable: {}", e);
            view! {
                <div class="placeholder">
                    <h2>"Nenhum artefato em elaboração"</h2>
                    <p>"Abra um artefato a partir da página do projeto para conversar com a LIA."</p>
                </div>
            }
            .into_any()
        }
    }
}

#[component]
fn ContextCard(vm: ArtifactVm) -> impl IntoView {
    view! {
        <details class="context-card">
            <summary>"Contexto do projeto"</summary>
            <div class="context-card__grid">
                <label>
                    "Gestor do contrato"
                    <input
                        type="text"
                        prop:value=move || vm.gestor.get()
                        on:input=move |ev| vm.gestor.set(event_target_value(&ev))
                    />
                </label>
                <label>
                    "Fiscal do contrato"
                    <input
                        type="text"
                        prop:value=move || vm.fiscal.get()
                        on:input=move |ev| vm.fiscal.set(event_target_value(&ev))
                    />
                </label>
                <label>
                    "Data limite"
                    <input
                        type="date"
                        prop:value=move || vm.data_limite.get()
                        on:input=move |ev| vm.data_limite.set(event_target_value(&ev))
                    />
                </label>
            </div>
        </details>
    }
}

#[component]
fn SkillsDropdown(vm: ArtifactVm) -> impl IntoView {
    let open = RwSignal::new(false);
    let active_count = Memo::new(move |_| vm.session.with(|s| s.active_skills().len()));

    let items = move || {
        if vm.skills_error.get() {
            return view! { <span class="skills-dropdown__empty">"Erro ao carregar skills."</span> }
                .into_any();
        }
        let active = vm.session.with(|s| s.active_skills().clone());
        vm.skills.with(|skills| {
            if skills.is_empty() {
                return view! { <span class="skills-dropdown__empty">"Nenhuma skill disponível."</span> }
                    .into_any();
            }
            skills
                .iter()
                .map(|skill| {
                    let id = skill.id;
                    let is_active = active.contains(&id);
                    view! {
                        <div
                            class="skill-item"
                            class:active=is_active
                            on:click=move |_| vm.toggle_skill(id)
                        >
                            <span class="skill-item__check">{if is_active { "☑" } else { "☐" }}</span>
                            <div>
                                <div class="skill-item__name">
                                    {skill.icon().to_string()}" "{skill.nome.clone()}
                                </div>
                                <div class="skill-item__description">{skill.description().to_string()}</div>
                            </div>
                        </div>
                    }
                })
                .collect_view()
                .into_any()
        })
    };

    view! {
        <div class="skills-dropdown">
            <button
                class="chat__tool"
                title="Skills da sessão"
                on:click=move |_| open.update(|o| *o = !*o)
            >
                {icon("zap")}
                <Show when=move || { active_count.get() > 0 }>
                    <span class="badge">{move || active_count.get()}</span>
                </Show>
            </button>
            <Show when=move || open.get()>
                <div class="skills-dropdown__menu">{items}</div>
            </Show>
        </div>
    }
}

#[component]
fn ChatMessages(vm: ArtifactVm) -> impl IntoView {
    let container = NodeRef::<leptos::html::Div>::new();

    Effect::new(move |_| {
        vm.session.with(|s| {
            (
                s.messages().len(),
                s.current_turn().map(|t| t.content.len() + t.reasoning.len()),
            )
        });
        if let Some(el) = container.get() {
            request_animation_frame(move || el.set_scroll_top(el.scroll_height()));
        }
    });

    let history = move || {
        vm.session.with(|s| {
            s.messages()
                .iter()
                .map(|m| {
                    let class = match m.role {
                        ChatRole::User => "chat__message chat__message--user",
                        _ => "chat__message chat__message--assistant",
                    };
                    view! {
                        <div class=class>
                            <RichText text=display_text(&m.content) />
                        </div>
                    }
                })
                .collect_view()
        })
    };

    let streaming = move || {
        let turn = vm.session.with(|s| s.current_turn().cloned())?;
        let body = if turn.has_output() {
            let reasoning = (!turn.reasoning.is_empty()).then(|| {
                view! {
                    <details class="chat__reasoning" open=turn.reasoning_open()>
                        <summary>"Raciocínio"</summary>
                        <RichText text=turn.reasoning.clone() />
                    </details>
                }
            });
            view! {
                {reasoning}
                <RichText text=display_text(&turn.content) />
            }
            .into_any()
        } else {
            view! { <span class="chat__typing">"LIA está digitando..."</span> }.into_any()
        };
        Some(view! {
            <div class="chat__message chat__message--assistant chat__message--streaming">{body}</div>
        })
    };

    view! {
        <div class="chat__messages" node_ref=container>
            {history}
            {streaming}
        </div>
    }
}

#[component]
fn ArtifactChat(vm: ArtifactVm) -> impl IntoView {
    let catalog = use_model_catalog();
    let adopted = StoredValue::new(false);
    Effect::new(move |_| {
        if catalog.loaded.get() && !adopted.get_value() {
            adopted.set_value(true);
            vm.adopt_model(catalog.resolve_preference());
        }
    });

    let busy = Signal::derive(move || vm.session.with(|s| s.is_busy()));
    let chat_disabled = Signal::derive(move || !vm.session.with(|s| s.chat_enabled()));
    let supports_research = vm
        .session
        .with_untracked(|s| s.config().supports_deep_research());
    let title = vm
        .session
        .with_untracked(|s| format!("LIA · {}", s.config().artifact_label));

    let handle_file = move |ev: leptos::ev::Event| {
        if let Some(file) = take_selected_file(&ev) {
            vm.upload(file, None);
        }
    };

    let attachment_chips = move || {
        vm.session
            .with(|s| s.attachments().to_vec())
            .into_iter()
            .map(|att| {
                let filename = att.filename.clone();
                let glyph = if att.mime_type == "application/pdf" { "📕" } else { "📄" };
                view! {
                    <span class="chat__chip">
                        {glyph}" "{att.filename.clone()}
                        <button title="Remover" on:click=move |_| vm.remove_attachment(&filename)>
                            {icon("x")}
                        </button>
                    </span>
                }
            })
            .collect_view()
    };

    view! {
        <div class=move || format!("artifact-page {}", vm.session.with(|s| s.phase().layout_class()))>
            <section class="chat">
                <div class="chat__header">
                    <h2>{title}</h2>
                    <ModelSelector
                        selected=Signal::derive(move || vm.session.with(|s| s.model().clone()))
                        on_change=Callback::new(move |m: SelectedModel| vm.adopt_model(m))
                        persist=true
                        disabled=busy
                    />
                </div>

                <ContextCard vm=vm />
                <ChatMessages vm=vm />

                <Show when=move || vm.session.with(|s| s.ready_to_generate())>
                    <div class="chat__authorize">
                        <span>"A LIA reuniu informações suficientes para gerar o documento."</span>
                        <Button
                            appearance=ButtonAppearance::Primary
                            disabled=busy
                            on_click=move |_| vm.authorize(None)
                        >
                            "⚡ Autorizar geração"
                        </Button>
                    </div>
                </Show>

                <Show when=move || vm.session.with(|s| s.can_retry_generation())>
                    <div class="chat__authorize chat__authorize--retry">
                        <span>"A geração foi interrompida antes de preencher os campos."</span>
                        <Button appearance=ButtonAppearance::Primary on_click=move |_| vm.authorize(None)>
                            "🔁 Tentar novamente"
                        </Button>
                    </div>
                </Show>

                <div class="chat__chips">{attachment_chips}</div>

                <div class="chat__input">
                    <input
                        type="file"
                        id=CHAT_FILE_INPUT_ID
                        style="display: none;"
                        on:change=handle_file
                    />
                    <button
                        class="chat__tool"
                        title="Anexar arquivo"
                        disabled=move || vm.uploading.get() || chat_disabled.get()
                        on:click=move |_| click_element(CHAT_FILE_INPUT_ID)
                    >
                        {icon("paperclip")}
                    </button>
                    <SkillsDropdown vm=vm />
                    {supports_research.then(|| view! {
                        <button
                            class="chat__tool chat__tool--research"
                            class:active=move || vm.session.with(|s| s.deep_research_enabled())
                            title="Deep Research antes da geração"
                            on:click=move |_| vm.toggle_deep_research()
                        >
                            {icon("search")}
                        </button>
                    })}
                    <textarea
                        class="chat__textarea"
                        rows="2"
                        placeholder="Digite sua mensagem... (Shift+Enter para nova linha)"
                        prop:value=move || vm.input.get()
                        prop:disabled=move || chat_disabled.get()
                        on:input=move |ev| vm.input.set(event_target_value(&ev))
                        on:keydown=move |ev: web_sys::KeyboardEvent| {
                            if ev.key() == "Enter" && !ev.shift_key() {
                                ev.prevent_default();
                                vm.send_message();
                            }
                        }
                    ></textarea>
                    <Button
                        appearance=ButtonAppearance::Primary
                        disabled=chat_disabled
                        on_click=move |_| vm.send_message()
                    >
                        {icon("send")}
                    </Button>
                </div>

                <Show when=move || vm.session.with(|s| s.can_force_generate())>
                    <div class="chat__force">
                        <Button appearance=ButtonAppearance::Subtle on_click=move |_| vm.force_generate()>
                            "✨ Gerar agora"
                        </Button>
                    </div>
                </Show>
            </section>

            <FieldsPanel vm=vm />

            <Show when=move || vm.research.with(|r| r.is_some())>
                <DeepResearchDialog vm=vm />
            </Show>
        </div>
    }
}
