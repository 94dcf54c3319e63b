//! Inline regeneration panel under one field. Its model, attachments and
//! skills belong to that field alone.

use contracts::domain::a003_skill::autocomplete::suggestions;
use contracts::domain::a003_skill::SkillId;
use contracts::domain::a004_ai_model::SelectedModel;
use contracts::domain::a002_artifact::FieldStatus;
use contracts::usecases::u501_artifact_generation::RegenIndicators;
use leptos::prelude::*;
use thaw::*;
use wasm_bindgen::JsCast;

use super::view_model::{byte_to_utf16_offset, utf16_to_byte_offset, ArtifactVm};
use crate::domain::a004_ai_model::ui::ModelSelector;
use crate::shared::dom::{click_element, take_selected_file};
use crate::shared::icons::icon;

const MAX_SUGGESTIONS: usize = 6;

fn input_id(key: &str) -> String {
    format!("regen-input-{}", key)
}

fn file_input_id(key: &str) -> String {
    format!("regen-file-{}", key)
}

/// Caret of the textarea as a byte offset into its text.
fn caret_of(textarea: &web_sys::HtmlTextAreaElement, text: &str) -> usize {
    let pos = textarea
        .selection_start()
        .ok()
        .flatten()
        .unwrap_or(text.encode_utf16().count() as u32) as usize;
    utf16_to_byte_offset(text, pos)
}

fn restore_caret(key: &str, text: &str, byte_pos: usize) {
    let pos = byte_to_utf16_offset(text, byte_pos) as u32;
    if let Some(textarea) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(&input_id(key)))
        .and_then(|el| el.dyn_into::<web_sys::HtmlTextAreaElement>().ok())
    {
        textarea.set_value(text);
        let _ = textarea.focus();
        let _ = textarea.set_selection_range(pos, pos);
    }
}

#[component]
pub fn RegenPanel(vm: ArtifactVm, field_key: String) -> impl IntoView {
    let key = StoredValue::new(field_key);
    let skills_open = RwSignal::new(false);

    let context = Memo::new(move |_| {
        key.with_value(|k| vm.session.with(|s| s.regen().peek(k).cloned()))
    });
    let indicators = Memo::new(move |_| {
        context.get().map(|c| c.indicators()).unwrap_or(RegenIndicators {
            model_name: String::new(),
            attachment_count: 0,
            skill_count: 0,
        })
    });
    let regenerating = Signal::derive(move || {
        key.with_value(|k| {
            vm.session
                .with(|s| s.is_regenerating() && s.field_status(k) == FieldStatus::Generating)
        })
    });
    let busy = Signal::derive(move || vm.session.with(|s| s.is_regenerating()) || vm.uploading.get());

    let selected_model = Signal::derive(move || {
        context
            .get()
            .map(|c| c.model)
            .unwrap_or_else(|| vm.session.with(|s| s.model().clone()))
    });
    let on_model = Callback::new(move |model: SelectedModel| {
        key.with_value(|k| {
            vm.session.update(|s| {
                s.regen_mut().set_model(k, model);
            })
        });
    });

    let handle_input = move |ev: leptos::ev::Event| {
        let Some(textarea) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlTextAreaElement>().ok())
        else {
            return;
        };
        let text = textarea.value();
        let cursor = caret_of(&textarea, &text);
        key.with_value(|k| vm.set_regen_input(k, text, cursor));
    };

    let handle_keydown = move |ev: web_sys::KeyboardEvent| match ev.key().as_str() {
        "Enter" if !ev.shift_key() => {
            ev.prevent_default();
            vm.skill_popup.set(None);
            key.with_value(|k| vm.regenerate(k));
        }
        "Escape" => vm.skill_popup.set(None),
        _ => {}
    };

    let pick_skill = move |id: SkillId| {
        if let Some(cursor) = vm.pick_popup_skill(id) {
            key.with_value(|k| restore_caret(k, &vm.regen_input(k), cursor));
        }
    };

    let handle_file = move |ev: leptos::ev::Event| {
        if let Some(file) = take_selected_file(&ev) {
            vm.upload(file, Some(key.get_value()));
        }
    };

    let popup = move || {
        let state = vm
            .skill_popup
            .get()
            .filter(|p| key.with_value(|k| &p.field_key == k))?;
        let items = vm.skills.with(|skills| {
            suggestions(skills, &state.query)
                .into_iter()
                .take(MAX_SUGGESTIONS)
                .map(|s| (s.id, s.icon().to_string(), s.nome.clone(), s.description().to_string()))
                .collect::<Vec<_>>()
        });
        if items.is_empty() {
            return None;
        }
        Some(view! {
            <div class="regen-autocomplete">
                {items
                    .into_iter()
                    .map(|(id, icon, nome, descricao)| view! {
                        <div
                            class="regen-autocomplete__item"
                            on:mousedown=move |ev| {
                                ev.prevent_default();
                                pick_skill(id);
                            }
                        >
                            <span>{icon}" "{nome}</span>
                            <small>{descricao}</small>
                        </div>
                    })
                    .collect_view()}
            </div>
        })
    };

    let skills_list = move || {
        let active = context.get().map(|c| c.skills).unwrap_or_default();
        vm.skills.with(|skills| {
            if skills.is_empty() {
                return view! { <div class="regen-skills__empty">"Nenhuma skill disponível."</div> }
                    .into_any();
            }
            skills
                .iter()
                .map(|skill| {
                    let id = skill.id;
                    let checked = active.contains(&id);
                    let label = format!("{} {}", skill.icon(), skill.nome);
                    view! {
                        <label class="regen-skills__item" class:active=checked>
                            <input
                                type="checkbox"
                                prop:checked=checked
                                on:change=move |_| {
                                    key.with_value(|k| vm.session.update(|s| {
                                        s.regen_mut().toggle_skill(k, id);
                                    }));
                                }
                            />
                            {label}
                        </label>
                    }
                })
                .collect_view()
                .into_any()
        })
    };

    let attachment_chips = move || {
        context
            .get()
            .map(|c| c.attachments.to_vec())
            .unwrap_or_default()
            .into_iter()
            .map(|att| {
                let filename = att.filename.clone();
                view! {
                    <span class="chat__chip">
                        {att.filename.clone()}
                        <button
                            title="Remover"
                            on:click=move |_| {
                                key.with_value(|k| vm.session.update(|s| {
                                    s.regen_mut().remove_attachment(k, &filename);
                                }));
                            }
                        >
                            {icon("x")}
                        </button>
                    </span>
                }
            })
            .collect_view()
    };

    view! {
        <div class="regen-panel">
            <div class="regen-panel__input">
                <textarea
                    id=move || key.with_value(|k| input_id(k))
                    rows="2"
                    placeholder="Como devo melhorar este campo? Digite \\ para escolher skills"
                    prop:value=move || key.with_value(|k| vm.regen_input(k))
                    prop:disabled=move || busy.get()
                    on:input=handle_input
                    on:keydown=handle_keydown
                    on:blur=move |_| vm.skill_popup.set(None)
                ></textarea>
                {popup}
            </div>

            <div class="regen-panel__toolbar">
                <ModelSelector selected=selected_model on_change=on_model disabled=busy />

                <input
                    type="file"
                    id=move || key.with_value(|k| file_input_id(k))
                    style="display: none;"
                    on:change=handle_file
                />
                <button
                    class="regen-panel__tool"
                    title="Anexar arquivo a este campo"
                    disabled=move || busy.get()
                    on:click=move |_| key.with_value(|k| click_element(&file_input_id(k)))
                >
                    {icon("paperclip")}
                    <Show when=move || { indicators.get().attachment_count > 0 }>
                        <span class="badge">{move || indicators.get().attachment_count}</span>
                    </Show>
                </button>

                <div class="regen-skills">
                    <button
                        class="regen-panel__tool"
                        title="Skills deste campo"
                        on:click=move |_| skills_open.update(|o| *o = !*o)
                    >
                        {icon("zap")}
                        <Show when=move || { indicators.get().skill_count > 0 }>
                            <span class="badge">{move || indicators.get().skill_count}</span>
                        </Show>
                    </button>
                    <Show when=move || skills_open.get()>
                        <div class="regen-skills__dropdown">{skills_list}</div>
                    </Show>
                </div>

                <span class="regen-panel__indicators">
                    {move || {
                        let i = indicators.get();
                        format!("🤖 {} · 📎 {} · ⚡ {}", i.model_name, i.attachment_count, i.skill_count)
                    }}
                </span>
            </div>

            <div class="regen-panel__chips">{attachment_chips}</div>

            <Flex justify=FlexJustify::End gap=FlexGap::Small>
                <Show
                    when=move || regenerating.get()
                    fallback=move || view! {
                        <Button
                            appearance=ButtonAppearance::Secondary
                            on_click=move |_| key.with_value(|k| vm.toggle_regen_panel(k))
                        >
                            "Cancelar"
                        </Button>
                        <Button
                            appearance=ButtonAppearance::Primary
                            disabled=busy
                            on_click=move |_| key.with_value(|k| vm.regenerate(k))
                        >
                            {icon("zap")}
                            " Regenerar"
                        </Button>
                    }
                >
                    <span class="regen-panel__status">"Regenerando com IA..."</span>
                </Show>
            </Flex>
        </div>
    }
}
