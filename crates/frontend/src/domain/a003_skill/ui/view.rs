use super::editor::SkillEditor;
use super::model::{create_skill, delete_skill, fetch_skills, update_skill};
use super::view_model::{EditorTarget, SkillSettingsVm};
use crate::layout::global_context::AppGlobalContext;
use crate::layout::tabs::tab_label;
use crate::layout::tabs::tab_labels::SKILL_WIZARD_TAB;
use crate::shared::components::{Modal, PageHeader, TabGroup};
use crate::shared::config::use_config;
use crate::shared::dom::confirm;
use crate::shared::icons::icon;
use crate::shared::notifications::use_notifications;
use contracts::domain::a003_skill::draft::SkillPayload;
use contracts::domain::a003_skill::{Skill, SkillId};
use leptos::prelude::*;
use leptos::task::spawn_local;
use thaw::*;

#[component]
pub fn SkillSettings() -> impl IntoView {
    let vm = SkillSettingsVm::new();
    let endpoint = StoredValue::new(use_config().endpoints.skills);
    let notifications = use_notifications();
    let tabs_store = use_context::<AppGlobalContext>().expect("AppGlobalContext not found");

    let reload = move || {
        vm.loading.set(true);
        spawn_local(async move {
            match fetch_skills(&endpoint.get_value()).await {
                Ok(skills) => {
                    vm.set_skills(skills);
                    vm.error.set(None);
                }
                Err(e) => vm.error.set(Some(format!("Erro ao carregar skills: {}", e))),
            }
            vm.loading.set(false);
        });
    };
    reload();

    let handle_save = Callback::new(move |payload: SkillPayload| {
        let Some(target) = vm.editor.get_untracked() else {
            return;
        };
        vm.saving.set(true);
        spawn_local(async move {
            let endpoint = endpoint.get_value();
            let result = match target {
                EditorTarget::New => create_skill(&endpoint, &payload).await,
                EditorTarget::Existing(id) => update_skill(&endpoint, id, &payload).await,
            };
            match result {
                Ok(saved) => {
                    notifications.success(format!("Skill \"{}\" salva com sucesso", saved.nome));
                    vm.close_editor();
                    reload();
                }
                Err(e) => {
                    vm.saving.set(false);
                    notifications.error(format!("Erro ao salvar skill: {}", e));
                }
            }
        });
    });

    let handle_delete = move |id: SkillId| {
        let name = vm.name_of(id);
        if !confirm(&format!("Excluir a skill \"{}\"?", name)) {
            return;
        }
        spawn_local(async move {
            match delete_skill(&endpoint.get_value(), id).await {
                Ok(()) => {
                    notifications.success("Skill excluída");
                    reload();
                }
                Err(e) => {
                    notifications.error(format!("Erro ao excluir skill: {}", e));
                }
            }
        });
    };

    let skill_card = move |skill: Skill, editable: bool| {
        let id = skill.id;
        let knowledge: Vec<String> = skill
            .textos_base
            .iter()
            .flatten()
            .map(|t| t.titulo.clone())
            .collect();
        let tools_count = skill.tools.as_ref().map_or(0, Vec::len);
        let badge_class = if skill.is_system() {
            "skill-card__badge skill-card__badge--system"
        } else {
            "skill-card__badge skill-card__badge--user"
        };
        view! {
            <div
                class="skill-card"
                class:skill-card--expanded=move || vm.expanded.get() == Some(id)
                on:click=move |_| vm.toggle_expanded(id)
            >
                <div class="skill-card__header">
                    <span class="skill-card__icon">{skill.icon().to_string()}</span>
                    <div class="skill-card__info">
                        <div class="skill-card__name">{skill.nome.clone()}</div>
                        <div class="skill-card__desc">
                            {if skill.description().is_empty() {
                                "Sem descrição".to_string()
                            } else {
                                skill.description().to_string()
                            }}
                        </div>
                    </div>
                    <span class=badge_class>{skill.escopo.badge()}</span>
                    {editable.then(|| view! {
                        <div class="skill-card__actions">
                            <button
                                title="Editar"
                                on:click=move |ev| {
                                    ev.stop_propagation();
                                    vm.open_edit(id);
                                }
                            >
                                {icon("settings")}
                            </button>
                            <button
                                class="skill-card__delete"
                                title="Excluir"
                                on:click=move |ev| {
                                    ev.stop_propagation();
                                    handle_delete(id);
                                }
                            >
                                {icon("trash")}
                            </button>
                        </div>
                    })}
                </div>
                <Show when=move || vm.expanded.get() == Some(id)>
                    <div class="skill-card__body">
                        <pre class="skill-card__instructions">{skill.instrucoes.clone()}</pre>
                        {(tools_count > 0).then(|| view! {
                            <div class="skill-card__meta">{format!("🔧 {} tool(s)", tools_count)}</div>
                        })}
                        {(!knowledge.is_empty()).then(|| {
                            let titles = knowledge.join(", ");
                            view! { <div class="skill-card__meta">{format!("📚 {}", titles)}</div> }
                        })}
                    </div>
                </Show>
            </div>
        }
    };

    view! {
        <div class="page skill-settings">
            <PageHeader title="Skills" subtitle="Instruções reutilizáveis para a LIA">
                <Button
                    appearance=ButtonAppearance::Secondary
                    on_click=move |_| tabs_store.open_tab(SKILL_WIZARD_TAB, tab_label(SKILL_WIZARD_TAB))
                >
                    {icon("message-square")}
                    " Criar com assistente"
                </Button>
                <Button appearance=ButtonAppearance::Primary on_click=move |_| vm.open_new()>
                    {icon("zap")}
                    " Nova skill"
                </Button>
            </PageHeader>

            {move || vm.error.get().map(|e| view! { <div class="form__error">{e}</div> })}

            <TabGroup
                tabs=vec![("minhas", "Minhas skills"), ("sistema", "Skills do sistema")]
                active=vm.active_tab
                storage_key="habilidades"
            />

            <Show when=move || vm.loading.get()>
                <div class="placeholder">"Carregando..."</div>
            </Show>

            {move || {
                let (system, user) = vm.partitioned();
                if vm.active_tab.get() == "sistema" {
                    system
                        .into_iter()
                        .map(|s| skill_card(s, false))
                        .collect_view()
                        .into_any()
                } else if user.is_empty() {
                    view! {
                        <div class="placeholder">
                            "Você ainda não criou nenhuma skill."
                        </div>
                    }
                    .into_any()
                } else {
                    user.into_iter()
                        .map(|s| skill_card(s, true))
                        .collect_view()
                        .into_any()
                }
            }}

            {move || {
                vm.editor.get().map(|target| {
                    let title = match target {
                        EditorTarget::New => "Nova skill".to_string(),
                        EditorTarget::Existing(_) => "Editar skill".to_string(),
                    };
                    view! {
                        <Modal title=title on_close=Callback::new(move |_| vm.close_editor())>
                            <SkillEditor
                                draft=vm.draft
                                saving=vm.saving
                                on_save=handle_save
                                on_cancel=Callback::new(move |_| vm.close_editor())
                            />
                        </Modal>
                    }
                })
            }}
        </div>
    }
}
