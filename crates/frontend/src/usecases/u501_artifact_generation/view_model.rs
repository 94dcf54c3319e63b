//! ViewModel for the artifact workspace

use std::collections::HashMap;

use contracts::domain::a002_artifact::lifecycle::ArtifactRef;
use contracts::domain::a002_artifact::{ArtifactConfig, ArtifactStatus};
use contracts::domain::a003_skill::autocomplete::{find_trigger, strip_trigger};
use contracts::domain::a003_skill::{Skill, SkillId};
use contracts::domain::a004_ai_model::{ModelPreference, SelectedModel};
use contracts::domain::a005_attachment::Attachment;
use contracts::shared::config::ClientConfig;
use contracts::usecases::common::{UseCaseError, UseCaseResult};
use contracts::usecases::u501_artifact_generation::request::{GenerateRequest, ProjectContext};
use contracts::usecases::u501_artifact_generation::{
    ArtifactSession, Authorization, GenerationPhase, GenerationUpdate,
};
use contracts::usecases::u502_deep_research::{DeepResearchRequest, ResearchProgress};
use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::model::{
    create_new_version, delete_artifact, execute_save, fetch_welcome, publish_to_sei,
    stream_artifact, stream_research,
};
use crate::domain::a003_skill::ui::fetch_skills;
use crate::shared::api_utils::upload_file;
use crate::shared::dom::{confirm, open_in_new_window, redirect, reload_page};
use crate::shared::notifications::NotificationContext;
use crate::shared::storage::BrowserStorage;

const REDIRECT_DELAY_MS: u32 = 1500;
const RELOAD_DELAY_MS: u32 = 1000;
const RESEARCH_HANDOFF_MS: u32 = 1500;

/// Deep research dialog: the operator edits the context, then watches the
/// progress timeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResearchDialog {
    pub context: String,
    pub progress: Option<ResearchProgress>,
    pub error: Option<String>,
}

impl ResearchDialog {
    pub fn is_running(&self) -> bool {
        self.progress.as_ref().is_some_and(|p| !p.is_complete()) && self.error.is_none()
    }
}

/// Autocomplete popup of one regeneration input.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillPopup {
    pub field_key: String,
    pub query: String,
    pub start: usize,
    pub cursor: usize,
}

#[derive(Clone)]
struct Settings {
    upload_endpoint: String,
    research_endpoint: String,
    skills_endpoint: String,
    idle_timeout_secs: u32,
}

#[derive(Clone, Copy)]
pub struct ArtifactVm {
    pub session: RwSignal<ArtifactSession>,
    pub input: RwSignal<String>,
    pub gestor: RwSignal<String>,
    pub fiscal: RwSignal<String>,
    pub data_limite: RwSignal<String>,
    pub skills: RwSignal<Vec<Skill>>,
    pub skills_error: RwSignal<bool>,
    pub research: RwSignal<Option<ResearchDialog>>,
    pub uploading: RwSignal<bool>,
    pub saving: RwSignal<bool>,
    /// Draft instruction per regeneration panel
    pub regen_inputs: RwSignal<HashMap<String, String>>,
    pub skill_popup: RwSignal<Option<SkillPopup>>,
    notifications: NotificationContext,
    settings: StoredValue<Settings>,
}

impl ArtifactVm {
    pub fn new(config: ArtifactConfig, client: &ClientConfig, notifications: NotificationContext) -> Self {
        let model = ModelPreference::new(BrowserStorage)
            .stored()
            .unwrap_or_else(|| {
                SelectedModel::new(&client.chat.default_model_id, &client.chat.default_model_name)
            });
        Self {
            session: RwSignal::new(ArtifactSession::new(config, model, client.chat.history_window)),
            input: RwSignal::new(String::new()),
            gestor: RwSignal::new(String::new()),
            fiscal: RwSignal::new(String::new()),
            data_limite: RwSignal::new(String::new()),
            skills: RwSignal::new(Vec::new()),
            skills_error: RwSignal::new(false),
            research: RwSignal::new(None),
            uploading: RwSignal::new(false),
            saving: RwSignal::new(false),
            regen_inputs: RwSignal::new(HashMap::new()),
            skill_popup: RwSignal::new(None),
            notifications,
            settings: StoredValue::new(Settings {
                upload_endpoint: client.endpoints.upload.clone(),
                research_endpoint: client.endpoints.deep_research.clone(),
                skills_endpoint: client.endpoints.skills.clone(),
                idle_timeout_secs: client.chat.stream_idle_timeout_secs,
            }),
        }
    }

    fn idle_timeout(&self) -> u32 {
        self.settings.with_value(|s| s.idle_timeout_secs)
    }

    pub fn project_context(&self) -> ProjectContext {
        ProjectContext::from_inputs(
            &self.gestor.get_untracked(),
            &self.fiscal.get_untracked(),
            &self.data_limite.get_untracked(),
        )
    }

    pub fn is_editing(&self) -> Signal<bool> {
        let session = self.session;
        Signal::derive(move || session.with(|s| s.phase() == GenerationPhase::Editing))
    }

    pub fn artifact_ref(&self) -> Option<ArtifactRef> {
        self.session
            .with_untracked(|s| ArtifactRef::from_config(s.config()))
    }

    /// Welcome message and skill catalogue.
    pub fn init(&self) {
        let session = self.session;
        if session.with_untracked(|s| s.phase() != GenerationPhase::Editing) {
            let config = session.with_untracked(|s| s.config().clone());
            spawn_local(async move {
                let welcome = fetch_welcome(&config).await;
                session.update(|s| s.apply_welcome(welcome));
            });
        }
        self.load_skills();
    }

    pub fn load_skills(&self) {
        let skills = self.skills;
        let skills_error = self.skills_error;
        let endpoint = self.settings.with_value(|s| s.skills_endpoint.clone());
        spawn_local(async move {
            match fetch_skills(&endpoint).await {
                Ok(mut list) => {
                    contracts::domain::a003_skill::aggregate::sort_for_display(&mut list);
                    skills.set(list);
                    skills_error.set(false);
                }
                Err(e) => {
                    log::error!("skills unavailable: {}", e);
                    skills_error.set(true);
                }
            }
        });
    }

    /// Adopts the catalogue-resolved model once models are loaded.
    pub fn adopt_model(&self, model: SelectedModel) {
        self.session.update(|s| s.set_model(model));
    }

    // ---- chat ----

    pub fn send_message(&self) {
        let content = self.input.get_untracked();
        let context = self.project_context();
        let mut request = None;
        self.session
            .update(|s| request = s.begin_chat_turn(&content, context));
        let Some(request) = request else {
            return;
        };
        self.input.set(String::new());

        let session = self.session;
        let url = session.with_untracked(|s| s.config().chat_url());
        let timeout = self.idle_timeout();
        spawn_local(async move {
            let result = stream_artifact(&url, &request, timeout, |event| {
                session.update(|s| {
                    s.apply_chat_event(event);
                });
            })
            .await;
            match result {
                Ok(()) => session.update(|s| {
                    s.finish_chat_turn();
                }),
                Err(e) => session.update(|s| s.fail_chat_turn(&e)),
            }
        });
    }

    // ---- generation ----

    pub fn force_generate(&self) {
        let label = self
            .session
            .with_untracked(|s| s.config().artifact_label.clone());
        if !confirm(&format!(
            "Deseja gerar o {label} agora com base na conversa atual?"
        )) {
            return;
        }
        let context = self.project_context();
        let mut result = None;
        self.session
            .update(|s| result = Some(s.force_generate(context)));
        if let Some(result) = result {
            self.handle_authorization(result);
        }
    }

    /// `research_context` is the synthesized research text, when a research
    /// run preceded this call.
    pub fn authorize(&self, research_context: Option<String>) {
        let context = self.project_context();
        let mut result = None;
        self.session
            .update(|s| result = Some(s.authorize_generation(research_context, context)));
        if let Some(result) = result {
            self.handle_authorization(result);
        }
    }

    fn handle_authorization(&self, result: UseCaseResult<Authorization>) {
        match result {
            Ok(Authorization::Generate(request)) => self.run_generation(request),
            Ok(Authorization::DeepResearchRequired(request)) => self.open_research(request),
            Err(e) if e.is_validation() => {
                self.notifications.warning(e.user_message().to_string());
            }
            Err(e) => {
                log::warn!("generation not authorized: {}", e);
                self.notifications.error(e.user_message().to_string());
            }
        }
    }

    fn run_generation(&self, request: GenerateRequest) {
        let session = self.session;
        let notifications = self.notifications;
        let url = session.with_untracked(|s| s.config().generate_url());
        let timeout = self.idle_timeout();
        spawn_local(async move {
            let result = stream_artifact(&url, &request, timeout, |event| {
                session.update(|s| {
                    if let GenerationUpdate::ServerError(error) = s.apply_generation_event(event) {
                        log::warn!("generation event error: {}", error);
                    }
                });
            })
            .await;
            match result {
                Ok(()) => {
                    let mut update = GenerationUpdate::Ignored;
                    session.update(|s| update = s.end_generation_stream());
                    if update == GenerationUpdate::Incomplete {
                        notifications.warning("A geração terminou sem todos os campos");
                    }
                }
                Err(e) => session.update(|s| s.fail_generation(&e)),
            }
        });
    }

    pub fn toggle_deep_research(&self) {
        self.session.update(|s| {
            let enabled = !s.deep_research_enabled();
            s.set_deep_research(enabled);
        });
    }

    // ---- deep research ----

    fn open_research(&self, request: DeepResearchRequest) {
        self.research.set(Some(ResearchDialog {
            context: request.context,
            ..Default::default()
        }));
    }

    pub fn close_research(&self) {
        if self.research.with_untracked(|r| r.as_ref().is_some_and(ResearchDialog::is_running)) {
            return;
        }
        self.research.set(None);
    }

    pub fn run_research(&self) {
        let Some(dialog) = self.research.get_untracked() else {
            return;
        };
        let request = DeepResearchRequest {
            topic: self
                .session
                .with_untracked(|s| s.config().artifact_label.clone()),
            context: dialog.context.trim().to_string(),
        };
        if let Err(e) = request.validate() {
            self.research.update(|r| {
                if let Some(r) = r.as_mut() {
                    r.error = Some(e.user_message().to_string());
                }
            });
            return;
        }
        self.research.update(|r| {
            if let Some(r) = r.as_mut() {
                r.progress = Some(ResearchProgress::new());
                r.error = None;
            }
        });

        let vm = *self;
        let research = self.research;
        let endpoint = self.settings.with_value(|s| s.research_endpoint.clone());
        let timeout = self.idle_timeout();
        spawn_local(async move {
            let result = stream_research(&endpoint, &request, timeout, |event| {
                research.update(|r| {
                    if let Some(p) = r.as_mut().and_then(|r| r.progress.as_mut()) {
                        p.apply(event);
                    }
                });
            })
            .await;
            match result {
                Ok(()) => {
                    TimeoutFuture::new(RESEARCH_HANDOFF_MS).await;
                    let context = research
                        .get_untracked()
                        .and_then(|r| r.progress)
                        .map(ResearchProgress::into_context)
                        .unwrap_or_default();
                    research.set(None);
                    vm.authorize(Some(context));
                }
                Err(e) => {
                    log::error!("deep research failed: {}", e);
                    research.update(|r| {
                        if let Some(r) = r.as_mut() {
                            r.progress = None;
                            r.error = Some(format!("Erro na pesquisa: {}", e.user_message()));
                        }
                    });
                }
            }
        });
    }

    // ---- attachments and skills ----

    /// Uploads a file for the global chat, or for one field's regeneration
    /// context when `field_key` is set.
    pub fn upload(&self, file: web_sys::File, field_key: Option<String>) {
        let session = self.session;
        let uploading = self.uploading;
        let notifications = self.notifications;
        let endpoint = self.settings.with_value(|s| s.upload_endpoint.clone());
        uploading.set(true);
        spawn_local(async move {
            match upload_file(&endpoint, &file).await {
                Ok(upload) => {
                    let attachment = Attachment::from_upload(upload, &file.type_());
                    let name = attachment.filename.clone();
                    session.update(|s| match &field_key {
                        Some(key) => {
                            s.regen_mut().add_attachment(key, attachment);
                        }
                        None => s.add_attachment(attachment),
                    });
                    notifications.success(format!("Arquivo \"{}\" anexado", name));
                }
                Err(e) => {
                    notifications.error(format!("Erro no upload: {}", e));
                }
            }
            uploading.set(false);
        });
    }

    pub fn remove_attachment(&self, filename: &str) {
        self.session.update(|s| {
            s.remove_attachment(filename);
        });
    }

    pub fn toggle_skill(&self, id: SkillId) {
        self.session.update(|s| {
            s.toggle_session_skill(id);
        });
    }

    pub fn skill_name(&self, id: SkillId) -> String {
        self.skills.with_untracked(|list| {
            list.iter()
                .find(|s| s.id == id)
                .map(|s| s.nome.clone())
                .unwrap_or_default()
        })
    }

    // ---- editing ----

    pub fn set_field(&self, key: &str, value: String) {
        let mut result = Ok(());
        self.session.update(|s| result = s.set_field_value(key, value));
        if let Err(e) = result {
            log::warn!("field edit rejected: {}", e);
        }
    }

    pub fn save(&self, status: ArtifactStatus) {
        let plan = match self.session.with_untracked(|s| s.plan_save(status)) {
            Ok(plan) => plan,
            Err(e) => {
                self.notifications.warning(e.user_message().to_string());
                return;
            }
        };
        let session = self.session;
        let saving = self.saving;
        let project_url = session.with_untracked(|s| s.config().project_url());
        saving.set(true);
        spawn_local(async move {
            match execute_save(&plan).await {
                Ok(_) => {
                    session.update(|s| s.push_assistant(plan.success_message.clone()));
                    TimeoutFuture::new(REDIRECT_DELAY_MS).await;
                    redirect(&project_url);
                }
                Err(e) => {
                    log::error!("save failed: {}", e);
                    session.update(|s| s.record_save_failure(&UseCaseError::server(e)));
                    saving.set(false);
                }
            }
        });
    }

    pub fn back_to_project(&self) {
        redirect(&self.session.with_untracked(|s| s.config().project_url()));
    }

    // ---- regeneration ----

    pub fn toggle_regen_panel(&self, key: &str) {
        self.session.update(|s| {
            s.regen_mut().toggle_panel(key);
        });
        self.skill_popup.set(None);
    }

    pub fn regen_input(&self, key: &str) -> String {
        self.regen_inputs
            .with(|m| m.get(key).cloned().unwrap_or_default())
    }

    /// Stores the instruction and opens or closes the `\` skill popup.
    /// `cursor` is a byte offset into `text`.
    pub fn set_regen_input(&self, key: &str, text: String, cursor: usize) {
        let popup = find_trigger(&text, cursor).map(|t| SkillPopup {
            field_key: key.to_string(),
            query: t.query,
            start: t.start,
            cursor,
        });
        self.skill_popup.set(popup);
        self.regen_inputs.update(|m| {
            m.insert(key.to_string(), text);
        });
    }

    /// Picks a skill from the popup: drops the trigger text and activates the
    /// skill for that field only. Returns the cursor to restore.
    pub fn pick_popup_skill(&self, id: SkillId) -> Option<usize> {
        let popup = self.skill_popup.get_untracked()?;
        let text = self.regen_input(&popup.field_key);
        let trigger = find_trigger(&text, popup.cursor)?;
        let (stripped, cursor) = strip_trigger(&text, &trigger, popup.cursor);
        self.regen_inputs.update(|m| {
            m.insert(popup.field_key.clone(), stripped);
        });
        self.session.update(|s| {
            s.regen_mut().toggle_skill(&popup.field_key, id);
        });
        self.skill_popup.set(None);
        Some(cursor)
    }

    pub fn regenerate(&self, key: &str) {
        let instructions = self.regen_input(key);
        let mut begun = None;
        self.session
            .update(|s| begun = Some(s.begin_regeneration(key, &instructions)));
        let request = match begun {
            Some(Ok(request)) => request,
            Some(Err(e)) => {
                self.notifications.warning(e.user_message().to_string());
                return;
            }
            None => return,
        };

        let session = self.session;
        let regen_inputs = self.regen_inputs;
        let notifications = self.notifications;
        let url = session.with_untracked(|s| s.config().regenerate_url());
        let timeout = self.idle_timeout();
        spawn_local(async move {
            let mut event_error: Option<UseCaseError> = None;
            let result = stream_artifact(&url, &request, timeout, |event| {
                if event_error.is_some() {
                    return;
                }
                session.update(|s| {
                    if let Err(e) = s.apply_regeneration_event(event) {
                        event_error = Some(e);
                    }
                });
            })
            .await;

            let outcome = match (result, event_error) {
                (Err(e), _) | (Ok(()), Some(e)) => Err(e),
                (Ok(()), None) => {
                    let mut completed = Err(UseCaseError::internal("regeneração não concluída"));
                    session.update(|s| completed = s.complete_regeneration());
                    completed
                }
            };
            match outcome {
                Ok(field_key) => {
                    let label = session
                        .with_untracked(|s| s.config().field_label(&field_key).to_string());
                    regen_inputs.update(|m| {
                        m.remove(&field_key);
                    });
                    notifications.success(format!("{} regenerado", label));
                }
                Err(e) => {
                    let mut message = String::new();
                    session.update(|s| message = s.fail_regeneration(&e));
                    notifications.error(message);
                }
            }
        });
    }

    // ---- lifecycle of a stored artifact ----

    pub fn new_version(&self) {
        let Some(artifact) = self.artifact_ref() else {
            return;
        };
        let notifications = self.notifications;
        spawn_local(async move {
            match create_new_version(&artifact).await {
                Ok(()) => {
                    notifications.success("Nova versão criada com sucesso!");
                    TimeoutFuture::new(RELOAD_DELAY_MS).await;
                    reload_page();
                }
                Err(e) => {
                    notifications.error(e);
                }
            }
        });
    }

    pub fn delete(&self) {
        let Some(artifact) = self.artifact_ref() else {
            return;
        };
        if !confirm("Tem certeza que deseja deletar este artefato?") {
            return;
        }
        let notifications = self.notifications;
        let project_url = self.session.with_untracked(|s| s.config().project_url());
        spawn_local(async move {
            match delete_artifact(&artifact).await {
                Ok(()) => {
                    notifications.success("Artefato deletado com sucesso!");
                    TimeoutFuture::new(RELOAD_DELAY_MS).await;
                    redirect(&project_url);
                }
                Err(e) => {
                    notifications.error(e);
                }
            }
        });
    }

    pub fn open_pdf(&self) {
        if let Some(artifact) = self.artifact_ref() {
            self.notifications.info("Abrindo PDF...");
            open_in_new_window(&crate::shared::api_utils::api_url(&artifact.pdf_url()));
        }
    }

    pub fn publish_sei(&self) {
        let Some(artifact) = self.artifact_ref() else {
            return;
        };
        let Some(version) = self
            .session
            .with_untracked(|s| s.config().editar_versao.clone())
        else {
            self.notifications.warning("Versão do artefato desconhecida");
            return;
        };
        if !confirm("Publicar esta versão no SEI? Esta ação não pode ser desfeita.") {
            return;
        }
        let notifications = self.notifications;
        notifications.info("Publicando no SEI...");
        spawn_local(async move {
            match publish_to_sei(&artifact, &version).await {
                Ok(()) => {
                    notifications.success("Publicado no SEI com sucesso!");
                    TimeoutFuture::new(RELOAD_DELAY_MS).await;
                    reload_page();
                }
                Err(e) => {
                    notifications.error(e);
                }
            }
        });
    }
}

/// Byte offset of a UTF-16 caret position, as reported by `selectionStart`.
pub fn utf16_to_byte_offset(text: &str, utf16_pos: usize) -> usize {
    let mut units = 0;
    for (byte, ch) in text.char_indices() {
        if units >= utf16_pos {
            return byte;
        }
        units += ch.len_utf16();
    }
    text.len()
}

/// Inverse of [`utf16_to_byte_offset`].
pub fn byte_to_utf16_offset(text: &str, byte_pos: usize) -> usize {
    let byte_pos = byte_pos.min(text.len());
    text.char_indices()
        .take_while(|(b, _)| *b < byte_pos)
        .map(|(_, ch)| ch.len_utf16())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caret_offsets_with_accents() {
        let text = "ação \\jur";
        // "ação " is 5 UTF-16 units and 7 bytes
        assert_eq!(utf16_to_byte_offset(text, 5), 7);
        assert_eq!(byte_to_utf16_offset(text, 7), 5);
        assert_eq!(utf16_to_byte_offset(text, 99), text.len());
    }

    #[test]
    fn test_caret_offsets_ascii_identity() {
        let text = "melhore \\pre";
        for i in 0..=text.len() {
            assert_eq!(utf16_to_byte_offset(text, i), i);
            assert_eq!(byte_to_utf16_offset(text, i), i);
        }
    }

    #[test]
    fn test_research_dialog_running_state() {
        let mut dialog = ResearchDialog::default();
        assert!(!dialog.is_running());
        dialog.progress = Some(ResearchProgress::new());
        assert!(dialog.is_running());
        dialog.error = Some("falhou".into());
        assert!(!dialog.is_running());
    }
}
