//! Controller owning all state of one artifact chat page.
//!
//! The view layer issues the HTTP calls; this type decides whether a call may
//! start, builds its body, folds streamed events into state and records the
//! chat messages that report progress. One instance per page, no globals.

use std::collections::{BTreeSet, HashMap};

use serde_json::Value;

use super::events::StreamEvent;
use super::field_scraper::{FieldScraper, FieldUpdate};
use super::intent;
use super::phase::{GenerationPhase, PhaseMachine};
use super::regen_context::RegenContextManager;
use super::request::{
    ChatTurnRequest, GenerateRequest, ProjectContext, RegenerateFieldRequest, DEFAULT_REGEN_PROMPT,
};
use crate::domain::a001_chat_message::{ChatMessage, MessageLog};
use crate::domain::a002_artifact::aggregate::display_value;
use crate::domain::a002_artifact::lifecycle::{plan_save, SavePlan};
use crate::domain::a002_artifact::{
    ArtifactConfig, ArtifactData, ArtifactFieldSpec, ArtifactStatus, FieldKind, FieldStatus,
};
use crate::domain::a003_skill::SkillId;
use crate::domain::a004_ai_model::SelectedModel;
use crate::domain::a005_attachment::{Attachment, AttachmentList};
use crate::usecases::common::{UseCaseError, UseCaseResult};
use crate::usecases::u502_deep_research::DeepResearchRequest;

pub const CHAT_ERROR_MESSAGE: &str =
    "Desculpe, ocorreu um erro na comunicação. Por favor, tente novamente.";
pub const REASONING_OPEN_LIMIT: usize = 500;

/// Field keys prefilled from the preparation context inputs.
fn context_field_values(ctx: &ProjectContext) -> [(&'static str, Option<&String>); 3] {
    [
        ("responsavel_gestor", ctx.gestor.as_ref()),
        ("responsavel_fiscal", ctx.fiscal.as_ref()),
        ("data_pretendida", ctx.data_limite.as_ref()),
    ]
}

/// Assistant reply being streamed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnBuffer {
    pub reasoning: String,
    pub content: String,
    finalized: bool,
}

impl TurnBuffer {
    pub fn has_output(&self) -> bool {
        !self.reasoning.is_empty() || !self.content.is_empty()
    }

    pub fn reasoning_open(&self) -> bool {
        self.reasoning.chars().count() < REASONING_OPEN_LIMIT
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatTurnUpdate {
    Streaming,
    AuthorizationRequested,
    Finalized { authorization_requested: bool },
    ServerError(String),
    Ignored,
}

#[derive(Debug)]
struct GenerationRun {
    scraper: FieldScraper,
    full_response: String,
    finished: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationUpdate {
    /// Scraped values from the cumulative buffer
    Fields(Vec<FieldUpdate>),
    /// Explicit `field` event
    FieldSet(String),
    Finished,
    ServerError(String),
    /// Stream ended without a usable field map
    Incomplete,
    Ignored,
}

/// What the caller must run after an authorization
#[derive(Debug, Clone, PartialEq)]
pub enum Authorization {
    Generate(GenerateRequest),
    DeepResearchRequired(DeepResearchRequest),
}

#[derive(Debug, Default)]
struct RegenerationRun {
    field_key: String,
    buffer: String,
    success: bool,
}

pub struct ArtifactSession {
    config: ArtifactConfig,
    phase: PhaseMachine,
    history: MessageLog,
    history_window: usize,
    data: ArtifactData,
    statuses: HashMap<String, FieldStatus>,
    in_flight: bool,
    ready_to_generate: bool,
    model: SelectedModel,
    attachments: AttachmentList,
    active_skills: BTreeSet<SkillId>,
    deep_research: bool,
    turn: Option<TurnBuffer>,
    generation: Option<GenerationRun>,
    regeneration: Option<RegenerationRun>,
    regen: RegenContextManager,
}

impl ArtifactSession {
    pub fn new(config: ArtifactConfig, model: SelectedModel, history_window: usize) -> Self {
        let phase = if config.starts_in_editing() {
            PhaseMachine::editing()
        } else {
            PhaseMachine::new()
        };
        let data = config.editar_dados.clone().unwrap_or_default();
        let mut session = Self {
            phase,
            history: MessageLog::new(),
            history_window,
            data,
            statuses: HashMap::new(),
            in_flight: false,
            ready_to_generate: false,
            regen: RegenContextManager::new(model.clone()),
            model,
            attachments: AttachmentList::new(),
            active_skills: BTreeSet::new(),
            deep_research: false,
            turn: None,
            generation: None,
            regeneration: None,
            config,
        };
        session.seed_auto_fields();
        if session.phase.current_phase() == GenerationPhase::Editing {
            session.mark_all_done();
            let intro = session.edit_intro_message();
            session.history.push(ChatMessage::assistant(intro));
        }
        session
    }

    // ---- read side ----

    pub fn config(&self) -> &ArtifactConfig {
        &self.config
    }

    pub fn fields(&self) -> &[ArtifactFieldSpec] {
        &self.config.fields
    }

    pub fn phase(&self) -> GenerationPhase {
        self.phase.current_phase()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.history.all()
    }

    pub fn current_turn(&self) -> Option<&TurnBuffer> {
        self.turn.as_ref().filter(|t| !t.finalized)
    }

    pub fn data(&self) -> &ArtifactData {
        &self.data
    }

    pub fn field_value(&self, key: &str) -> String {
        self.data.get(key).map(display_value).unwrap_or_default()
    }

    pub fn field_status(&self, key: &str) -> FieldStatus {
        self.statuses.get(key).copied().unwrap_or(FieldStatus::Pending)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    pub fn is_regenerating(&self) -> bool {
        self.regeneration.is_some()
    }

    /// False while a turn, a generation or a field regeneration runs.
    pub fn chat_enabled(&self) -> bool {
        !self.in_flight && self.regeneration.is_none() && self.phase() != GenerationPhase::Generation
    }

    pub fn ready_to_generate(&self) -> bool {
        self.ready_to_generate && self.phase() == GenerationPhase::Preparation
    }

    pub fn can_force_generate(&self) -> bool {
        !self.history.is_empty() && !self.in_flight && self.phase() == GenerationPhase::Preparation
    }

    pub fn can_authorize(&self) -> bool {
        !self.in_flight && self.phase.can_transition(GenerationPhase::Generation)
    }

    /// A generation run stopped without a field map; only re-authorizing
    /// leaves this state.
    pub fn can_retry_generation(&self) -> bool {
        self.phase() == GenerationPhase::Generation && self.can_authorize()
    }

    pub fn model(&self) -> &SelectedModel {
        &self.model
    }

    pub fn attachments(&self) -> &AttachmentList {
        &self.attachments
    }

    pub fn active_skills(&self) -> &BTreeSet<SkillId> {
        &self.active_skills
    }

    pub fn deep_research_enabled(&self) -> bool {
        self.deep_research
    }

    pub fn regen(&self) -> &RegenContextManager {
        &self.regen
    }

    pub fn regen_mut(&mut self) -> &mut RegenContextManager {
        &mut self.regen
    }

    /// "3 de 8 campos" while generating.
    pub fn progress_label(&self) -> String {
        match (&self.generation, self.phase()) {
            (_, GenerationPhase::Editing) => "Todos os campos preenchidos".to_string(),
            (Some(run), _) => format!(
                "{} de {} campos",
                run.scraper.completed_count(),
                self.config.fields.len()
            ),
            (None, _) => String::new(),
        }
    }

    pub fn workspace_title(&self) -> String {
        let label = &self.config.artifact_label;
        match (self.phase(), &self.config.editar_versao) {
            (GenerationPhase::Editing, Some(v)) if self.config.is_edit_mode() => {
                format!("Editando {label} v{v}")
            }
            (GenerationPhase::Editing, _) => format!("{label} Gerado"),
            _ => format!("Gerando {label}"),
        }
    }

    pub fn status_badge(&self) -> &'static str {
        match (self.phase(), self.config.editar_status) {
            (GenerationPhase::Editing, Some(status)) if self.config.is_edit_mode() => status.badge(),
            (GenerationPhase::Editing, _) => "Pronto",
            _ => "Gerando",
        }
    }

    // ---- global chat configuration ----

    pub fn set_model(&mut self, model: SelectedModel) {
        self.regen.set_seed_model(model.clone());
        self.model = model;
    }

    pub fn add_attachment(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    pub fn remove_attachment(&mut self, filename: &str) -> bool {
        self.attachments.remove(filename).is_some()
    }

    /// Returns whether the skill is active afterwards.
    pub fn toggle_session_skill(&mut self, skill: SkillId) -> bool {
        if self.active_skills.remove(&skill) {
            false
        } else {
            self.active_skills.insert(skill);
            true
        }
    }

    pub fn set_deep_research(&mut self, enabled: bool) {
        self.deep_research = enabled && self.config.supports_deep_research();
    }

    // ---- welcome ----

    /// Pushes the server welcome, or the configured fallback when it failed.
    pub fn apply_welcome(&mut self, welcome: Option<String>) {
        let text = welcome
            .filter(|w| !w.trim().is_empty())
            .unwrap_or_else(|| self.config.welcome_fallback());
        self.history.push(ChatMessage::assistant(text));
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.history.push(ChatMessage::assistant(text));
    }

    fn edit_intro_message(&self) -> String {
        format!(
            "📝 **Modo Edição - {} v{}**\n\nVocê pode:\n- Editar os campos ✏️ diretamente no formulário\n- Me pedir para **regenerar** campos específicos usando IA\n- Campos automáticos 🔒 não podem ser alterados\n\n*Como posso ajudar?*",
            self.config.artifact_label,
            self.config.editar_versao.as_deref().unwrap_or("1"),
        )
    }

    // ---- chat turn ----

    /// Starts a turn. `None` when the input is empty or another flow is in
    /// flight; history is then left untouched.
    pub fn begin_chat_turn(
        &mut self,
        content: &str,
        context: ProjectContext,
    ) -> Option<ChatTurnRequest> {
        let content = content.trim();
        if content.is_empty() || !self.chat_enabled() {
            log::debug!("chat turn rejected");
            return None;
        }
        self.history.push(ChatMessage::user(content));
        self.in_flight = true;
        self.turn = Some(TurnBuffer::default());
        Some(ChatTurnRequest {
            content: content.to_string(),
            history: self.history.recent(self.history_window),
            model: self.model.id.clone(),
            attachments: self.attachments.to_vec(),
            context,
        })
    }

    pub fn apply_chat_event(&mut self, event: StreamEvent) -> ChatTurnUpdate {
        let Some(turn) = self.turn.as_mut().filter(|t| !t.finalized) else {
            return ChatTurnUpdate::Ignored;
        };
        match event {
            StreamEvent::Reasoning { content } => {
                turn.reasoning = content;
                ChatTurnUpdate::Streaming
            }
            StreamEvent::Chunk { content } => {
                turn.content = content;
                ChatTurnUpdate::Streaming
            }
            event if event.is_generate_action() => {
                self.finalize_turn();
                self.ready_to_generate = true;
                ChatTurnUpdate::AuthorizationRequested
            }
            StreamEvent::Done { .. } => {
                let authorization_requested = self.finalize_turn();
                ChatTurnUpdate::Finalized {
                    authorization_requested,
                }
            }
            StreamEvent::Error { error } => {
                self.finalize_turn();
                self.history
                    .push(ChatMessage::assistant(format!("❌ **Erro do servidor:** {error}")));
                ChatTurnUpdate::ServerError(error)
            }
            _ => ChatTurnUpdate::Ignored,
        }
    }

    /// Raw end of stream. Finalizes a reply that got no `done` event.
    pub fn finish_chat_turn(&mut self) -> bool {
        let requested = self.finalize_turn();
        self.turn = None;
        self.in_flight = false;
        requested
    }

    pub fn fail_chat_turn(&mut self, error: &UseCaseError) {
        log::error!("chat turn failed: {}", error);
        self.turn = None;
        self.in_flight = false;
        self.history.push(ChatMessage::assistant(CHAT_ERROR_MESSAGE));
    }

    /// Commits the streamed reply to history once. Returns whether the text
    /// asks for generation.
    fn finalize_turn(&mut self) -> bool {
        let Some(turn) = self.turn.as_mut().filter(|t| !t.finalized) else {
            return false;
        };
        turn.finalized = true;
        if turn.content.is_empty() {
            return false;
        }
        let content = turn.content.clone();
        let requested = intent::has_generate_intent(&content, self.config.generate_marker());
        self.history.push(ChatMessage::assistant(content));
        if requested {
            self.ready_to_generate = true;
        }
        requested
    }

    // ---- generation ----

    /// Manual trigger from the preparation phase; the caller confirms first.
    pub fn force_generate(&mut self, context: ProjectContext) -> UseCaseResult<Authorization> {
        if self.history.is_empty() {
            return Err(UseCaseError::validation(
                "Converse primeiro para coletar informações antes de gerar o artefato.",
            ));
        }
        if !self.can_force_generate() {
            return Err(UseCaseError::invalid_transition("Geração indisponível"));
        }
        self.history.push(ChatMessage::assistant(format!(
            "✨ Gerando {} com base na conversa atual...",
            self.config.artifact_label
        )));
        self.authorize_generation(None, context)
    }

    /// With deep research on and no research context yet, asks the caller
    /// to run research first and re-authorize with its result.
    pub fn authorize_generation(
        &mut self,
        research_context: Option<String>,
        context: ProjectContext,
    ) -> UseCaseResult<Authorization> {
        if self.in_flight {
            return Err(UseCaseError::invalid_transition("Outra operação em andamento"));
        }
        if !self.phase.can_transition(GenerationPhase::Generation) {
            return Err(UseCaseError::invalid_transition(format!(
                "Não é possível gerar na fase {}",
                self.phase().as_str()
            )));
        }
        if self.deep_research && research_context.is_none() {
            log::info!("generation intercepted by deep research");
            return Ok(Authorization::DeepResearchRequired(DeepResearchRequest {
                topic: self.config.artifact_label.clone(),
                context: self.history.user_transcript(),
            }));
        }

        self.phase.transition(GenerationPhase::Generation)?;
        self.in_flight = true;
        self.ready_to_generate = false;
        self.generation = Some(GenerationRun {
            scraper: FieldScraper::new(&self.config.fields),
            full_response: String::new(),
            finished: false,
        });
        self.reset_statuses();
        for (key, value) in context_field_values(&context) {
            if let (Some(value), Some(_)) = (value, self.config.field(key)) {
                self.data.insert(key.to_string(), Value::String(value.clone()));
            }
        }
        self.history.push(ChatMessage::assistant(format!(
            "⚡ **Iniciando geração do {}...** Aguarde enquanto preencho os campos.",
            self.config.artifact_label
        )));

        Ok(Authorization::Generate(GenerateRequest {
            history: self.history.all().to_vec(),
            gestor: context.gestor,
            fiscal: context.fiscal,
            data_limite: context.data_limite,
            model: self.model.id.clone(),
            attachments: self.attachments.to_vec(),
            skills: self.active_skills.iter().copied().collect(),
            deep_research_context: research_context,
        }))
    }

    pub fn apply_generation_event(&mut self, event: StreamEvent) -> GenerationUpdate {
        let Some(run) = self.generation.as_mut().filter(|r| !r.finished) else {
            return GenerationUpdate::Ignored;
        };
        match event {
            StreamEvent::Chunk { content } => {
                let updates = run.scraper.scan(&content);
                run.full_response = content;
                for update in &updates {
                    let status = if update.is_complete() {
                        FieldStatus::Done
                    } else {
                        FieldStatus::Generating
                    };
                    self.data
                        .insert(update.key.clone(), Value::String(update.value().to_string()));
                    self.statuses.insert(update.key.clone(), status);
                }
                GenerationUpdate::Fields(updates)
            }
            StreamEvent::Field { field, value } => {
                let writable = self
                    .config
                    .field(&field)
                    .is_some_and(|f| f.kind != FieldKind::Auto);
                if !writable {
                    log::debug!("field event for '{}' ignored", field);
                    return GenerationUpdate::Ignored;
                }
                if value.is_string() {
                    run.scraper.mark_complete(&field);
                    self.statuses.insert(field.clone(), FieldStatus::Done);
                }
                self.data.insert(field.clone(), value);
                GenerationUpdate::FieldSet(field)
            }
            StreamEvent::Complete { success, data } => {
                if let (true, Some(data)) = (success, data) {
                    self.populate_all(data);
                }
                self.finish_generation();
                GenerationUpdate::Finished
            }
            StreamEvent::Error { error } => {
                log::error!("generation server error: {}", error);
                self.history
                    .push(ChatMessage::assistant(format!("❌ **Erro do servidor:** {error}")));
                GenerationUpdate::ServerError(error)
            }
            _ => GenerationUpdate::Ignored,
        }
    }

    /// Raw end of stream. Without a `complete` event the final buffer is
    /// parsed by hand; when that fails the run stops and can be retried.
    pub fn end_generation_stream(&mut self) -> GenerationUpdate {
        let Some(run) = self.generation.as_mut() else {
            return GenerationUpdate::Ignored;
        };
        if run.finished {
            return GenerationUpdate::Ignored;
        }
        match parse_full_response(&run.full_response) {
            Some(data) => {
                self.populate_all(data);
                self.finish_generation();
                GenerationUpdate::Finished
            }
            None => {
                self.in_flight = false;
                self.history.push(ChatMessage::assistant(
                    "⚠️ A geração terminou sem retornar todos os campos. Tente gerar novamente.",
                ));
                GenerationUpdate::Incomplete
            }
        }
    }

    /// Transport failure during generation. The phase is kept.
    pub fn fail_generation(&mut self, error: &UseCaseError) {
        log::error!("generation failed: {}", error);
        if let Some(run) = self.generation.as_mut() {
            run.finished = true;
        }
        self.in_flight = false;
        self.history.push(ChatMessage::assistant(format!(
            "❌ **Erro na geração:** {}. Tente novamente ou entre em contato com o suporte.",
            error.user_message()
        )));
    }

    fn finish_generation(&mut self) {
        if let Some(run) = self.generation.as_mut() {
            run.finished = true;
        }
        if let Err(e) = self.phase.transition(GenerationPhase::Editing) {
            log::warn!("finish_generation: {}", e);
        }
        self.in_flight = false;
        self.mark_all_done();
        let label = &self.config.artifact_label;
        self.history.push(ChatMessage::assistant(format!(
            "✅ **{label} gerado com sucesso!** Revise os campos à direita e faça ajustes se necessário. Você pode editar diretamente ou me pedir para regenerar campos específicos. Quando estiver satisfeito, clique em **Aprovar {label}**."
        )));
    }

    fn populate_all(&mut self, data: ArtifactData) {
        for (key, value) in data {
            if self.config.field(&key).is_some_and(|f| f.kind == FieldKind::Auto) {
                continue;
            }
            self.data.insert(key, value);
        }
    }

    fn seed_auto_fields(&mut self) {
        for field in &self.config.fields {
            if field.kind == FieldKind::Auto {
                if let Some(value) = &field.value {
                    self.data
                        .entry(field.key.clone())
                        .or_insert_with(|| Value::String(value.clone()));
                }
                self.statuses.insert(field.key.clone(), FieldStatus::Locked);
            }
        }
    }

    fn reset_statuses(&mut self) {
        for field in &self.config.fields {
            let status = if field.kind == FieldKind::Auto {
                FieldStatus::Locked
            } else {
                FieldStatus::Pending
            };
            self.statuses.insert(field.key.clone(), status);
        }
    }

    fn mark_all_done(&mut self) {
        for field in &self.config.fields {
            let status = if field.kind == FieldKind::Auto {
                FieldStatus::Locked
            } else {
                FieldStatus::Done
            };
            self.statuses.insert(field.key.clone(), status);
        }
    }

    // ---- editing ----

    pub fn set_field_value(&mut self, key: &str, value: String) -> UseCaseResult<()> {
        let field = self
            .config
            .field(key)
            .ok_or_else(|| UseCaseError::validation(format!("Campo desconhecido: {key}")))?;
        if !field.kind.is_editable() {
            return Err(UseCaseError::validation(format!(
                "O campo {} não pode ser alterado",
                field.label
            )));
        }
        self.data.insert(key.to_string(), Value::String(value));
        Ok(())
    }

    /// Values sent on save: every declared field present in the data map.
    pub fn collect_fields(&self) -> ArtifactData {
        self.config
            .fields
            .iter()
            .filter_map(|f| self.data.get(&f.key).map(|v| (f.key.clone(), v.clone())))
            .collect()
    }

    pub fn plan_save(&self, status: ArtifactStatus) -> UseCaseResult<SavePlan> {
        if self.phase() != GenerationPhase::Editing {
            return Err(UseCaseError::validation("Gere o artefato antes de salvar."));
        }
        plan_save(&self.config, self.collect_fields(), status)
    }

    pub fn record_save_failure(&mut self, error: &UseCaseError) {
        self.history.push(ChatMessage::assistant(format!(
            "❌ **Erro ao salvar:** {}",
            error.user_message()
        )));
    }

    // ---- field regeneration ----

    /// Builds the field-scoped request from the field's own context.
    pub fn begin_regeneration(
        &mut self,
        key: &str,
        instructions: &str,
    ) -> UseCaseResult<RegenerateFieldRequest> {
        let field = self
            .config
            .field(key)
            .ok_or_else(|| UseCaseError::validation(format!("Campo desconhecido: {key}")))?;
        if !field.kind.is_regenerable() {
            return Err(UseCaseError::validation(format!(
                "O campo {} não pode ser regenerado",
                field.label
            )));
        }
        if self.phase() != GenerationPhase::Editing {
            return Err(UseCaseError::invalid_transition(
                "Regeneração disponível apenas na edição",
            ));
        }
        if self.regeneration.is_some() {
            return Err(UseCaseError::invalid_transition("Regeneração em andamento"));
        }
        if self.in_flight {
            return Err(UseCaseError::invalid_transition("Aguarde a resposta em andamento"));
        }

        let label = field.label.clone();
        let instructions = instructions.trim();
        let note = if instructions.is_empty() {
            String::new()
        } else {
            format!(" ({instructions})")
        };
        self.history
            .push(ChatMessage::assistant(format!("🔄 Regenerando **{label}**...{note}")));
        self.statuses.insert(key.to_string(), FieldStatus::Generating);
        self.regeneration = Some(RegenerationRun {
            field_key: key.to_string(),
            ..Default::default()
        });

        let valor_atual = self.field_value(key);
        let ctx = self.regen.get(key);
        Ok(RegenerateFieldRequest {
            campo: key.to_string(),
            history: self.history.all().to_vec(),
            prompt_adicional: if instructions.is_empty() {
                DEFAULT_REGEN_PROMPT.to_string()
            } else {
                instructions.to_string()
            },
            valor_atual,
            model: ctx.model.id.clone(),
            active_skills: ctx.skill_ids(),
            attachments: ctx.attachments.to_vec(),
        })
    }

    /// Folds one event. Chunks update the field live; an `error` event fails
    /// the run.
    pub fn apply_regeneration_event(&mut self, event: StreamEvent) -> UseCaseResult<()> {
        let Some(run) = self.regeneration.as_mut() else {
            return Ok(());
        };
        match event {
            StreamEvent::Chunk { content } => {
                run.buffer = content;
                self.data
                    .insert(run.field_key.clone(), Value::String(run.buffer.clone()));
            }
            StreamEvent::Done { content } => {
                if let Some(content) = content.filter(|c| !c.is_empty()) {
                    run.buffer = content;
                }
                run.success = true;
            }
            StreamEvent::Error { error } => {
                let message = if error.is_empty() {
                    "Falha na regeneração".to_string()
                } else {
                    error
                };
                return Err(UseCaseError::server(message));
            }
            _ => {}
        }
        Ok(())
    }

    /// Stream end. On success the value is committed and the panel closes.
    pub fn complete_regeneration(&mut self) -> UseCaseResult<String> {
        let run = self
            .regeneration
            .take()
            .ok_or_else(|| UseCaseError::invalid_transition("Nenhuma regeneração ativa"))?;
        if !run.success && run.buffer.is_empty() {
            self.regeneration = Some(run);
            return Err(UseCaseError::server("Nenhum conteúdo recebido da IA"));
        }
        let label = self.config.field_label(&run.field_key).to_string();
        self.data
            .insert(run.field_key.clone(), Value::String(run.buffer.clone()));
        self.statuses.insert(run.field_key.clone(), FieldStatus::Done);
        self.regen.close_panel(&run.field_key);
        self.history
            .push(ChatMessage::assistant(format!("✅ **{label}** regenerado com sucesso!")));
        Ok(run.field_key)
    }

    /// The panel stays open so the operator can retry.
    pub fn fail_regeneration(&mut self, error: &UseCaseError) -> String {
        let message = error.user_message().to_string();
        if let Some(run) = self.regeneration.take() {
            self.statuses.insert(run.field_key, FieldStatus::Error);
        }
        self.history
            .push(ChatMessage::assistant(format!("❌ Erro ao regenerar: {message}")));
        message
    }
}

/// Hand parse of the final buffer: strips code fences, then retries with
/// double-escaped newlines fixed.
pub fn parse_full_response(text: &str) -> Option<ArtifactData> {
    if text.trim().is_empty() {
        return None;
    }
    let mut cleaned = text.trim();
    cleaned = cleaned.strip_prefix("```json").unwrap_or(cleaned);
    cleaned = cleaned.strip_prefix("```").unwrap_or(cleaned);
    cleaned = cleaned.strip_suffix("```").unwrap_or(cleaned);
    match serde_json::from_str::<ArtifactData>(cleaned.trim()) {
        Ok(data) => Some(data),
        Err(first) => {
            log::warn!("manual parse failed: {}", first);
            let fixed = cleaned.replace("\\\\n", "\\n");
            serde_json::from_str::<ArtifactData>(fixed.trim())
                .map_err(|e| log::warn!("manual parse with fix failed: {}", e))
                .ok()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ArtifactConfig {
        serde_json::from_value(serde_json::json!({
            "artifactType": "etp",
            "artifactLabel": "ETP",
            "apiBase": "/api/etp",
            "projetoId": 1,
            "saveEndpoint": "/api/etp",
            "generateMarker": "[GERAR_ETP]",
            "fields": [
                {"key": "numero", "label": "Número", "type": "auto", "value": "001"},
                {"key": "objeto", "label": "Objeto", "type": "ia"},
                {"key": "justificativa", "label": "Justificativa", "type": "ia"},
                {"key": "responsavel_gestor", "label": "Gestor", "type": "user"},
                {"key": "riscos", "label": "Riscos", "type": "riscos"}
            ]
        }))
        .unwrap()
    }

    fn session() -> ArtifactSession {
        ArtifactSession::new(config(), SelectedModel::default(), 10)
    }

    fn chunk(s: &str) -> StreamEvent {
        StreamEvent::Chunk { content: s.into() }
    }

    fn generating() -> ArtifactSession {
        let mut s = session();
        s.apply_welcome(None);
        match s.force_generate(ProjectContext::default()).unwrap() {
            Authorization::Generate(_) => {}
            other => panic!("unexpected {other:?}"),
        }
        s
    }

    #[test]
    fn test_cumulative_chunks_replace_content() {
        let mut s = session();
        s.begin_chat_turn("Olá", ProjectContext::default()).unwrap();
        for payload in ["Pre", "Preciso", "Preciso de dados"] {
            assert_eq!(s.apply_chat_event(chunk(payload)), ChatTurnUpdate::Streaming);
            assert_eq!(s.current_turn().unwrap().content, payload);
        }
        s.apply_chat_event(StreamEvent::Done { content: None });
        s.finish_chat_turn();
        assert_eq!(s.messages().last().unwrap().content, "Preciso de dados");
        assert_eq!(s.messages().len(), 2);
    }

    #[test]
    fn test_send_while_busy_is_noop() {
        let mut s = session();
        s.begin_chat_turn("primeira", ProjectContext::default()).unwrap();
        let len = s.messages().len();
        assert!(s.begin_chat_turn("segunda", ProjectContext::default()).is_none());
        assert_eq!(s.messages().len(), len);

        let mut g = generating();
        let len = g.messages().len();
        assert!(g.is_busy());
        assert!(g.begin_chat_turn("oi", ProjectContext::default()).is_none());
        assert_eq!(g.messages().len(), len);
    }

    #[test]
    fn test_history_window_on_turn_request() {
        let mut s = session();
        for i in 0..15 {
            s.push_assistant(format!("m{i}"));
        }
        let req = s.begin_chat_turn("última", ProjectContext::default()).unwrap();
        assert_eq!(req.history.len(), 10);
        assert_eq!(req.history.last().unwrap().content, "última");
    }

    #[test]
    fn test_marker_in_reply_requests_authorization() {
        let mut s = session();
        s.begin_chat_turn("pode gerar", ProjectContext::default()).unwrap();
        s.apply_chat_event(chunk("Tudo pronto [GERAR_ETP]"));
        let update = s.apply_chat_event(StreamEvent::Done { content: None });
        assert_eq!(update, ChatTurnUpdate::Finalized { authorization_requested: true });
        assert!(s.ready_to_generate());
    }

    #[test]
    fn test_action_event_requests_authorization_and_eof_does_not_duplicate() {
        let mut s = session();
        s.begin_chat_turn("pode gerar", ProjectContext::default()).unwrap();
        s.apply_chat_event(chunk("Vamos lá"));
        let update = s.apply_chat_event(StreamEvent::Action { action: "generate".into() });
        assert_eq!(update, ChatTurnUpdate::AuthorizationRequested);
        s.finish_chat_turn();
        assert_eq!(s.messages().len(), 2);
        assert!(!s.is_busy());
    }

    #[test]
    fn test_eof_without_done_finalizes() {
        let mut s = session();
        s.begin_chat_turn("oi", ProjectContext::default()).unwrap();
        s.apply_chat_event(chunk("resposta"));
        s.finish_chat_turn();
        assert_eq!(s.messages().last().unwrap().content, "resposta");
    }

    #[test]
    fn test_chat_transport_failure() {
        let mut s = session();
        s.begin_chat_turn("oi", ProjectContext::default()).unwrap();
        s.fail_chat_turn(&UseCaseError::transport("HTTP 500"));
        assert!(!s.is_busy());
        assert_eq!(s.messages().last().unwrap().content, CHAT_ERROR_MESSAGE);
    }

    #[test]
    fn test_force_generate_requires_history() {
        let mut s = session();
        assert!(!s.can_force_generate());
        let err = s.force_generate(ProjectContext::default()).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(s.phase(), GenerationPhase::Preparation);
    }

    #[test]
    fn test_generation_streams_fields_then_completes() {
        let mut s = generating();
        assert_eq!(s.phase(), GenerationPhase::Generation);
        assert!(!s.chat_enabled());
        assert_eq!(s.field_status("numero"), FieldStatus::Locked);

        s.apply_generation_event(chunk(r#"{"objeto": "Aquisição de note"#));
        assert_eq!(s.field_value("objeto"), "Aquisição de note");
        assert_eq!(s.field_status("objeto"), FieldStatus::Generating);

        s.apply_generation_event(chunk(r#"{"objeto": "Aquisição de notebooks", "justi"#));
        assert_eq!(s.field_status("objeto"), FieldStatus::Done);
        assert_eq!(s.progress_label(), "1 de 5 campos");

        let mut data = ArtifactData::new();
        data.insert("objeto".into(), Value::String("Aquisição de notebooks".into()));
        data.insert("justificativa".into(), Value::String("Renovação".into()));
        data.insert("riscos".into(), serde_json::json!([{"risco": "atraso"}]));
        data.insert("numero".into(), Value::String("999".into()));
        let update = s.apply_generation_event(StreamEvent::Complete { success: true, data: Some(data) });
        assert_eq!(update, GenerationUpdate::Finished);
        assert_eq!(s.phase(), GenerationPhase::Editing);
        assert!(s.data()["riscos"].is_array());
        assert_eq!(s.field_value("numero"), "001");
        assert_eq!(s.field_status("justificativa"), FieldStatus::Done);
        assert!(!s.is_busy());
        assert_eq!(s.end_generation_stream(), GenerationUpdate::Ignored);
    }

    #[test]
    fn test_fallback_parse_when_no_complete_event() {
        let mut s = generating();
        s.apply_generation_event(chunk("```json\n{\"objeto\": \"linha\\\\nnova\", \"justificativa\": \"ok\"}\n```"));
        assert_eq!(s.end_generation_stream(), GenerationUpdate::Finished);
        assert_eq!(s.phase(), GenerationPhase::Editing);
        assert_eq!(s.field_value("justificativa"), "ok");
    }

    #[test]
    fn test_server_error_keeps_phase_and_allows_retry() {
        let mut s = generating();
        let update = s.apply_generation_event(StreamEvent::Error { error: "quota".into() });
        assert_eq!(update, GenerationUpdate::ServerError("quota".into()));
        assert_eq!(s.end_generation_stream(), GenerationUpdate::Incomplete);
        assert_eq!(s.phase(), GenerationPhase::Generation);
        assert!(!s.chat_enabled());
        assert!(s.can_authorize());
        assert!(s.can_retry_generation());
        assert!(s.authorize_generation(None, ProjectContext::default()).is_ok());
        assert!(!s.can_retry_generation());
    }

    #[test]
    fn test_retry_offered_after_transport_failure_only() {
        let mut s = session();
        assert!(!s.can_retry_generation());
        s.apply_welcome(None);
        s.force_generate(ProjectContext::default()).unwrap();
        assert!(!s.can_retry_generation());
        s.fail_generation(&UseCaseError::transport("HTTP 502"));
        assert_eq!(s.phase(), GenerationPhase::Generation);
        assert!(!s.chat_enabled());
        assert!(!s.ready_to_generate());
        assert!(!s.can_force_generate());
        assert!(s.can_retry_generation());
    }

    #[test]
    fn test_deep_research_intercepts_once() {
        let mut s = session();
        s.set_deep_research(true);
        assert!(s.deep_research_enabled());
        s.begin_chat_turn("Comprar notebooks", ProjectContext::default()).unwrap();
        s.finish_chat_turn();
        match s.authorize_generation(None, ProjectContext::default()).unwrap() {
            Authorization::DeepResearchRequired(req) => {
                assert_eq!(req.topic, "ETP");
                assert_eq!(req.context, "Comprar notebooks");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(s.phase(), GenerationPhase::Preparation);
        match s.authorize_generation(Some("pesquisa".into()), ProjectContext::default()).unwrap() {
            Authorization::Generate(req) => {
                assert_eq!(req.deep_research_context.as_deref(), Some("pesquisa"))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_context_inputs_prefill_user_fields() {
        let mut s = session();
        s.apply_welcome(Some("Bem-vindo".into()));
        let ctx = ProjectContext::from_inputs("Ana", "", "");
        let Authorization::Generate(req) = s.authorize_generation(None, ctx).unwrap() else {
            panic!("expected generate");
        };
        assert_eq!(req.gestor.as_deref(), Some("Ana"));
        assert_eq!(s.field_value("responsavel_gestor"), "Ana");
    }

    fn editing() -> ArtifactSession {
        let mut s = generating();
        let mut data = ArtifactData::new();
        data.insert("objeto".into(), Value::String("Texto".into()));
        s.apply_generation_event(StreamEvent::Complete { success: true, data: Some(data) });
        s
    }

    #[test]
    fn test_regeneration_uses_field_context_only() {
        let mut s = editing();
        s.toggle_session_skill(1);
        s.add_attachment(Attachment {
            mime_type: "text/plain".into(),
            filename: "global.txt".into(),
            url: String::new(),
            extracted_text: None,
        });
        s.regen_mut().toggle_skill("objeto", 9);
        s.regen_mut().set_model("objeto", SelectedModel::new("m/z", "Z"));
        let req = s.begin_regeneration("objeto", "").unwrap();
        assert_eq!(req.active_skills, vec![9]);
        assert!(req.attachments.is_empty());
        assert_eq!(req.model, "m/z");
        assert_eq!(req.prompt_adicional, DEFAULT_REGEN_PROMPT);
        assert_eq!(req.valor_atual, "Texto");
        assert!(s.begin_regeneration("justificativa", "").is_err());
    }

    #[test]
    fn test_regeneration_success_closes_panel() {
        let mut s = editing();
        s.regen_mut().toggle_panel("objeto");
        s.begin_regeneration("objeto", "mais formal").unwrap();
        s.apply_regeneration_event(chunk("Novo")).unwrap();
        assert_eq!(s.field_value("objeto"), "Novo");
        s.apply_regeneration_event(StreamEvent::Done { content: Some("Novo texto".into()) })
            .unwrap();
        assert_eq!(s.complete_regeneration().unwrap(), "objeto");
        assert_eq!(s.field_value("objeto"), "Novo texto");
        assert!(!s.regen().is_open("objeto"));
        assert!(s.messages().last().unwrap().content.contains("regenerado com sucesso"));
    }

    #[test]
    fn test_regeneration_failure_keeps_panel_open() {
        let mut s = editing();
        s.regen_mut().toggle_panel("objeto");
        s.begin_regeneration("objeto", "").unwrap();
        let err = s
            .apply_regeneration_event(StreamEvent::Error { error: "limite".into() })
            .unwrap_err();
        assert_eq!(s.fail_regeneration(&err), "limite");
        assert!(s.regen().is_open("objeto"));
        assert_eq!(s.field_status("objeto"), FieldStatus::Error);
        assert!(!s.is_regenerating());
        assert!(s.begin_regeneration("objeto", "").is_ok());
    }

    #[test]
    fn test_field_events_skip_auto_and_undeclared_keys() {
        let mut s = generating();
        let update = s.apply_generation_event(StreamEvent::Field {
            field: "numero".into(),
            value: Value::String("999".into()),
        });
        assert_eq!(update, GenerationUpdate::Ignored);
        assert_eq!(s.field_value("numero"), "001");
        assert_eq!(s.field_status("numero"), FieldStatus::Locked);

        let update = s.apply_generation_event(StreamEvent::Field {
            field: "desconhecido".into(),
            value: Value::String("x".into()),
        });
        assert_eq!(update, GenerationUpdate::Ignored);
        assert!(!s.data().contains_key("desconhecido"));

        let update = s.apply_generation_event(StreamEvent::Field {
            field: "objeto".into(),
            value: Value::String("Notebooks".into()),
        });
        assert_eq!(update, GenerationUpdate::FieldSet("objeto".into()));
        assert_eq!(s.field_status("objeto"), FieldStatus::Done);
    }

    #[test]
    fn test_chat_and_regeneration_exclude_each_other() {
        let mut s = editing();
        s.begin_regeneration("objeto", "").unwrap();
        let len = s.messages().len();
        assert!(!s.chat_enabled());
        assert!(s.begin_chat_turn("oi", ProjectContext::default()).is_none());
        assert_eq!(s.messages().len(), len);

        let mut s = editing();
        s.begin_chat_turn("oi", ProjectContext::default()).unwrap();
        let len = s.messages().len();
        let err = s.begin_regeneration("objeto", "").unwrap_err();
        assert_eq!(err.code, UseCaseError::INVALID_TRANSITION);
        assert!(!s.is_regenerating());
        assert_eq!(s.messages().len(), len);
    }

    #[test]
    fn test_auto_fields_are_locked() {
        let mut s = editing();
        assert!(s.set_field_value("numero", "2".into()).is_err());
        assert!(s.set_field_value("responsavel_gestor", "Bia".into()).is_ok());
        assert!(s.begin_regeneration("numero", "").is_err());
    }

    #[test]
    fn test_edit_entry_starts_in_editing() {
        let mut cfg = config();
        cfg.fase_inicial = Some(GenerationPhase::Editing);
        cfg.editar_id = Some("5".into());
        cfg.editar_versao = Some("3".into());
        cfg.editar_status = Some(ArtifactStatus::Aprovado);
        cfg.update_endpoint = Some("/api/etp/{id}".into());
        let s = ArtifactSession::new(cfg, SelectedModel::default(), 10);
        assert_eq!(s.phase(), GenerationPhase::Editing);
        assert_eq!(s.workspace_title(), "Editando ETP v3");
        assert_eq!(s.status_badge(), "Aprovado");
        assert!(s.messages()[0].content.contains("Modo Edição - ETP v3"));
        let plan = s.plan_save(ArtifactStatus::Rascunho).unwrap();
        assert_eq!(plan.url, "/api/etp/5");
    }

    #[test]
    fn test_parse_full_response_variants() {
        assert!(parse_full_response("").is_none());
        assert!(parse_full_response("not json").is_none());
        let data = parse_full_response("```\n{\"a\": \"b\"}\n```").unwrap();
        assert_eq!(data["a"], "b");
    }
}
