//! Guided conversation that drafts a new skill.
//!
//! Unlike the artifact chat, wizard `chunk` events are deltas and are
//! appended to the reply.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::a001_chat_message::{ChatMessage, ChatRole, MessageLog};
use crate::domain::a003_skill::{KnowledgeText, SkillDraft};
use crate::domain::a005_attachment::UploadResponse;

pub const SKILL_READY_MARKER: &str = "[SKILL_READY]";
pub const WIZARD_ERROR_MESSAGE: &str = "Erro ao se comunicar com a IA. Tente novamente.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardEvent {
    Chunk {
        #[serde(default)]
        content: String,
    },
    SkillReady {
        skill: SkillProposal,
    },
    #[serde(other)]
    Other,
}

/// Skill proposed by the wizard; every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillProposal {
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default)]
    pub instrucoes: String,
    #[serde(default)]
    pub tools: Option<Vec<Value>>,
    #[serde(default)]
    pub textos_base: Option<Vec<KnowledgeText>>,
}

impl SkillProposal {
    pub fn into_draft(self) -> SkillDraft {
        SkillDraft {
            nome: self.nome,
            descricao: self.descricao.unwrap_or_default(),
            instrucoes: self.instrucoes,
            tools_json: self
                .tools
                .and_then(|t| serde_json::to_string(&t).ok())
                .unwrap_or_default(),
            textos_base_json: self
                .textos_base
                .and_then(|t| serde_json::to_string_pretty(&t).ok())
                .unwrap_or_default(),
        }
    }
}

/// `POST /api/skills/chat`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardChatRequest {
    pub content: String,
    pub history: Vec<ChatMessage>,
    pub model: String,
}

/// Line shown in the wizard transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardLine {
    pub role: ChatRole,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingFile {
    filename: String,
    extracted_text: String,
}

#[derive(Debug, Clone, Default)]
pub struct WizardSession {
    history: MessageLog,
    transcript: Vec<WizardLine>,
    pending_file: Option<PendingFile>,
    sending: bool,
    reply: String,
    proposal: Option<SkillDraft>,
}

impl WizardSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &[WizardLine] {
        &self.transcript
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn proposal(&self) -> Option<&SkillDraft> {
        self.proposal.as_ref()
    }

    pub fn take_proposal(&mut self) -> Option<SkillDraft> {
        self.proposal.take()
    }

    pub fn pending_file_name(&self) -> Option<&str> {
        self.pending_file.as_ref().map(|f| f.filename.as_str())
    }

    /// Stores an uploaded file for the next message. Returns the preview
    /// label.
    pub fn attach_file(&mut self, upload: &UploadResponse) -> String {
        match upload.extracted_text.as_ref().filter(|t| !t.is_empty()) {
            Some(text) => {
                self.pending_file = Some(PendingFile {
                    filename: upload.filename.clone(),
                    extracted_text: text.clone(),
                });
                format!("📎 {} (Texto extraído)", upload.filename)
            }
            None => {
                self.pending_file = None;
                format!("⚠️ {} (Sem texto extraído)", upload.filename)
            }
        }
    }

    pub fn clear_file(&mut self) {
        self.pending_file = None;
    }

    /// A file alone counts as a message. History keeps the text with the
    /// file contents; the transcript shows only the file name.
    pub fn begin_send(&mut self, content: &str, model: &str) -> Option<WizardChatRequest> {
        let content = content.trim();
        if self.sending || (content.is_empty() && self.pending_file.is_none()) {
            return None;
        }
        let mut display = content.to_string();
        let mut technical = content.to_string();
        if let Some(file) = self.pending_file.take() {
            display.push_str(&format!("\n\n*[Arquivo Anexado: {}]*", file.filename));
            technical.push_str(&format!(
                "\n\n--- CONTEXTO DO ARQUIVO ANEXO ({}) ---\n{}\n--- FIM DO ARQUIVO ---",
                file.filename, file.extracted_text
            ));
        }
        self.transcript.push(WizardLine {
            role: ChatRole::User,
            text: display,
        });
        self.history.push(ChatMessage::user(technical.clone()));
        self.sending = true;
        self.reply.clear();
        Some(WizardChatRequest {
            content: technical,
            history: self.history.all().to_vec(),
            model: model.to_string(),
        })
    }

    /// Returns `true` when the event carried a skill proposal.
    pub fn apply_event(&mut self, event: WizardEvent) -> bool {
        match event {
            WizardEvent::Chunk { content } => {
                self.reply.push_str(&content);
                false
            }
            WizardEvent::SkillReady { skill } => {
                self.proposal = Some(skill.into_draft());
                true
            }
            WizardEvent::Other => false,
        }
    }

    /// Reply text without markers or the trailing JSON payload.
    pub fn reply_display(&self) -> String {
        display_text(&self.reply)
    }

    pub fn finish(&mut self) {
        self.history.push(ChatMessage::assistant(self.reply.clone()));
        self.transcript.push(WizardLine {
            role: ChatRole::Assistant,
            text: display_text(&self.reply),
        });
        self.reply.clear();
        self.sending = false;
    }

    pub fn fail(&mut self) {
        self.reply.clear();
        self.transcript.push(WizardLine {
            role: ChatRole::Assistant,
            text: WIZARD_ERROR_MESSAGE.to_string(),
        });
        self.sending = false;
    }
}

pub fn display_text(text: &str) -> String {
    let cleaned = text.replace(SKILL_READY_MARKER, "");
    let visible = match cleaned.find('{') {
        Some(pos) => &cleaned[..pos],
        None => cleaned.as_str(),
    };
    visible.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_are_deltas() {
        let mut w = WizardSession::new();
        w.begin_send("Quero uma skill", "m").unwrap();
        for part in ["Claro", ", vamos", " lá!"] {
            w.apply_event(WizardEvent::Chunk { content: part.into() });
        }
        assert_eq!(w.reply_display(), "Claro, vamos lá!");
        w.finish();
        assert_eq!(w.transcript().last().unwrap().text, "Claro, vamos lá!");
        assert!(!w.is_sending());
    }

    #[test]
    fn test_marker_and_json_hidden() {
        let text = "Pronto! [SKILL_READY]\n{\"nome\": \"X\"}";
        assert_eq!(display_text(text), "Pronto!");
    }

    #[test]
    fn test_file_context_goes_to_history_only() {
        let mut w = WizardSession::new();
        let label = w.attach_file(&UploadResponse {
            filename: "edital.pdf".into(),
            url: String::new(),
            extracted_text: Some("Cláusula 1".into()),
            mime_type: None,
        });
        assert!(label.contains("Texto extraído"));
        let req = w.begin_send("", "m").unwrap();
        assert!(req.content.contains("--- CONTEXTO DO ARQUIVO ANEXO (edital.pdf) ---\nCláusula 1"));
        assert_eq!(req.history.len(), 1);
        assert!(w.transcript()[0].text.contains("[Arquivo Anexado: edital.pdf]"));
        assert!(!w.transcript()[0].text.contains("Cláusula"));
        assert!(w.pending_file_name().is_none());
    }

    #[test]
    fn test_guard_while_sending_and_empty() {
        let mut w = WizardSession::new();
        assert!(w.begin_send("  ", "m").is_none());
        w.begin_send("oi", "m").unwrap();
        assert!(w.begin_send("de novo", "m").is_none());
        w.fail();
        assert_eq!(w.transcript().last().unwrap().text, WIZARD_ERROR_MESSAGE);
        assert!(w.begin_send("de novo", "m").is_some());
    }

    #[test]
    fn test_skill_ready_event() {
        let ev: WizardEvent = serde_json::from_str(
            r#"{"type":"skill_ready","skill":{"nome":"Pesquisa","instrucoes":"Cite fontes sempre","tools":["google_search"]}}"#,
        )
        .unwrap();
        let mut w = WizardSession::new();
        assert!(w.apply_event(ev));
        let draft = w.take_proposal().unwrap();
        assert_eq!(draft.tools_json, r#"["google_search"]"#);
        assert!(draft.validate().is_ok());
    }
}
