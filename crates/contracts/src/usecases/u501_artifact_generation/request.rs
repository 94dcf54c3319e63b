use serde::{Deserialize, Serialize};

use crate::domain::a001_chat_message::ChatMessage;
use crate::domain::a003_skill::SkillId;
use crate::domain::a005_attachment::Attachment;

pub const DEFAULT_REGEN_PROMPT: &str = "Melhore o texto mantendo a essência.";

/// Optional context typed in the preparation sidebar
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gestor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiscal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_limite: Option<String>,
}

impl ProjectContext {
    /// Empty inputs become `None`.
    pub fn from_inputs(gestor: &str, fiscal: &str, data_limite: &str) -> Self {
        fn clean(s: &str) -> Option<String> {
            Some(s.trim().to_string()).filter(|s| !s.is_empty())
        }
        Self {
            gestor: clean(gestor),
            fiscal: clean(fiscal),
            data_limite: clean(data_limite),
        }
    }
}

/// `POST {apiBase}/chat/{projetoId}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurnRequest {
    pub content: String,
    pub history: Vec<ChatMessage>,
    pub model: String,
    pub attachments: Vec<Attachment>,
    #[serde(flatten)]
    pub context: ProjectContext,
}

/// `POST {apiBase}/chat/{projetoId}/gerar`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    pub history: Vec<ChatMessage>,
    pub gestor: Option<String>,
    pub fiscal: Option<String>,
    pub data_limite: Option<String>,
    pub model: String,
    pub attachments: Vec<Attachment>,
    pub skills: Vec<SkillId>,
    pub deep_research_context: Option<String>,
}

/// `POST {apiBase}/chat/{projetoId}/regenerar-campo`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegenerateFieldRequest {
    pub campo: String,
    pub history: Vec<ChatMessage>,
    pub prompt_adicional: String,
    pub valor_atual: String,
    pub model: String,
    pub active_skills: Vec<SkillId>,
    pub attachments: Vec<Attachment>,
}

/// Answer of `GET {apiBase}/chat/init/{projetoId}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WelcomeResponse {
    #[serde(default)]
    pub welcome_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_turn_flattens_context() {
        let req = ChatTurnRequest {
            content: "Oi".into(),
            history: vec![],
            model: "m".into(),
            attachments: vec![],
            context: ProjectContext::from_inputs(" Ana ", "", "2025-03-01"),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["gestor"], "Ana");
        assert_eq!(json["data_limite"], "2025-03-01");
        assert!(json.get("fiscal").is_none());
    }

    #[test]
    fn test_generate_sends_nulls() {
        let req = GenerateRequest {
            history: vec![],
            gestor: None,
            fiscal: None,
            data_limite: None,
            model: "m".into(),
            attachments: vec![],
            skills: vec![3],
            deep_research_context: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json["gestor"].is_null());
        assert!(json["deep_research_context"].is_null());
        assert_eq!(json["skills"], serde_json::json!([3]));
    }
}
