//! Editable form state for creating or updating a skill.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::aggregate::{KnowledgeText, Skill};
use crate::domain::a005_attachment::UploadResponse;
use crate::usecases::common::{UseCaseError, UseCaseResult};

pub const NAME_MIN: usize = 3;
pub const NAME_MAX: usize = 200;
pub const DESCRIPTION_MAX: usize = 1000;
pub const INSTRUCTIONS_MIN: usize = 10;
pub const INSTRUCTIONS_MAX: usize = 5000;

/// Raw form text; tools and knowledge texts are typed as JSON.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillDraft {
    pub nome: String,
    pub descricao: String,
    pub instrucoes: String,
    pub tools_json: String,
    pub textos_base_json: String,
}

/// Payload accepted by `POST /api/skills` and `PUT /api/skills/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillPayload {
    pub nome: String,
    pub descricao: String,
    pub instrucoes: String,
    pub tools: Option<Vec<Value>>,
    pub textos_base: Option<Vec<KnowledgeText>>,
}

impl SkillDraft {
    pub fn from_skill(skill: &Skill) -> Self {
        Self {
            nome: skill.nome.clone(),
            descricao: skill.descricao.clone().unwrap_or_default(),
            instrucoes: skill.instrucoes.clone(),
            tools_json: skill
                .tools
                .as_ref()
                .and_then(|t| serde_json::to_string(t).ok())
                .unwrap_or_default(),
            textos_base_json: skill
                .textos_base
                .as_ref()
                .and_then(|t| serde_json::to_string_pretty(t).ok())
                .unwrap_or_default(),
        }
    }

    /// Validates lengths and JSON fields, producing the request body.
    pub fn validate(&self) -> UseCaseResult<SkillPayload> {
        let nome = self.nome.trim();
        let len = nome.chars().count();
        if !(NAME_MIN..=NAME_MAX).contains(&len) {
            return Err(UseCaseError::validation(format!(
                "O nome deve ter entre {NAME_MIN} e {NAME_MAX} caracteres"
            )));
        }
        let descricao = self.descricao.trim();
        if descricao.chars().count() > DESCRIPTION_MAX {
            return Err(UseCaseError::validation(format!(
                "A descrição deve ter no máximo {DESCRIPTION_MAX} caracteres"
            )));
        }
        let instrucoes = self.instrucoes.trim();
        let len = instrucoes.chars().count();
        if !(INSTRUCTIONS_MIN..=INSTRUCTIONS_MAX).contains(&len) {
            return Err(UseCaseError::validation(format!(
                "As instruções devem ter entre {INSTRUCTIONS_MIN} e {INSTRUCTIONS_MAX} caracteres"
            )));
        }

        Ok(SkillPayload {
            nome: nome.to_string(),
            descricao: descricao.to_string(),
            instrucoes: instrucoes.to_string(),
            tools: self.parse_tools()?,
            textos_base: self.parse_textos_base()?,
        })
    }

    fn parse_tools(&self) -> UseCaseResult<Option<Vec<Value>>> {
        let raw = self.tools_json.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => Ok(Some(items)),
            Ok(_) => Err(UseCaseError::validation(
                "Erro no formato JSON das tools: Tools deve ser uma lista JSON",
            )),
            Err(e) => Err(UseCaseError::validation(format!(
                "Erro no formato JSON das tools: {e}"
            ))),
        }
    }

    fn parse_textos_base(&self) -> UseCaseResult<Option<Vec<KnowledgeText>>> {
        let raw = self.textos_base_json.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(raw).map(Some).map_err(|e| {
            UseCaseError::validation(format!(
                "Erro no formato JSON da Base de Conhecimento: {e}"
            ))
        })
    }

    /// Appends an uploaded document to the knowledge texts.
    ///
    /// Returns `false` when the upload produced no text.
    pub fn append_upload(&mut self, upload: &UploadResponse) -> UseCaseResult<bool> {
        let Some(text) = upload.extracted_text.as_ref().filter(|t| !t.is_empty()) else {
            return Ok(false);
        };
        let mut texts = self.parse_textos_base()?.unwrap_or_default();
        texts.push(KnowledgeText {
            titulo: upload.filename.clone(),
            conteudo: text.clone(),
        });
        self.textos_base_json = serde_json::to_string_pretty(&texts)
            .map_err(|e| UseCaseError::internal(e.to_string()))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> SkillDraft {
        SkillDraft {
            nome: "Pesquisa de mercado".into(),
            descricao: "Ajuda com preços".into(),
            instrucoes: "Sempre cite três fontes.".into(),
            tools_json: r#"["google_search"]"#.into(),
            textos_base_json: String::new(),
        }
    }

    #[test]
    fn test_valid_draft() {
        let payload = valid().validate().unwrap();
        assert_eq!(payload.tools.unwrap().len(), 1);
        assert!(payload.textos_base.is_none());
    }

    #[test]
    fn test_length_rules() {
        let mut d = valid();
        d.nome = "ab".into();
        assert!(d.validate().unwrap_err().is_validation());

        let mut d = valid();
        d.instrucoes = "curta".into();
        assert!(d.validate().is_err());

        let mut d = valid();
        d.descricao = "x".repeat(1001);
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_tools_must_be_array() {
        let mut d = valid();
        d.tools_json = r#"{"a": 1}"#.into();
        let err = d.validate().unwrap_err();
        assert!(err.message.contains("lista JSON"));
    }

    #[test]
    fn test_append_upload() {
        let mut d = valid();
        let upload = UploadResponse {
            filename: "lei.pdf".into(),
            url: "/files/lei.pdf".into(),
            extracted_text: Some("Art. 1".into()),
            mime_type: None,
        };
        assert!(d.append_upload(&upload).unwrap());
        assert!(d.append_upload(&upload).unwrap());
        let payload = d.validate().unwrap();
        let texts = payload.textos_base.unwrap();
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[0].titulo, "lei.pdf");

        let empty = UploadResponse {
            extracted_text: None,
            ..upload
        };
        assert!(!d.append_upload(&empty).unwrap());
    }
}
