use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::usecases::u501_artifact_generation::phase::GenerationPhase;

/// Current value of every artifact field, keyed by field key.
pub type ArtifactData = Map<String, Value>;

/// Editability class of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// System-computed, read-only
    Auto,
    /// Model-generated, regenerable
    #[default]
    Ia,
    /// Free text typed by the operator
    User,
    Riscos,
    Custom,
    Hidden,
}

impl FieldKind {
    pub fn is_editable(&self) -> bool {
        matches!(self, FieldKind::Ia | FieldKind::User)
    }

    pub fn is_regenerable(&self) -> bool {
        matches!(self, FieldKind::Ia)
    }

    /// Kinds delegated to a page-supplied renderer and populated wholesale.
    pub fn is_custom_rendered(&self) -> bool {
        matches!(self, FieldKind::Riscos | FieldKind::Custom | FieldKind::Hidden)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactFieldSpec {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default = "default_rows")]
    pub rows: u32,
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    /// Preset value of `auto` fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

fn default_rows() -> u32 {
    3
}

impl ArtifactFieldSpec {
    pub fn new(key: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            icon: String::new(),
            rows: default_rows(),
            kind,
            value: None,
        }
    }
}

/// Per-field rendering status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    Pending,
    Generating,
    Done,
    Error,
    Locked,
}

impl FieldStatus {
    pub fn label(&self) -> &'static str {
        match self {
            FieldStatus::Pending => "Aguardando",
            FieldStatus::Generating => "Gerando...",
            FieldStatus::Done => "✓ Gerado",
            FieldStatus::Error => "Erro",
            FieldStatus::Locked => "Automático",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            FieldStatus::Pending => "pending",
            FieldStatus::Generating => "generating",
            FieldStatus::Done | FieldStatus::Locked => "done",
            FieldStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactStatus {
    #[default]
    Rascunho,
    Aprovado,
}

impl ArtifactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactStatus::Rascunho => "rascunho",
            ArtifactStatus::Aprovado => "aprovado",
        }
    }

    pub fn badge(&self) -> &'static str {
        match self {
            ArtifactStatus::Rascunho => "Rascunho",
            ArtifactStatus::Aprovado => "Aprovado",
        }
    }
}

/// Configuration the hosting page embeds for the artifact chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactConfig {
    pub artifact_type: String,
    pub artifact_label: String,
    pub api_base: String,
    #[serde(deserialize_with = "id_as_string")]
    pub projeto_id: String,
    #[serde(default)]
    pub fase_inicial: Option<GenerationPhase>,
    #[serde(default, deserialize_with = "opt_id_as_string")]
    pub editar_id: Option<String>,
    #[serde(default)]
    pub editar_dados: Option<ArtifactData>,
    #[serde(default, deserialize_with = "opt_id_as_string")]
    pub editar_versao: Option<String>,
    #[serde(default)]
    pub editar_status: Option<ArtifactStatus>,
    #[serde(default)]
    pub generate_marker: Option<String>,
    #[serde(default)]
    pub fallback_message: Option<String>,
    #[serde(default)]
    pub save_endpoint: Option<String>,
    #[serde(default)]
    pub update_endpoint: Option<String>,
    #[serde(default)]
    pub fields: Vec<ArtifactFieldSpec>,
}

pub const DEFAULT_GENERATE_MARKER: &str = "[GERAR_DFD]";

impl ArtifactConfig {
    pub fn field(&self, key: &str) -> Option<&ArtifactFieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn field_label<'a>(&'a self, key: &'a str) -> &'a str {
        self.field(key).map(|f| f.label.as_str()).unwrap_or(key)
    }

    pub fn generate_marker(&self) -> &str {
        self.generate_marker
            .as_deref()
            .unwrap_or(DEFAULT_GENERATE_MARKER)
    }

    pub fn is_edit_mode(&self) -> bool {
        self.editar_id.is_some()
    }

    /// Page starts directly in editing on an existing artifact.
    pub fn starts_in_editing(&self) -> bool {
        self.fase_inicial == Some(GenerationPhase::Editing) && self.editar_id.is_some()
    }

    /// Deep research is offered only for study and reference-term artifacts.
    pub fn supports_deep_research(&self) -> bool {
        matches!(self.artifact_type.as_str(), "etp" | "tr")
    }

    pub fn welcome_fallback(&self) -> String {
        self.fallback_message.clone().unwrap_or_else(|| {
            format!(
                "Olá! Sou a **LIA**, sua assistente para elaboração do {} conforme a Lei 14.133/2021.\n\n\
                 Vou te ajudar a elaborar um documento completo e bem fundamentado. Para começar:\n\n\
                 **Me conta: qual problema ou necessidade motivou essa contratação?**",
                self.artifact_label
            )
        })
    }

    pub fn welcome_url(&self) -> String {
        format!("{}/chat/init/{}", self.api_base, self.projeto_id)
    }

    pub fn chat_url(&self) -> String {
        format!("{}/chat/{}", self.api_base, self.projeto_id)
    }

    pub fn generate_url(&self) -> String {
        format!("{}/gerar", self.chat_url())
    }

    pub fn regenerate_url(&self) -> String {
        format!("{}/regenerar-campo", self.chat_url())
    }

    pub fn project_url(&self) -> String {
        format!("/projetos/{}", self.projeto_id)
    }
}

fn id_as_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match Value::deserialize(d)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

fn opt_id_as_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// Renders a field value for a textarea; structured values are pretty-printed.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> ArtifactConfig {
        serde_json::from_value(serde_json::json!({
            "artifactType": "dfd",
            "artifactLabel": "DFD",
            "apiBase": "/api/dfd",
            "projetoId": 42,
            "faseInicial": "editing",
            "editarId": 7,
            "editarVersao": 2,
            "editarStatus": "aprovado",
            "fields": [
                {"key": "numero", "label": "Número", "type": "auto", "value": "001/2025"},
                {"key": "descricao", "label": "Descrição", "icon": "📝", "rows": 5, "type": "ia"},
                {"key": "riscos", "label": "Riscos", "type": "riscos"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_config_accepts_numeric_ids() {
        let config = sample_config();
        assert_eq!(config.projeto_id, "42");
        assert_eq!(config.editar_id.as_deref(), Some("7"));
        assert_eq!(config.editar_versao.as_deref(), Some("2"));
        assert!(config.starts_in_editing());
        assert_eq!(config.generate_marker(), "[GERAR_DFD]");
        assert_eq!(config.generate_url(), "/api/dfd/chat/42/gerar");
        assert!(!config.supports_deep_research());
    }

    #[test]
    fn test_field_kinds() {
        let config = sample_config();
        let numero = config.field("numero").unwrap();
        assert_eq!(numero.kind, FieldKind::Auto);
        assert!(!numero.kind.is_regenerable());
        assert!(!numero.kind.is_editable());
        let descricao = config.field("descricao").unwrap();
        assert!(descricao.kind.is_regenerable());
        assert_eq!(descricao.rows, 5);
        assert!(config.field("riscos").unwrap().kind.is_custom_rendered());
        assert_eq!(config.field_label("nope"), "nope");
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&Value::String("x".into())), "x");
        assert_eq!(display_value(&Value::Null), "");
        assert_eq!(display_value(&serde_json::json!([1])), "[\n  1\n]");
    }
}
