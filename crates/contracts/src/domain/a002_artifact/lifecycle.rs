//! Persistence and lifecycle requests for a finished artifact.

use serde::Serialize;
use serde_json::Value;

use super::aggregate::{ArtifactConfig, ArtifactData, ArtifactStatus};
use crate::usecases::common::{UseCaseError, UseCaseResult};

/// Body of a create call against `saveEndpoint`
#[derive(Debug, Clone, Serialize)]
pub struct SaveArtifactRequest {
    pub projeto_id: String,
    pub tipo_artefato: String,
    pub data: ArtifactData,
    pub status: ArtifactStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMethod {
    Post,
    Put,
}

/// Fully resolved save call
#[derive(Debug, Clone)]
pub struct SavePlan {
    pub method: SaveMethod,
    pub url: String,
    pub body: Value,
    pub success_message: String,
}

/// Chooses between update (edit mode with an update endpoint) and create.
pub fn plan_save(
    config: &ArtifactConfig,
    data: ArtifactData,
    status: ArtifactStatus,
) -> UseCaseResult<SavePlan> {
    let verb = match (config.is_edit_mode(), status) {
        (true, _) => "atualizado",
        (false, ArtifactStatus::Aprovado) => "aprovado",
        (false, ArtifactStatus::Rascunho) => "salvo",
    };
    let success_message = format!(
        "🎉 **{} {} com sucesso!** Redirecionando...",
        config.artifact_label, verb
    );

    if let (Some(id), Some(endpoint)) = (&config.editar_id, &config.update_endpoint) {
        let mut body = data;
        body.insert("status".into(), Value::String(status.as_str().into()));
        return Ok(SavePlan {
            method: SaveMethod::Put,
            url: endpoint.replace("{id}", id),
            body: Value::Object(body),
            success_message,
        });
    }

    let endpoint = config
        .save_endpoint
        .as_ref()
        .ok_or_else(|| UseCaseError::validation("Nenhum endpoint de salvamento configurado"))?;
    let request = SaveArtifactRequest {
        projeto_id: config.projeto_id.clone(),
        tipo_artefato: config.artifact_type.clone(),
        data,
        status,
    };
    Ok(SavePlan {
        method: SaveMethod::Post,
        url: endpoint.clone(),
        body: serde_json::to_value(request)?,
        success_message,
    })
}

/// Lifecycle endpoints for a stored artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    pub projeto_id: String,
    pub artifact_type: String,
    pub id: String,
}

impl ArtifactRef {
    pub fn from_config(config: &ArtifactConfig) -> Option<Self> {
        Some(Self {
            projeto_id: config.projeto_id.clone(),
            artifact_type: config.artifact_type.clone(),
            id: config.editar_id.clone()?,
        })
    }

    pub fn new_version_url(&self) -> String {
        format!(
            "/api/projetos/{}/artefatos/{}/{}/versao",
            self.projeto_id, self.artifact_type, self.id
        )
    }

    pub fn delete_url(&self) -> String {
        format!("/api/{}/{}", self.artifact_type, self.id)
    }

    pub fn pdf_url(&self) -> String {
        format!("/api/{}/{}/pdf", self.artifact_type, self.id)
    }

    pub fn publish_sei_url(&self, version_id: &str) -> String {
        format!(
            "/api/projetos/{}/artefatos/{}/{}/versoes/{}/publicar-sei",
            self.projeto_id, self.artifact_type, self.id, version_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(edit: bool) -> ArtifactConfig {
        let mut value = serde_json::json!({
            "artifactType": "etp",
            "artifactLabel": "ETP",
            "apiBase": "/api/etp",
            "projetoId": "9",
            "saveEndpoint": "/api/etp",
            "updateEndpoint": "/api/etp/{id}"
        });
        if edit {
            value["editarId"] = serde_json::json!(3);
        }
        serde_json::from_value(value).unwrap()
    }

    fn data() -> ArtifactData {
        let mut data = ArtifactData::new();
        data.insert("objeto".into(), Value::String("Notebooks".into()));
        data
    }

    #[test]
    fn test_create_posts_wrapped_payload() {
        let plan = plan_save(&config(false), data(), ArtifactStatus::Aprovado).unwrap();
        assert_eq!(plan.method, SaveMethod::Post);
        assert_eq!(plan.url, "/api/etp");
        assert_eq!(plan.body["tipo_artefato"], "etp");
        assert_eq!(plan.body["status"], "aprovado");
        assert_eq!(plan.body["data"]["objeto"], "Notebooks");
        assert!(plan.success_message.contains("ETP aprovado"));
    }

    #[test]
    fn test_update_puts_flat_payload() {
        let plan = plan_save(&config(true), data(), ArtifactStatus::Rascunho).unwrap();
        assert_eq!(plan.method, SaveMethod::Put);
        assert_eq!(plan.url, "/api/etp/3");
        assert_eq!(plan.body["objeto"], "Notebooks");
        assert_eq!(plan.body["status"], "rascunho");
        assert!(plan.success_message.contains("atualizado"));
    }

    #[test]
    fn test_lifecycle_urls() {
        let r = ArtifactRef::from_config(&config(true)).unwrap();
        assert_eq!(r.new_version_url(), "/api/projetos/9/artefatos/etp/3/versao");
        assert_eq!(r.pdf_url(), "/api/etp/3/pdf");
        assert_eq!(
            r.publish_sei_url("11"),
            "/api/projetos/9/artefatos/etp/3/versoes/11/publicar-sei"
        );
        assert!(ArtifactRef::from_config(&config(false)).is_none());
    }
}
