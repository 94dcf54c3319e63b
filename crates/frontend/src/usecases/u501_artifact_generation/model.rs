use super::ARTIFACT_CONFIG_ELEMENT_ID;
use crate::shared::api_utils::{api_url, get_json, send_json, stream_events};
use crate::shared::dom::script_text;
use contracts::domain::a002_artifact::lifecycle::{ArtifactRef, SaveMethod, SavePlan};
use contracts::domain::a002_artifact::ArtifactConfig;
use contracts::usecases::common::{error_detail, UseCaseResult};
use contracts::usecases::u501_artifact_generation::request::WelcomeResponse;
use contracts::usecases::u501_artifact_generation::StreamEvent;
use contracts::usecases::u502_deep_research::{DeepResearchRequest, ResearchEvent};
use gloo_net::http::{Request, Response};
use serde::Serialize;
use serde_json::Value;

pub fn load_artifact_config() -> Result<ArtifactConfig, String> {
    let text = script_text(ARTIFACT_CONFIG_ELEMENT_ID)
        .ok_or_else(|| "Configuração do artefato ausente".to_string())?;
    serde_json::from_str(&text).map_err(|e| format!("Configuração do artefato inválida: {}", e))
}

/// Welcome text for a new conversation; `None` when the endpoint fails.
pub async fn fetch_welcome(config: &ArtifactConfig) -> Option<String> {
    match get_json::<WelcomeResponse>(&config.welcome_url()).await {
        Ok(resp) => resp.welcome_message,
        Err(e) => {
            log::warn!("welcome unavailable: {}", e);
            None
        }
    }
}

/// Chat, generation and regeneration all stream the same event shape.
pub async fn stream_artifact<B: Serialize, F: FnMut(StreamEvent)>(
    url: &str,
    body: &B,
    idle_timeout_secs: u32,
    on_event: F,
) -> UseCaseResult<()> {
    stream_events(url, body, idle_timeout_secs, on_event).await
}

pub async fn stream_research<F: FnMut(ResearchEvent)>(
    endpoint: &str,
    request: &DeepResearchRequest,
    idle_timeout_secs: u32,
    on_event: F,
) -> UseCaseResult<()> {
    request.validate()?;
    stream_events(endpoint, request, idle_timeout_secs, on_event).await
}

pub async fn execute_save(plan: &SavePlan) -> Result<Value, String> {
    let method = match plan.method {
        SaveMethod::Post => "POST",
        SaveMethod::Put => "PUT",
    };
    send_json::<Value, Value>(method, &plan.url, &plan.body).await
}

async fn check(response: Response, fallback: &str) -> Result<(), String> {
    if response.ok() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(error_detail(&body).unwrap_or_else(|| fallback.to_string()))
}

pub async fn create_new_version(artifact: &ArtifactRef) -> Result<(), String> {
    let response = Request::post(&api_url(&artifact.new_version_url()))
        .header("Content-Type", "application/json")
        .send()
        .await
        .map_err(|e| format!("Falha ao enviar: {}", e))?;
    check(response, "Erro ao criar versão").await
}

pub async fn delete_artifact(artifact: &ArtifactRef) -> Result<(), String> {
    let response = Request::delete(&api_url(&artifact.delete_url()))
        .send()
        .await
        .map_err(|e| format!("Falha ao enviar: {}", e))?;
    check(response, "Erro ao deletar").await
}

pub async fn publish_to_sei(artifact: &ArtifactRef, version_id: &str) -> Result<(), String> {
    let response = Request::post(&api_url(&artifact.publish_sei_url(version_id)))
        .header("Content-Type", "application/json")
        .send()
        .await
        .map_err(|e| format!("Falha ao enviar: {}", e))?;
    check(response, "Erro ao publicar no SEI").await
}
