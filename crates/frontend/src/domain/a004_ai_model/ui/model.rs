use crate::shared::api_utils::get_json;
use contracts::domain::a004_ai_model::ModelsResponse;

/// `GET /api/ia/models`
pub async fn fetch_models(endpoint: &str) -> Result<ModelsResponse, String> {
    get_json(endpoint).await
}
