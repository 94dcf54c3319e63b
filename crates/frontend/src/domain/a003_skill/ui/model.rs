use crate::shared::api_utils::{get_json, send_empty, send_json};
use contracts::domain::a003_skill::draft::SkillPayload;
use contracts::domain::a003_skill::{Skill, SkillId};

/// System skills plus the user's own.
pub async fn fetch_skills(endpoint: &str) -> Result<Vec<Skill>, String> {
    get_json(&format!("{}?incluir_sistema=true", endpoint)).await
}

pub async fn create_skill(endpoint: &str, payload: &SkillPayload) -> Result<Skill, String> {
    send_json("POST", endpoint, payload).await
}

pub async fn update_skill(endpoint: &str, id: SkillId, payload: &SkillPayload) -> Result<Skill, String> {
    send_json("PUT", &format!("{}/{}", endpoint, id), payload).await
}

pub async fn delete_skill(endpoint: &str, id: SkillId) -> Result<(), String> {
    send_empty("DELETE", &format!("{}/{}", endpoint, id)).await
}
