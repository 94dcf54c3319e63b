use crate::shared::api_utils::stream_events;
use contracts::usecases::common::UseCaseResult;
use contracts::usecases::u503_skill_wizard::{WizardChatRequest, WizardEvent};

/// `POST /api/skills/chat`, streamed.
pub async fn stream_wizard_turn<F: FnMut(WizardEvent)>(
    endpoint: &str,
    request: &WizardChatRequest,
    idle_timeout_secs: u32,
    on_event: F,
) -> UseCaseResult<()> {
    stream_events(endpoint, request, idle_timeout_secs, on_event).await
}
