//! Optional web-research pass run before generation.
//!
//! Research events carry a `step` instead of a `type` tag. The `complete`
//! step holds the synthesized context injected into the generation request.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::usecases::common::{UseCaseError, UseCaseMetadata, UseCaseResult};

pub struct DeepResearch;

impl UseCaseMetadata for DeepResearch {
    fn usecase_index() -> &'static str {
        "u502"
    }

    fn usecase_name() -> &'static str {
        "deep_research"
    }

    fn display_name() -> &'static str {
        "Pesquisa Aprofundada"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepResearchRequest {
    pub topic: String,
    pub context: String,
}

impl DeepResearchRequest {
    pub fn validate(&self) -> UseCaseResult<()> {
        if self.context.trim().is_empty() {
            return Err(UseCaseError::validation(
                "Por favor, forneça um contexto para a pesquisa.",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResearchStep {
    Start,
    Plan,
    Queries,
    Search,
    Read,
    Synthesize,
    Complete,
    #[serde(other)]
    Other,
}

impl ResearchStep {
    pub fn icon(&self) -> &'static str {
        match self {
            ResearchStep::Start => "🏁",
            ResearchStep::Plan => "🗺️",
            ResearchStep::Queries => "❓",
            ResearchStep::Search => "🔍",
            ResearchStep::Read => "📖",
            ResearchStep::Synthesize => "🧠",
            ResearchStep::Complete => "✅",
            ResearchStep::Other => "ℹ️",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            ResearchStep::Start => "start",
            ResearchStep::Plan => "plan",
            ResearchStep::Queries => "queries",
            ResearchStep::Search => "search",
            ResearchStep::Read => "read",
            ResearchStep::Synthesize => "synthesize",
            ResearchStep::Complete => "complete",
            ResearchStep::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchEvent {
    pub step: ResearchStep,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Value,
}

impl ResearchEvent {
    /// Queries listed by a `queries` step.
    pub fn queries(&self) -> Vec<String> {
        if self.step != ResearchStep::Queries {
            return Vec::new();
        }
        self.data
            .get("queries")
            .and_then(Value::as_array)
            .map(|qs| {
                qs.iter()
                    .filter_map(|q| q.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn context(&self) -> Option<&str> {
        self.data.get("context").and_then(Value::as_str)
    }
}

/// Timeline of one research run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResearchProgress {
    pub steps: Vec<ResearchEvent>,
    pub status: String,
    pub result: Option<String>,
}

pub const RESEARCH_START_STATUS: &str = "Iniciando agentes de pesquisa...";

impl ResearchProgress {
    pub fn new() -> Self {
        Self {
            status: RESEARCH_START_STATUS.to_string(),
            ..Default::default()
        }
    }

    pub fn apply(&mut self, event: ResearchEvent) {
        if event.step == ResearchStep::Complete {
            self.result = Some(event.context().unwrap_or_default().to_string());
        }
        if !event.message.is_empty() {
            self.status = event.message.clone();
        }
        self.steps.push(event);
    }

    pub fn is_complete(&self) -> bool {
        self.result.is_some()
    }

    /// Context injected into generation; empty when research produced none.
    pub fn into_context(self) -> String {
        self.result.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(raw: &str) -> ResearchEvent {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_progress_collects_result() {
        let mut p = ResearchProgress::new();
        p.apply(event(r#"{"step":"start","message":"Começando"}"#));
        p.apply(event(r#"{"step":"queries","message":"Consultas","data":{"queries":["preço notebook","ETP TI"]}}"#));
        assert_eq!(p.steps[1].queries(), vec!["preço notebook", "ETP TI"]);
        assert!(!p.is_complete());
        p.apply(event(r#"{"step":"complete","message":"Pronto","data":{"context":"Síntese"}}"#));
        assert_eq!(p.status, "Pronto");
        assert_eq!(p.into_context(), "Síntese");
    }

    #[test]
    fn test_unknown_step_uses_info_icon() {
        let e = event(r#"{"step":"rank","message":"x"}"#);
        assert_eq!(e.step, ResearchStep::Other);
        assert_eq!(e.step.icon(), "ℹ️");
        assert!(e.queries().is_empty());
    }

    #[test]
    fn test_request_needs_context() {
        let req = DeepResearchRequest { topic: "ETP".into(), context: "  ".into() };
        assert!(req.validate().unwrap_err().is_validation());
    }
}
