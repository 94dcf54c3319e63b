pub mod events;
pub mod field_scraper;
pub mod intent;
pub mod phase;
pub mod regen_context;
pub mod request;
pub mod session;

pub use events::StreamEvent;
pub use phase::{GenerationPhase, PhaseMachine};
pub use regen_context::{RegenContext, RegenContextManager, RegenIndicators};
pub use session::{ArtifactSession, Authorization, ChatTurnUpdate, GenerationUpdate};

use crate::usecases::common::UseCaseMetadata;

pub struct ArtifactGeneration;

impl UseCaseMetadata for ArtifactGeneration {
    fn usecase_index() -> &'static str {
        "u501"
    }

    fn usecase_name() -> &'static str {
        "artifact_generation"
    }

    fn display_name() -> &'static str {
        "Elaboração de Artefato"
    }

    fn description() -> &'static str {
        "Chat com a LIA para coletar requisitos e gerar os campos do documento"
    }
}
