pub mod session;

pub use session::{SkillProposal, WizardChatRequest, WizardEvent, WizardLine, WizardSession};

use crate::usecases::common::UseCaseMetadata;

pub struct SkillWizard;

impl UseCaseMetadata for SkillWizard {
    fn usecase_index() -> &'static str {
        "u503"
    }

    fn usecase_name() -> &'static str {
        "skill_wizard"
    }

    fn display_name() -> &'static str {
        "Assistente de Skills"
    }

    fn description() -> &'static str {
        "Conversa guiada que propõe uma nova skill pronta para salvar"
    }
}
