use serde::{Deserialize, Serialize};

use crate::usecases::common::{UseCaseError, UseCaseResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GenerationPhase {
    /// Free-form chat collecting requirements
    #[default]
    Preparation,
    /// Fields streaming in; chat disabled
    Generation,
    /// Fields editable, per-field regeneration available
    Editing,
}

impl GenerationPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationPhase::Preparation => "preparation",
            GenerationPhase::Generation => "generation",
            GenerationPhase::Editing => "editing",
        }
    }

    /// CSS class of the page layout
    pub fn layout_class(&self) -> &'static str {
        match self {
            GenerationPhase::Preparation => "phase-preparation",
            GenerationPhase::Generation => "phase-generation",
            GenerationPhase::Editing => "phase-editing",
        }
    }
}

/// Single active phase with a fixed transition table.
///
/// `generation -> generation` is allowed so a failed run can be
/// re-authorized. Nothing leaves `editing`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhaseMachine {
    current: GenerationPhase,
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry point for editing an existing artifact.
    pub fn editing() -> Self {
        Self {
            current: GenerationPhase::Editing,
        }
    }

    pub fn current_phase(&self) -> GenerationPhase {
        self.current
    }

    pub fn can_transition(&self, to: GenerationPhase) -> bool {
        use GenerationPhase::*;
        matches!(
            (self.current, to),
            (Preparation, Generation) | (Generation, Generation) | (Generation, Editing)
        )
    }

    pub fn transition(&mut self, to: GenerationPhase) -> UseCaseResult<GenerationPhase> {
        if !self.can_transition(to) {
            return Err(UseCaseError::invalid_transition(format!(
                "{} -> {}",
                self.current.as_str(),
                to.as_str()
            )));
        }
        log::debug!("phase {} -> {}", self.current.as_str(), to.as_str());
        let previous = self.current;
        self.current = to;
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use GenerationPhase::*;

    #[test]
    fn test_forward_path() {
        let mut fsm = PhaseMachine::new();
        assert_eq!(fsm.current_phase(), Preparation);
        assert!(!fsm.can_transition(Editing));
        assert_eq!(fsm.transition(Generation).unwrap(), Preparation);
        assert!(fsm.transition(Generation).is_ok());
        fsm.transition(Editing).unwrap();
        assert_eq!(fsm.current_phase(), Editing);
    }

    #[test]
    fn test_editing_is_final() {
        let mut fsm = PhaseMachine::editing();
        for to in [Preparation, Generation, Editing] {
            assert!(!fsm.can_transition(to));
            let err = fsm.transition(to).unwrap_err();
            assert_eq!(err.code, UseCaseError::INVALID_TRANSITION);
        }
        assert_eq!(fsm.current_phase(), Editing);
    }

    #[test]
    fn test_no_way_back_to_preparation() {
        let mut fsm = PhaseMachine::new();
        fsm.transition(Generation).unwrap();
        assert!(fsm.transition(Preparation).is_err());
        assert_eq!(fsm.current_phase(), Generation);
    }

    #[test]
    fn test_phase_serde() {
        assert_eq!(serde_json::to_string(&Editing).unwrap(), "\"editing\"");
        assert_eq!(Generation.layout_class(), "phase-generation");
    }
}
