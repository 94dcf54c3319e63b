pub mod u501_artifact_generation;
pub mod u503_skill_wizard;
