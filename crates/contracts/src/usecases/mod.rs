pub mod common;
pub mod u501_artifact_generation;
pub mod u502_deep_research;
pub mod u503_skill_wizard;
