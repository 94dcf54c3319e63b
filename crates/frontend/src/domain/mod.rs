pub mod a003_skill;
pub mod a004_ai_model;
