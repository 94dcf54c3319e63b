pub mod a001_chat_message;
pub mod a002_artifact;
pub mod a003_skill;
pub mod a004_ai_model;
pub mod a005_attachment;
