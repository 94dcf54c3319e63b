pub mod aggregate;
pub mod autocomplete;
pub mod draft;

pub use aggregate::{KnowledgeText, Skill, SkillId, SkillScope};
pub use draft::SkillDraft;
