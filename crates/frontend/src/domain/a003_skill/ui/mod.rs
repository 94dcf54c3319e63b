//! Skills settings (MVVM)
//!
//! - model.rs: API calls
//! - view_model.rs: SkillSettingsVm
//! - view.rs: SkillSettings page
//! - editor.rs: SkillEditor form, also used by the wizard preview

mod editor;
mod model;
mod view;
mod view_model;

pub use editor::SkillEditor;
pub use model::{create_skill, fetch_skills};
pub use view::SkillSettings;
