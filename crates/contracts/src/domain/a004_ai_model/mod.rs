pub mod aggregate;

pub use aggregate::{AiModel, ModelPreference, ModelsResponse, SelectedModel};
