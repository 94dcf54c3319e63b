mod deep_research;
mod fields_panel;
mod model;
mod regen_panel;
mod view;
mod view_model;

/// Element holding the page's artifact configuration (JSON).
pub const ARTIFACT_CONFIG_ELEMENT_ID: &str = "lia-artifact-config";

/// Whether the hosting page embeds an artifact to work on.
pub fn has_artifact_config() -> bool {
    crate::shared::dom::script_text(ARTIFACT_CONFIG_ELEMENT_ID).is_some()
}

pub use view::ArtifactWorkspace;
