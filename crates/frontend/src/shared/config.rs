use contracts::shared::config::{load_config, ClientConfig};
use leptos::prelude::*;

use super::dom::script_text;

/// Element holding page overrides for the client configuration (TOML).
pub const CONFIG_ELEMENT_ID: &str = "lia-client-config";

/// Embedded defaults merged with the page's override block. A broken
/// override is logged and ignored.
pub fn load_client_config() -> ClientConfig {
    let page_override = script_text(CONFIG_ELEMENT_ID);
    match load_config(page_override.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("invalid client config override: {:#}", e);
            ClientConfig::default()
        }
    }
}

pub fn use_config() -> ClientConfig {
    use_context::<ClientConfig>().expect("ClientConfig not provided")
}
