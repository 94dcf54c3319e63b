use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub endpoints: EndpointsConfig,
    pub chat: ChatConfig,
    pub price_table: PriceTableConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointsConfig {
    pub price_search: String,
    pub contract_detail: String,
    pub quotation_save: String,
    pub upload: String,
    pub models: String,
    pub skills: String,
    pub skills_chat: String,
    pub deep_research: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Number of trailing messages sent as request context.
    pub history_window: usize,
    pub default_model_id: String,
    pub default_model_name: String,
    pub stream_idle_timeout_secs: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTableConfig {
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    pub histogram_bins: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    pub notification_duration_ms: u32,
}

/// Defaults compiled into the bundle
pub const DEFAULT_CONFIG: &str = r#"
[endpoints]
price_search = "/api/v1/precos"
contract_detail = "/api/v1/contratacao"
quotation_save = "/api/pesquisa_precos/salvar"
upload = "/api/ia-upload/"
models = "/api/ia/models"
skills = "/api/skills"
skills_chat = "/api/skills/chat"
deep_research = "/api/ia-native/deep-research/stream"

[chat]
history_window = 10
default_model_id = "arcee-ai/trinity-mini:free"
default_model_name = "Trinity Mini"
stream_idle_timeout_secs = 120

[price_table]
page_size = 25
page_size_options = [10, 25, 50, 100]
histogram_bins = 12

[ui]
notification_duration_ms = 5000
"#;

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoints: EndpointsConfig {
                price_search: "/api/v1/precos".into(),
                contract_detail: "/api/v1/contratacao".into(),
                quotation_save: "/api/pesquisa_precos/salvar".into(),
                upload: "/api/ia-upload/".into(),
                models: "/api/ia/models".into(),
                skills: "/api/skills".into(),
                skills_chat: "/api/skills/chat".into(),
                deep_research: "/api/ia-native/deep-research/stream".into(),
            },
            chat: ChatConfig {
                history_window: 10,
                default_model_id: "arcee-ai/trinity-mini:free".into(),
                default_model_name: "Trinity Mini".into(),
                stream_idle_timeout_secs: 120,
            },
            price_table: PriceTableConfig {
                page_size: 25,
                page_size_options: vec![10, 25, 50, 100],
                histogram_bins: 12,
            },
            ui: UiConfig {
                notification_duration_ms: 5000,
            },
        }
    }
}

/// Load configuration, merging an optional page-supplied TOML fragment over
/// the embedded defaults. Keys missing from the fragment keep their default.
pub fn load_config(page_override: Option<&str>) -> anyhow::Result<ClientConfig> {
    let mut base: toml::Table =
        toml::from_str(DEFAULT_CONFIG).context("parsing embedded default config")?;

    if let Some(fragment) = page_override.filter(|s| !s.trim().is_empty()) {
        let overlay: toml::Table = toml::from_str(fragment).context("parsing page config")?;
        merge_tables(&mut base, overlay);
        log::info!("Using page configuration overrides");
    }

    let config: ClientConfig = toml::Value::Table(base)
        .try_into()
        .context("validating client config")?;
    Ok(config)
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(nested)) => {
                merge_tables(existing, nested)
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = load_config(None).unwrap();
        assert_eq!(config.chat.history_window, 10);
        assert_eq!(config.chat.default_model_id, "arcee-ai/trinity-mini:free");
        assert_eq!(config.price_table.page_size, 25);
        assert_eq!(config.price_table.histogram_bins, 12);
        assert_eq!(config.ui.notification_duration_ms, 5000);
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_override_keeps_other_defaults() {
        let config = load_config(Some("[chat]\nhistory_window = 4\n")).unwrap();
        assert_eq!(config.chat.history_window, 4);
        assert_eq!(config.chat.default_model_name, "Trinity Mini");
        assert_eq!(config.endpoints.models, "/api/ia/models");
    }

    #[test]
    fn test_invalid_override_is_an_error() {
        assert!(load_config(Some("[chat]\nhistory_window = \"many\"\n")).is_err());
    }
}
