use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::seed::default_known_types;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub editor: EditorConfig,
    pub fields: FieldsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Rule types shown in the editor, in display order
    pub known_types: Vec<String>,
    /// Report out-of-range indexes and unknown types instead of ignoring them
    pub strict_bounds: bool,
    /// Start from the sample rules instead of an empty rule set
    pub load_sample: bool,
    /// Answer every confirmation with yes
    pub auto_confirm: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldsConfig {
    pub latency_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            known_types: default_known_types(),
            strict_bounds: false,
            load_sample: true,
            auto_confirm: false,
        }
    }
}

impl Default for FieldsConfig {
    fn default() -> Self {
        Self { latency_ms: 300 }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and config file
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Add default configuration
        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        // Add config file if it exists
        config = config.add_source(config::File::with_name("config").required(false));

        // Environment variables like RULES_EDITOR__STRICT_BOUNDS; keys contain underscores
        config = config.add_source(
            config::Environment::with_prefix("RULES")
                .separator("__")
                .prefix_separator("_")
                .list_separator(",")
                .with_list_parse_key("editor.known_types")
                .try_parsing(true),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }

    pub fn field_latency(&self) -> Duration {
        Duration::from_millis(self.fields.latency_ms)
    }
}
