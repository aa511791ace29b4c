//! CLI configuration.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use upsell_observability::{LogConfig, LogLevel};
use upsell_widget::UpsellConfig;

/// Config file names searched for, nearest directory first.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["upsell.toml", ".upsell.toml", "upsell.json"];

/// CLI configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Widget configuration.
    #[serde(default)]
    pub upsell: UpsellConfig,

    /// Logging configuration.
    #[serde(default = "default_logging")]
    pub logging: LogConfig,
}

fn default_logging() -> LogConfig {
    LogConfig::human(LogLevel::Warn)
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            upsell: UpsellConfig::default(),
            logging: default_logging(),
        }
    }
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        Self::parse(path, &content)
    }

    /// Parse config text, as JSON when the path ends in `.json`, else TOML.
    pub fn parse(path: &str, content: &str) -> Result<Self> {
        if path.ends_with(".json") {
            serde_json::from_str(content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(content).with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &str) -> Result<()> {
        let content = if path.ends_with(".json") {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path))
    }

    /// Read a value by dot-separated key, e.g. `upsell.collection_handle`.
    pub fn get(&self, key: &str) -> Result<Value> {
        let tree = serde_json::to_value(self)?;
        let mut node = &tree;
        for part in key.split('.') {
            node = match node.get(part) {
                Some(next) => next,
                None => bail!("Unknown config key: {}", key),
            };
        }
        Ok(node.clone())
    }

    /// Set a value by dot-separated key.
    ///
    /// String fields take the value as is; other fields read it as JSON.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut tree = serde_json::to_value(&*self)?;
        let parts: Vec<&str> = key.split('.').collect();
        let Some((field, parents)) = parts.split_last() else {
            bail!("Empty config key");
        };

        let mut node = &mut tree;
        for part in parents {
            node = match node.get_mut(*part) {
                Some(next) => next,
                None => bail!("Unknown config key: {}", key),
            };
        }
        let Some(table) = node.as_object_mut() else {
            bail!("Unknown config key: {}", key);
        };
        // `logging.filter` is omitted from the tree while unset.
        if key != "logging.filter" && !table.contains_key(*field) {
            bail!("Unknown config key: {}", key);
        }

        let parsed = match table.get(*field) {
            Some(Value::String(_)) | None => Value::String(value.to_string()),
            Some(_) => serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string())),
        };
        table.insert(field.to_string(), parsed);

        *self = serde_json::from_value(tree)
            .with_context(|| format!("Invalid value for {}: {}", key, value))?;
        Ok(())
    }
}

/// Generate a default upsell.toml config file.
pub fn generate_default_config() -> String {
    let defaults = UpsellConfig::default();
    format!(
        r#"# Checkout upsell widget configuration

[upsell]
collection_handle = "{handle}"
placeholder_image_url = "{placeholder}"
max_products = {max_products}
max_variants = {max_variants}
feedback_timeout_ms = {timeout}
error_message = "{message}"
guard_reentrant_submissions = true

[logging]
level = "warn"
format = "human"
# filter = "upsell_widget=debug,warn"
"#,
        handle = defaults.collection_handle,
        placeholder = defaults.placeholder_image_url,
        max_products = defaults.max_products,
        max_variants = defaults.max_variants,
        timeout = defaults.feedback_timeout_ms,
        message = defaults.error_message,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use upsell_observability::LogFormat;

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config = CliConfig::parse("upsell.toml", &generate_default_config()).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = CliConfig::parse(
            "upsell.toml",
            r#"
            [upsell]
            collection_handle = "Gifts"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.upsell.collection_handle, "Gifts");
        assert_eq!(config.upsell.feedback_timeout_ms, 3000);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_json_config() {
        let config = CliConfig::parse(
            "upsell.json",
            r#"{"upsell": {"guard_reentrant_submissions": false}}"#,
        )
        .unwrap();
        assert!(!config.upsell.guard_reentrant_submissions);
        assert_eq!(config.logging, default_logging());
    }

    #[test]
    fn test_get_and_set() {
        let mut config = CliConfig::default();
        assert_eq!(
            config.get("upsell.collection_handle").unwrap(),
            Value::String("Merchandise".into())
        );

        config.set("upsell.max_products", "3").unwrap();
        config.set("upsell.collection_handle", "Gifts").unwrap();
        config.set("logging.filter", "upsell_widget=debug").unwrap();
        assert_eq!(config.upsell.max_products, 3);
        assert_eq!(config.upsell.collection_handle, "Gifts");
        assert_eq!(config.logging.filter.as_deref(), Some("upsell_widget=debug"));

        assert!(config.set("upsell.nope", "1").is_err());
        assert!(config.set("upsell.max_products", "many").is_err());
        assert!(config.get("logging.nope").is_err());
    }
}
