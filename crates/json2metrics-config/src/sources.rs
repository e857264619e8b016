// Configuration source loading
//
// Priority order:
// 1. Environment variables (JSON2METRICS_* prefix)
// 2. Config file path from JSON2METRICS_CONFIG
// 3. Inline config content from JSON2METRICS_CONFIG_CONTENT
// 4. Default config file (./json2metrics.toml)
// 5. Built-in defaults

use crate::env_overrides::{self, EnvSource, ENV_PREFIX};
use crate::*;
use anyhow::{Context, Result};
use std::env;
use std::path::Path;

const DEFAULT_CONFIG_PATHS: &[&str] = &["./json2metrics.toml", "./.json2metrics.toml"];

/// Load configuration using native environment/file access.
pub fn load_config() -> Result<RuntimeConfig> {
    let mut config = load_from_file()?.unwrap_or_default();

    env_overrides::apply_env_overrides(&mut config, &StdEnvSource)?;
    config.validate()?;
    Ok(config)
}

fn load_from_file() -> Result<Option<RuntimeConfig>> {
    if let Ok(path) = env::var(format!("{}CONFIG", ENV_PREFIX)) {
        return read_file(Path::new(&path)).map(Some);
    }

    if let Ok(content) = env::var(format!("{}CONFIG_CONTENT", ENV_PREFIX)) {
        let config = parse_toml(&content)
            .context("Failed to parse inline config from JSON2METRICS_CONFIG_CONTENT")?;
        return Ok(Some(config));
    }

    for path in DEFAULT_CONFIG_PATHS {
        let path = Path::new(path);
        if path.exists() {
            return read_file(path).map(Some);
        }
    }

    Ok(None)
}

/// Load configuration from a specific file path (for CLI --config flag).
/// Returns error if file doesn't exist or can't be parsed; environment
/// overrides still apply on top of the file.
pub fn load_from_file_path(path: impl AsRef<Path>) -> Result<RuntimeConfig> {
    let mut config = read_file(path.as_ref())?;

    env_overrides::apply_env_overrides(&mut config, &StdEnvSource)?;
    config.validate()?;
    Ok(config)
}

pub fn parse_toml(content: &str) -> Result<RuntimeConfig> {
    let config: RuntimeConfig = toml::from_str(content)?;
    Ok(config)
}

fn read_file(path: &Path) -> Result<RuntimeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_toml(&content).with_context(|| format!("Failed to parse config file: {}", path.display()))
}

struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(format!("{}{}", ENV_PREFIX, key)).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_document() {
        let config = parse_toml(
            r#"
            [converter]
            name_key = "name"
            default_metric_name = "sensor"
            tag_keys = ["tags", "meta.region"]
            timestamp_key = "timestamp"
            time_format = "unix_ms"
            string_fields_allowed = false
            string_fields = ["status"]
            flatten_separator = "_"

            [converter.default_tags]
            source = "json"

            [input]
            mode = "lines"
            max_input_bytes = 4096

            [log]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.converter.name_key.as_deref(), Some("name"));
        assert_eq!(config.converter.default_metric_name, "sensor");
        assert!(config.converter.tag_keys.contains("meta.region"));
        assert_eq!(config.converter.time_format, TimeFormat::UnixMs);
        assert!(!config.converter.string_fields_allowed);
        assert_eq!(
            config.converter.default_tags.get("source").map(String::as_str),
            Some("json")
        );
        assert_eq!(config.input.mode, InputMode::Lines);
        assert_eq!(config.input.max_input_bytes, 4096);
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn parse_partial_document_uses_defaults() {
        let config = parse_toml("[log]\nlevel = \"warn\"\n").unwrap();
        assert_eq!(config.log.level, "warn");
        assert_eq!(config.log.format, LogFormat::Text);
        assert_eq!(config.converter, ConverterConfig::default());
        assert_eq!(config.input, InputConfig::default());
    }

    #[test]
    fn parse_rejects_unknown_types() {
        assert!(parse_toml("[input]\nmode = \"stream\"\n").is_err());
        assert!(parse_toml("[converter]\ntag_keys = 5\n").is_err());
    }
}
