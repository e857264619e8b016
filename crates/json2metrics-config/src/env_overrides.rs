use super::{InputMode, LogFormat, RuntimeConfig};
use anyhow::{anyhow, Context, Result};
use json2metrics_core::TimeFormat;

pub const ENV_PREFIX: &str = "JSON2METRICS_";

/// Abstraction over environment-variable lookups so tests (and embedding hosts)
/// can supply their own source of overrides.
pub trait EnvSource {
    /// Get a variable by its name without the JSON2METRICS_ prefix
    fn get(&self, key: &str) -> Option<String>;
}

/// Apply environment-variable overrides (highest priority) to the runtime config.
pub fn apply_env_overrides<E: EnvSource>(config: &mut RuntimeConfig, env: &E) -> Result<()> {
    // Converter configuration
    if let Some(name) = get_env_string(env, "METRIC_NAME") {
        config.converter.default_metric_name = name;
    }
    if let Some(key) = get_env_string(env, "NAME_KEY") {
        config.converter.name_key = non_empty(key);
    }
    if let Some(keys) = get_env_string(env, "TAG_KEYS") {
        config.converter.tag_keys = split_list(&keys).collect();
    }
    if let Some(key) = get_env_string(env, "TIMESTAMP_KEY") {
        config.converter.timestamp_key = non_empty(key);
    }
    if let Some(format) = get_env_string(env, "TIME_FORMAT") {
        config.converter.time_format = TimeFormat::from(format);
    }
    if let Some(val) = get_env_bool(env, "STRING_FIELDS_ALLOWED")? {
        config.converter.string_fields_allowed = val;
    }
    if let Some(keys) = get_env_string(env, "STRING_FIELDS") {
        config.converter.string_fields = split_list(&keys).collect();
    }
    if let Some(separator) = get_env_string(env, "FLATTEN_SEPARATOR") {
        config.converter.flatten_separator = non_empty(separator);
    }
    if let Some(query) = get_env_string(env, "QUERY") {
        config.converter.query = non_empty(query);
    }

    // Input configuration
    if let Some(mode) = get_env_string(env, "INPUT_MODE") {
        config.input.mode = mode
            .parse::<InputMode>()
            .context("Invalid JSON2METRICS_INPUT_MODE value")?;
    }
    if let Some(val) = get_env_usize(env, "MAX_INPUT_BYTES")? {
        config.input.max_input_bytes = val;
    }

    // Logging
    if let Some(level) = get_env_string(env, "LOG_LEVEL") {
        config.log.level = level;
    }
    if let Some(format) = get_env_string(env, "LOG_FORMAT") {
        config.log.format = format
            .parse::<LogFormat>()
            .context("Invalid JSON2METRICS_LOG_FORMAT value")?;
    }

    Ok(())
}

fn get_env_string<E: EnvSource>(env: &E, key: &str) -> Option<String> {
    env.get(key)
}

fn get_env_usize<E: EnvSource>(env: &E, key: &str) -> Result<Option<usize>> {
    match get_env_string(env, key) {
        Some(val) => {
            let parsed = val
                .parse::<usize>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

fn get_env_bool<E: EnvSource>(env: &E, key: &str) -> Result<Option<bool>> {
    match get_env_string(env, key) {
        Some(val) => {
            let parsed = val.parse::<bool>().map_err(|e| {
                anyhow!(
                    "Failed to parse {}{} (expected bool): {}",
                    ENV_PREFIX,
                    key,
                    e
                )
            })?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

/// Comma separated list, blanks skipped
fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapEnv(HashMap<&'static str, &'static str>);

    impl EnvSource for MapEnv {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key).map(|v| v.to_string())
        }
    }

    fn env(pairs: &[(&'static str, &'static str)]) -> MapEnv {
        MapEnv(pairs.iter().copied().collect())
    }

    #[test]
    fn test_converter_overrides() {
        let mut config = RuntimeConfig::default();
        apply_env_overrides(
            &mut config,
            &env(&[
                ("METRIC_NAME", "sensor"),
                ("NAME_KEY", "name"),
                ("TAG_KEYS", "host, region,,dc"),
                ("TIMESTAMP_KEY", "ts"),
                ("TIME_FORMAT", "unix_ms"),
                ("STRING_FIELDS_ALLOWED", "false"),
                ("STRING_FIELDS", "status"),
                ("FLATTEN_SEPARATOR", "_"),
                ("QUERY", "data.metrics"),
            ]),
        )
        .unwrap();

        let converter = &config.converter;
        assert_eq!(converter.default_metric_name, "sensor");
        assert_eq!(converter.name_key.as_deref(), Some("name"));
        let tag_keys: Vec<_> = converter.tag_keys.iter().map(String::as_str).collect();
        assert_eq!(tag_keys, vec!["dc", "host", "region"]);
        assert_eq!(converter.timestamp_key.as_deref(), Some("ts"));
        assert_eq!(converter.time_format, TimeFormat::UnixMs);
        assert!(!converter.string_fields_allowed);
        assert!(converter.string_fields.contains("status"));
        assert_eq!(converter.flatten_separator.as_deref(), Some("_"));
        assert_eq!(converter.query.as_deref(), Some("data.metrics"));
    }

    #[test]
    fn test_input_and_log_overrides() {
        let mut config = RuntimeConfig::default();
        apply_env_overrides(
            &mut config,
            &env(&[
                ("INPUT_MODE", "lines"),
                ("MAX_INPUT_BYTES", "1024"),
                ("LOG_LEVEL", "debug"),
                ("LOG_FORMAT", "JSON"),
            ]),
        )
        .unwrap();

        assert_eq!(config.input.mode, InputMode::Lines);
        assert_eq!(config.input.max_input_bytes, 1024);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn test_empty_value_clears_optional_key() {
        let mut config = RuntimeConfig::default();
        config.converter.name_key = Some("name".into());
        apply_env_overrides(&mut config, &env(&[("NAME_KEY", "")])).unwrap();
        assert_eq!(config.converter.name_key, None);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let mut config = RuntimeConfig::default();
        assert!(
            apply_env_overrides(&mut config, &env(&[("MAX_INPUT_BYTES", "lots")])).is_err()
        );
        assert!(
            apply_env_overrides(&mut config, &env(&[("STRING_FIELDS_ALLOWED", "yes")])).is_err()
        );
        assert!(apply_env_overrides(&mut config, &env(&[("INPUT_MODE", "stream")])).is_err());

        let err = apply_env_overrides(&mut config, &env(&[("LOG_FORMAT", "yaml")])).unwrap_err();
        assert!(err.to_string().contains("JSON2METRICS_LOG_FORMAT"));
        assert_eq!(config.log.format, LogFormat::Text);
    }
}
