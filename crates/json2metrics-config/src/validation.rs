// Configuration validation
//
// Validates that required fields are present and values are sensible

use crate::*;
use anyhow::{bail, Result};
use tracing::warn;

pub fn validate_config(config: &RuntimeConfig) -> Result<()> {
    validate_converter_config(&config.converter)?;
    validate_input_config(&config.input)?;
    validate_log_config(&config.log)?;
    Ok(())
}

fn validate_converter_config(config: &ConverterConfig) -> Result<()> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("converter: {}", e))?;

    // Keys claimed by the name or timestamp never reach the tag set
    for claimed in [&config.name_key, &config.timestamp_key].into_iter().flatten() {
        if config.tag_keys.contains(claimed) {
            warn!(
                key = %claimed,
                "converter.tag_keys contains a key already used as name or timestamp; it will not become a tag"
            );
        }
    }

    if !config.string_fields_allowed && config.string_fields.is_empty() {
        warn!("converter.string_fields_allowed is false; all string values will be dropped");
    }

    Ok(())
}

fn validate_input_config(config: &InputConfig) -> Result<()> {
    if config.max_input_bytes == 0 {
        bail!("input.max_input_bytes must be greater than 0");
    }

    if config.max_input_bytes > 256 * 1024 * 1024 {
        // 256 MB
        warn!(
            max_input_bytes = config.max_input_bytes,
            "input.max_input_bytes is very large; the whole payload is held in memory"
        );
    }

    Ok(())
}

fn validate_log_config(config: &LogConfig) -> Result<()> {
    if config.level.trim().is_empty() {
        bail!("log.level must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_converter_config() {
        assert!(validate_converter_config(&ConverterConfig::default()).is_ok());

        let invalid = ConverterConfig::default().with_default_metric_name("");
        let err = validate_converter_config(&invalid).unwrap_err();
        assert!(err.to_string().contains("default_metric_name"));

        // Shadowed tag keys only warn
        let shadowed = ConverterConfig::default()
            .with_name_key("name")
            .with_tag_keys(["name"]);
        assert!(validate_converter_config(&shadowed).is_ok());
    }

    #[test]
    fn test_validate_input_config() {
        let valid = InputConfig {
            mode: InputMode::Lines,
            max_input_bytes: 1024,
        };
        assert!(validate_input_config(&valid).is_ok());

        let invalid = InputConfig {
            mode: InputMode::Buffer,
            max_input_bytes: 0,
        };
        assert!(validate_input_config(&invalid).is_err());
    }

    #[test]
    fn test_validate_log_config() {
        let invalid = LogConfig {
            level: " ".into(),
            format: LogFormat::Text,
        };
        assert!(validate_log_config(&invalid).is_err());
    }
}
