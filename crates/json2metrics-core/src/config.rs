// Converter configuration
//
// Supplied once at construction and never mutated afterwards. Loading it from
// files or the environment is the job of json2metrics-config.

use crate::error::{ConvertError, Result};
use crate::timestamp::TimeFormat;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_METRIC_NAME: &str = "json";

/// Options controlling how a JSON object is split into name, tags, fields and timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Key whose value becomes the record name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_key: Option<String>,

    /// Name used when no name key is configured or present
    #[serde(default = "default_metric_name")]
    pub default_metric_name: String,

    /// Keys (or dotted paths into nested objects) whose values become tags
    #[serde(default)]
    pub tag_keys: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_key: Option<String>,

    #[serde(default)]
    pub time_format: TimeFormat,

    /// Keep string leaves as string fields; `false` is the strict-numeric mode
    #[serde(default = "default_string_fields_allowed")]
    pub string_fields_allowed: bool,

    /// Keys kept as string fields even in strict-numeric mode
    #[serde(default)]
    pub string_fields: BTreeSet<String>,

    /// Join nested keys with this separator instead of using the leaf key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flatten_separator: Option<String>,

    /// Dotted path selecting the part of the document to convert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// Tags added to every record; tags from the payload take precedence
    #[serde(default)]
    pub default_tags: BTreeMap<String, String>,
}

fn default_metric_name() -> String {
    DEFAULT_METRIC_NAME.to_string()
}

fn default_string_fields_allowed() -> bool {
    true
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            name_key: None,
            default_metric_name: default_metric_name(),
            tag_keys: BTreeSet::new(),
            timestamp_key: None,
            time_format: TimeFormat::default(),
            string_fields_allowed: default_string_fields_allowed(),
            string_fields: BTreeSet::new(),
            flatten_separator: None,
            query: None,
            default_tags: BTreeMap::new(),
        }
    }
}

impl ConverterConfig {
    pub fn with_default_metric_name(mut self, name: impl Into<String>) -> Self {
        self.default_metric_name = name.into();
        self
    }

    pub fn with_name_key(mut self, key: impl Into<String>) -> Self {
        self.name_key = Some(key.into());
        self
    }

    pub fn with_timestamp_key(mut self, key: impl Into<String>) -> Self {
        self.timestamp_key = Some(key.into());
        self
    }

    pub fn with_time_format(mut self, format: TimeFormat) -> Self {
        self.time_format = format;
        self
    }

    pub fn with_tag_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tag_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn with_string_fields_allowed(mut self, allowed: bool) -> Self {
        self.string_fields_allowed = allowed;
        self
    }

    pub fn with_string_fields<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.string_fields.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn with_flatten_separator(mut self, separator: impl Into<String>) -> Self {
        self.flatten_separator = Some(separator.into());
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_default_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_tags.insert(key.into(), value.into());
        self
    }

    /// Check the options that would make every conversion fail or misbehave
    pub fn validate(&self) -> Result<()> {
        if self.default_metric_name.trim().is_empty() {
            return Err(ConvertError::InvalidConfig(
                "default_metric_name must not be empty".into(),
            ));
        }

        if let (Some(name_key), Some(timestamp_key)) = (&self.name_key, &self.timestamp_key) {
            if name_key == timestamp_key {
                return Err(ConvertError::InvalidConfig(format!(
                    "name_key and timestamp_key must differ (both are '{}')",
                    name_key
                )));
            }
        }

        if matches!(self.flatten_separator.as_deref(), Some("")) {
            return Err(ConvertError::InvalidConfig(
                "flatten_separator must not be empty".into(),
            ));
        }

        if self.tag_keys.iter().any(|key| key.is_empty()) {
            return Err(ConvertError::InvalidConfig(
                "tag_keys must not contain empty keys".into(),
            ));
        }

        Ok(())
    }
}
