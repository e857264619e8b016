// Classification and flattening
//
// Splits one decoded JSON object into name, timestamp, tags and fields.
// Top-level keys are visited in source order; each contributes to exactly one
// destination. Nested objects are flattened, nested arrays in fields are dropped.

use crate::config::ConverterConfig;
use crate::decode::{type_name, JsonObject};
use crate::error::{ConvertError, Result};
use crate::record::{FieldValue, RecordParts};
use crate::timestamp::parse_timestamp;
use serde_json::{Number, Value as JsonValue};
use tracing::trace;

/// Coerce a scalar to its tag text.
///
/// Total over the JSON variants: null has no text, containers are rejected.
pub(crate) fn tag_text(key: &str, value: &JsonValue) -> Result<Option<String>> {
    match value {
        JsonValue::Null => Ok(None),
        JsonValue::Bool(b) => Ok(Some(b.to_string())),
        JsonValue::Number(n) => Ok(Some(number_text(n))),
        JsonValue::String(s) => Ok(Some(s.clone())),
        JsonValue::Array(_) | JsonValue::Object(_) => Err(ConvertError::parse(format!(
            "unsupported {} value for '{}', expected a scalar",
            type_name(value),
            key
        ))),
    }
}

/// Integers keep their exact digits; floats print as plain decimals, so `2.0`
/// becomes `2` and `1e21` is written out in full.
fn number_text(number: &Number) -> String {
    if let Some(i) = number.as_i64() {
        return i.to_string();
    }
    if let Some(u) = number.as_u64() {
        return u.to_string();
    }
    number
        .as_f64()
        .map(|f| f.to_string())
        .unwrap_or_else(|| number.to_string())
}

pub(crate) struct Classifier<'a> {
    config: &'a ConverterConfig,
}

impl<'a> Classifier<'a> {
    pub fn new(config: &'a ConverterConfig) -> Self {
        Self { config }
    }

    pub fn classify(&self, object: &JsonObject) -> Result<RecordParts> {
        let mut parts = RecordParts::default();

        for (key, value) in object {
            if self.config.name_key.as_deref() == Some(key.as_str()) {
                parts.name = tag_text(key, value)?;
            } else if self.config.timestamp_key.as_deref() == Some(key.as_str()) {
                parts.timestamp = Some(parse_timestamp(key, value, &self.config.time_format)?);
            } else if self.config.tag_keys.contains(key) {
                self.add_tag(&mut parts, key, value)?;
            } else {
                self.add_field(&mut parts, key, key, key, value)?;
            }
        }

        Ok(parts)
    }

    /// Scalars become tags under `key`; nested objects contribute every leaf
    /// under the leaf's own key.
    fn add_tag(&self, parts: &mut RecordParts, key: &str, value: &JsonValue) -> Result<()> {
        if let JsonValue::Object(nested) = value {
            for (leaf_key, leaf) in nested {
                self.add_tag(parts, leaf_key, leaf)?;
            }
            return Ok(());
        }

        match tag_text(key, value)? {
            Some(_) if parts.fields.contains_key(key) => {
                trace!(key, "dropping tag that collides with a field");
            }
            Some(text) => {
                parts.tags.insert(key.to_string(), text);
            }
            None => trace!(key, "dropping null tag"),
        }
        Ok(())
    }

    /// `path` is the dotted location of `value` from the object root, used for
    /// `tag_keys` and `string_fields` lookups. `name` is the field name the
    /// value is stored under, `key` its own key.
    fn add_field(
        &self,
        parts: &mut RecordParts,
        path: &str,
        name: &str,
        key: &str,
        value: &JsonValue,
    ) -> Result<()> {
        let field = match value {
            JsonValue::Number(n) => n.as_f64().map(FieldValue::from),
            JsonValue::Bool(b) => Some(FieldValue::from(*b)),
            JsonValue::String(s) => {
                if self.keeps_string(path, key) {
                    Some(FieldValue::from(s.clone()))
                } else {
                    trace!(path, "dropping string field in strict numeric mode");
                    None
                }
            }
            JsonValue::Null => {
                trace!(path, "dropping null field");
                None
            }
            JsonValue::Array(_) => {
                trace!(path, "dropping array field");
                None
            }
            JsonValue::Object(nested) => {
                for (leaf_key, leaf) in nested {
                    let leaf_path = format!("{}.{}", path, leaf_key);
                    if self.config.tag_keys.contains(&leaf_path) {
                        self.add_tag(parts, leaf_key, leaf)?;
                    } else {
                        let leaf_name = self.nested_name(name, leaf_key);
                        self.add_field(parts, &leaf_path, &leaf_name, leaf_key, leaf)?;
                    }
                }
                None
            }
        };

        if let Some(field) = field {
            if parts.tags.contains_key(name) {
                trace!(path, name, "dropping field that collides with a tag");
            } else {
                parts.fields.insert(name.to_string(), field);
            }
        }
        Ok(())
    }

    fn keeps_string(&self, path: &str, key: &str) -> bool {
        self.config.string_fields_allowed
            || self.config.string_fields.contains(key)
            || self.config.string_fields.contains(path)
    }

    fn nested_name(&self, parent: &str, leaf_key: &str) -> String {
        match &self.config.flatten_separator {
            Some(separator) => format!("{}{}{}", parent, separator, leaf_key),
            None => leaf_key.to_string(),
        }
    }
}
