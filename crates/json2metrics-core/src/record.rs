// Metric record model and builder
//
// A record is assembled once per converted JSON object and owns its maps;
// nothing in it borrows from the decoded JSON tree.

use crate::error::{ConvertError, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Typed value carried by a metric field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Every JSON number is widened to f64
    Float(f64),
    String(String),
    Bool(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Float(v) => v.fmt(f),
            FieldValue::String(v) => v.fmt(f),
            FieldValue::Bool(v) => v.fmt(f),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// One structured observation: name + tags + fields + timestamp
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    name: String,
    tags: IndexMap<String, String>,
    fields: IndexMap<String, FieldValue>,
    timestamp: DateTime<Utc>,
}

impl MetricRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &IndexMap<String, String> {
        &self.tags
    }

    pub fn fields(&self) -> &IndexMap<String, FieldValue> {
        &self.fields
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }
}

/// Collects the pieces of a record while an object is being classified
#[derive(Debug, Default)]
pub(crate) struct RecordParts {
    pub name: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub tags: IndexMap<String, String>,
    pub fields: IndexMap<String, FieldValue>,
}

impl RecordParts {
    /// Apply defaults and validate.
    ///
    /// Default tags go in first so that tags found in the payload replace them.
    /// A default tag named like a field is skipped; tag and field keys stay disjoint.
    pub fn build(
        self,
        default_name: &str,
        default_tags: &BTreeMap<String, String>,
        now: DateTime<Utc>,
    ) -> Result<MetricRecord> {
        let name = self.name.unwrap_or_else(|| default_name.to_string());

        if self.fields.is_empty() {
            return Err(ConvertError::EmptyFields { name });
        }

        let mut tags = IndexMap::with_capacity(default_tags.len() + self.tags.len());
        for (key, value) in default_tags {
            if !self.fields.contains_key(key) {
                tags.insert(key.clone(), value.clone());
            }
        }
        tags.extend(self.tags);

        Ok(MetricRecord {
            name,
            tags,
            fields: self.fields,
            timestamp: self.timestamp.unwrap_or(now),
        })
    }
}
