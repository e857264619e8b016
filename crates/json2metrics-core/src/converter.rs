// Converter entry points
//
// Stateless apart from the configuration it was built with, so one instance can
// be shared across threads.

use crate::classify::Classifier;
use crate::config::ConverterConfig;
use crate::decode::{self, JsonObject};
use crate::error::{ConvertError, Result};
use crate::record::MetricRecord;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use tracing::debug;

/// Converts JSON payloads into metric records
#[derive(Debug, Clone)]
pub struct Converter {
    config: ConverterConfig,
}

impl Converter {
    /// Build a converter, rejecting configurations that cannot produce records
    pub fn new(config: ConverterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Convert a whole buffer.
    ///
    /// A top-level object yields one record, an array of objects one record per
    /// element in order. Blank input yields no records. The first error aborts
    /// the call and no partial results are returned.
    pub fn parse(&self, bytes: &[u8]) -> Result<Vec<MetricRecord>> {
        let Some(root) = self.decode(bytes)? else {
            debug!("blank input, no metrics produced");
            return Ok(Vec::new());
        };

        let objects = decode::dispatch(root)?;
        let now = Utc::now();
        let records = objects
            .iter()
            .map(|object| self.convert_object(object, now))
            .collect::<Result<Vec<_>>>()?;

        debug!(count = records.len(), "converted JSON payload");
        Ok(records)
    }

    /// Convert a single line holding exactly one JSON object
    pub fn parse_line(&self, line: &str) -> Result<MetricRecord> {
        let object = match self.decode(line.as_bytes())? {
            Some(JsonValue::Object(map)) => map,
            Some(JsonValue::Array(values)) => {
                return Err(ConvertError::parse(format!(
                    "expected a single JSON object per line, found array of {} elements",
                    values.len()
                )))
            }
            Some(other) => {
                return Err(ConvertError::parse(format!(
                    "expected a single JSON object per line, found {}",
                    decode::type_name(&other)
                )))
            }
            None => return Err(ConvertError::parse("expected one metric, line is blank")),
        };

        self.convert_object(&object, Utc::now())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Option<JsonValue>> {
        let root = decode::decode(bytes)?;
        match (root, self.config.query.as_deref()) {
            (Some(root), Some(query)) => decode::select(root, query).map(Some),
            (root, _) => Ok(root),
        }
    }

    fn convert_object(&self, object: &JsonObject, now: DateTime<Utc>) -> Result<MetricRecord> {
        Classifier::new(&self.config).classify(object)?.build(
            &self.config.default_metric_name,
            &self.config.default_tags,
            now,
        )
    }
}
