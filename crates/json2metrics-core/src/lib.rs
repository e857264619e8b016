// json2metrics-core - Platform-agnostic conversion logic
//
// This crate contains the PURE logic for turning JSON payloads into metric
// records. No I/O, no async, no runtime dependencies.
//
// Pipeline: bytes → serde_json::Value → objects → (name, tags, fields, timestamp)

pub mod config;
pub mod converter;
pub mod error;
pub mod record;
pub mod timestamp;

mod classify;
mod decode;

pub use config::{ConverterConfig, DEFAULT_METRIC_NAME};
pub use converter::Converter;
pub use error::{ConvertError, Result};
pub use record::{FieldValue, MetricRecord};
pub use timestamp::TimeFormat;
