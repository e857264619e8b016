// Decode-and-dispatch
//
// Turns a raw buffer into the list of JSON objects that each become one record.
// Accepted roots are a single object or an array of objects.

use crate::error::{ConvertError, Result};
use serde_json::{Map as JsonMap, Value as JsonValue};

pub(crate) type JsonObject = JsonMap<String, JsonValue>;

/// Decode a buffer into a JSON tree.
///
/// Returns `Ok(None)` for empty or whitespace-only input.
pub(crate) fn decode(bytes: &[u8]) -> Result<Option<JsonValue>> {
    let trimmed = bytes.trim_ascii();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let leading = bytes.len() - bytes.trim_ascii_start().len();
    serde_json::from_slice(trimmed)
        .map(Some)
        .map_err(|e| ConvertError::from_json(&e, trimmed, leading))
}

/// Follow a dotted path of object keys and array indices.
pub(crate) fn select(root: JsonValue, query: &str) -> Result<JsonValue> {
    let mut current = root;
    for segment in query.split('.').filter(|s| !s.is_empty()) {
        current = match current {
            JsonValue::Object(mut map) => map.remove(segment),
            JsonValue::Array(mut values) => match segment.parse::<usize>() {
                Ok(index) if index < values.len() => Some(values.swap_remove(index)),
                _ => None,
            },
            _ => None,
        }
        .ok_or_else(|| {
            ConvertError::parse(format!(
                "query '{}' matched nothing at '{}'",
                query, segment
            ))
        })?;
    }
    Ok(current)
}

/// Split a decoded root into the objects to convert, preserving array order.
pub(crate) fn dispatch(root: JsonValue) -> Result<Vec<JsonObject>> {
    match root {
        JsonValue::Object(map) => Ok(vec![map]),
        JsonValue::Array(values) => values
            .into_iter()
            .enumerate()
            .map(|(index, value)| match value {
                JsonValue::Object(map) => Ok(map),
                other => Err(ConvertError::parse(format!(
                    "expected object at index {}, found {}",
                    index,
                    type_name(&other)
                ))),
            })
            .collect(),
        other => Err(ConvertError::parse(format!(
            "expected object or array of objects, found {}",
            type_name(&other)
        ))),
    }
}

pub(crate) fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
