//! Error types for JSON to metric conversion

use thiserror::Error;

/// Errors that can occur while converting a JSON payload into metric records
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    /// Malformed JSON, unexpected root/element type, bad timestamp or wrong cardinality
    #[error("failed to parse JSON{}: {message}", at_offset(.offset))]
    Parse {
        message: String,
        /// Byte offset into the input buffer, when the decoder reports one
        offset: Option<usize>,
    },

    /// A candidate record ended up with no fields after classification
    #[error("metric '{name}' has no fields")]
    EmptyFields { name: String },

    /// The converter configuration cannot be used
    #[error("invalid converter configuration: {0}")]
    InvalidConfig(String),
}

fn at_offset(offset: &Option<usize>) -> String {
    match offset {
        Some(offset) => format!(" at byte {}", offset),
        None => String::new(),
    }
}

impl ConvertError {
    /// Create a parse error without position information
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            offset: None,
        }
    }

    /// Create a parse error from a serde_json failure.
    ///
    /// serde_json reports 1-based line/column pairs; `base` is the number of bytes
    /// stripped in front of `text` so the offset points into the caller's buffer.
    pub(crate) fn from_json(err: &serde_json::Error, text: &[u8], base: usize) -> Self {
        Self::Parse {
            message: err.to_string(),
            offset: byte_offset(text, err.line(), err.column()).map(|pos| pos + base),
        }
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    pub fn is_empty_fields(&self) -> bool {
        matches!(self, Self::EmptyFields { .. })
    }
}

fn byte_offset(text: &[u8], line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }

    let line_start = if line == 1 {
        0
    } else {
        text.iter()
            .enumerate()
            .filter(|(_, b)| **b == b'\n')
            .nth(line - 2)
            .map(|(idx, _)| idx + 1)?
    };

    Some((line_start + column.saturating_sub(1)).min(text.len()))
}

/// Result type alias for ConvertError
pub type Result<T> = std::result::Result<T, ConvertError>;
