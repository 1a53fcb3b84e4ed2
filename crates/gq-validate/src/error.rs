//! Validation errors
//!
//! A payload is either accepted whole or rejected whole; the error names the
//! first problem found.

/// Reasons a payload is unusable
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Body was empty or whitespace
    #[error("empty response body")]
    EmptyBody,

    /// Body was not JSON
    #[error("response is not valid JSON: {0}")]
    NotJson(String),

    /// Top-level value was neither an array nor an object
    #[error("unexpected payload shape: expected array or object, got {found}")]
    UnexpectedShape { found: &'static str },

    /// Object did not hold the record array
    #[error("payload has no '{key}' array")]
    MissingArray { key: &'static str },

    /// Record array key held something else
    #[error("'{key}' is not an array (got {found})")]
    NotAnArray { key: String, found: &'static str },

    /// Record failed structural decoding (missing field, wrong type, bad enum)
    #[error("record {index} is malformed: {message}")]
    MalformedRecord { index: usize, message: String },

    /// Record decoded but a field is out of range
    #[error("record {index} field '{field}' is invalid: {reason}")]
    RuleViolation {
        index: usize,
        field: &'static str,
        reason: String,
    },
}

impl ValidationError {
    /// Index of the offending record, if the failure is record-level
    #[inline]
    #[must_use]
    pub fn record_index(&self) -> Option<usize> {
        match self {
            Self::MalformedRecord { index, .. } | Self::RuleViolation { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// Name of a JSON value's type for error messages
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_index_only_for_record_errors() {
        assert_eq!(ValidationError::EmptyBody.record_index(), None);
        assert_eq!(
            ValidationError::MalformedRecord {
                index: 3,
                message: "missing field".into()
            }
            .record_index(),
            Some(3)
        );
    }

    #[test]
    fn display_names_field() {
        let err = ValidationError::RuleViolation {
            index: 0,
            field: "coefficient",
            reason: "1.5 outside [-1, 1]".into(),
        };
        assert!(err.to_string().contains("coefficient"));
    }
}
