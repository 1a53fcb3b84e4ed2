//! Locating the record array inside a response payload
//!
//! Accepted shapes:
//! - a bare array: `[...]`
//! - an object with the dataset key: `{"pairs": [...], "metrics": {...}}`
//! - an object with a generic key: `{"data": [...]}` / `{"records": [...]}`
//! - one level of `data` wrapping: `{"data": {"pairs": [...]}}`

use crate::error::{json_type_name, ValidationError};
use gq_core::DatasetKind;
use serde_json::Value;

/// Generic keys tried after the dataset's own key
pub const GENERIC_ARRAY_KEYS: [&str; 2] = ["data", "records"];

/// Parse a raw response body
///
/// # Errors
/// `EmptyBody` for blank input, `NotJson` for anything serde_json rejects.
pub fn parse_body(body: &str) -> Result<Value, ValidationError> {
    if body.trim().is_empty() {
        return Err(ValidationError::EmptyBody);
    }
    serde_json::from_str(body).map_err(|e| ValidationError::NotJson(e.to_string()))
}

/// Find the record array for `kind`
///
/// # Errors
/// Returns a shape error when no array can be located.
pub fn extract_array(value: &Value, kind: DatasetKind) -> Result<&[Value], ValidationError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(map) => {
            let own_key = kind.array_key();
            for key in std::iter::once(own_key).chain(GENERIC_ARRAY_KEYS) {
                match map.get(key) {
                    Some(Value::Array(items)) => return Ok(items),
                    Some(Value::Object(inner)) if key == "data" && inner.contains_key(own_key) => {
                        return extract_array(&map[key], kind);
                    }
                    Some(other) => {
                        return Err(ValidationError::NotAnArray {
                            key: key.to_string(),
                            found: json_type_name(other),
                        })
                    }
                    None => {}
                }
            }
            Err(ValidationError::MissingArray { key: own_key })
        }
        other => Err(ValidationError::UnexpectedShape {
            found: json_type_name(other),
        }),
    }
}
