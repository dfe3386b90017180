//! Conversion utilities between tool arguments, typed values and response text.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::error::{McpError, Result};

/// Helper to get a required string argument from JSON arguments.
pub fn get_string_arg(args: &Map<String, JsonValue>, name: &str) -> Result<String> {
    args.get(name)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| McpError::MissingArg(name.to_string()))
}

/// Helper to get a required object argument.
pub fn get_object_arg(args: &Map<String, JsonValue>, name: &str) -> Result<Map<String, JsonValue>> {
    args.get(name)
        .and_then(|v| v.as_object())
        .cloned()
        .ok_or_else(|| McpError::MissingArg(name.to_string()))
}

/// Read a non-negative integer, accepting integral floats such as `10.0`.
pub fn as_count(value: &JsonValue) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}

/// Helper to get an optional count argument from JSON arguments.
pub fn get_optional_u64(args: &Map<String, JsonValue>, name: &str) -> Option<u64> {
    args.get(name).and_then(as_count)
}

/// Helper to get an optional boolean argument.
pub fn get_optional_bool(args: &Map<String, JsonValue>, name: &str) -> Option<bool> {
    args.get(name).and_then(|v| v.as_bool())
}

/// Helper to get a required array argument decoded into `T` items.
pub fn get_list_arg<T: DeserializeOwned>(args: &Map<String, JsonValue>, name: &str) -> Result<Vec<T>> {
    get_optional_list(args, name)?.ok_or_else(|| McpError::MissingArg(name.to_string()))
}

/// Helper to get an optional array argument decoded into `T` items.
/// Null counts as absent.
pub fn get_optional_list<T: DeserializeOwned>(
    args: &Map<String, JsonValue>,
    name: &str,
) -> Result<Option<Vec<T>>> {
    match args.get(name) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| McpError::invalid_arg(name, e.to_string())),
    }
}

/// Render a result as pretty-printed JSON text.
pub fn to_pretty_text<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| McpError::Internal(e.to_string()))
}

/// Render a result as compact JSON text.
pub fn to_compact_text<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| McpError::Internal(e.to_string()))
}
