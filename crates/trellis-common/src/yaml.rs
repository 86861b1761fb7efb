//! Canonical YAML rendering
//!
//! Values are first converted to a `serde_json::Value` and only then emitted
//! as YAML. The JSON object map keeps its keys sorted, so the YAML text is
//! stable for identical input regardless of struct field or map insertion
//! order. Boot data embeds this text, and diffs between renders must only
//! show real changes.

use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};

/// Serialize a value to canonical YAML text
pub fn to_canonical_yaml<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let canonical = serde_json::to_value(value)
        .map_err(|e| Error::serialization_for_kind("json", e.to_string()))?;
    serde_yaml::to_string(&canonical)
        .map_err(|e| Error::serialization_for_kind("yaml", e.to_string()))
}

/// Parse a YAML string into a `serde_json::Value`.
///
/// Returns `Value::Null` for empty input.
pub fn parse_yaml(input: &str) -> Result<Value> {
    if input.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(input).map_err(|e| Error::serialization_for_kind("yaml", e.to_string()))
}
