//! Guards the raw payload bytes before any derivation happens.

use serde_json::{Map, Value};

use crate::errors::{Error, Result};

/// Parse `data` as a JSON document whose root is an object.
pub fn parse_object(data: &[u8]) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_slice(data)
        .map_err(|err| Error::InvalidJson(format!("invalid JSON received, {}", err)))?;

    match value {
        Value::Object(object) => Ok(object),
        other => Err(Error::InvalidJson(format!(
            "failed to JSON unmarshal data as object, got {}",
            json_kind(&other)
        ))),
    }
}

/// Returns a human readable name of the JSON value's kind, for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
