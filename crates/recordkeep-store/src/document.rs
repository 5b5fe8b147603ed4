//! JSON document encoding shared by single- and multi-collection stores.

use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};

use crate::error::{Result, StoreError};

/// Encode a document, optionally with the 4-space indent the data files use.
pub fn encode(document: &Value, pretty: bool) -> Result<Vec<u8>> {
    if !pretty {
        return Ok(serde_json::to_vec(document)?);
    }

    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    document.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Decode a document read from `path`.
///
/// Anything that is not UTF-8 JSON with an object at the top level is
/// reported as corruption.
pub fn decode(bytes: &[u8], path: &Path) -> Result<serde_json::Map<String, Value>> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| StoreError::Corruption {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Corruption {
            path: path.to_path_buf(),
            reason: format!("expected a JSON object at top level, found {}", kind(&other)),
        }),
    }
}

/// JSON type name, for error messages.
pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
