//! Record and payload mappings

use crate::error::{type_name, PayloadError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Input mapping: field name to arbitrary JSON value
pub type Record = Map<String, Value>;

/// Output mapping produced by a builder
pub type Payload = Map<String, Value>;

/// Convert a parsed JSON document into a record.
///
/// Only objects are accepted; any other JSON type is a structural error.
pub fn from_value(value: Value) -> Result<Record> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(PayloadError::NotAnObject {
            found_type: type_name(&other).to_string(),
        }),
    }
}

/// Parse a record from JSON text
pub fn from_json_str(text: &str) -> Result<Record> {
    let value: Value = serde_json::from_str(text)?;
    from_value(value)
}

/// Remove every key of `keys` present in `map`, returning the removed names.
///
/// Keys absent from the map are ignored, so repeated calls are no-ops.
pub(crate) fn drop_keys<'a, I>(map: &mut Map<String, Value>, keys: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let wanted: BTreeSet<&str> = keys.into_iter().collect();
    let mut removed = Vec::new();
    for key in wanted {
        if map.remove(key).is_some() {
            removed.push(key.to_string());
        }
    }
    removed
}
