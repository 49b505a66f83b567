//! Result-shape conventions shared by every domain operation.
//!
//! The API signals "nothing matched" with an empty list and "it worked" with
//! any non-empty payload. These functions are the only place those rules are
//! spelled out; none of them treat an empty result as an error.

use serde_json::Value;
use tracing::debug;

use crate::error::ProtocolError;

use super::models::{EntityRecord, id_value};
use super::rpc::json_kind;

/// Get-style: the first record of a filtered list, or `None` when it is empty.
///
/// Filters are expected to be unique; when several records match, the first
/// one wins.
///
/// # Errors
///
/// Returns a [`ProtocolError`] when the result is not a list of objects.
pub fn first_record(result: Value) -> Result<Option<EntityRecord>, ProtocolError> {
    let Value::Array(items) = result else {
        return Err(ProtocolError::UnexpectedShape {
            expected: "array",
            found: json_kind(&result),
        });
    };
    if items.len() > 1 {
        debug!(matches = items.len(), "filter matched several records, using the first");
    }
    items.into_iter().next().map(EntityRecord::try_from).transpose()
}

/// Create-style: the identifiers listed under `key`, e.g. `groupids`.
///
/// An empty result (`[]`, `{}`, `null`) yields no identifiers.
///
/// # Errors
///
/// Returns a [`ProtocolError`] when a non-empty result lacks `key` or holds
/// something other than a list of identifiers there.
pub fn created_ids(result: Value, key: &str) -> Result<Vec<String>, ProtocolError> {
    if !succeeded(&result) {
        return Ok(Vec::new());
    }
    let Value::Object(mut map) = result else {
        return Err(ProtocolError::UnexpectedShape {
            expected: "object",
            found: json_kind(&result),
        });
    };
    match map.remove(key) {
        Some(Value::Array(ids)) => ids.iter().map(|id| id_value(key, id)).collect(),
        Some(other) => Err(ProtocolError::InvalidField {
            field: key.to_string(),
            message: format!("expected array, got {}", json_kind(&other)),
        }),
        None => Err(ProtocolError::MissingField {
            field: key.to_string(),
        }),
    }
}

/// Create-style for single objects: the first identifier under `key`.
///
/// # Errors
///
/// Same as [`created_ids`].
pub fn created_id(result: Value, key: &str) -> Result<Option<String>, ProtocolError> {
    Ok(created_ids(result, key)?.into_iter().next())
}

/// Update, delete and mass-operation style: any non-empty payload is success.
pub fn succeeded(result: &Value) -> bool {
    match result {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
