use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;

const BODY_PREVIEW_LIMIT: usize = 256;
pub(crate) const JSONRPC_VERSION: &str = "2.0";

#[derive(Serialize)]
pub(super) struct RpcRequest<'a> {
    pub(crate) jsonrpc: &'static str,
    pub(crate) method: &'a str,
    pub(crate) params: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) auth: Option<&'a str>,
    pub(crate) id: u64,
}

/// Structured `error` object returned by the API.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<String>,
}

/// A decoded response envelope.
#[derive(Debug, PartialEq)]
pub enum RpcOutcome {
    Result(Value),
    Error(RpcError),
}

/// Serialize a request envelope. `auth` is left out entirely when `None`.
pub fn encode(
    method: &str,
    params: &Value,
    auth: Option<&str>,
    id: u64,
) -> Result<Vec<u8>, ProtocolError> {
    let request = RpcRequest {
        jsonrpc: JSONRPC_VERSION,
        method,
        params,
        auth,
        id,
    };
    serde_json::to_vec(&request).map_err(|err| ProtocolError::Json {
        message: format!("error encoding {method} request: {err}"),
    })
}

/// Parse a response body into either the `result` payload or the `error` object.
pub fn decode(body: &[u8]) -> Result<RpcOutcome, ProtocolError> {
    let value: Value = serde_json::from_slice(body).map_err(|err| ProtocolError::Json {
        message: format!(
            "error decoding response body: {err}; body preview: {}",
            body_preview(body)
        ),
    })?;

    let Value::Object(mut envelope) = value else {
        return Err(ProtocolError::UnexpectedShape {
            expected: "object",
            found: json_kind(&value),
        });
    };

    match envelope.remove("error") {
        None | Some(Value::Null) => {}
        Some(error) => {
            let error: RpcError =
                serde_json::from_value(error).map_err(|err| ProtocolError::Json {
                    message: format!(
                        "malformed error object: {err}; body preview: {}",
                        body_preview(body)
                    ),
                })?;
            return Ok(RpcOutcome::Error(error));
        }
    }

    envelope
        .remove("result")
        .map(RpcOutcome::Result)
        .ok_or_else(|| ProtocolError::MissingField {
            field: "result".to_string(),
        })
}

pub(crate) const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(super) fn body_preview(body: &[u8]) -> String {
    if body.is_empty() {
        return "<empty>".to_string();
    }
    let end = body.len().min(BODY_PREVIEW_LIMIT);
    let mut preview = String::from_utf8_lossy(&body[..end]).to_string();
    if body.len() > BODY_PREVIEW_LIMIT {
        preview.push_str("...");
    }
    preview.replace('\n', "\\n")
}
