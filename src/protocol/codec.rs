//! Batch Wire Codec
//!
//! Parses the two-line push/pull batch format and serializes single-line
//! response envelopes:
//!
//! ```text
//! ["push", ["call", <capId>, [<method>], [<args...>]]]
//! ["pull", <importId>]
//! ```
//!
//! Decoding is deliberately non-throwing: any deviation from the expected
//! shape (wrong line count, malformed JSON, wrong tags) is "not a batch for
//! this handler" and yields `None`, so the dispatcher can fall through to
//! the next handler in its chain. Encoding works on in-memory values and
//! cannot fail.

use serde_json::{json, Value};

use super::value::WireValue;

/// A recognized two-line batch: one call plus one pull of its result.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub capability_id: u64,
    pub method: String,
    pub args: Vec<Value>,
    pub import_id: u64,
}

/// Decode raw request text into a batch, or `None` when the input is not a
/// recognized batch.
pub fn decode_batch(input: &str) -> Option<Batch> {
    let lines: Vec<&str> = input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let [push_line, pull_line] = lines.as_slice() else {
        return None;
    };

    let (capability_id, method, args) = decode_push(push_line)?;
    let import_id = decode_pull(pull_line)?;

    Some(Batch {
        capability_id,
        method,
        args,
        import_id,
    })
}

fn decode_push(line: &str) -> Option<(u64, String, Vec<Value>)> {
    let op: Value = serde_json::from_str(line).ok()?;
    let arr = op.as_array()?;
    if arr.first()?.as_str()? != "push" {
        return None;
    }

    let payload = arr.get(1)?.as_array()?;
    if payload.first()?.as_str()? != "call" {
        return None;
    }

    let capability_id = payload.get(1)?.as_u64()?;
    let method = payload
        .get(2)?
        .as_array()?
        .first()?
        .as_str()?
        .to_string();
    let args = match payload.get(3) {
        Some(Value::Array(values)) => values.clone(),
        Some(_) => return None,
        None => Vec::new(),
    };

    Some((capability_id, method, args))
}

fn decode_pull(line: &str) -> Option<u64> {
    let op: Value = serde_json::from_str(line).ok()?;
    let arr = op.as_array()?;
    if arr.first()?.as_str()? != "pull" {
        return None;
    }
    arr.get(1)?.as_u64()
}

/// Encode a successful result envelope.
pub fn encode_result(import_id: u64, value: &WireValue) -> String {
    json!(["result", import_id, value.to_json()]).to_string()
}

/// Encode a protocol-level error envelope.
pub fn encode_error(import_id: u64, message: &str) -> String {
    json!(["error", import_id, { "message": message }]).to_string()
}
