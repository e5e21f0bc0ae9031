//! Wire Values
//!
//! Result values are modeled as a tagged variant set so capability
//! references are encoded and decoded exhaustively instead of being
//! duck-typed JSON shapes.

use std::collections::BTreeMap;

use serde_json::{json, Map, Number, Value};

/// A value carried in a wire result envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<WireValue>),
    Object(BTreeMap<String, WireValue>),
    /// Reference to a live capability, serialized as
    /// `{"_type": "capability", "id": n}`
    CapabilityRef(u64),
}

impl WireValue {
    /// Serialize into plain JSON for the wire.
    pub fn to_json(&self) -> Value {
        match self {
            WireValue::Null => Value::Null,
            WireValue::Bool(value) => Value::Bool(*value),
            WireValue::Number(value) => Value::Number(value.clone()),
            WireValue::String(value) => Value::String(value.clone()),
            WireValue::Array(items) => {
                Value::Array(items.iter().map(WireValue::to_json).collect())
            }
            WireValue::Object(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            WireValue::CapabilityRef(id) => json!({
                "_type": "capability",
                "id": id,
            }),
        }
    }

    /// Reconstruct from plain JSON, recognizing the capability shape.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => WireValue::Null,
            Value::Bool(value) => WireValue::Bool(*value),
            Value::Number(value) => WireValue::Number(value.clone()),
            Value::String(value) => WireValue::String(value.clone()),
            Value::Array(items) => {
                WireValue::Array(items.iter().map(WireValue::from_json).collect())
            }
            Value::Object(entries) => match capability_id(entries) {
                Some(id) => WireValue::CapabilityRef(id),
                None => WireValue::Object(
                    entries
                        .iter()
                        .map(|(key, value)| (key.clone(), WireValue::from_json(value)))
                        .collect(),
                ),
            },
        }
    }
}

impl From<Value> for WireValue {
    fn from(value: Value) -> Self {
        WireValue::from_json(&value)
    }
}

impl From<WireValue> for Value {
    fn from(value: WireValue) -> Self {
        value.to_json()
    }
}

fn capability_id(entries: &Map<String, Value>) -> Option<u64> {
    if entries.get("_type").and_then(Value::as_str) != Some("capability") {
        return None;
    }
    entries.get("id").and_then(Value::as_u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn capability_ref_round_trips() {
        let value = WireValue::CapabilityRef(10_042);
        let encoded = value.to_json();
        assert_eq!(encoded, json!({"_type": "capability", "id": 10_042}));
        assert_eq!(WireValue::from_json(&encoded), value);
    }

    #[test]
    fn nested_structures_round_trip() {
        let raw = json!({
            "status": "ok",
            "session": {"_type": "capability", "id": 10_000},
            "tags": [1, "two", null, {"deep": true}],
        });
        let value = WireValue::from_json(&raw);
        match &value {
            WireValue::Object(entries) => {
                assert_eq!(
                    entries.get("session"),
                    Some(&WireValue::CapabilityRef(10_000))
                );
            }
            other => panic!("expected object, got {other:?}"),
        }
        assert_eq!(value.to_json(), raw);
    }

    #[test]
    fn near_capability_shapes_stay_objects() {
        let raw = json!({"_type": "session", "id": 7});
        assert!(matches!(WireValue::from_json(&raw), WireValue::Object(_)));

        let raw = json!({"_type": "capability", "id": "ten"});
        assert!(matches!(WireValue::from_json(&raw), WireValue::Object(_)));
    }
}
