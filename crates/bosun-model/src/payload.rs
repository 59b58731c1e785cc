//! Opaque execution payloads
//!
//! A payload is the structured value threaded through an execution:
//! executors receive it as input and produce a replacement, and completion
//! signals merge their result into it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured payload carried by an execution
///
/// A flat mapping from string keys to JSON values. The orchestrator treats
/// it as opaque; only executors and completion signals give keys meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(serde_json::Map<String, Value>);

impl Payload {
    /// Create an empty payload
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a string value by key
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    /// Check whether a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of top-level keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether the payload has no keys
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add a value, consuming and returning the payload
    pub fn with(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.0.insert(key.into(), json_value);
        }
        self
    }

    /// Insert a value in place
    pub fn set(&mut self, key: impl Into<String>, value: impl Serialize) {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.0.insert(key.into(), json_value);
        }
    }

    /// Merge another payload into this one
    ///
    /// Top-level keys from `other` override existing keys; keys absent from
    /// `other` are left untouched. This is how a completion signal's result
    /// is folded into the execution state.
    pub fn merge(&mut self, other: Payload) {
        for (key, value) in other.0 {
            self.0.insert(key, value);
        }
    }
}

impl From<serde_json::Map<String, Value>> for Payload {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Payload {
    type Error = Value;

    /// Convert a JSON value into a payload; non-object values are returned
    /// unchanged as the error.
    fn try_from(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_with() {
        let payload = Payload::new()
            .with("serverId", "s1")
            .with("port", 27015u16);

        assert_eq!(payload.get_str("serverId"), Some("s1"));
        assert_eq!(payload.get("port"), Some(&json!(27015)));
        assert_eq!(payload.len(), 2);
    }

    #[test]
    fn test_payload_merge_overrides() {
        let mut payload = Payload::new()
            .with("serverId", "s1")
            .with("instanceIp", "10.0.0.1");

        let signal = Payload::new()
            .with("instanceIp", "203.0.113.9")
            .with("bootstrapped", true);

        payload.merge(signal);

        assert_eq!(payload.get_str("serverId"), Some("s1"));
        assert_eq!(payload.get_str("instanceIp"), Some("203.0.113.9"));
        assert_eq!(payload.get("bootstrapped"), Some(&json!(true)));
    }

    #[test]
    fn test_payload_merge_empty_is_noop() {
        let mut payload = Payload::new().with("serverId", "s1");
        let before = payload.clone();

        payload.merge(Payload::new());
        assert_eq!(payload, before);
    }

    #[test]
    fn test_payload_try_from_value() {
        let payload = Payload::try_from(json!({"region": "us-west-2"})).unwrap();
        assert_eq!(payload.get_str("region"), Some("us-west-2"));

        assert!(Payload::try_from(json!("not an object")).is_err());
        assert!(Payload::try_from(json!(42)).is_err());
    }

    #[test]
    fn test_payload_serialization() {
        let payload = Payload::new()
            .with("serverId", "s1")
            .with("tags", json!(["managed", "game"]));

        let text = serde_json::to_string(&payload).unwrap();
        let parsed: Payload = serde_json::from_str(&text).unwrap();

        assert_eq!(payload, parsed);
    }
}
