//! Events posted to the collector and polled by the client
//!
//! The collector stamps `id` and `timestamp`; everything else is supplied by
//! the poster. Only `details.source`, `details.deliver_to` and
//! `details.operation` carry meaning here, other fields ride along.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Collector-assigned unique id
pub type EventId = String;
/// Epoch milliseconds
pub type Timestamp = i64;

/// Placeholder shown for a missing payload field
pub const UNKNOWN: &str = "Unknown";

/// Payload of a transmission event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDetails {
    /// Log name of the sending component
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Log name of the receiving component
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliver_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    /// Any other fields the poster included
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventDetails {
    pub fn new(source: &str, deliver_to: &str, operation: &str) -> Self {
        Self {
            source: Some(source.to_string()),
            deliver_to: Some(deliver_to.to_string()),
            operation: Some(operation.to_string()),
            extra: Map::new(),
        }
    }

    pub fn with_extra(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }
}

/// A stamped event as served by `GET /events`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    #[serde(default)]
    pub details: EventDetails,
    /// Top-level fields of the original posting other than `details`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Event {
    pub fn new(id: impl Into<EventId>, timestamp: Timestamp, details: EventDetails) -> Self {
        Self {
            id: id.into(),
            timestamp,
            details,
            extra: Map::new(),
        }
    }

    pub fn source(&self) -> &str {
        self.details.source.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn deliver_to(&self) -> &str {
        self.details.deliver_to.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn operation(&self) -> &str {
        self.details.operation.as_deref().unwrap_or(UNKNOWN)
    }

    /// Pretty JSON of the payload fields beyond source/deliver_to/operation
    pub fn extra_details_pretty(&self) -> Option<String> {
        if self.details.extra.is_empty() {
            return None;
        }
        serde_json::to_string_pretty(&self.details.extra).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_with_extra_fields() {
        let event: Event = serde_json::from_value(json!({
            "id": "7d9c",
            "timestamp": 1_700_000_000_000_i64,
            "details": {
                "source": "svc-a",
                "deliver_to": "svc-b",
                "operation": "send",
                "topic": "orders",
                "partition": 3
            },
            "trace": "abc"
        }))
        .unwrap();

        assert_eq!(event.source(), "svc-a");
        assert_eq!(event.deliver_to(), "svc-b");
        assert_eq!(event.operation(), "send");
        assert_eq!(event.details.extra.len(), 2);
        assert_eq!(event.extra.get("trace"), Some(&json!("abc")));
    }

    #[test]
    fn test_missing_fields_read_unknown() {
        let event: Event =
            serde_json::from_value(json!({"id": "1", "timestamp": 0})).unwrap();
        assert_eq!(event.source(), UNKNOWN);
        assert_eq!(event.deliver_to(), UNKNOWN);
        assert_eq!(event.operation(), UNKNOWN);
        assert!(event.extra_details_pretty().is_none());
    }

    #[test]
    fn test_extra_details_pretty() {
        let details = EventDetails::new("a", "b", "send").with_extra("key", json!("value"));
        let event = Event::new("1", 0, details);
        let pretty = event.extra_details_pretty().unwrap();
        assert!(pretty.contains("\"key\": \"value\""));
        assert!(!pretty.contains("deliver_to"));
    }

    #[test]
    fn test_serialize_keeps_wire_names() {
        let event = Event::new("1", 5, EventDetails::new("a", "b", "send"));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["details"]["deliver_to"], json!("b"));
        assert_eq!(value["timestamp"], json!(5));
    }
}
