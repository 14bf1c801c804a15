//! Event type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Identifier of an event category or concrete event kind
///
/// Cheap to clone: the name is reference counted.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventType(Arc<str>);

impl EventType {
    /// Create a new event type tag
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The tag's name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventType({})", self.0)
    }
}

impl From<&str> for EventType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for EventType {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<&EventType> for EventType {
    fn from(tag: &EventType) -> Self {
        tag.clone()
    }
}

impl Borrow<str> for EventType {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EventType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A published event
///
/// The concrete type is fixed at construction. Everything else the event
/// carries is an opaque attribute that plays no part in routing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event {
    id: String,
    timestamp: DateTime<Utc>,
    event_type: EventType,
    #[serde(default)]
    attributes: Map<String, Value>,
}

impl Event {
    /// Create a new event of the given concrete type
    pub fn new(event_type: impl Into<EventType>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.into(),
            attributes: Map::new(),
        }
    }

    /// Attach an attribute before the event is published
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Unique event ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// When the event was created
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The event's concrete type
    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    /// Get an attribute by key
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// All attributes
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Check whether the event is of the given concrete type
    pub fn is(&self, event_type: &str) -> bool {
        self.event_type.as_str() == event_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_event_type_equality() {
        let a = EventType::new("FaultEvent");
        let b: EventType = "FaultEvent".into();
        let c: EventType = String::from("SecurityEvent").into();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_string(), "FaultEvent");

        let set: HashSet<EventType> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains("FaultEvent"));
    }

    #[test]
    fn test_event_creation() {
        let event = Event::new("FaultEvent").with_attribute("level", "MODERATE");

        assert!(event.is("FaultEvent"));
        assert!(!event.is("SecurityEvent"));
        assert_eq!(event.event_type().as_str(), "FaultEvent");
        assert_eq!(event.attribute("level"), Some(&Value::from("MODERATE")));
        assert!(event.attribute("missing").is_none());
    }

    #[test]
    fn test_events_have_unique_ids() {
        let a = Event::new("FaultEvent");
        let b = Event::new("FaultEvent");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_event_serialization() {
        let event = Event::new("FinancialEvent").with_attribute("amount", 750_000);

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event_type\":\"FinancialEvent\""));

        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id(), event.id());
        assert_eq!(parsed.event_type(), event.event_type());
        assert_eq!(parsed.attribute("amount"), Some(&Value::from(750_000)));
    }
}
