//! Event shapes and their signatures
//!
//! The pipeline only compares [`ShapeSignature`]s for equality. How a set of
//! properties turns into a signature is up to the [`ShapeExtractor`] in use;
//! [`JsonShapeExtractor`] is the one the agent ships with.

pub mod extractor;

pub use extractor::JsonShapeExtractor;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identity of an event shape
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeSignature {
    pub event_id: String,
    pub event_hash: String,
}

impl ShapeSignature {
    pub fn new(event_id: impl Into<String>, event_hash: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            event_hash: event_hash.into(),
        }
    }
}

impl fmt::Display for ShapeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.event_id, self.event_hash)
    }
}

/// One property of an event schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventProperty {
    pub property_name: String,
    pub property_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<EventProperty>>,
}

impl EventProperty {
    pub fn new(name: impl Into<String>, property_type: impl Into<String>) -> Self {
        Self {
            property_name: name.into(),
            property_type: property_type.into(),
            children: None,
        }
    }

    pub fn with_children(mut self, children: Vec<EventProperty>) -> Self {
        self.children = Some(children);
        self
    }
}

/// Schema and signature extracted from one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedShape {
    pub signature: ShapeSignature,
    pub schema: Vec<EventProperty>,
}

/// Turns an event's properties into a schema and a stable signature.
///
/// Implementations must be deterministic within a process: equal inputs
/// always give equal signatures. Property values must not affect the result.
pub trait ShapeExtractor: Send + Sync {
    /// Infer the schema of a property set
    fn extract_schema(&self, properties: &serde_json::Value) -> Vec<EventProperty>;

    /// Derive the signature of an already extracted schema
    fn signature(&self, event_name: &str, schema: &[EventProperty]) -> ShapeSignature;

    fn extract(&self, event_name: &str, properties: &serde_json::Value) -> ExtractedShape {
        let schema = self.extract_schema(properties);
        let signature = self.signature(event_name, &schema);
        ExtractedShape { signature, schema }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_property_serialization() {
        let prop = EventProperty::new("address", "object")
            .with_children(vec![EventProperty::new("city", "string")]);

        let json = serde_json::to_value(&prop).unwrap();
        assert_eq!(json["propertyName"], "address");
        assert_eq!(json["propertyType"], "object");
        assert_eq!(json["children"][0]["propertyName"], "city");

        let leaf = serde_json::to_value(EventProperty::new("id", "int")).unwrap();
        assert!(leaf.get("children").is_none());
    }

    #[test]
    fn test_signature_display() {
        let sig = ShapeSignature::new("Checkout", "abc123");
        assert_eq!(sig.to_string(), "Checkout:abc123");
    }
}
