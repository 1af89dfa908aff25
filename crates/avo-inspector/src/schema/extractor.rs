//! Default shape extractor over JSON property objects
//!
//! Type names: `string`, `int`, `float`, `boolean`, `null`, `object` and
//! `list(<item types>)`. Object keys are emitted in sorted order so the
//! canonical form, and therefore the hash, does not depend on insertion order.

use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

use super::{EventProperty, ShapeExtractor, ShapeSignature};

/// Infers schemas from `serde_json::Value` properties and hashes them with SHA-256
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonShapeExtractor;

impl JsonShapeExtractor {
    pub fn new() -> Self {
        Self
    }

    fn object_schema(&self, map: &serde_json::Map<String, serde_json::Value>) -> Vec<EventProperty> {
        let mut props: Vec<EventProperty> = map
            .iter()
            .map(|(name, value)| self.property(name, value))
            .collect();
        props.sort_by(|a, b| a.property_name.cmp(&b.property_name));
        props
    }

    fn property(&self, name: &str, value: &serde_json::Value) -> EventProperty {
        let prop = EventProperty::new(name, type_name(value));
        match value {
            serde_json::Value::Object(map) => prop.with_children(self.object_schema(map)),
            serde_json::Value::Array(items) => match self.merged_item_children(items) {
                Some(children) => prop.with_children(children),
                None => prop,
            },
            _ => prop,
        }
    }

    /// Union of the children of every object item; first occurrence of a name wins
    fn merged_item_children(&self, items: &[serde_json::Value]) -> Option<Vec<EventProperty>> {
        let mut merged: BTreeMap<String, EventProperty> = BTreeMap::new();
        let mut saw_object = false;

        for item in items {
            if let serde_json::Value::Object(map) = item {
                saw_object = true;
                for child in self.object_schema(map) {
                    merged.entry(child.property_name.clone()).or_insert(child);
                }
            }
        }

        saw_object.then(|| merged.into_values().collect())
    }
}

fn type_name(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::Bool(_) => "boolean".to_string(),
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => "int".to_string(),
        serde_json::Value::Number(_) => "float".to_string(),
        serde_json::Value::String(_) => "string".to_string(),
        serde_json::Value::Object(_) => "object".to_string(),
        serde_json::Value::Array(items) => {
            let item_types: BTreeSet<String> = items.iter().map(type_name).collect();
            if item_types.is_empty() {
                "list".to_string()
            } else {
                format!(
                    "list({})",
                    item_types.into_iter().collect::<Vec<_>>().join("|")
                )
            }
        }
    }
}

impl ShapeExtractor for JsonShapeExtractor {
    fn extract_schema(&self, properties: &serde_json::Value) -> Vec<EventProperty> {
        match properties {
            serde_json::Value::Object(map) => self.object_schema(map),
            _ => Vec::new(),
        }
    }

    fn signature(&self, event_name: &str, schema: &[EventProperty]) -> ShapeSignature {
        let mut hasher = Sha256::new();
        hasher.update(event_name.as_bytes());
        hasher.update([0u8]);
        // Vec<EventProperty> serialization cannot fail: plain strings and vecs
        if let Ok(canonical) = serde_json::to_vec(schema) {
            hasher.update(&canonical);
        }
        ShapeSignature::new(event_name, hex::encode(hasher.finalize()))
    }
}
