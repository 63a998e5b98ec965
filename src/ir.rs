use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A directed link between two nodes. `id` is the identity the visual cache keys on;
/// `data` is the opaque record mappings read weights and styles from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub data: Value,
}

impl Link {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            data: Value::Null,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

/// Animation descriptor handed through to the drawing surface untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub duration_ms: u32,
    #[serde(default)]
    pub easing: Option<String>,
}

/// One render pass worth of changes. `updates` and `removed` are disjoint.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    pub updates: Vec<Link>,
    pub removed: Vec<Link>,
    pub transition: Option<Transition>,
}

impl ChangeSet {
    pub fn updates(updates: Vec<Link>) -> Self {
        Self {
            updates,
            ..Self::default()
        }
    }
}

/// Node data records by node id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeTable {
    records: BTreeMap<String, Value>,
}

static NULL_RECORD: Value = Value::Null;

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, record: Value) {
        self.records.insert(id.into(), record);
    }

    /// Unknown ids resolve to a null record so every mapping falls back to its default.
    pub fn record(&self, id: &str) -> &Value {
        self.records.get(id).unwrap_or(&NULL_RECORD)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<(String, Value)> for NodeTable {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_node_resolves_to_null_record() {
        let mut nodes = NodeTable::new();
        nodes.insert("A", json!({ "x": 1 }));
        assert_eq!(nodes.record("A")["x"], json!(1));
        assert!(nodes.record("missing").is_null());
    }

    #[test]
    fn link_deserializes_without_data() {
        let link: Link =
            serde_json::from_str(r#"{"id":"a","source":"A","target":"B"}"#).expect("link");
        assert!(link.data.is_null());
        assert_eq!(link, Link::new("a", "A", "B"));
    }
}
