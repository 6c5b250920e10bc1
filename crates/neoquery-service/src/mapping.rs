//! Result type mappings: label → caller type.
//!
//! When a node carrying a registered label comes back from the streaming
//! transport, its property map is deserialized into the registered type
//! and handed out as [`GraphValue::Mapped`].

use std::any::Any;
use std::sync::Arc;

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::types::{GraphValue, MappedNode, Node};

type Hydrator =
    Arc<dyn Fn(&Node) -> Result<Arc<dyn Any + Send + Sync>, serde_json::Error> + Send + Sync>;

/// Shared, cheaply clonable mapping table.
#[derive(Clone, Default)]
pub struct ResultMappings {
    by_label: Arc<DashMap<String, Hydrator>>,
}

impl ResultMappings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` for nodes labelled `label`. A later registration for
    /// the same label replaces the earlier one.
    pub fn register<T>(&self, label: impl Into<String>) -> &Self
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let hydrator: Hydrator = Arc::new(
            |node: &Node| -> Result<Arc<dyn Any + Send + Sync>, serde_json::Error> {
                let value: T = serde_json::from_value(Value::Object(node.properties.clone()))?;
                Ok(Arc::new(value))
            },
        );
        self.by_label.insert(label.into(), hydrator);
        self
    }

    pub fn contains(&self, label: &str) -> bool {
        self.by_label.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }

    pub fn clear(&self) {
        self.by_label.clear();
    }

    /// Hydrates `node` with the first of its labels that has a mapping.
    ///
    /// Nodes without a matching label, or whose properties do not fit the
    /// registered type, are passed through as raw nodes.
    pub fn hydrate(&self, node: Node) -> GraphValue {
        let found = node.labels.iter().find_map(|label| {
            self.by_label
                .get(label)
                .map(|h| (label.clone(), Arc::clone(h.value())))
        });
        let Some((label, hydrator)) = found else {
            return GraphValue::Node(node);
        };

        match hydrator(&node) {
            Ok(value) => GraphValue::Mapped(MappedNode::new(label, node, value)),
            Err(e) => {
                tracing::warn!(%label, id = node.id, "result mapping failed, passing raw node: {e}");
                GraphValue::Node(node)
            }
        }
    }
}

impl std::fmt::Debug for ResultMappings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let labels: Vec<String> = self.by_label.iter().map(|e| e.key().clone()).collect();
        f.debug_struct("ResultMappings")
            .field("labels", &labels)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::{Map, json};

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct User {
        first_name: String,
    }

    fn node(labels: &[&str], props: Value) -> Node {
        let properties: Map<String, Value> = props.as_object().cloned().unwrap_or_default();
        Node {
            id: 1,
            labels: labels.iter().map(|l| (*l).to_owned()).collect(),
            properties,
        }
    }

    #[test]
    fn registered_label_is_hydrated() {
        let mappings = ResultMappings::new();
        mappings.register::<User>("User");
        assert!(mappings.contains("User"));

        let value = mappings.hydrate(node(&["Person", "User"], json!({"firstName": "Gabi"})));
        assert_eq!(
            value.as_mapped::<User>(),
            Some(&User {
                first_name: "Gabi".into()
            })
        );
    }

    #[test]
    fn unknown_label_or_bad_shape_passes_through() {
        let mappings = ResultMappings::new();
        mappings.register::<User>("User");

        let value = mappings.hydrate(node(&["Tag"], json!({"name": "rust"})));
        assert!(matches!(value, GraphValue::Node(_)));

        let value = mappings.hydrate(node(&["User"], json!({"age": 3})));
        assert!(matches!(value, GraphValue::Node(_)));
    }

    #[test]
    fn clones_share_the_table() {
        let mappings = ResultMappings::new();
        let shared = mappings.clone();
        mappings.register::<User>("User");
        assert_eq!(shared.len(), 1);
        shared.clear();
        assert!(mappings.is_empty());
    }
}
