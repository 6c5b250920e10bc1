//! Result model shared by both transports.
//!
//! The streaming transport folds wire records into [`Record`]s of
//! [`GraphValue`]s; the stateless transport hands back the JSON body
//! untouched. Both travel as a [`QueryResult`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use neoquery_builder::LabelMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Transport variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverType {
    /// Persistent connection with session and optional transaction (Bolt).
    #[serde(alias = "bolt")]
    Streaming,
    /// One HTTP request per query, no session.
    #[serde(alias = "http", alias = "rest")]
    Stateless,
}

impl DriverType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Streaming => "bolt",
            Self::Stateless => "http",
        }
    }
}

impl fmt::Display for DriverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A graph node as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: i64,
    pub labels: Vec<String>,
    pub properties: Map<String, Value>,
}

/// A graph relationship as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relationship {
    pub id: i64,
    pub start: i64,
    pub end: i64,
    #[serde(rename = "type")]
    pub rel_type: String,
    pub properties: Map<String, Value>,
}

/// A node hydrated into a caller-registered type.
///
/// The raw node stays available next to the typed value.
#[derive(Clone)]
pub struct MappedNode {
    label: String,
    node: Node,
    value: Arc<dyn Any + Send + Sync>,
}

impl MappedNode {
    pub fn new(label: impl Into<String>, node: Node, value: Arc<dyn Any + Send + Sync>) -> Self {
        Self {
            label: label.into(),
            node,
            value,
        }
    }

    /// Label the mapping was registered under.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    /// The typed value, if `T` is the registered type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for MappedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedNode")
            .field("label", &self.label)
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}

/// One returned value.
#[derive(Debug, Clone)]
pub enum GraphValue {
    Scalar(Value),
    Node(Node),
    Relationship(Relationship),
    List(Vec<GraphValue>),
    Mapped(MappedNode),
}

impl GraphValue {
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(node) => Some(node),
            Self::Mapped(mapped) => Some(mapped.node()),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Self::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_mapped<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Mapped(mapped) => mapped.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// JSON rendering; mapped nodes render as their raw node.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Scalar(v) => v.clone(),
            Self::Node(node) => node_json(node),
            Self::Mapped(mapped) => node_json(mapped.node()),
            Self::Relationship(rel) => serde_json::to_value(rel).unwrap_or(Value::Null),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
        }
    }
}

fn node_json(node: &Node) -> Value {
    serde_json::to_value(node).unwrap_or(Value::Null)
}

/// One result row, keyed by the returned alias. Field order is kept.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: Vec<(String, GraphValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field, replacing an existing one with the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: GraphValue) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&GraphValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GraphValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Renames every key that `labels` maps to an alias, in place.
    ///
    /// New names are taken from the keys as they were before remapping, so
    /// swapped aliases work and no field is dropped. An alias equal to an
    /// existing column yields two fields with that key; `get` returns the
    /// first. Returns the number of renamed fields.
    pub fn remap_keys(&mut self, labels: &LabelMap) -> usize {
        let mut renamed = 0;
        for (key, _) in &mut self.fields {
            if let Some(alias) = labels.alias_of(key)
                && alias != key.as_str()
            {
                *key = alias.to_owned();
                renamed += 1;
            }
        }
        renamed
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl FromIterator<(String, GraphValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, GraphValue)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// Normalized result of one query.
#[derive(Debug, Clone)]
pub enum QueryResult {
    /// Folded records from the streaming transport.
    Records(Vec<Record>),
    /// Parsed JSON body from the stateless transport.
    Json(Value),
}

impl QueryResult {
    pub fn records(&self) -> Option<&[Record]> {
        match self {
            Self::Records(records) => Some(records),
            Self::Json(_) => None,
        }
    }

    pub fn json(&self) -> Option<&Value> {
        match self {
            Self::Json(body) => Some(body),
            Self::Records(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Records(records) => Value::Array(records.iter().map(Record::to_json).collect()),
            Self::Json(body) => body.clone(),
        }
    }

    /// Renames placeholders to their aliases.
    ///
    /// Records get their keys renamed; a JSON body of the transactional
    /// endpoint (`results[].columns[]`) gets its column names renamed.
    pub fn remap_aliases(&mut self, labels: &LabelMap) {
        if labels.is_empty() {
            return;
        }
        match self {
            Self::Records(records) => {
                for record in records {
                    record.remap_keys(labels);
                }
            }
            Self::Json(body) => {
                let Some(results) = body.get_mut("results").and_then(Value::as_array_mut) else {
                    return;
                };
                for columns in results
                    .iter_mut()
                    .filter_map(|r| r.get_mut("columns").and_then(Value::as_array_mut))
                {
                    for column in columns.iter_mut() {
                        if let Some(alias) = column.as_str().and_then(|c| labels.alias_of(c)) {
                            *column = Value::String(alias.to_owned());
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn user_node() -> Node {
        let mut properties = Map::new();
        properties.insert("firstName".into(), json!("Gabi"));
        Node {
            id: 7,
            labels: vec!["User".into()],
            properties,
        }
    }

    #[test]
    fn driver_type_accepts_transport_names() {
        let t: DriverType = serde_json::from_value(json!("bolt")).unwrap();
        assert_eq!(t, DriverType::Streaming);
        let t: DriverType = serde_json::from_value(json!("rest")).unwrap();
        assert_eq!(t, DriverType::Stateless);
        let t: DriverType = serde_json::from_value(json!("stateless")).unwrap();
        assert_eq!(t, DriverType::Stateless);
        assert_eq!(DriverType::Streaming.to_string(), "bolt");
    }

    #[test]
    fn record_remap_keeps_position() {
        let mut record: Record = [
            ("u".to_owned(), GraphValue::Node(user_node())),
            ("n".to_owned(), GraphValue::Scalar(json!(3))),
        ]
        .into_iter()
        .collect();
        assert_eq!(record.remap_keys(&LabelMap::from([("u", "user"), ("missing", "x")])), 1);
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["user", "n"]);
        assert_eq!(record.get("user").and_then(GraphValue::as_node).map(|n| n.id), Some(7));
    }

    #[test]
    fn record_remap_swaps_aliases() {
        let mut result = QueryResult::Records(vec![
            [
                ("a".to_owned(), GraphValue::Scalar(json!(1))),
                ("b".to_owned(), GraphValue::Scalar(json!(2))),
            ]
            .into_iter()
            .collect(),
        ]);
        result.remap_aliases(&LabelMap::from([("a", "b"), ("b", "a")]));

        let record = &result.records().unwrap()[0];
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(record.get("b").and_then(GraphValue::as_scalar), Some(&json!(1)));
        assert_eq!(record.get("a").and_then(GraphValue::as_scalar), Some(&json!(2)));
    }

    #[test]
    fn record_remap_keeps_colliding_column() {
        let mut result = QueryResult::Records(vec![
            [
                ("u".to_owned(), GraphValue::Scalar(json!("node"))),
                ("user".to_owned(), GraphValue::Scalar(json!("column"))),
            ]
            .into_iter()
            .collect(),
        ]);
        result.remap_aliases(&LabelMap::from([("u", "user")]));

        let record = &result.records().unwrap()[0];
        assert_eq!(record.len(), 2);
        let values: Vec<_> = record.iter().map(|(_, v)| v.to_json()).collect();
        assert_eq!(values, vec![json!("node"), json!("column")]);
    }

    #[test]
    fn remap_records_and_json_columns() {
        let labels = LabelMap::from([("u", "user")]);

        let mut result = QueryResult::Records(vec![
            [("u".to_owned(), GraphValue::Scalar(json!(1)))].into_iter().collect(),
        ]);
        result.remap_aliases(&labels);
        assert_eq!(result.to_json(), json!([{"user": 1}]));

        let mut result = QueryResult::Json(json!({
            "results": [{"columns": ["u", "n"], "data": [{"row": [1, 2]}]}],
            "errors": []
        }));
        result.remap_aliases(&labels);
        assert_eq!(result.json().unwrap()["results"][0]["columns"], json!(["user", "n"]));
    }

    #[test]
    fn mapped_node_downcasts() {
        #[derive(Debug, PartialEq)]
        struct User(String);

        let mapped = MappedNode::new("User", user_node(), Arc::new(User("Gabi".into())));
        let value = GraphValue::Mapped(mapped);
        assert_eq!(value.as_mapped::<User>(), Some(&User("Gabi".into())));
        assert!(value.as_mapped::<String>().is_none());
        assert_eq!(value.to_json()["properties"]["firstName"], json!("Gabi"));
    }
}
