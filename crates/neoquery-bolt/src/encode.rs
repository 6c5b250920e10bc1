//! Value conversion between `serde_json` parameters/results and `neo4rs::BoltType`.

use std::collections::HashMap;

use neo4rs::{BoltList, BoltMap, BoltNode, BoltNull, BoltRelation, BoltString, BoltType, Query, Row};
use neoquery_builder::Parameters;
use neoquery_service::{GraphValue, Node, Record, Relationship, ResultMappings, ServiceError};
use serde_json::{Map, Number, Value};

/// Converts a JSON parameter value to a Bolt value.
pub fn json_to_bolt(value: &Value) -> BoltType {
    match value {
        Value::Null => BoltType::Null(BoltNull),
        Value::Bool(b) => BoltType::from(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => BoltType::from(i),
            None => BoltType::from(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => BoltType::from(s.clone()),
        Value::Array(items) => BoltType::List(BoltList {
            value: items.iter().map(json_to_bolt).collect(),
        }),
        Value::Object(map) => BoltType::Map(BoltMap {
            value: map
                .iter()
                .map(|(k, v)| (BoltString::from(k.as_str()), json_to_bolt(v)))
                .collect(),
        }),
    }
}

/// Builds a `neo4rs` query with every parameter bound.
pub fn to_query(text: &str, params: &Parameters) -> Query {
    params
        .iter()
        .fold(neo4rs::query(text), |q, (key, value)| {
            q.param(key, json_to_bolt(value))
        })
}

/// Converts a Bolt value to plain JSON. Graph structures become their
/// serialized node/relationship form; unsupported types fall back to text.
pub fn bolt_to_json(value: &BoltType) -> Value {
    match value {
        BoltType::Null(_) => Value::Null,
        BoltType::Boolean(b) => Value::Bool(b.value),
        BoltType::Integer(i) => Value::from(i.value),
        BoltType::Float(f) => Number::from_f64(f.value).map_or(Value::Null, Value::Number),
        BoltType::String(s) => Value::String(s.value.clone()),
        BoltType::List(list) => Value::Array(list.value.iter().map(bolt_to_json).collect()),
        BoltType::Map(map) => Value::Object(properties(map)),
        BoltType::Node(node) => GraphValue::Node(node_from_bolt(node)).to_json(),
        BoltType::Relation(rel) => GraphValue::Relationship(relationship_from_bolt(rel)).to_json(),
        other => Value::String(format!("{other:?}")),
    }
}

/// Converts a returned value, hydrating nodes with `mappings` when given.
pub fn bolt_to_graph_value(value: &BoltType, mappings: Option<&ResultMappings>) -> GraphValue {
    match value {
        BoltType::Node(node) => {
            let node = node_from_bolt(node);
            match mappings {
                Some(m) if !m.is_empty() => m.hydrate(node),
                _ => GraphValue::Node(node),
            }
        }
        BoltType::Relation(rel) => GraphValue::Relationship(relationship_from_bolt(rel)),
        BoltType::List(list) => GraphValue::List(
            list.value
                .iter()
                .map(|item| bolt_to_graph_value(item, mappings))
                .collect(),
        ),
        other => GraphValue::Scalar(bolt_to_json(other)),
    }
}

/// Folds one result row into a record keyed by returned alias.
///
/// Keys are sorted: rows arrive as a hash map and callers expect a stable
/// column order.
pub fn row_to_record(row: &Row, mappings: Option<&ResultMappings>) -> Result<Record, ServiceError> {
    let fields: HashMap<String, BoltType> = row.to().map_err(ServiceError::transport)?;
    let mut fields: Vec<_> = fields.into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(fields
        .into_iter()
        .map(|(alias, value)| (alias, bolt_to_graph_value(&value, mappings)))
        .collect())
}

fn node_from_bolt(node: &BoltNode) -> Node {
    Node {
        id: node.id.value,
        labels: node
            .labels
            .value
            .iter()
            .filter_map(|label| match label {
                BoltType::String(s) => Some(s.value.clone()),
                _ => None,
            })
            .collect(),
        properties: properties(&node.properties),
    }
}

fn relationship_from_bolt(rel: &BoltRelation) -> Relationship {
    Relationship {
        id: rel.id.value,
        start: rel.start_node_id.value,
        end: rel.end_node_id.value,
        rel_type: rel.typ.value.clone(),
        properties: properties(&rel.properties),
    }
}

fn properties(map: &BoltMap) -> Map<String, Value> {
    map.value
        .iter()
        .map(|(k, v)| (k.value.clone(), bolt_to_json(v)))
        .collect()
}
