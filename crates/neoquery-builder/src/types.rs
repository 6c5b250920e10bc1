//! Value types handed to the builder: property maps, bound parameters and
//! alias maps.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Parameters bound to `{name}` / `$name` placeholders in the query text.
///
/// Merged on every builder call that supplies parameters; a repeated key
/// overwrites the earlier value.
pub type Parameters = HashMap<String, serde_json::Value>;

/// A value rendered inline into a property block or SET list.
///
/// `Reference` is written without quotes so it can point at another
/// placeholder of the same query (`{owner: u}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Literal(serde_json::Value),
    Reference(String),
}

impl PropertyValue {
    /// Creates a back-reference to a placeholder.
    pub fn reference(name: impl Into<String>) -> Self {
        Self::Reference(name.into())
    }

    /// Whether this is a literal JSON `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Literal(serde_json::Value::Null))
    }
}

impl From<serde_json::Value> for PropertyValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Literal(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Literal(serde_json::Value::String(value.to_owned()))
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Literal(serde_json::Value::String(value))
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Literal(serde_json::Value::Bool(value))
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Literal(value.into())
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Literal(value.into())
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        Self::Literal(value.into())
    }
}

impl From<u64> for PropertyValue {
    fn from(value: u64) -> Self {
        Self::Literal(value.into())
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Literal(value.into())
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Literal(serde_json::Value::Null), Into::into)
    }
}

/// Ordered property map for node/relationship patterns and SET lists.
///
/// Keys keep their insertion order so the rendered query is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    entries: Vec<(String, PropertyValue)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a property, keeping the original position on replace.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds a property whose value is another placeholder.
    pub fn with_reference(self, key: impl Into<String>, placeholder: impl Into<String>) -> Self {
        self.with(key, PropertyValue::Reference(placeholder.into()))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Properties
where
    K: Into<String>,
    V: Into<PropertyValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Self::new();
        for (k, v) in iter {
            props.insert(k, v);
        }
        props
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Properties
where
    K: Into<String>,
    V: Into<PropertyValue>,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// Caller-supplied placeholder → alias map.
///
/// Ordered; inserting an existing placeholder replaces its alias.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMap {
    entries: Vec<(String, String)>,
}

impl LabelMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, placeholder: impl Into<String>, alias: impl Into<String>) {
        let placeholder = placeholder.into();
        let alias = alias.into();
        match self.entries.iter_mut().find(|(p, _)| *p == placeholder) {
            Some(entry) => entry.1 = alias,
            None => self.entries.push((placeholder, alias)),
        }
    }

    pub fn alias_of(&self, placeholder: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == placeholder)
            .map(|(_, a)| a.as_str())
    }

    /// Alias names in insertion order, duplicates removed.
    pub fn aliases(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(self.entries.len());
        for (_, alias) in &self.entries {
            if !out.contains(&alias.as_str()) {
                out.push(alias);
            }
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, a)| (p.as_str(), a.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: Into<String>, A: Into<String>> FromIterator<(P, A)> for LabelMap {
    fn from_iter<I: IntoIterator<Item = (P, A)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (p, a) in iter {
            map.insert(p, a);
        }
        map
    }
}

impl<P: Into<String>, A: Into<String>, const N: usize> From<[(P, A); N]> for LabelMap {
    fn from(entries: [(P, A); N]) -> Self {
        entries.into_iter().collect()
    }
}
