//! Common types used throughout the client
//!
//! Magento payloads are passed through as opaque JSON; the only structured
//! type here is [`Query`], the flat `searchCriteria[...]` parameter map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A single remote record (product, order, source item, ...)
pub type Entity = JsonValue;

/// Product SKU
pub type Sku = str;

// ============================================================================
// Query
// ============================================================================

/// Flat query-string parameters, e.g. `searchCriteria[pageSize] = 100`.
///
/// Values are primitives or arrays. Arrays are sent as repeated keys and
/// `null` values are not sent at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query(BTreeMap<String, JsonValue>);

impl Query {
    /// Create an empty query
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Builder-style [`Query::insert`]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a parameter
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    /// Remove a parameter
    pub fn remove(&mut self, key: &str) -> Option<JsonValue> {
        self.0.remove(key)
    }

    /// Check if a parameter is set
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the query is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over parameters in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.0.iter()
    }

    /// Merge another query into this one; its values win on conflicts
    pub fn extend(&mut self, other: Query) {
        self.0.extend(other.0);
    }

    /// Encode as URL query pairs
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.0.len());
        for (key, value) in &self.0 {
            match value {
                JsonValue::Null => {}
                JsonValue::Array(items) => {
                    for item in items {
                        if let Some(text) = scalar_text(item) {
                            pairs.push((key.clone(), text));
                        }
                    }
                }
                other => {
                    if let Some(text) = scalar_text(other) {
                        pairs.push((key.clone(), text));
                    }
                }
            }
        }
        pairs
    }
}

/// Text form of a query value; `None` for null
fn scalar_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl<K: Into<String>, V: Into<JsonValue>> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Query {
    type Item = (&'a String, &'a JsonValue);
    type IntoIter = std::collections::btree_map::Iter<'a, String, JsonValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
