//! Structured fields bound to a logger or passed as a call payload.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

/// Transforms a field value before it is written.
///
/// A logger applies the serializer registered for a key to every payload
/// value logged under that key.
#[derive(Clone, Copy)]
pub struct Serializer(fn(&Value) -> Value);

impl Serializer {
    pub fn new(f: fn(&Value) -> Value) -> Self {
        Self(f)
    }

    /// Passes the value through unchanged.
    pub fn identity() -> Self {
        Self(|value| value.clone())
    }

    pub fn apply(&self, value: &Value) -> Value {
        (self.0)(value)
    }
}

impl fmt::Debug for Serializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Serializer(..)")
    }
}

/// An ordered set of structured key/value pairs plus serializer overrides.
///
/// Optional values go through [`Fields::insert_non_empty`], which leaves the
/// key out entirely instead of writing an empty string or `null`.
#[derive(Clone, Debug, Default)]
pub struct Fields {
    values: Map<String, Value>,
    serializers: BTreeMap<String, Serializer>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Fields::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets `key`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Sets `key` only when `value` is a non-empty string.
    ///
    /// Returns whether the key was set.
    pub fn insert_non_empty(&mut self, key: impl Into<String>, value: Option<&str>) -> bool {
        match value {
            Some(v) if !v.is_empty() => {
                self.insert(key, v);
                true
            }
            _ => false,
        }
    }

    /// Registers `serializer` for payload values logged under `key`.
    pub fn with_serializer(mut self, key: impl Into<String>, serializer: Serializer) -> Self {
        self.serializers.insert(key.into(), serializer);
        self
    }

    pub fn serializer(&self, key: &str) -> Option<Serializer> {
        self.serializers.get(key).copied()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Lays `other` over `self`. Keys and serializers in `other` win.
    pub fn merge(&mut self, other: Fields) {
        self.values.extend(other.values);
        self.serializers.extend(other.serializers);
    }

    /// Applies this set's serializers to every value of `payload`.
    pub fn serialize(&self, payload: &Fields) -> Map<String, Value> {
        payload.values.iter()
            .map(|(key, value)| {
                let value = match self.serializer(key) {
                    Some(serializer) => serializer.apply(value),
                    None => value.clone(),
                };
                (key.clone(), value)
            })
            .collect()
    }

    /// Builds the final record for one call: the bound values, overlaid by
    /// `payload` with this set's serializers applied.
    pub fn render(&self, payload: &Fields) -> Map<String, Value> {
        let mut record = self.values.clone();
        record.extend(self.serialize(payload));
        record
    }
}
