//! The shared state container threaded through node functions.
//!
//! A run's state is a loosely-schematized record of named JSON fields. The
//! engine enforces no schema; node functions read and write the fields they
//! care about and are responsible for presence checks on their own inputs.
//! Each run owns its state exclusively, so state is never aliased across
//! concurrent runs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// A mutable record of named fields carried through a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(Map<String, JsonValue>);

impl State {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a field's value, if present.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.0.get(field)
    }

    /// Sets a field, replacing any previous value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<JsonValue>) {
        self.0.insert(field.into(), value.into());
    }

    /// Returns true if the field is present.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Returns a string field's value, if present and a string.
    #[must_use]
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(JsonValue::as_str)
    }

    /// Returns a numeric field's value, if present and numeric.
    #[must_use]
    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.0.get(field).and_then(JsonValue::as_f64)
    }

    /// Returns a boolean field's value, if present and boolean.
    #[must_use]
    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.0.get(field).and_then(JsonValue::as_bool)
    }

    /// Returns an object field's entries, if present and an object.
    #[must_use]
    pub fn get_object(&self, field: &str) -> Option<&Map<String, JsonValue>> {
        self.0.get(field).and_then(JsonValue::as_object)
    }

    /// Returns an array field's elements, if present and an array.
    #[must_use]
    pub fn get_array(&self, field: &str) -> Option<&Vec<JsonValue>> {
        self.0.get(field).and_then(JsonValue::as_array)
    }

    /// Iterates over all fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.0.iter()
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no fields are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the state, returning the underlying field map.
    #[must_use]
    pub fn into_inner(self) -> Map<String, JsonValue> {
        self.0
    }
}

impl From<Map<String, JsonValue>> for State {
    fn from(fields: Map<String, JsonValue>) -> Self {
        Self(fields)
    }
}

impl FromIterator<(String, JsonValue)> for State {
    fn from_iter<I: IntoIterator<Item = (String, JsonValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
