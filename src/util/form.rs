//! Snapshot of a container's named form inputs.

#[cfg(test)]
#[path = "form_test.rs"]
mod form_test;

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// One input's current value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Checked(bool),
}

impl FieldValue {
    /// Checkboxes always count as set; text inputs when non-empty.
    #[must_use]
    pub fn is_set(&self) -> bool {
        match self {
            Self::Text(text) => !text.is_empty(),
            Self::Checked(_) => true,
        }
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Checked(checked) => Value::Bool(*checked),
        }
    }
}

/// Named input values of one container, keyed by input `name`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormValues(BTreeMap<String, FieldValue>);

impl FormValues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; unnamed inputs are skipped.
    #[must_use]
    pub fn with(mut self, name: &str, value: FieldValue) -> Self {
        self.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_text(self, name: &str, text: &str) -> Self {
        self.with(name, FieldValue::Text(text.to_owned()))
    }

    pub fn insert(&mut self, name: &str, value: FieldValue) {
        if !name.is_empty() {
            self.0.insert(name.to_owned(), value);
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    /// Text value of `name`, trimmed; `None` when absent or a checkbox.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(FieldValue::Text(text)) => Some(text.trim()),
            _ => None,
        }
    }

    /// True when every collected input has a value.
    #[must_use]
    pub fn all_set(&self) -> bool {
        self.0.values().all(FieldValue::is_set)
    }

    /// True when each of `names` is present and set.
    #[must_use]
    pub fn has_all(&self, names: &[String]) -> bool {
        names.iter().all(|name| self.0.get(name).is_some_and(FieldValue::is_set))
    }

    #[must_use]
    pub fn to_json(&self) -> Map<String, Value> {
        self.0.iter().map(|(name, value)| (name.clone(), value.to_json())).collect()
    }
}
