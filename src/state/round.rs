//! Measurements collected for one scored round.
//!
//! The set of required keys is declared when the accumulator is built (the
//! page's measurement controls plus the identity fields), so the completeness
//! check follows the page instead of a fixed count.

#[cfg(test)]
#[path = "round_test.rs"]
mod round_test;

use std::collections::BTreeMap;

use serde_json::{Map, Value};

pub const PERSON_KEY: &str = "person-name";
pub const TEAM_KEY: &str = "team-name";

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RoundError {
    #[error("No name/team has been entered!")]
    MissingIdentity { field: &'static str },
    #[error("Not every test was done! Missing: {}", missing.join(", "))]
    Incomplete { missing: Vec<String> },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoundAccumulator {
    required: Vec<String>,
    values: BTreeMap<String, Value>,
}

impl RoundAccumulator {
    /// Accumulator requiring `measurements` plus the identity keys.
    #[must_use]
    pub fn new<I, K>(measurements: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let mut required: Vec<String> = measurements.into_iter().map(Into::into).collect();
        for key in [TEAM_KEY, PERSON_KEY] {
            if !required.iter().any(|k| k == key) {
                required.push(key.to_owned());
            }
        }
        Self { required, values: BTreeMap::new() }
    }

    #[must_use]
    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn record(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_owned(), value);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Record the identity fields; both must be non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`RoundError::MissingIdentity`] naming the first empty field.
    pub fn set_identity(&mut self, person: &str, team: &str) -> Result<(), RoundError> {
        let person = person.trim();
        let team = team.trim();
        if team.is_empty() {
            return Err(RoundError::MissingIdentity { field: TEAM_KEY });
        }
        if person.is_empty() {
            return Err(RoundError::MissingIdentity { field: PERSON_KEY });
        }
        self.record(TEAM_KEY, Value::String(team.to_owned()));
        self.record(PERSON_KEY, Value::String(person.to_owned()));
        Ok(())
    }

    #[must_use]
    pub fn missing(&self) -> Vec<String> {
        self.required.iter().filter(|key| !self.values.contains_key(*key)).cloned().collect()
    }

    /// # Errors
    ///
    /// Returns [`RoundError::Incomplete`] listing the absent keys.
    pub fn check_complete(&self) -> Result<(), RoundError> {
        let missing = self.missing();
        if missing.is_empty() { Ok(()) } else { Err(RoundError::Incomplete { missing }) }
    }

    #[must_use]
    pub fn to_payload(&self) -> Map<String, Value> {
        self.values.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
