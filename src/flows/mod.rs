//! Operator workflows composed from state machines and network calls.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each flow is what one page interaction does end to end: `confirm` drives
//! the review/commit handshake, `steps` submits gamemode steps, `board` runs
//! the standalone measurement board and round submission, `gamemode` opens
//! sections, `settings` pushes gamemode settings, and `local_game`,
//! `trickshots` and `tools` cover the smaller pages.
//!
//! ERROR HANDLING
//! ==============
//! Flows report the operator-facing part of a failure themselves (alert,
//! notification, control reset) and still return the typed error so the
//! caller can log it.

pub mod board;
pub mod confirm;
pub mod gamemode;
pub mod local_game;
pub mod settings;
pub mod steps;
pub mod tools;
pub mod trickshots;

use crate::measure::MeasureError;
use crate::net::api::ApiError;
use crate::state::round::RoundError;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Measure(#[from] MeasureError),
    #[error(transparent)]
    Round(#[from] RoundError),
}

/// Text of a JSON value as shown to the operator (strings without quotes).
#[must_use]
pub fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
