//! Wire DTOs for the game module's HTTP endpoints.
//!
//! DESIGN
//! ======
//! Controller responses carry optional UI directives as loose keys. They are
//! decoded into a typed struct here and then flattened into a [`Directive`]
//! list so the transport can apply them with one exhaustive match.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event carrying scoreboard history to the scoreboard renderer.
pub const SCOREBOARD_EVENT: &str = "update_scoreboard";

/// One camera detection, in table millimeters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CameraDetection {
    pub name: String,
    #[serde(alias = "x_mm")]
    pub x: f64,
    #[serde(alias = "y_mm")]
    pub y: f64,
}

/// `GET /camera/coords` body: detection name to detection.
pub type CameraCoordinates = BTreeMap<String, CameraDetection>;

/// One entry of an outbound coordinate submission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackendCoordinate {
    pub name: String,
    pub x: f64,
    pub y: f64,
}

/// Response of `POST /gamemodecontroller` and its narrow variants.
///
/// Every field is optional on the wire.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControllerResponse {
    pub message: Option<String>,
    /// Suffix of the step to activate next.
    pub signal: Option<String>,
    pub notification: Option<String>,
    pub enable: Vec<String>,
    pub disable: Vec<String>,
    /// Event name to detail payload.
    pub emit: Map<String, Value>,
    pub click: Vec<String>,
    pub log_to: Option<String>,
    pub history: Option<Value>,
    pub resume: bool,
    /// Result slot index of the round that just finished.
    pub was_round: Option<usize>,
    /// Present (any value) when the finished round was discarded.
    pub discarded: Option<Value>,
    pub score: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A UI instruction carried by a response.
#[derive(Clone, Debug, PartialEq)]
pub enum Directive {
    /// Show a transient notification.
    Notify { message: String },
    /// Remove the `deactivated` class from every match.
    Enable { selectors: Vec<String> },
    /// Add the `deactivated` class to every match.
    Disable { selectors: Vec<String> },
    /// Dispatch a custom window event.
    Emit { event: String, detail: Value },
    /// Synthetically click every match.
    Click { selectors: Vec<String> },
    /// Write the response message to this element instead of the control label.
    LogTo { selector: String, message: String },
}

impl ControllerResponse {
    /// Decode a raw response body.
    ///
    /// # Errors
    ///
    /// Returns the serde error when a known key has the wrong shape.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[must_use]
    pub fn has_signal(&self, signal: &str) -> bool {
        self.signal.as_deref() == Some(signal)
    }

    #[must_use]
    pub fn is_discarded(&self) -> bool {
        self.discarded.is_some()
    }

    /// Directives in application order: notify, disable, enable, emit, click, log.
    #[must_use]
    pub fn directives(&self) -> Vec<Directive> {
        let mut out = Vec::new();
        if let Some(message) = &self.notification {
            out.push(Directive::Notify { message: message.clone() });
        }
        if !self.disable.is_empty() {
            out.push(Directive::Disable { selectors: self.disable.clone() });
        }
        if !self.enable.is_empty() {
            out.push(Directive::Enable { selectors: self.enable.clone() });
        }
        for (event, detail) in &self.emit {
            out.push(Directive::Emit { event: event.clone(), detail: detail.clone() });
        }
        if let Some(history) = &self.history {
            out.push(Directive::Emit { event: SCOREBOARD_EVENT.to_owned(), detail: history.clone() });
        }
        if !self.click.is_empty() {
            out.push(Directive::Click { selectors: self.click.clone() });
        }
        if let (Some(selector), Some(message)) = (&self.log_to, &self.message) {
            out.push(Directive::LogTo { selector: selector.clone(), message: message.clone() });
        }
        out
    }
}

/// `GET /general/takeimage` body.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TakeImageResponse {
    pub answer: Value,
}

/// One entry of `GET /trickshots/list`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Trickshot {
    pub id: Value,
    pub name: String,
    pub difficulty: Value,
}

/// `GET /game/enterround` body for the local two-player game.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LocalRound {
    #[serde(rename = "current-player")]
    pub current_player: String,
    /// Remaining balls per group (`full`, `half`, `eight`).
    #[serde(rename = "remaining-balls")]
    pub remaining_balls: BTreeMap<String, u32>,
    /// Group per player once the table is closed; empty while open.
    pub groups: Vec<String>,
}

/// `POST /kp2/enterround` body: score plus pre-rendered scoreboards.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoresResponse {
    pub score: Option<Value>,
    #[serde(flatten)]
    pub boards: Map<String, Value>,
}
