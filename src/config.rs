//! Client configuration read from the page.
//!
//! The server renders an optional `<script id="cueboard-config"
//! type="application/json">` block; every field falls back to the deployed
//! defaults when omitted.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;

use crate::state::coords::Point;

pub const CONFIG_ELEMENT_ID: &str = "cueboard-config";

pub const DEFAULT_TABLE_LONG_SIDE_MM: f64 = 2230.0;
pub const DEFAULT_TABLE_SHORT_SIDE_MM: f64 = 1115.0;
pub const DEFAULT_KEEPALIVE_URL: &str = "http://134.28.20.53:5000/website/liveline";
pub const DEFAULT_KEEPALIVE_INTERVAL_MS: u32 = 55_000;
pub const DEFAULT_LONG_POLL_INTERVAL_MS: u32 = 6_000;
pub const DEFAULT_NOTIFICATION_MS: u32 = 6_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u32 = 15_000;
pub const DEFAULT_RACK_SIZE: u32 = 16;
pub const DEFAULT_TRICKSHOT_BALLS: u32 = 3;

/// Error returned by [`ClientConfig::from_json`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid client config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} must not be zero")]
    ZeroInterval { field: &'static str },
}

/// Physical playing-surface size in millimeters.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TableDimensions {
    pub long_side_mm: f64,
    pub short_side_mm: f64,
}

impl Default for TableDimensions {
    fn default() -> Self {
        Self { long_side_mm: DEFAULT_TABLE_LONG_SIDE_MM, short_side_mm: DEFAULT_TABLE_SHORT_SIDE_MM }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub table: TableDimensions,
    /// Liveness endpoint pinged for the life of the page. `None` disables it.
    pub keepalive_url: Option<String>,
    pub keepalive_interval_ms: u32,
    pub long_poll_interval_ms: u32,
    pub notification_ms: u32,
    pub request_timeout_ms: u32,
    /// Reference point for precision measurements, in table millimeters.
    pub precision_target: Point,
    pub rack_size: u32,
    pub trickshot_balls: u32,
    /// Umbrella gamemode (e.g. `"kp2"`) whose sub-activities are the page's sections.
    pub umbrella: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            table: TableDimensions::default(),
            keepalive_url: Some(DEFAULT_KEEPALIVE_URL.to_owned()),
            keepalive_interval_ms: DEFAULT_KEEPALIVE_INTERVAL_MS,
            long_poll_interval_ms: DEFAULT_LONG_POLL_INTERVAL_MS,
            notification_ms: DEFAULT_NOTIFICATION_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            precision_target: Point::new(565.0, 557.0),
            rack_size: DEFAULT_RACK_SIZE,
            trickshot_balls: DEFAULT_TRICKSHOT_BALLS,
            umbrella: None,
        }
    }
}

impl ClientConfig {
    /// Parse and validate the page-embedded JSON config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the JSON is malformed, a table dimension
    /// is not positive, or a timer interval is zero.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("table.long_side_mm", self.table.long_side_mm),
            ("table.short_side_mm", self.table.short_side_mm),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        for (field, value) in [
            ("keepalive_interval_ms", self.keepalive_interval_ms),
            ("long_poll_interval_ms", self.long_poll_interval_ms),
            ("request_timeout_ms", self.request_timeout_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroInterval { field });
            }
        }
        Ok(())
    }
}
