//! Which gamemode section is open and how requests are stamped with it.

#[cfg(test)]
#[path = "gamemode_test.rs"]
mod gamemode_test;

use serde_json::{Map, Value};

/// Gamemode id when no section is open.
pub const BASE_GAMEMODE: &str = "base";
/// Window event dispatched after the selection changed.
pub const GAMEMODE_UPDATED_EVENT: &str = "gamemode_updated";

/// How the gamemode identity is attached to controller requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// `gmode` is the open section.
    Vanilla,
    /// `gmode` is the umbrella; the open section goes in `<umbrella>_activity`.
    Nested { umbrella: String },
}

impl Route {
    #[must_use]
    pub fn from_umbrella(umbrella: Option<&str>) -> Self {
        match umbrella {
            Some(umbrella) => Self::Nested { umbrella: umbrella.to_owned() },
            None => Self::Vanilla,
        }
    }

    /// Name of the sub-activity field (`kp2_activity`), if nested.
    #[must_use]
    pub fn activity_key(&self) -> Option<String> {
        match self {
            Self::Vanilla => None,
            Self::Nested { umbrella } => Some(format!("{umbrella}_activity")),
        }
    }

    /// Attach the discriminator fields for `current` to `payload`.
    ///
    /// With `set_activity` false a nested route leaves any activity field the
    /// caller set untouched (meta actions such as hand-in and settings).
    pub fn stamp(&self, payload: &mut Map<String, Value>, current: &str, set_activity: bool) {
        match self {
            Self::Vanilla => {
                payload.insert("gmode".to_owned(), Value::String(current.to_owned()));
            }
            Self::Nested { umbrella } => {
                payload.insert("gmode".to_owned(), Value::String(umbrella.clone()));
                if set_activity {
                    payload.insert(format!("{umbrella}_activity"), Value::String(current.to_owned()));
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GamemodeSelection {
    current: String,
}

impl Default for GamemodeSelection {
    fn default() -> Self {
        Self { current: BASE_GAMEMODE.to_owned() }
    }
}

impl GamemodeSelection {
    #[must_use]
    pub fn current(&self) -> &str {
        &self.current
    }

    #[must_use]
    pub fn is_base(&self) -> bool {
        self.current == BASE_GAMEMODE
    }

    /// Open `gamemode`; selecting the open one again closes it back to base.
    pub fn toggle(&mut self, gamemode: &str) -> &str {
        self.current = if self.current == gamemode { BASE_GAMEMODE.to_owned() } else { gamemode.to_owned() };
        &self.current
    }

    pub fn reset(&mut self) {
        self.current = BASE_GAMEMODE.to_owned();
    }
}
