//! Two players at one table.
//!
//! The server keeps the game state; the page registers both players, asks it
//! who breaks and reports each finished turn. The turn answer (current
//! player, remaining balls per group, group assignment) is re-emitted as a
//! window event for the page's scoreboard.

#[cfg(test)]
#[path = "local_game_test.rs"]
mod local_game_test;

use serde_json::Value;

use crate::flows::display_value;
use crate::net::api::{ApiError, Backend, GAME_DETERMINE_START, GAME_ENTER_ROUND, GAME_START};
use crate::net::types::LocalRound;
use crate::session::Session;
use crate::util::form::FormValues;
use crate::util::surface::Surface;

pub const START_BUTTON_ID: &str = "game-start-button";
/// Window event carrying the latest [`LocalRound`] body.
pub const LOCAL_ROUND_EVENT: &str = "local_round_updated";

/// Player name and team input names, in wire order (`p1`, `t1`, `p2`, `t2`).
const PLAYER_FIELDS: [(&str, &str); 4] =
    [("p1", "person-name-1"), ("t1", "team-name-1"), ("p2", "person-name-2"), ("t2", "team-name-2")];

/// Register both players and (re)start the game.
pub fn start_game<B: Backend, S: Surface>(session: &Session<B, S>, players: &FormValues) {
    let mut body = serde_json::Map::new();
    for (key, input) in PLAYER_FIELDS {
        body.insert(key.to_owned(), Value::String(players.text(input).unwrap_or_default().to_owned()));
    }
    log::info!("starting local game: {body:?}");
    session.backend().post_detached(GAME_START, Value::Object(body));
    session.surface().set_control_value(START_BUTTON_ID, "Restart game");
}

/// Ask the server which player breaks.
///
/// # Errors
///
/// Returns [`ApiError`] when the request fails.
pub async fn determine_start<B: Backend, S: Surface>(session: &Session<B, S>) -> Result<Value, ApiError> {
    let body = session.backend().get_json(GAME_DETERMINE_START).await?;
    if let Some(message) = body.get("message") {
        session.surface().notify(&display_value(message), session.config().notification_ms);
    }
    Ok(body)
}

/// Report a finished turn and read back the game state.
///
/// # Errors
///
/// Returns [`ApiError`] when the request fails or the body is malformed.
pub async fn enter_round<B: Backend, S: Surface>(session: &Session<B, S>) -> Result<LocalRound, ApiError> {
    let body = session.backend().get_json(GAME_ENTER_ROUND).await?;
    let round: LocalRound = serde_json::from_value(body.clone())?;
    log::info!("{} to play, remaining {:?}", round.current_player, round.remaining_balls);
    session.surface().dispatch(LOCAL_ROUND_EVENT, &body);
    Ok(round)
}
