//! Opening and closing gamemode sections.

#[cfg(test)]
#[path = "gamemode_test.rs"]
mod gamemode_test;

use serde_json::{Map, Value, json};

use crate::net::api::{ApiError, Backend};
use crate::session::Session;
use crate::state::gamemode::{GAMEMODE_UPDATED_EVENT, Route};
use crate::util::surface::Surface;

/// Open `gamemode` (or close it when it is already open) and announce it.
///
/// Under an umbrella route the newly opened activity is initialised on the
/// server with `{"action":"show"}`. Returns the gamemode that is now open.
///
/// # Errors
///
/// Returns [`ApiError`] when the initialising request fails; the selection
/// has changed regardless.
pub async fn select_gamemode<B: Backend, S: Surface>(session: &Session<B, S>, gamemode: &str) -> Result<String, ApiError> {
    let current = session.gamemode_mut().toggle(gamemode).to_owned();
    log::info!("gamemode -> {current}");
    session.surface().dispatch(GAMEMODE_UPDATED_EVENT, &json!({ "gamemode": current }));
    if let Route::Nested { .. } = session.route() {
        let mut payload = Map::new();
        payload.insert("action".to_owned(), Value::String("show".to_owned()));
        session.send(payload, true).await?;
    }
    Ok(current)
}
