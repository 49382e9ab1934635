//! Trickshot catalogue.

#[cfg(test)]
#[path = "trickshots_test.rs"]
mod trickshots_test;

use serde_json::{Value, json};

use crate::flows::display_value;
use crate::net::api::{ApiError, Backend, TRICKSHOTS_LIST, TRICKSHOTS_LOAD};
use crate::net::types::Trickshot;
use crate::session::Session;
use crate::util::surface::Surface;

/// Fetch every stored trickshot.
///
/// # Errors
///
/// Returns [`ApiError`] when the request fails or the body is not a list.
pub async fn list_trickshots<B: Backend, S: Surface>(session: &Session<B, S>) -> Result<Vec<Trickshot>, ApiError> {
    let body = session.backend().get_json(TRICKSHOTS_LIST).await?;
    let tricks: Vec<Trickshot> = serde_json::from_value(body)?;
    log::debug!("{} trickshots listed", tricks.len());
    Ok(tricks)
}

/// Project trickshot `id` onto the table.
pub fn load_trickshot<B: Backend, S: Surface>(session: &Session<B, S>, id: &Value) {
    log::info!("loading trickshot {id}");
    session.backend().post_detached(TRICKSHOTS_LOAD, json!({ "id": id }));
}

/// Difficulty cell text (`7/10`).
#[must_use]
pub fn difficulty_label(trick: &Trickshot) -> String {
    format!("{}/10", display_value(&trick.difficulty))
}
