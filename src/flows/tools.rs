//! Operator tools next to the live image.

#[cfg(test)]
#[path = "tools_test.rs"]
mod tools_test;

use crate::flows::display_value;
use crate::net::api::{ApiError, Backend, TAKE_IMAGE};
use crate::net::types::TakeImageResponse;
use crate::session::Session;
use crate::util::surface::Surface;

pub const TRAINING_BUTTON_ID: &str = "ai-training-button";

/// Save the current camera frame for detector training and show the answer
/// on `button`.
///
/// # Errors
///
/// Returns [`ApiError`] when the request fails or the body is malformed.
pub async fn take_training_image<B: Backend, S: Surface>(session: &Session<B, S>, button: &str) -> Result<String, ApiError> {
    let body = session.backend().get_json(TAKE_IMAGE).await?;
    let resp: TakeImageResponse = serde_json::from_value(body)?;
    let caption = format!("Click to save image. {}", display_value(&resp.answer));
    session.surface().set_control_value(button, &caption);
    Ok(caption)
}
