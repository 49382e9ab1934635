//! Pushing gamemode settings to the controller.
//!
//! A `.setting` container inside a gamemode sends its inputs whenever one
//! changes. A `.global-config` container holds settings that belong to no
//! activity (semester, session); it is sent only once every input is set.

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;

use serde_json::{Map, Value};

use crate::net::api::{ApiError, Backend};
use crate::net::types::ControllerResponse;
use crate::session::Session;
use crate::util::form::FormValues;
use crate::util::surface::Surface;

/// Selector of the element a setting's response message is printed into.
pub const OUTPUT_SELECTOR: &str = ".output";

/// Send the settings held by `container`.
///
/// `meta` settings are tagged with the `settings` activity instead of the
/// open one. With `print` the response message goes to the container's
/// output element.
///
/// # Errors
///
/// Returns [`ApiError`] when the request fails.
pub async fn send_setting<B: Backend, S: Surface>(
    session: &Session<B, S>,
    container: &str,
    values: &FormValues,
    print: bool,
    meta: bool,
) -> Result<ControllerResponse, ApiError> {
    let mut payload = Map::new();
    if meta {
        if let Some(key) = session.route().activity_key() {
            payload.insert(key, Value::String("settings".to_owned()));
        }
    }
    payload.insert("action".to_owned(), Value::String("settings".to_owned()));
    payload.insert("settings".to_owned(), Value::Object(values.to_json()));
    payload.insert("container".to_owned(), Value::String(container.to_owned()));

    let resp = session.send(payload, !meta).await?;
    if print {
        if let Some(message) = &resp.message {
            session.surface().write_text(&format!("#{container}"), OUTPUT_SELECTOR, message);
        }
    }
    Ok(resp)
}

/// Send a global configuration container once all of its inputs are set.
///
/// # Errors
///
/// Returns [`ApiError`] when the request fails.
pub async fn send_global_config<B: Backend, S: Surface>(
    session: &Session<B, S>,
    container: &str,
    values: &FormValues,
) -> Result<Option<ControllerResponse>, ApiError> {
    if !values.all_set() {
        log::debug!("{container}: global config incomplete, not sent");
        return Ok(None);
    }
    send_setting(session, container, values, false, true).await.map(Some)
}
