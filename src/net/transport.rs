//! Gamemode controller round trip.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every gamemode action goes to `POST /gamemodecontroller`. The payload is
//! stamped with the gamemode discriminator (see `state::gamemode::Route`),
//! the response decoded into a [`ControllerResponse`] and its directives
//! applied to the page before the caller sees it.

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use serde_json::{Map, Value};

use crate::net::api::{ApiError, Backend, GAMEMODE_CONTROLLER};
use crate::net::types::{ControllerResponse, Directive};
use crate::session::Session;
use crate::util::surface::Surface;

/// Send `payload` for the open gamemode and apply the response directives.
///
/// `set_activity` controls whether a nested route overwrites the activity
/// field with the open section. `log_to` targets are resolved inside
/// `scope`, the selector of the container that issued the request.
///
/// # Errors
///
/// Returns [`ApiError`] when the request fails or a known response key has
/// the wrong shape. No directive is applied in that case.
pub async fn send<B: Backend, S: Surface>(
    session: &Session<B, S>,
    mut payload: Map<String, Value>,
    set_activity: bool,
    scope: &str,
) -> Result<ControllerResponse, ApiError> {
    let gamemode = session.gamemode();
    session.route().stamp(&mut payload, &gamemode, set_activity);
    let body = Value::Object(payload);
    let raw = session.backend().post_json(GAMEMODE_CONTROLLER, &body).await?;
    log::debug!("SEND: {body} RECEIVED: {raw}");
    let resp = ControllerResponse::from_value(raw)?;
    apply_directives(session.surface(), scope, &resp.directives(), session.config().notification_ms);
    Ok(resp)
}

/// Selector of a container `log_to` targets are resolved in.
#[must_use]
pub fn scope_selector(container: &str) -> String {
    format!("#{container}")
}

pub fn apply_directives<S: Surface>(surface: &S, scope: &str, directives: &[Directive], notification_ms: u32) {
    for directive in directives {
        apply_directive(surface, scope, directive, notification_ms);
    }
}

pub fn apply_directive<S: Surface>(surface: &S, scope: &str, directive: &Directive, notification_ms: u32) {
    match directive {
        Directive::Notify { message } => surface.notify(message, notification_ms),
        Directive::Enable { selectors } => {
            for selector in selectors {
                surface.set_deactivated(selector, false);
            }
        }
        Directive::Disable { selectors } => {
            for selector in selectors {
                surface.set_deactivated(selector, true);
            }
        }
        Directive::Emit { event, detail } => surface.dispatch(event, detail),
        Directive::Click { selectors } => {
            for selector in selectors {
                surface.click(selector);
            }
        }
        Directive::LogTo { selector, message } => surface.write_text(scope, selector, message),
    }
}
