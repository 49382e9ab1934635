//! Review-then-commit driver for checkbox controls.
//!
//! SYSTEM CONTEXT
//! ==============
//! The first activation of a control fetches camera coordinates and shows
//! them for review while the control is disabled. The next activation
//! commits the store as it stands, including any corrections the operator
//! made in between. With manipulation set the review is skipped: the
//! operator already owns the coordinates.
//!
//! The phase records live in `state::handshake`; this module performs the
//! side effects around each transition.
//!
//! ERROR HANDLING
//! ==============
//! A failed fetch or commit returns the control to idle: unchecked, label
//! restored, enabled, and the error shown as a notification.

#[cfg(test)]
#[path = "confirm_test.rs"]
mod confirm_test;

use std::future::Future;

use serde_json::{Map, Value};

use crate::net::api::{ApiError, Backend};
use crate::net::camera::{SyncOutcome, fetch_coordinates};
use crate::net::types::ControllerResponse;
use crate::session::Session;
use crate::state::handshake::Activation;
use crate::util::surface::Surface;

pub const REVIEW_LABEL: &str = "Getting coordinates...";
pub const COMMIT_LABEL: &str = "Commit coordinates";

#[derive(Clone, Debug, PartialEq)]
pub enum ConfirmOutcome {
    /// Coordinates are on screen; the next activation commits.
    AwaitingReview(SyncOutcome),
    /// The commit went through.
    Committed(ControllerResponse),
    /// The activation did not start or finish a cycle.
    Ignored,
}

/// Finalizer writing the response message to the control's label.
pub fn label_with_message<S: Surface>(surface: &S, control: &str, resp: &ControllerResponse) {
    if let Some(message) = &resp.message {
        surface.set_label(control, message);
    }
}

/// Advance the handshake of `control` after it turned `checked`.
///
/// On commit, `payload` gets the store snapshot under `coordinates` and is
/// passed to `commit`; `finalize` then sees the response.
///
/// # Errors
///
/// Returns the [`ApiError`] of a failed fetch or commit after the control was
/// reset and the operator notified.
pub async fn confirm_and_commit<B, S, C, Fut, F>(
    session: &Session<B, S>,
    control: &str,
    checked: bool,
    mut payload: Map<String, Value>,
    commit: C,
    finalize: F,
) -> Result<ConfirmOutcome, ApiError>
where
    B: Backend,
    S: Surface,
    C: FnOnce(Map<String, Value>) -> Fut,
    Fut: Future<Output = Result<ControllerResponse, ApiError>>,
    F: FnOnce(&S, &str, &ControllerResponse),
{
    let surface = session.surface();
    let handshake = session.handshake();
    match handshake.decide(control, checked, session.manipulation().is_manipulated()) {
        Activation::Ignored => Ok(ConfirmOutcome::Ignored),
        Activation::Review => {
            handshake.begin_review(control);
            surface.set_label(control, REVIEW_LABEL);
            surface.set_control_disabled(control, true);
            match fetch_coordinates(session).await {
                Ok(outcome) => {
                    surface.set_label(control, COMMIT_LABEL);
                    surface.set_control_disabled(control, false);
                    Ok(ConfirmOutcome::AwaitingReview(outcome))
                }
                Err(e) => {
                    handshake.finish(control);
                    abandon_control(session, control, &e);
                    Err(e)
                }
            }
        }
        Activation::Commit => {
            handshake.finish(control);
            surface.set_control_checked(control, true);
            payload.insert("coordinates".to_owned(), session.store().snapshot());
            match commit(payload).await {
                Ok(resp) => {
                    finalize(surface, control, &resp);
                    Ok(ConfirmOutcome::Committed(resp))
                }
                Err(e) => {
                    abandon_control(session, control, &e);
                    Err(e)
                }
            }
        }
    }
}

/// Return `control` to idle after a failed request and tell the operator.
pub fn abandon_control<B: Backend, S: Surface>(session: &Session<B, S>, control: &str, err: &ApiError) {
    log::warn!("{control}: {err}");
    let surface = session.surface();
    surface.set_control_checked(control, false);
    surface.restore_label(control);
    surface.set_control_disabled(control, false);
    surface.notify(&err.to_string(), session.config().notification_ms);
}
