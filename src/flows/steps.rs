//! Submitting a gamemode step.
//!
//! The owning step declares how its submit control commits. Reviewed steps
//! go through `flows::confirm`; direct steps post at once with the current
//! store. Either way the response drives the step controller, and a finished
//! round resets the session's round state.

#[cfg(test)]
#[path = "steps_test.rs"]
mod steps_test;

use crate::flows::confirm::{ConfirmOutcome, abandon_control, confirm_and_commit};
use crate::net::api::{ApiError, Backend};
use crate::session::Session;
use crate::state::steps::{InteractionKind, StepController, StepResult};
use crate::util::form::FormValues;
use crate::util::surface::Surface;

/// Submit the step owning `control` with the step's current input `values`.
///
/// `checked` is the control's state after the event (always `true` for
/// buttons); `clicked_on` is the button value for multi-button steps.
/// Returns `None` while a review is pending or when nothing was sent.
///
/// # Errors
///
/// Returns [`ApiError`] when the commit fails; the control is reset first.
pub async fn submit_step<B: Backend, S: Surface>(
    session: &Session<B, S>,
    control: &str,
    checked: bool,
    values: &FormValues,
    clicked_on: Option<&str>,
) -> Result<Option<StepResult>, ApiError> {
    let Some((container, step)) = session.step_for_control(control) else {
        log::warn!("{control} is not a submit control of any step");
        return Ok(None);
    };
    let payload = StepController::build_payload(values, clicked_on);

    let resp = match step.kind {
        InteractionKind::ReviewedCommit => {
            let outcome =
                confirm_and_commit(session, control, checked, payload, |p| session.send_for(&container, p, true), |_, _, _| {})
                    .await?;
            match outcome {
                ConfirmOutcome::Committed(resp) => resp,
                ConfirmOutcome::AwaitingReview(_) | ConfirmOutcome::Ignored => return Ok(None),
            }
        }
        InteractionKind::DirectCommit => {
            let mut payload = payload;
            payload.insert("coordinates".to_owned(), session.store().snapshot());
            match session.send_for(&container, payload, true).await {
                Ok(resp) => resp,
                Err(e) => {
                    abandon_control(session, control, &e);
                    return Err(e);
                }
            }
        }
    };

    let result = session.with_steps(&container, |controller| controller.apply_response(control, &resp, session.surface()));
    if result == Some(StepResult::Finished) {
        log::info!("{container}: round finished");
        session.reset_round();
    }
    Ok(result)
}

/// Value to report as `clicked_on`: the button's value when it has a name.
#[must_use]
pub fn clicked_value<'a>(name: &str, value: &'a str) -> Option<&'a str> {
    (!name.is_empty()).then_some(value)
}

/// Recompute the submit gate of the step `dom_id` in `container`.
pub fn refresh_gate<B: Backend, S: Surface>(
    session: &Session<B, S>,
    container: &str,
    dom_id: &str,
    values: &FormValues,
) -> Option<bool> {
    session.with_steps(container, |controller| controller.refresh_gate(dom_id, values, session.surface())).flatten()
}
