//! Standalone measurement board and scored round submission.
//!
//! SYSTEM CONTEXT
//! ==============
//! The exam page measures one shot per checkbox: precision and distance
//! controls need exactly one ball on the table, break and trickshot controls
//! count the balls left. Each result is shown on the control's label and
//! recorded in the session's round accumulator under the control id (or the
//! fixed `break`/`trickshot` key). The submit button sends the complete round
//! with the player's identity to `/kp2/enterround`.
//!
//! ERROR HANDLING
//! ==============
//! Ambiguous detections and incomplete rounds are operator errors: they are
//! shown as a blocking alert, the control is unchecked and its label
//! restored. Nothing is retried.

#[cfg(test)]
#[path = "board_test.rs"]
mod board_test;

use serde_json::{Map, Value, json};

use crate::flows::confirm::abandon_control;
use crate::flows::{FlowError, display_value};
use crate::measure::{MeasureError, cushion_distance, precision_distance, sunk_count};
use crate::net::api::{ApiError, Backend, KP2_ENTER_ROUND, KP2_SELECT_MODE};
use crate::net::camera::fetch_coordinates;
use crate::net::types::{ControllerResponse, ScoresResponse};
use crate::session::Session;
use crate::state::coords::{START_MARKER_ID, marker_id};
use crate::state::round::{PERSON_KEY, TEAM_KEY};
use crate::util::form::FormValues;
use crate::util::surface::Surface;

pub const FINDING_LABEL: &str = "Finding ball...";
pub const COUNTING_LABEL: &str = "Counting balls...";

/// Sections of the board, one visible at a time.
pub const BOARD_SECTIONS: [&str; 4] = ["precision", "distance", "break", "trickshot"];
pub const BREAK_KEY: &str = "break";
pub const TRICKSHOT_KEY: &str = "trickshot";

pub const SUBMIT_BUTTON_ID: &str = "submit-button";
pub const ROUND_FORM_ID: &str = "roundForm";
/// Event carrying the scoreboard payload after scores were (re)loaded.
pub const SCORES_LOADED_EVENT: &str = "scores_loaded";
pub const USER_INFO_ID: &str = "user-info";
pub const SESSION_INFO_ID: &str = "session-info";
pub const RESULT_OVERVIEW_ID: &str = "result-overview";

/// Which count a sunk-ball control measures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SunkKind {
    Break,
    Trickshot,
}

impl SunkKind {
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Break => BREAK_KEY,
            Self::Trickshot => TRICKSHOT_KEY,
        }
    }
}

/// Switch the visible board section and tell the beamer.
///
/// Distance measurements place the start marker first; every other section
/// places the cue ball.
pub fn select_mode<B: Backend, S: Surface>(session: &Session<B, S>, mode: &str) {
    session.backend().post_detached(KP2_SELECT_MODE, json!({ "mode": mode }));
    for section in BOARD_SECTIONS {
        session.surface().set_deactivated(&format!("#{section}"), section != mode);
    }
    if mode == "distance" {
        session.select_ball(START_MARKER_ID);
    } else {
        session.select_ball(&marker_id("white"));
    }
}

/// Enable a distance checkbox only once its collision counter has a value.
pub fn collision_gate<S: Surface>(surface: &S, checkbox: &str, counter_value: &str) {
    surface.set_control_disabled(checkbox, counter_value.trim().is_empty());
}

/// Measure the precision shot behind `control`. Unchecking does nothing.
///
/// # Errors
///
/// [`FlowError::Api`] when the refresh fails, [`FlowError::Measure`] when
/// not exactly one ball is on the table.
pub async fn measure_precision<B: Backend, S: Surface>(
    session: &Session<B, S>,
    control: &str,
    checked: bool,
) -> Result<Option<f64>, FlowError> {
    if !checked {
        return Ok(None);
    }
    refresh(session, control, FINDING_LABEL).await?;
    let measured = precision_distance(&session.store(), session.config().precision_target);
    record_distance(session, control, measured).map(Some)
}

/// Measure the distance shot behind `control` over `collisions` cushions.
///
/// # Errors
///
/// As [`measure_precision`], plus a missing start marker.
pub async fn measure_distance<B: Backend, S: Surface>(
    session: &Session<B, S>,
    control: &str,
    checked: bool,
    collisions: u32,
) -> Result<Option<f64>, FlowError> {
    if !checked {
        return Ok(None);
    }
    refresh(session, control, FINDING_LABEL).await?;
    let measured = cushion_distance(&session.store(), collisions);
    record_distance(session, control, measured).map(Some)
}

/// Count the balls sunk on the break or trickshot control.
///
/// # Errors
///
/// [`FlowError::Api`] when the refresh fails.
pub async fn count_sunk<B: Backend, S: Surface>(
    session: &Session<B, S>,
    control: &str,
    checked: bool,
    kind: SunkKind,
) -> Result<Option<u32>, FlowError> {
    if !checked {
        return Ok(None);
    }
    refresh(session, control, COUNTING_LABEL).await?;
    let total = match kind {
        SunkKind::Break => session.config().rack_size,
        SunkKind::Trickshot => session.config().trickshot_balls,
    };
    let sunk = sunk_count(total, session.store().primary_len());
    session.surface().set_label(control, &format!("{sunk} balls were sunk"));
    session.round_mut().record(kind.key(), json!(sunk));
    Ok(Some(sunk))
}

async fn refresh<B: Backend, S: Surface>(session: &Session<B, S>, control: &str, label: &str) -> Result<(), ApiError> {
    session.surface().set_label(control, label);
    match fetch_coordinates(session).await {
        Ok(outcome) => {
            log::debug!("{control}: {outcome:?}");
            Ok(())
        }
        Err(e) => {
            abandon_control(session, control, &e);
            Err(e)
        }
    }
}

fn record_distance<B: Backend, S: Surface>(
    session: &Session<B, S>,
    control: &str,
    measured: Result<f64, MeasureError>,
) -> Result<f64, FlowError> {
    let surface = session.surface();
    match measured {
        Ok(distance) => {
            surface.set_label(control, &format!("{} mm", distance.round()));
            session.round_mut().record(control, json!(distance));
            Ok(distance)
        }
        Err(e) => {
            surface.alert(&e.to_string());
            surface.set_control_checked(control, false);
            surface.restore_label(control);
            Err(e.into())
        }
    }
}

/// Submit the accumulated round for `person` of `team`.
///
/// # Errors
///
/// [`FlowError::Round`] when identity or measurements are missing (nothing
/// is sent), [`FlowError::Api`] when the request fails.
pub async fn submit_round<B: Backend, S: Surface>(
    session: &Session<B, S>,
    person: &str,
    team: &str,
) -> Result<ScoresResponse, FlowError> {
    let payload = {
        let mut round = session.round_mut();
        let checked = round.set_identity(person, team).and_then(|()| round.check_complete());
        if let Err(e) = checked {
            session.surface().alert(&e.to_string());
            return Err(e.into());
        }
        Value::Object(round.to_payload())
    };
    let raw = session.backend().post_json(KP2_ENTER_ROUND, &payload).await?;
    let scores = show_scores(session, raw)?;

    let surface = session.surface();
    surface.reset_fields(ROUND_FORM_ID);
    for key in [PERSON_KEY, TEAM_KEY] {
        surface.set_control_value(key, "");
    }
    session.round_mut().clear();
    Ok(scores)
}

/// Fetch the current scores on page load.
///
/// # Errors
///
/// [`FlowError::Api`] when the request fails or the body is malformed.
pub async fn load_scores<B: Backend, S: Surface>(session: &Session<B, S>) -> Result<ScoresResponse, FlowError> {
    let raw = session.backend().post_json(KP2_ENTER_ROUND, &json!({ "get": "true" })).await?;
    show_scores(session, raw)
}

fn show_scores<B: Backend, S: Surface>(session: &Session<B, S>, raw: Value) -> Result<ScoresResponse, FlowError> {
    let surface = session.surface();
    surface.dispatch(SCORES_LOADED_EVENT, &raw);
    let scores: ScoresResponse = serde_json::from_value(raw).map_err(ApiError::from)?;
    if let Some(score) = &scores.score {
        surface.set_control_value(SUBMIT_BUTTON_ID, &format!("Last score: {}", display_value(score)));
    }
    Ok(scores)
}

/// Hand in the exam once user and session information are complete.
///
/// Returns `None` when a form is incomplete; the operator is told which.
///
/// # Errors
///
/// [`FlowError::Api`] when the request fails.
pub async fn hand_in<B: Backend, S: Surface>(
    session: &Session<B, S>,
    user_info: &FormValues,
    session_info: &FormValues,
) -> Result<Option<ControllerResponse>, FlowError> {
    let surface = session.surface();
    let duration = session.config().notification_ms;
    if !user_info.all_set() {
        surface.notify("Set user information to continue", duration);
        return Ok(None);
    }
    if !session_info.all_set() {
        surface.notify("Set session information to continue", duration);
        return Ok(None);
    }

    let mut payload = Map::new();
    if let Some(key) = session.route().activity_key() {
        payload.insert(key, json!("hand_in"));
    }
    payload.insert("action".to_owned(), json!("game"));
    let resp = session.send(payload, false).await?;

    if let Some(Value::Object(overview)) = resp.extra.get("overview") {
        surface.write_text("body", &format!("#{RESULT_OVERVIEW_ID}"), &overview_text(overview));
    }
    Ok(Some(resp))
}

/// One-line summary of the hand-in overview (`key: value` pairs).
#[must_use]
pub fn overview_text(overview: &Map<String, Value>) -> String {
    overview.iter().map(|(k, v)| format!("{k}: {}", display_value(v))).collect::<Vec<_>>().join(" | ")
}
