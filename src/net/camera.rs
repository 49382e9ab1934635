//! Camera coordinate refresh.
//!
//! A successful fetch replaces the primary layer wholesale; it never merges.
//! While the operator owns the coordinates (manipulation flag set) nothing is
//! fetched and nothing changes.
//!
//! ERROR HANDLING
//! ==============
//! Network and decode failures propagate before the store is touched, so a
//! failed refresh leaves the previous coordinates in place.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::net::api::{ApiError, Backend, CAMERA_COORDS};
use crate::net::types::CameraCoordinates;
use crate::session::Session;
use crate::state::coords::{Layer, Point, marker_id};
use crate::util::surface::Surface;

/// What a refresh did to the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Manipulation was set; no request was made.
    Skipped,
    /// Manipulation was set while the request was in flight; the answer was dropped.
    Superseded,
    /// The table image has no rendered size yet; the answer was dropped.
    Unmeasured,
    /// The primary layer now holds exactly `count` detections.
    Replaced { count: usize },
}

/// Refresh the coordinate store from the camera.
///
/// # Errors
///
/// Returns [`ApiError`] when the request fails or the body is not a
/// detection map. The store is unchanged in that case.
pub async fn fetch_coordinates<B: Backend, S: Surface>(session: &Session<B, S>) -> Result<SyncOutcome, ApiError> {
    if session.manipulation().is_manipulated() {
        log::debug!("camera refresh skipped: coordinates are manipulated");
        return Ok(SyncOutcome::Skipped);
    }
    let raw = session.backend().get_json(CAMERA_COORDS).await?;
    let detections: CameraCoordinates = serde_json::from_value(raw)?;
    if session.manipulation().is_manipulated() {
        log::debug!("camera refresh dropped: manipulation started while fetching");
        return Ok(SyncOutcome::Superseded);
    }
    if !session.measure_table() {
        log::warn!("camera refresh dropped: table image not laid out");
        return Ok(SyncOutcome::Unmeasured);
    }
    Ok(replace_primary(session, &detections))
}

fn replace_primary<B: Backend, S: Surface>(session: &Session<B, S>, detections: &CameraCoordinates) -> SyncOutcome {
    let surface = session.surface();
    let mut store = session.store_mut();
    store.clear_primary();
    surface.hide_all_markers();
    for marker in store.auxiliary() {
        surface.show_marker(&marker.id, marker.pixel);
    }
    for detection in detections.values() {
        let id = marker_id(&detection.name);
        let placed = store.place_from_real(&id, Point::new(detection.x, detection.y), Layer::Primary);
        surface.show_marker(&placed.id, placed.pixel);
    }
    let count = store.primary_len();
    log::debug!("camera refresh placed {count} balls");
    SyncOutcome::Replaced { count }
}
