//! Operator override gate for camera refreshes.
//!
//! While set, camera detections must not overwrite the coordinate store. The
//! flag and the `manipulation-flag` checkbox are one source of truth: every
//! write from code is mirrored to the checkbox, and checkbox changes made by
//! the operator are read back with [`ManipulationTracker::sync_from_toggle`].

#[cfg(test)]
#[path = "manipulation_test.rs"]
mod manipulation_test;

use std::cell::Cell;

use crate::state::coords::START_MARKER_ID;
use crate::util::surface::Surface;

pub const MANIPULATION_TOGGLE_ID: &str = "manipulation-flag";

#[derive(Debug, Default)]
pub struct ManipulationTracker {
    manipulated: Cell<bool>,
}

impl ManipulationTracker {
    #[must_use]
    pub fn is_manipulated(&self) -> bool {
        self.manipulated.get()
    }

    /// Set the flag and mirror it to the page toggle.
    pub fn set<S: Surface>(&self, manipulated: bool, surface: &S) {
        if self.manipulated.replace(manipulated) != manipulated {
            log::debug!("manipulation flag -> {manipulated}");
        }
        surface.set_manipulation_toggle(manipulated);
    }

    /// Adopt the toggle's state after the operator changed it.
    pub fn sync_from_toggle(&self, checked: bool) {
        self.manipulated.set(checked);
    }

    /// Record a manual placement or removal of `id`.
    ///
    /// Returns whether the edit counted as manipulation; the distance start
    /// marker is exempt.
    pub fn record_manual_edit<S: Surface>(&self, id: &str, surface: &S) -> bool {
        if counts_as_manipulation(id) {
            self.set(true, surface);
            true
        } else {
            false
        }
    }
}

#[must_use]
pub fn counts_as_manipulation(id: &str) -> bool {
    id != START_MARKER_ID
}
