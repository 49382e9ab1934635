//! Per-control review/commit phase records.
//!
//! A control first fetches camera coordinates for the operator to review and
//! only commits on its next activation. Each control id owns its own record,
//! so independent controls may interleave their cycles freely.
//!
//! `flows::confirm` drives the transitions; this module only decides them.

#[cfg(test)]
#[path = "handshake_test.rs"]
mod handshake_test;

use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    AwaitingReview,
}

/// What an activation of a control should do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
    /// Fetch coordinates and wait for the operator.
    Review,
    /// Treat the store as final and submit.
    Commit,
    /// Neither applies (e.g. unchecking an idle control).
    Ignored,
}

#[derive(Debug, Default)]
pub struct ConfirmCommit {
    phases: RefCell<HashMap<String, Phase>>,
}

impl ConfirmCommit {
    #[must_use]
    pub fn phase(&self, control: &str) -> Phase {
        self.phases.borrow().get(control).copied().unwrap_or_default()
    }

    /// Decide the transition for `control` turning `checked`.
    ///
    /// Manipulation skips review entirely: the operator already owns the
    /// coordinates.
    #[must_use]
    pub fn decide(&self, control: &str, checked: bool, manipulated: bool) -> Activation {
        let phase = self.phase(control);
        if checked && !manipulated && phase == Phase::Idle {
            Activation::Review
        } else if phase == Phase::AwaitingReview || manipulated {
            Activation::Commit
        } else {
            Activation::Ignored
        }
    }

    pub fn begin_review(&self, control: &str) {
        self.phases.borrow_mut().insert(control.to_owned(), Phase::AwaitingReview);
    }

    /// Drop the in-flight marker for `control`.
    pub fn finish(&self, control: &str) {
        self.phases.borrow_mut().remove(control);
    }

    /// Forget every in-flight review.
    pub fn reset(&self) {
        self.phases.borrow_mut().clear();
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.phases.borrow().len()
    }
}
