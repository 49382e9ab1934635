//! Step controller for one gamemode container.
//!
//! SYSTEM CONTEXT
//! ==============
//! A gamemode container (`.mode`) holds ordered `.step` sections whose DOM id
//! ends in the step's name (`precision-aim` is step `aim`). The backend names
//! the next step through the response `signal`; exactly that step is shown
//! and every other one gets the `deactivated` class.
//!
//! Each step declares up front how its submit controls commit:
//! [`InteractionKind::ReviewedCommit`] goes through the confirm/commit
//! handshake, [`InteractionKind::DirectCommit`] posts straight away.

#[cfg(test)]
#[path = "steps_test.rs"]
mod steps_test;

use serde_json::{Map, Value};

use crate::net::types::ControllerResponse;
use crate::util::form::FormValues;
use crate::util::surface::{SlotOutcome, Surface};

/// Signal that ends a round and resets the container.
pub const FINISHED_SIGNAL: &str = "finished";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionKind {
    /// Checkbox-style submit; coordinates are reviewed before commit.
    ReviewedCommit,
    /// Button-style submit for actions without a physical measurement.
    DirectCommit,
}

impl InteractionKind {
    /// Resolve a step's kind once, when the page is scanned.
    ///
    /// An explicit `data-interaction` declaration (`"reviewed"` or
    /// `"direct"`) wins. Otherwise a checkbox as first submit control means a
    /// reviewed commit and all-button submits mean a direct commit.
    #[must_use]
    pub fn resolve<T: AsRef<str>>(declared: Option<&str>, submit_types: &[T]) -> Self {
        match declared.map(str::trim) {
            Some("reviewed") => return Self::ReviewedCommit,
            Some("direct") => return Self::DirectCommit,
            Some(other) => log::warn!("unknown interaction kind {other:?}, deriving from controls"),
            None => {}
        }
        let all_buttons =
            !submit_types.is_empty() && submit_types.iter().all(|t| matches!(t.as_ref(), "button" | "submit"));
        if all_buttons { Self::DirectCommit } else { Self::ReviewedCommit }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepDef {
    pub dom_id: String,
    /// Names of the inputs that must be filled before submitting.
    pub inputs: Vec<String>,
    /// Ids of the submit controls.
    pub submits: Vec<String>,
    pub kind: InteractionKind,
}

impl StepDef {
    /// Step name: the last `-` separated part of the DOM id.
    #[must_use]
    pub fn name(&self) -> &str {
        self.dom_id.rsplit('-').next().unwrap_or(&self.dom_id)
    }

    /// Steps with required inputs besides their submit control are gated.
    #[must_use]
    pub fn is_gated(&self) -> bool {
        !self.inputs.is_empty()
    }

    #[must_use]
    pub fn is_complete(&self, values: &FormValues) -> bool {
        values.has_all(&self.inputs)
    }
}

/// Result of applying a step response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepResult {
    /// The round continues in the named (or no) step.
    Continued,
    /// The round finished and the container was reset.
    Finished,
}

#[derive(Clone, Debug)]
pub struct StepController {
    container: String,
    steps: Vec<StepDef>,
    active: Option<usize>,
}

impl StepController {
    #[must_use]
    pub fn new(container: &str, steps: Vec<StepDef>) -> Self {
        Self { container: container.to_owned(), steps, active: None }
    }

    #[must_use]
    pub fn container(&self) -> &str {
        &self.container
    }

    #[must_use]
    pub fn steps(&self) -> &[StepDef] {
        &self.steps
    }

    #[must_use]
    pub fn step(&self, dom_id: &str) -> Option<&StepDef> {
        self.steps.iter().find(|step| step.dom_id == dom_id)
    }

    /// The step owning submit control `control`.
    #[must_use]
    pub fn step_for_control(&self, control: &str) -> Option<&StepDef> {
        self.steps.iter().find(|step| step.submits.iter().any(|id| id == control))
    }

    #[must_use]
    pub fn active(&self) -> Option<&StepDef> {
        self.active.and_then(|index| self.steps.get(index))
    }

    /// Show only the step named `signal`. An unknown signal hides every step.
    pub fn activate<S: Surface>(&mut self, signal: &str, surface: &S) -> Option<&StepDef> {
        let index = self.steps.iter().position(|step| step.name() == signal);
        if index.is_none() {
            log::debug!("{}: no step named {signal:?}", self.container);
        }
        self.show_only(index, surface);
        self.active()
    }

    /// Show only the step at `index` (page-load initialisation).
    pub fn activate_index<S: Surface>(&mut self, index: usize, surface: &S) -> Option<&StepDef> {
        let index = (index < self.steps.len()).then_some(index);
        self.show_only(index, surface);
        self.active()
    }

    fn show_only<S: Surface>(&mut self, index: Option<usize>, surface: &S) {
        for (i, step) in self.steps.iter().enumerate() {
            surface.set_deactivated(&format!("#{}", step.dom_id), Some(i) != index);
        }
        self.active = index;
    }

    /// Recompute the submit gate of `dom_id` after an input change.
    ///
    /// Returns the completeness, or `None` for unknown or ungated steps.
    pub fn refresh_gate<S: Surface>(&self, dom_id: &str, values: &FormValues, surface: &S) -> Option<bool> {
        let step = self.step(dom_id).filter(|step| step.is_gated())?;
        let complete = step.is_complete(values);
        for submit in &step.submits {
            surface.set_control_disabled(submit, !complete);
        }
        Some(complete)
    }

    /// Payload for submitting a step: its inputs, the action and the clicked button.
    #[must_use]
    pub fn build_payload(values: &FormValues, clicked_on: Option<&str>) -> Map<String, Value> {
        let mut payload = values.to_json();
        payload.insert("action".to_owned(), Value::String("game".to_owned()));
        if let Some(clicked) = clicked_on {
            payload.insert("clicked_on".to_owned(), Value::String(clicked.to_owned()));
        }
        payload
    }

    /// Apply the backend's answer to a step submitted through `control`.
    ///
    /// `log_to` messages were already written by the transport; otherwise the
    /// message goes to the control's label.
    pub fn apply_response<S: Surface>(&mut self, control: &str, resp: &ControllerResponse, surface: &S) -> StepResult {
        if let Some(signal) = &resp.signal {
            self.activate(signal, surface);
        }
        if resp.has_signal(FINISHED_SIGNAL) {
            surface.reset_fields(&self.container);
            self.close_gates(surface);
            if let Some(index) = resp.was_round {
                let outcome = if resp.is_discarded() { SlotOutcome::Failed } else { SlotOutcome::Finished };
                surface.set_result_slot(&self.container, index, resp.message.as_deref().unwrap_or_default(), outcome);
            }
            return StepResult::Finished;
        }
        if let Some(message) = &resp.message {
            if resp.log_to.is_none() {
                surface.set_label(control, message);
            }
        }
        surface.set_control_disabled(control, false);
        StepResult::Continued
    }

    /// Page-load baseline: first step shown, gated submits disabled.
    ///
    /// Field values are left as rendered; server-prefilled inputs survive.
    pub fn initialise<S: Surface>(&mut self, surface: &S) {
        self.activate_index(0, surface);
        self.close_gates(surface);
    }

    /// Disable the submit controls of every gated step. Used whenever the
    /// inputs are known to be empty.
    fn close_gates<S: Surface>(&self, surface: &S) {
        for step in self.steps.iter().filter(|step| step.is_gated()) {
            for submit in &step.submits {
                surface.set_control_disabled(submit, true);
            }
        }
    }
}
