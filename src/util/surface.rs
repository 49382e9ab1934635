//! The page as seen by the state machines.
//!
//! SYSTEM CONTEXT
//! ==============
//! Markup is rendered by the server. Everything the client changes on it goes
//! through [`Surface`], addressed by element id (controls, markers) or CSS
//! selector (directives). `util::dom::DomSurface` is the browser
//! implementation; tests record calls instead.

use serde_json::Value;

use crate::state::coords::{Point, RenderedSize};

/// Class toggled by enable/disable directives and step activation.
pub const DEACTIVATED_CLASS: &str = "deactivated";

/// How a finished round is tagged in its result slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotOutcome {
    Finished,
    Failed,
}

impl SlotOutcome {
    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            Self::Finished => "finished-game",
            Self::Failed => "failed-game",
        }
    }
}

pub trait Surface {
    /// Current rendered size of the table image.
    fn rendered_size(&self) -> RenderedSize;

    fn show_marker(&self, id: &str, pixel: Point);
    fn hide_marker(&self, id: &str);
    /// Hide every element with class `ball`.
    fn hide_all_markers(&self);

    /// Mirror the manipulation flag into the `manipulation-flag` checkbox.
    fn set_manipulation_toggle(&self, checked: bool);

    /// Set the text of the label bound to `control`.
    fn set_label(&self, control: &str, text: &str);
    /// Restore the label bound to `control` to its baseline (`data-og`) text.
    fn restore_label(&self, control: &str);
    fn set_control_disabled(&self, control: &str, disabled: bool);
    fn set_control_checked(&self, control: &str, checked: bool);
    /// Set the value attribute of an input (button captions).
    fn set_control_value(&self, control: &str, value: &str);

    /// Transient, non-blocking notification.
    fn notify(&self, message: &str, duration_ms: u32);
    /// Blocking operator alert.
    fn alert(&self, message: &str);

    /// Add or remove [`DEACTIVATED_CLASS`] on every element matching `selector`.
    fn set_deactivated(&self, selector: &str, deactivated: bool);
    /// Dispatch a custom event on the window.
    fn dispatch(&self, event: &str, detail: &Value);
    /// Synthetically click every element matching `selector`.
    fn click(&self, selector: &str);
    /// Write `text` into the first match of `selector` inside `scope`.
    fn write_text(&self, scope: &str, selector: &str, text: &str);

    /// Reset step-scoped fields inside `container`: `data-og` labels of its
    /// steps back to baseline, number inputs cleared, checkboxes unchecked.
    /// Text inputs and radios keep their values.
    fn reset_fields(&self, container: &str);
    /// Write a round result into slot `index` of the container's `.results`.
    fn set_result_slot(&self, container: &str, index: usize, text: &str, outcome: SlotOutcome);
}
