//! Browser implementation of [`Surface`] and page scanning.
//!
//! SYSTEM CONTEXT
//! ==============
//! The control page is server-rendered. This module is the only place that
//! touches `web-sys`: it reads the table image size, moves ball markers,
//! rewrites labels and classes, and scans the gamemode containers into
//! [`StepController`]s at start-up.
//!
//! ERROR HANDLING
//! ==============
//! A missing element is not an error for the operator. Lookups that miss are
//! logged at debug level and the call does nothing; DOM calls that throw are
//! logged as warnings.

use gloo_timers::callback::Timeout;
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, HtmlSelectElement, NodeList};

use crate::config::{CONFIG_ELEMENT_ID, ClientConfig};
use crate::state::coords::{Point, RenderedSize};
use crate::state::manipulation::MANIPULATION_TOGGLE_ID;
use crate::state::steps::{InteractionKind, StepController, StepDef};
use crate::util::form::{FieldValue, FormValues};
use crate::util::surface::{DEACTIVATED_CLASS, SlotOutcome, Surface};

/// The live table image; clicks on it place markers.
pub const TABLE_IMAGE_ID: &str = "livestream";
/// Class shared by every ball and marker element.
pub const MARKER_CLASS: &str = "ball";
pub const NOTIFICATION_CLASS: &str = "notification";
/// Marks a step's submit controls.
pub const SUBMIT_CLASS: &str = "submit-step";

const BASELINE_ATTR: &str = "data-og";
const INTERACTION_ATTR: &str = "data-interaction";
const OPEN_SLOT_CLASS: &str = "open-game";

fn warn_js(what: &str, err: &JsValue) {
    log::warn!("{what} failed: {err:?}");
}

/// Every element matching `selector` in the document.
#[must_use]
pub fn select_all(document: &Document, selector: &str) -> Vec<Element> {
    match document.query_selector_all(selector) {
        Ok(list) => elements(&list),
        Err(e) => {
            warn_js(selector, &e);
            Vec::new()
        }
    }
}

/// Every element matching `selector` below `root`.
#[must_use]
pub fn select_within(root: &Element, selector: &str) -> Vec<Element> {
    match root.query_selector_all(selector) {
        Ok(list) => elements(&list),
        Err(e) => {
            warn_js(selector, &e);
            Vec::new()
        }
    }
}

fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length()).filter_map(|i| list.item(i)).filter_map(|node| node.dyn_ref::<Element>().cloned()).collect()
}

fn set_style(el: &HtmlElement, property: &str, value: &str) {
    if let Err(e) = el.style().set_property(property, value) {
        warn_js(property, &e);
    }
}

fn set_text(el: &Element, text: &str) {
    match el.dyn_ref::<HtmlElement>() {
        Some(html) => html.set_inner_text(text),
        None => el.set_text_content(Some(text)),
    }
}

fn set_class(el: &Element, class: &str, on: bool) {
    let list = el.class_list();
    let result = if on { list.add_1(class) } else { list.remove_1(class) };
    if let Err(e) = result {
        warn_js(class, &e);
    }
}

#[derive(Clone, Debug)]
pub struct DomSurface {
    document: Document,
}

impl DomSurface {
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    fn by_id(&self, id: &str) -> Option<Element> {
        let found = self.document.get_element_by_id(id);
        if found.is_none() {
            log::debug!("no element #{id}");
        }
        found
    }

    fn html(&self, id: &str) -> Option<HtmlElement> {
        self.by_id(id).and_then(|el| el.dyn_ref::<HtmlElement>().cloned())
    }

    fn input(&self, id: &str) -> Option<HtmlInputElement> {
        self.by_id(id).and_then(|el| el.dyn_ref::<HtmlInputElement>().cloned())
    }

    fn label_for(&self, control: &str) -> Option<Element> {
        match self.document.query_selector(&format!("label[for=\"{control}\"]")) {
            Ok(label) => label,
            Err(e) => {
                warn_js(control, &e);
                None
            }
        }
    }
}

impl Surface for DomSurface {
    fn rendered_size(&self) -> RenderedSize {
        match self.by_id(TABLE_IMAGE_ID) {
            Some(image) => {
                let rect = image.get_bounding_client_rect();
                RenderedSize::new(rect.width(), rect.height())
            }
            None => RenderedSize::new(0.0, 0.0),
        }
    }

    fn show_marker(&self, id: &str, pixel: Point) {
        if let Some(marker) = self.html(id) {
            set_style(&marker, "display", "inline");
            set_style(&marker, "left", &format!("{}px", pixel.x));
            set_style(&marker, "top", &format!("{}px", pixel.y));
        }
    }

    fn hide_marker(&self, id: &str) {
        if let Some(marker) = self.html(id) {
            set_style(&marker, "display", "none");
        }
    }

    fn hide_all_markers(&self) {
        for marker in select_all(&self.document, &format!(".{MARKER_CLASS}")) {
            if let Some(marker) = marker.dyn_ref::<HtmlElement>() {
                set_style(marker, "display", "none");
            }
        }
    }

    fn set_manipulation_toggle(&self, checked: bool) {
        if let Some(toggle) = self.input(MANIPULATION_TOGGLE_ID) {
            toggle.set_checked(checked);
        }
    }

    fn set_label(&self, control: &str, text: &str) {
        if let Some(label) = self.label_for(control) {
            set_text(&label, text);
        }
    }

    fn restore_label(&self, control: &str) {
        if let Some(label) = self.label_for(control) {
            if let Some(baseline) = label.get_attribute(BASELINE_ATTR) {
                set_text(&label, &baseline);
            }
        }
    }

    fn set_control_disabled(&self, control: &str, disabled: bool) {
        if let Some(input) = self.input(control) {
            input.set_disabled(disabled);
        }
    }

    fn set_control_checked(&self, control: &str, checked: bool) {
        if let Some(input) = self.input(control) {
            input.set_checked(checked);
        }
    }

    fn set_control_value(&self, control: &str, value: &str) {
        if let Some(input) = self.input(control) {
            input.set_value(value);
        }
    }

    fn notify(&self, message: &str, duration_ms: u32) {
        let Some(body) = self.document.body() else {
            return;
        };
        let note = match self.document.create_element("div") {
            Ok(note) => note,
            Err(e) => {
                warn_js("create notification", &e);
                return;
            }
        };
        note.set_class_name(NOTIFICATION_CLASS);
        note.set_text_content(Some(message));
        if let Err(e) = body.append_child(&note) {
            warn_js("show notification", &e);
            return;
        }
        Timeout::new(duration_ms, move || note.remove()).forget();
    }

    fn alert(&self, message: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Err(e) = window.alert_with_message(message) {
            warn_js("alert", &e);
        }
    }

    fn set_deactivated(&self, selector: &str, deactivated: bool) {
        for el in select_all(&self.document, selector) {
            set_class(&el, DEACTIVATED_CLASS, deactivated);
        }
    }

    fn dispatch(&self, event: &str, detail: &Value) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let detail = match js_sys::JSON::parse(&detail.to_string()) {
            Ok(detail) => detail,
            Err(e) => {
                warn_js(event, &e);
                JsValue::NULL
            }
        };
        let init = web_sys::CustomEventInit::new();
        init.set_detail(&detail);
        match web_sys::CustomEvent::new_with_event_init_dict(event, &init) {
            Ok(custom) => {
                if let Err(e) = window.dispatch_event(&custom) {
                    warn_js(event, &e);
                }
            }
            Err(e) => warn_js(event, &e),
        }
    }

    fn click(&self, selector: &str) {
        for el in select_all(&self.document, selector) {
            if let Some(el) = el.dyn_ref::<HtmlElement>() {
                el.click();
            }
        }
    }

    fn write_text(&self, scope: &str, selector: &str, text: &str) {
        match self.document.query_selector(&format!("{scope} {selector}")) {
            Ok(Some(target)) => set_text(&target, text),
            Ok(None) => log::debug!("nothing matches {scope} {selector}"),
            Err(e) => warn_js(selector, &e),
        }
    }

    fn reset_fields(&self, container: &str) {
        let scope = format!("#{container}");
        let steps = format!("{scope} .step");
        let labels = if select_all(&self.document, &steps).is_empty() { scope.clone() } else { steps };
        for el in select_all(&self.document, &format!("{labels} [{BASELINE_ATTR}]")) {
            if let Some(baseline) = el.get_attribute(BASELINE_ATTR) {
                set_text(&el, &baseline);
            }
        }
        for el in select_all(&self.document, &format!("{scope} input")) {
            if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
                match input.type_().as_str() {
                    "checkbox" => input.set_checked(false),
                    "number" => input.set_value(""),
                    _ => {}
                }
            }
        }
    }

    fn set_result_slot(&self, container: &str, index: usize, text: &str, outcome: SlotOutcome) {
        let slots = select_all(&self.document, &format!("#{container} .results div"));
        let Some(slot) = slots.get(index) else {
            log::debug!("{container} has no result slot {index}");
            return;
        };
        set_text(slot, text);
        set_class(slot, outcome.class(), true);
        set_class(slot, OPEN_SLOT_CLASS, false);
    }
}

/// Named inputs and selects below `root`, submit controls excluded.
#[must_use]
pub fn read_form(root: &Element) -> FormValues {
    let mut values = FormValues::new();
    for el in select_within(root, "input[name], select[name], textarea[name]") {
        if el.class_list().contains(SUBMIT_CLASS) {
            continue;
        }
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            match input.type_().as_str() {
                "checkbox" => values.insert(&input.name(), FieldValue::Checked(input.checked())),
                "radio" => {
                    if input.checked() {
                        values.insert(&input.name(), FieldValue::Text(input.value()));
                    }
                }
                _ => values.insert(&input.name(), FieldValue::Text(input.value())),
            }
        } else if let Some(select) = el.dyn_ref::<HtmlSelectElement>() {
            values.insert(&select.name(), FieldValue::Text(select.value()));
        } else if let Some(name) = el.get_attribute("name") {
            values.insert(&name, FieldValue::Text(el.text_content().unwrap_or_default()));
        }
    }
    values
}

/// Values of the form with id `id`, empty when it is missing.
#[must_use]
pub fn read_form_by_id(document: &Document, id: &str) -> FormValues {
    document.get_element_by_id(id).map(|root| read_form(&root)).unwrap_or_default()
}

fn control_type(el: &Element) -> String {
    if let Some(kind) = el.get_attribute("type") {
        return kind;
    }
    let implied = if el.tag_name().eq_ignore_ascii_case("button") { "submit" } else { "text" };
    implied.to_owned()
}

fn scan_step(step: &Element) -> StepDef {
    let mut inputs: Vec<String> = Vec::new();
    for el in select_within(step, "input[name], select[name], textarea[name]") {
        if el.class_list().contains(SUBMIT_CLASS) {
            continue;
        }
        if let Some(name) = el.get_attribute("name") {
            if !inputs.contains(&name) {
                inputs.push(name);
            }
        }
    }
    let submit_controls = select_within(step, &format!(".{SUBMIT_CLASS}"));
    let types: Vec<String> = submit_controls.iter().map(control_type).collect();
    let kind = InteractionKind::resolve(step.get_attribute(INTERACTION_ATTR).as_deref(), &types);
    StepDef { dom_id: step.id(), inputs, submits: submit_controls.iter().map(Element::id).collect(), kind }
}

/// One controller per `.mode` container, with its `.step` sections in page order.
#[must_use]
pub fn scan_steps(document: &Document) -> Vec<StepController> {
    select_all(document, ".mode")
        .iter()
        .map(|mode| {
            let steps: Vec<StepDef> = select_within(mode, ".step").iter().map(scan_step).collect();
            log::debug!("{}: {} steps", mode.id(), steps.len());
            StepController::new(&mode.id(), steps)
        })
        .collect()
}

/// Page-embedded client config, or the defaults when absent or invalid.
#[must_use]
pub fn read_config(document: &Document) -> ClientConfig {
    let Some(raw) = document.get_element_by_id(CONFIG_ELEMENT_ID).and_then(|el| el.text_content()) else {
        return ClientConfig::default();
    };
    match ClientConfig::from_json(&raw) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{e}; using defaults");
            ClientConfig::default()
        }
    }
}
