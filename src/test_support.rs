//! In-memory backend and surface for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

use serde_json::{Value, json};

use crate::config::ClientConfig;
use crate::net::api::{ApiError, Backend};
use crate::net::polling::Ticker;
use crate::session::Session;
use crate::state::coords::{Point, RenderedSize};
use crate::util::surface::{SlotOutcome, Surface};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Get(String),
    Post(String, Value),
    Detached(String, Value),
    Ping(String),
}

/// Backend answering from per-path queues; unqueued requests get `{}`.
#[derive(Default)]
pub struct FakeBackend {
    pub calls: RefCell<Vec<Call>>,
    replies: RefCell<HashMap<String, VecDeque<Result<Value, ApiError>>>>,
}

impl FakeBackend {
    pub fn reply(&self, path: &str, reply: Result<Value, ApiError>) {
        self.replies.borrow_mut().entry(path.to_owned()).or_default().push_back(reply);
    }

    pub fn reply_ok(&self, path: &str, body: Value) {
        self.reply(path, Ok(body));
    }

    fn next(&self, path: &str) -> Result<Value, ApiError> {
        self.replies
            .borrow_mut()
            .get_mut(path)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(json!({})))
    }

    /// Number of request/response calls (GET or POST) made to `path`.
    pub fn count(&self, path: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| match call {
                Call::Get(p) | Call::Post(p, _) => p == path,
                _ => false,
            })
            .count()
    }

    pub fn posts_to(&self, path: &str) -> Vec<Value> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Post(p, body) | Call::Detached(p, body) if p == path => Some(body.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Backend for FakeBackend {
    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        self.calls.borrow_mut().push(Call::Get(path.to_owned()));
        self.next(path)
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.calls.borrow_mut().push(Call::Post(path.to_owned(), body.clone()));
        self.next(path)
    }

    fn post_detached(&self, path: &str, body: Value) {
        self.calls.borrow_mut().push(Call::Detached(path.to_owned(), body));
    }

    fn ping(&self, url: &str) {
        self.calls.borrow_mut().push(Call::Ping(url.to_owned()));
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    ShowMarker(String, Point),
    HideMarker(String),
    HideAllMarkers,
    Toggle(bool),
    Label(String, String),
    RestoreLabel(String),
    Disabled(String, bool),
    Checked(String, bool),
    Value(String, String),
    Notify(String),
    Alert(String),
    Deactivated(String, bool),
    Dispatch(String, Value),
    Click(String),
    WriteText(String, String, String),
    ResetFields(String),
    ResultSlot(String, usize, String, SlotOutcome),
}

/// Surface that records every call.
pub struct RecordingSurface {
    pub ops: RefCell<Vec<Op>>,
    pub size: Cell<RenderedSize>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self { ops: RefCell::new(Vec::new()), size: Cell::new(RenderedSize::new(width, height)) }
    }

    pub fn ops(&self) -> Vec<Op> {
        self.ops.borrow().clone()
    }

    pub fn has(&self, op: &Op) -> bool {
        self.ops.borrow().contains(op)
    }

    /// Last label text written to `control`.
    pub fn label(&self, control: &str) -> Option<String> {
        self.ops.borrow().iter().rev().find_map(|op| match op {
            Op::Label(c, text) if c == control => Some(text.clone()),
            _ => None,
        })
    }

    /// Last disabled state written to `control`.
    pub fn disabled(&self, control: &str) -> Option<bool> {
        self.ops.borrow().iter().rev().find_map(|op| match op {
            Op::Disabled(c, disabled) if c == control => Some(*disabled),
            _ => None,
        })
    }

    /// Last checked state written to `control`.
    pub fn checked(&self, control: &str) -> Option<bool> {
        self.ops.borrow().iter().rev().find_map(|op| match op {
            Op::Checked(c, checked) if c == control => Some(*checked),
            _ => None,
        })
    }

    fn push(&self, op: Op) {
        self.ops.borrow_mut().push(op);
    }
}

impl Surface for RecordingSurface {
    fn rendered_size(&self) -> RenderedSize {
        self.size.get()
    }

    fn show_marker(&self, id: &str, pixel: Point) {
        self.push(Op::ShowMarker(id.to_owned(), pixel));
    }

    fn hide_marker(&self, id: &str) {
        self.push(Op::HideMarker(id.to_owned()));
    }

    fn hide_all_markers(&self) {
        self.push(Op::HideAllMarkers);
    }

    fn set_manipulation_toggle(&self, checked: bool) {
        self.push(Op::Toggle(checked));
    }

    fn set_label(&self, control: &str, text: &str) {
        self.push(Op::Label(control.to_owned(), text.to_owned()));
    }

    fn restore_label(&self, control: &str) {
        self.push(Op::RestoreLabel(control.to_owned()));
    }

    fn set_control_disabled(&self, control: &str, disabled: bool) {
        self.push(Op::Disabled(control.to_owned(), disabled));
    }

    fn set_control_checked(&self, control: &str, checked: bool) {
        self.push(Op::Checked(control.to_owned(), checked));
    }

    fn set_control_value(&self, control: &str, value: &str) {
        self.push(Op::Value(control.to_owned(), value.to_owned()));
    }

    fn notify(&self, message: &str, _duration_ms: u32) {
        self.push(Op::Notify(message.to_owned()));
    }

    fn alert(&self, message: &str) {
        self.push(Op::Alert(message.to_owned()));
    }

    fn set_deactivated(&self, selector: &str, deactivated: bool) {
        self.push(Op::Deactivated(selector.to_owned(), deactivated));
    }

    fn dispatch(&self, event: &str, detail: &Value) {
        self.push(Op::Dispatch(event.to_owned(), detail.clone()));
    }

    fn click(&self, selector: &str) {
        self.push(Op::Click(selector.to_owned()));
    }

    fn write_text(&self, scope: &str, selector: &str, text: &str) {
        self.push(Op::WriteText(scope.to_owned(), selector.to_owned(), text.to_owned()));
    }

    fn reset_fields(&self, container: &str) {
        self.push(Op::ResetFields(container.to_owned()));
    }

    fn set_result_slot(&self, container: &str, index: usize, text: &str, outcome: SlotOutcome) {
        self.push(Op::ResultSlot(container.to_owned(), index, text.to_owned(), outcome));
    }
}

/// Ticker that never waits and counts its ticks.
#[derive(Default)]
pub struct ImmediateTicker {
    pub ticks: Cell<usize>,
}

impl Ticker for ImmediateTicker {
    async fn tick(&self, _interval_ms: u32) {
        self.ticks.set(self.ticks.get() + 1);
    }
}

pub type TestSession = Session<FakeBackend, RecordingSurface>;

/// Session over a 1000x500 px image of the default 2230x1115 mm table.
pub fn session() -> TestSession {
    session_with(ClientConfig::default())
}

pub fn session_with(config: ClientConfig) -> TestSession {
    Session::new(config, FakeBackend::default(), RecordingSurface::new(1000.0, 500.0))
}

/// Session whose table image has not been laid out yet.
pub fn unmeasured_session() -> TestSession {
    Session::new(ClientConfig::default(), FakeBackend::default(), RecordingSurface::new(0.0, 0.0))
}

pub fn block_on<F: std::future::Future>(future: F) -> F::Output {
    futures::executor::block_on(future)
}
