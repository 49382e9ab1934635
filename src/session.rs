//! Page-scoped context shared by every handler.
//!
//! SYSTEM CONTEXT
//! ==============
//! One [`Session`] exists per page load, held in an `Rc` by the browser entry
//! point and borrowed by each event handler. It owns the coordinate store, the
//! manipulation flag, the per-control handshake records, the gamemode
//! selection, the ball selection, the round accumulator and the step
//! controllers of every gamemode container.
//!
//! DESIGN
//! ======
//! Handlers run to completion on the single browser thread, so interior
//! mutability is plain `RefCell`/`Cell`. Borrows are scoped to synchronous
//! blocks and never held across an `.await`; every async operation re-reads
//! state after it resumes.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::cell::{Ref, RefCell, RefMut};

use serde_json::{Map, Value};

use crate::config::ClientConfig;
use crate::net::api::{ApiError, Backend, CORRECTED_COORDS};
use crate::net::transport;
use crate::net::types::ControllerResponse;
use crate::state::coords::{CoordinateStore, Layer, Point, marker_id};
use crate::state::gamemode::{GamemodeSelection, Route};
use crate::state::handshake::ConfirmCommit;
use crate::state::manipulation::ManipulationTracker;
use crate::state::round::RoundAccumulator;
use crate::state::steps::{StepController, StepDef};
use crate::util::surface::Surface;

/// Ball selected for manual placement on page load.
pub const DEFAULT_BALL: &str = "1";

pub struct Session<B: Backend, S: Surface> {
    config: ClientConfig,
    backend: B,
    surface: S,
    route: Route,
    store: RefCell<CoordinateStore>,
    manipulation: ManipulationTracker,
    handshake: ConfirmCommit,
    gamemode: RefCell<GamemodeSelection>,
    current_ball: RefCell<String>,
    round: RefCell<RoundAccumulator>,
    steps: RefCell<Vec<StepController>>,
}

impl<B: Backend, S: Surface> Session<B, S> {
    pub fn new(config: ClientConfig, backend: B, surface: S) -> Self {
        let store = CoordinateStore::new(config.table, surface.rendered_size());
        let route = Route::from_umbrella(config.umbrella.as_deref());
        Self {
            config,
            backend,
            surface,
            route,
            store: RefCell::new(store),
            manipulation: ManipulationTracker::default(),
            handshake: ConfirmCommit::default(),
            gamemode: RefCell::new(GamemodeSelection::default()),
            current_ball: RefCell::new(marker_id(DEFAULT_BALL)),
            round: RefCell::new(RoundAccumulator::new(Vec::<String>::new())),
            steps: RefCell::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn store(&self) -> Ref<'_, CoordinateStore> {
        self.store.borrow()
    }

    pub fn store_mut(&self) -> RefMut<'_, CoordinateStore> {
        self.store.borrow_mut()
    }

    pub fn manipulation(&self) -> &ManipulationTracker {
        &self.manipulation
    }

    pub fn handshake(&self) -> &ConfirmCommit {
        &self.handshake
    }

    pub fn round(&self) -> Ref<'_, RoundAccumulator> {
        self.round.borrow()
    }

    pub fn round_mut(&self) -> RefMut<'_, RoundAccumulator> {
        self.round.borrow_mut()
    }

    /// Id of the open gamemode section (owned, so no borrow escapes).
    pub fn gamemode(&self) -> String {
        self.gamemode.borrow().current().to_owned()
    }

    pub fn gamemode_mut(&self) -> RefMut<'_, GamemodeSelection> {
        self.gamemode.borrow_mut()
    }

    pub fn current_ball(&self) -> String {
        self.current_ball.borrow().clone()
    }

    /// Choose the id placed by the next click on the table image.
    pub fn select_ball(&self, id: &str) {
        log::debug!("current ball -> {id}");
        id.clone_into(&mut *self.current_ball.borrow_mut());
    }

    /// Declare the measurement keys a scored round must contain.
    pub fn declare_round<I, K>(&self, measurements: I)
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        *self.round.borrow_mut() = RoundAccumulator::new(measurements);
    }

    /// Pick up the table image's current rendered size.
    pub fn refresh_rendered_size(&self) {
        self.store.borrow_mut().set_rendered_size(self.surface.rendered_size());
    }

    /// Refresh the rendered size and report whether pixels can be converted.
    pub fn measure_table(&self) -> bool {
        self.refresh_rendered_size();
        self.store.borrow().is_measured()
    }

    /// Place the selected ball or marker where the operator clicked.
    ///
    /// Ignored while the table image has no rendered size.
    pub fn place_manual(&self, pixel: Point) {
        let id = self.current_ball();
        if !self.measure_table() {
            log::warn!("table image not laid out; {id} not placed");
            return;
        }
        self.store.borrow_mut().place(&id, pixel, Layer::for_id(&id));
        self.surface.show_marker(&id, pixel);
        self.manipulation.record_manual_edit(&id, &self.surface);
        self.post_corrected_coordinates();
    }

    /// Remove a ball or marker the operator clicked on.
    pub fn remove_manual(&self, id: &str) {
        self.surface.hide_marker(id);
        if self.store.borrow_mut().remove(id).is_none() {
            log::debug!("{id} was not placed");
        }
        self.manipulation.record_manual_edit(id, &self.surface);
        self.post_corrected_coordinates();
    }

    /// Push the operator-corrected store to the backend without waiting.
    pub fn post_corrected_coordinates(&self) {
        let body = self.store.borrow().snapshot();
        self.backend.post_detached(CORRECTED_COORDS, body);
    }

    /// Round trip to the gamemode controller with the current gamemode attached.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails or the body is malformed.
    pub async fn send(&self, payload: Map<String, Value>, set_activity: bool) -> Result<ControllerResponse, ApiError> {
        let scope = transport::scope_selector(&self.gamemode());
        transport::send(self, payload, set_activity, &scope).await
    }

    /// [`Self::send`] on behalf of gamemode container `container`; its
    /// `log_to` output lands inside that container.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails or the body is malformed.
    pub async fn send_for(
        &self,
        container: &str,
        payload: Map<String, Value>,
        set_activity: bool,
    ) -> Result<ControllerResponse, ApiError> {
        transport::send(self, payload, set_activity, &transport::scope_selector(container)).await
    }

    /// Reset between rounds: accumulator, store, markers, flag and handshakes.
    pub fn reset_round(&self) {
        self.round.borrow_mut().clear();
        self.store.borrow_mut().clear();
        self.surface.hide_all_markers();
        self.manipulation.set(false, &self.surface);
        self.handshake.reset();
    }

    /// Install the step controllers scanned from the page.
    pub fn register_steps(&self, controllers: Vec<StepController>) {
        *self.steps.borrow_mut() = controllers;
    }

    /// Page-load baseline for every container: first step shown, fields reset.
    pub fn initialise_steps(&self) {
        for controller in self.steps.borrow_mut().iter_mut() {
            controller.initialise(&self.surface);
        }
    }

    /// Run `f` on the controller of `container`.
    pub fn with_steps<R>(&self, container: &str, f: impl FnOnce(&mut StepController) -> R) -> Option<R> {
        let mut steps = self.steps.borrow_mut();
        steps.iter_mut().find(|c| c.container() == container).map(f)
    }

    /// Container and step definition owning submit control `control`.
    pub fn step_for_control(&self, control: &str) -> Option<(String, StepDef)> {
        self.steps
            .borrow()
            .iter()
            .find_map(|c| c.step_for_control(control).map(|step| (c.container().to_owned(), step.clone())))
    }

    /// Activate `signal` in the open gamemode's container, or the first
    /// container when the open gamemode has none.
    pub fn activate_step(&self, signal: &str) -> Option<String> {
        let gamemode = self.gamemode();
        let mut steps = self.steps.borrow_mut();
        let index = steps.iter().position(|c| c.container() == gamemode).unwrap_or(0);
        let controller = steps.get_mut(index)?;
        controller.activate(signal, &self.surface).map(|step| step.dom_id.clone())
    }
}
