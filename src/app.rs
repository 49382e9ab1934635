//! Browser entry point.
//!
//! SYSTEM CONTEXT
//! ==============
//! The server renders one of several control pages (gamemode controller,
//! standalone measurement board, local game, trickshots). [`start`] runs once
//! per page load: it builds the [`Session`], scans the gamemode containers
//! and binds listeners for whatever elements the page actually has.
//!
//! DESIGN
//! ======
//! Every listener holds an `Rc` of the session. Synchronous work runs inline;
//! anything that talks to the backend is spawned with `spawn_local` and logs
//! its error when the flow returns one (the flow has already told the
//! operator). Closures live for the life of the page and are leaked with
//! `forget`.

use std::cell::Cell;
use std::rc::Rc;

use gloo_timers::callback::Interval;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, EventTarget, HtmlInputElement, MouseEvent};

use crate::flows::board::{self, SESSION_INFO_ID, SUBMIT_BUTTON_ID, SunkKind, USER_INFO_ID};
use crate::flows::gamemode::select_gamemode;
use crate::flows::local_game::{self, START_BUTTON_ID};
use crate::flows::settings::{send_global_config, send_setting};
use crate::flows::steps::{clicked_value, refresh_gate, submit_step};
use crate::flows::tools::{TRAINING_BUTTON_ID, take_training_image};
use crate::flows::trickshots::{difficulty_label, list_trickshots, load_trickshot};
use crate::net::api::{Backend, HttpBackend};
use crate::net::camera::fetch_coordinates;
use crate::net::polling::{START_LONG_POLL_EVENT, STOP_LONG_POLL_EVENT, TimerTicker, run_long_poll};
use crate::net::types::Trickshot;
use crate::session::Session;
use crate::state::coords::Point;
use crate::state::gamemode::Route;
use crate::state::manipulation::MANIPULATION_TOGGLE_ID;
use crate::state::round::{PERSON_KEY, TEAM_KEY};
use crate::util::dom::{
    DomSurface, MARKER_CLASS, SUBMIT_CLASS, TABLE_IMAGE_ID, read_config, read_form, read_form_by_id, scan_steps,
    select_all, select_within,
};
use crate::util::form::FormValues;

type PageSession = Session<HttpBackend, DomSurface>;

const BREAK_BUTTON_ID: &str = "break-button";
const TRICKSHOT_BUTTON_ID: &str = "trickshot-button";
const INSPECT_BUTTON_ID: &str = "inspect-button";
const DETERMINE_START_BUTTON_ID: &str = "determine-start-button";
const TRICKSHOT_LIST_ID: &str = "trickshot-list";
const ACTIVE_CLASS: &str = "active";
const OPEN_CLASS: &str = "open";

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        log::warn!("logger not installed: {e}");
    }

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let config = read_config(&document);
    let backend = HttpBackend::new(config.request_timeout_ms);
    let session = Rc::new(Session::new(config, backend, DomSurface::new(document.clone())));

    session.register_steps(scan_steps(&document));
    session.initialise_steps();
    for el in select_all(&document, "input[type=\"checkbox\"]") {
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            input.set_checked(false);
        }
    }
    declare_board_round(&session, &document);

    bind_table(&session, &document);
    bind_radios(&session, &document);
    bind_gamemodes(&session, &document);
    bind_steps(&session, &document);
    bind_settings(&session, &document);
    bind_board(&session, &document);
    bind_submit(&session, &document);
    bind_local_game(&session, &document);
    bind_tools(&session, &document);
    bind_long_poll(&session);
    start_keepalive(&session);
    show_trickshots(&session, &document);
    log::info!("control surface ready ({:?})", session.route());
}

fn listen(target: &EventTarget, event: &str, handler: impl FnMut(Event) + 'static) {
    let cb = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    if let Err(e) = target.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref()) {
        log::warn!("cannot listen for {event}: {e:?}");
    }
    cb.forget();
}

fn listen_id(document: &Document, id: &str, event: &str, handler: impl FnMut(Event) + 'static) {
    if let Some(el) = document.get_element_by_id(id) {
        listen(&el, event, handler);
    }
}

fn as_input(el: &Element) -> Option<HtmlInputElement> {
    el.dyn_ref::<HtmlInputElement>().cloned()
}

fn input_value(document: &Document, id: &str) -> String {
    document.get_element_by_id(id).and_then(|el| as_input(&el)).map(|input| input.value()).unwrap_or_default()
}

// =============================================================================
// TABLE IMAGE
// =============================================================================

fn bind_table(session: &Rc<PageSession>, document: &Document) {
    if let Some(image) = document.get_element_by_id(TABLE_IMAGE_ID) {
        let s = Rc::clone(session);
        let image_for_cb = image.clone();
        listen(&image, "click", move |event| {
            let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let rect = image_for_cb.get_bounding_client_rect();
            let pixel = Point::new(f64::from(mouse.client_x()) - rect.left(), f64::from(mouse.client_y()) - rect.top());
            s.place_manual(pixel);
        });
    }

    for marker in select_all(document, &format!(".{MARKER_CLASS}")) {
        let s = Rc::clone(session);
        let id = marker.id();
        listen(&marker, "click", move |_| s.remove_manual(&id));
    }

    if let Some(toggle) = document.get_element_by_id(MANIPULATION_TOGGLE_ID).and_then(|el| as_input(&el)) {
        let s = Rc::clone(session);
        let toggle_for_cb = toggle.clone();
        listen(&toggle, "change", move |_| s.manipulation().sync_from_toggle(toggle_for_cb.checked()));
    }
}

// =============================================================================
// RADIOS (ball selection, board mode)
// =============================================================================

fn mark_active(document: &Document, radio: &HtmlInputElement) {
    for el in select_all(document, &format!("input[type=\"radio\"][name=\"{}\"]", radio.name())) {
        if let Some(label) = el.parent_element() {
            if let Err(e) = label.class_list().remove_1(ACTIVE_CLASS) {
                log::warn!("{e:?}");
            }
        }
    }
    if let Some(label) = radio.parent_element() {
        if let Err(e) = label.class_list().add_1(ACTIVE_CLASS) {
            log::warn!("{e:?}");
        }
    }
}

fn bind_radios(session: &Rc<PageSession>, document: &Document) {
    for el in select_all(document, "input[type=\"radio\"]") {
        let Some(radio) = as_input(&el) else {
            continue;
        };
        let s = Rc::clone(session);
        let doc = document.clone();
        let radio_for_cb = radio.clone();
        listen(&radio, "click", move |_| {
            if !radio_for_cb.checked() {
                return;
            }
            mark_active(&doc, &radio_for_cb);
            match radio_for_cb.name().as_str() {
                "current_ball" => s.select_ball(&radio_for_cb.value()),
                "mode" => board::select_mode(&s, &radio_for_cb.value()),
                _ => {}
            }
        });
    }
}

// =============================================================================
// GAMEMODE SECTIONS AND STEPS
// =============================================================================

fn open_sections(document: &Document, current: &str) {
    for header in select_all(document, ".collapsible") {
        if let Some(section) = header.parent_element() {
            let open = section.id() == current;
            if let Err(e) = section.class_list().toggle_with_force(OPEN_CLASS, open) {
                log::warn!("{e:?}");
            }
        }
    }
}

fn bind_gamemodes(session: &Rc<PageSession>, document: &Document) {
    for header in select_all(document, ".collapsible") {
        let Some(gamemode) = header.parent_element().map(|section| section.id()) else {
            continue;
        };
        let s = Rc::clone(session);
        let doc = document.clone();
        listen(&header, "click", move |_| {
            let s = Rc::clone(&s);
            let doc = doc.clone();
            let gamemode = gamemode.clone();
            spawn_local(async move {
                if let Err(e) = select_gamemode(&s, &gamemode).await {
                    log::warn!("opening {gamemode}: {e}");
                }
                open_sections(&doc, &s.gamemode());
            });
        });
    }
}

fn bind_steps(session: &Rc<PageSession>, document: &Document) {
    for mode in select_all(document, ".mode") {
        let container = mode.id();
        for step in select_within(&mode, ".step") {
            let s = Rc::clone(session);
            let step_for_cb = step.clone();
            let container_for_cb = container.clone();
            listen(&step, "change", move |_| {
                refresh_gate(&s, &container_for_cb, &step_for_cb.id(), &read_form(&step_for_cb));
            });

            for control in select_within(&step, &format!(".{SUBMIT_CLASS}")) {
                bind_submit_control(session, &step, &control);
            }
        }
    }
}

fn bind_submit_control(session: &Rc<PageSession>, step: &Element, control: &Element) {
    let is_checkbox = as_input(control).is_some_and(|input| input.type_() == "checkbox");
    let event = if is_checkbox { "change" } else { "click" };
    let s = Rc::clone(session);
    let step = step.clone();
    let control_for_cb = control.clone();
    listen(control, event, move |_| {
        let (checked, name, value) = match as_input(&control_for_cb) {
            Some(input) if is_checkbox => (input.checked(), input.name(), input.value()),
            Some(input) => (true, input.name(), input.value()),
            None => (
                true,
                control_for_cb.get_attribute("name").unwrap_or_default(),
                control_for_cb.get_attribute("value").unwrap_or_default(),
            ),
        };
        let clicked = clicked_value(&name, &value).map(str::to_owned);
        let values = read_form(&step);
        let id = control_for_cb.id();
        let s = Rc::clone(&s);
        spawn_local(async move {
            if let Err(e) = submit_step(&s, &id, checked, &values, clicked.as_deref()).await {
                log::warn!("{id}: {e}");
            }
        });
    });
}

fn bind_settings(session: &Rc<PageSession>, document: &Document) {
    for setting in select_all(document, ".setting") {
        let s = Rc::clone(session);
        let setting_for_cb = setting.clone();
        listen(&setting, "change", move |_| {
            let s = Rc::clone(&s);
            let container = setting_for_cb.id();
            let values = read_form(&setting_for_cb);
            spawn_local(async move {
                if let Err(e) = send_setting(&s, &container, &values, true, false).await {
                    log::warn!("{container}: {e}");
                }
            });
        });
    }

    for config in select_all(document, ".global-config") {
        let s = Rc::clone(session);
        let config_for_cb = config.clone();
        listen(&config, "focusout", move |_| {
            let s = Rc::clone(&s);
            let container = config_for_cb.id();
            let values = read_form(&config_for_cb);
            spawn_local(async move {
                if let Err(e) = send_global_config(&s, &container, &values).await {
                    log::warn!("{container}: {e}");
                }
            });
        });
    }
}

// =============================================================================
// MEASUREMENT BOARD
// =============================================================================

fn declare_board_round(session: &PageSession, document: &Document) {
    let mut keys: Vec<String> =
        select_all(document, ".prec-checkbox, .dist-checkbox").iter().map(Element::id).collect();
    if document.get_element_by_id(BREAK_BUTTON_ID).is_some() {
        keys.push(SunkKind::Break.key().to_owned());
    }
    if document.get_element_by_id(TRICKSHOT_BUTTON_ID).is_some() {
        keys.push(SunkKind::Trickshot.key().to_owned());
    }
    log::debug!("round measurements: {keys:?}");
    session.declare_round(keys);
}

fn bind_board(session: &Rc<PageSession>, document: &Document) {
    for el in select_all(document, ".prec-checkbox") {
        let Some(checkbox) = as_input(&el) else {
            continue;
        };
        let s = Rc::clone(session);
        let checkbox_for_cb = checkbox.clone();
        listen(&checkbox, "change", move |_| {
            let s = Rc::clone(&s);
            let id = checkbox_for_cb.id();
            let checked = checkbox_for_cb.checked();
            spawn_local(async move {
                if let Err(e) = board::measure_precision(&s, &id, checked).await {
                    log::warn!("{id}: {e}");
                }
            });
        });
    }

    for el in select_all(document, ".dist-checkbox") {
        let Some(checkbox) = as_input(&el) else {
            continue;
        };
        let s = Rc::clone(session);
        let doc = document.clone();
        let checkbox_for_cb = checkbox.clone();
        listen(&checkbox, "change", move |_| {
            let s = Rc::clone(&s);
            let id = checkbox_for_cb.id();
            let checked = checkbox_for_cb.checked();
            let raw = input_value(&doc, &format!("{id}c"));
            let collisions = match raw.trim().parse::<u32>() {
                Ok(n) => n,
                Err(e) => {
                    log::warn!("{id}: collision count {raw:?}: {e}");
                    0
                }
            };
            spawn_local(async move {
                if let Err(e) = board::measure_distance(&s, &id, checked, collisions).await {
                    log::warn!("{id}: {e}");
                }
            });
        });
    }

    for el in select_all(document, ".collision-counter") {
        let Some(counter) = as_input(&el) else {
            continue;
        };
        let s = Rc::clone(session);
        let counter_for_cb = counter.clone();
        listen(&counter, "input", move |_| {
            let id = counter_for_cb.id();
            let checkbox = id.strip_suffix('c').unwrap_or(&id);
            board::collision_gate(s.surface(), checkbox, &counter_for_cb.value());
        });
    }

    for (id, kind) in [(BREAK_BUTTON_ID, SunkKind::Break), (TRICKSHOT_BUTTON_ID, SunkKind::Trickshot)] {
        let Some(checkbox) = document.get_element_by_id(id).and_then(|el| as_input(&el)) else {
            continue;
        };
        let s = Rc::clone(session);
        let checkbox_for_cb = checkbox.clone();
        listen(&checkbox, "change", move |_| {
            let s = Rc::clone(&s);
            let checked = checkbox_for_cb.checked();
            spawn_local(async move {
                if let Err(e) = board::count_sunk(&s, id, checked, kind).await {
                    log::warn!("{id}: {e}");
                }
            });
        });
    }
}

/// `#submit-button` means a different thing per page: the local game's turn
/// report, the umbrella hand-in, or the board's round submission.
fn bind_submit(session: &Rc<PageSession>, document: &Document) {
    if document.get_element_by_id(SUBMIT_BUTTON_ID).is_none() {
        return;
    }
    let local_game = document.get_element_by_id(START_BUTTON_ID).is_some();
    let hand_in = matches!(session.route(), Route::Nested { .. }) && document.get_element_by_id(USER_INFO_ID).is_some();

    let s = Rc::clone(session);
    let doc = document.clone();
    listen_id(document, SUBMIT_BUTTON_ID, "click", move |_| {
        let s = Rc::clone(&s);
        if local_game {
            spawn_local(async move {
                if let Err(e) = local_game::enter_round(&s).await {
                    log::warn!("enter round: {e}");
                }
            });
        } else if hand_in {
            let user_info = read_form_by_id(&doc, USER_INFO_ID);
            let session_info = read_form_by_id(&doc, SESSION_INFO_ID);
            spawn_local(async move {
                if let Err(e) = board::hand_in(&s, &user_info, &session_info).await {
                    log::warn!("hand in: {e}");
                }
            });
        } else {
            let person = input_value(&doc, PERSON_KEY);
            let team = input_value(&doc, TEAM_KEY);
            spawn_local(async move {
                if let Err(e) = board::submit_round(&s, &person, &team).await {
                    log::warn!("submit round: {e}");
                }
            });
        }
    });

    if !local_game && !hand_in {
        let s = Rc::clone(session);
        spawn_local(async move {
            if let Err(e) = board::load_scores(&s).await {
                log::warn!("loading scores: {e}");
            }
        });
    }
}

// =============================================================================
// LOCAL GAME, TOOLS, TRICKSHOTS
// =============================================================================

fn bind_local_game(session: &Rc<PageSession>, document: &Document) {
    let s = Rc::clone(session);
    let doc = document.clone();
    listen_id(document, START_BUTTON_ID, "click", move |_| {
        let mut players = FormValues::new();
        for id in ["person-name-1", "team-name-1", "person-name-2", "team-name-2"] {
            players = players.with_text(id, &input_value(&doc, id));
        }
        local_game::start_game(&s, &players);
    });

    let s = Rc::clone(session);
    listen_id(document, DETERMINE_START_BUTTON_ID, "click", move |_| {
        let s = Rc::clone(&s);
        spawn_local(async move {
            if let Err(e) = local_game::determine_start(&s).await {
                log::warn!("determine start: {e}");
            }
        });
    });
}

fn bind_tools(session: &Rc<PageSession>, document: &Document) {
    let s = Rc::clone(session);
    listen_id(document, TRAINING_BUTTON_ID, "click", move |_| {
        let s = Rc::clone(&s);
        spawn_local(async move {
            if let Err(e) = take_training_image(&s, TRAINING_BUTTON_ID).await {
                log::warn!("training image: {e}");
            }
        });
    });

    let s = Rc::clone(session);
    listen_id(document, INSPECT_BUTTON_ID, "click", move |_| {
        let s = Rc::clone(&s);
        spawn_local(async move {
            match fetch_coordinates(&s).await {
                Ok(outcome) => log::debug!("inspect: {outcome:?}"),
                Err(e) => log::warn!("inspect: {e}"),
            }
        });
    });
}

fn trickshot_table(session: &Rc<PageSession>, document: &Document, tricks: &[Trickshot]) -> Result<Element, JsValue> {
    let table = document.create_element("table")?;
    table.set_inner_html("<tr><th>Name</th><th>Difficulty</th></tr>");
    for trick in tricks {
        let row = document.create_element("tr")?;
        row.set_class_name("trickshot-table-row");
        for text in [trick.name.clone(), difficulty_label(trick)] {
            let cell = document.create_element("td")?;
            cell.set_text_content(Some(&text));
            row.append_child(&cell)?;
        }
        let s = Rc::clone(session);
        let id = trick.id.clone();
        listen(&row, "click", move |_| load_trickshot(&s, &id));
        table.append_child(&row)?;
    }
    Ok(table)
}

fn show_trickshots(session: &Rc<PageSession>, document: &Document) {
    let Some(list) = document.get_element_by_id(TRICKSHOT_LIST_ID) else {
        return;
    };
    let s = Rc::clone(session);
    let doc = document.clone();
    spawn_local(async move {
        let tricks = match list_trickshots(&s).await {
            Ok(tricks) => tricks,
            Err(e) => {
                log::warn!("listing trickshots: {e}");
                return;
            }
        };
        match trickshot_table(&s, &doc, &tricks) {
            Ok(table) => {
                list.set_inner_html("");
                if let Err(e) = list.append_child(&table) {
                    log::warn!("{e:?}");
                }
            }
            Err(e) => log::warn!("building trickshot table: {e:?}"),
        }
    });
}

// =============================================================================
// LONG POLL AND LIVENESS
// =============================================================================

fn bind_long_poll(session: &Rc<PageSession>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let stop = Rc::new(Cell::new(false));
    let running = Rc::new(Cell::new(false));

    let s = Rc::clone(session);
    let stop_for_start = Rc::clone(&stop);
    listen(&window, START_LONG_POLL_EVENT, move |_| {
        if running.replace(true) {
            log::debug!("long poll already running");
            return;
        }
        stop_for_start.set(false);
        let s = Rc::clone(&s);
        let stop = Rc::clone(&stop_for_start);
        let running = Rc::clone(&running);
        spawn_local(async move {
            let outcome = run_long_poll(&s, &TimerTicker, &stop).await;
            log::info!("long poll ended: {outcome:?}");
            running.set(false);
        });
    });

    listen(&window, STOP_LONG_POLL_EVENT, move |_| stop.set(true));
}

fn start_keepalive(session: &Rc<PageSession>) {
    let Some(url) = session.config().keepalive_url.clone() else {
        return;
    };
    let s = Rc::clone(session);
    Interval::new(session.config().keepalive_interval_ms, move || s.backend().ping(&url)).forget();
}
