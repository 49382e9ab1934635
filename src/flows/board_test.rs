use super::*;
use crate::config::ClientConfig;
use crate::net::api::{CAMERA_COORDS, GAMEMODE_CONTROLLER};
use crate::net::types::SCOREBOARD_EVENT;
use crate::state::coords::{Layer, Point};
use crate::state::round::RoundError;
use crate::test_support::{Op, TestSession, block_on, session, session_with};

fn one_ball(x: f64, y: f64) -> Value {
    json!({"1": {"name": "1", "x": x, "y": y}})
}

fn balls(n: usize) -> Value {
    let mut map = Map::new();
    for i in 0..n {
        map.insert(i.to_string(), json!({"name": i.to_string(), "x": 100.0, "y": 100.0}));
    }
    Value::Object(map)
}

// =============================================================
// Mode selection
// =============================================================

#[test]
fn select_mode_shows_one_section_and_picks_placement_id() {
    let s = session();
    select_mode(&s, "distance");
    assert_eq!(s.backend().posts_to(KP2_SELECT_MODE), vec![json!({"mode": "distance"})]);
    assert!(s.surface().has(&Op::Deactivated("#distance".to_owned(), false)));
    assert!(s.surface().has(&Op::Deactivated("#precision".to_owned(), true)));
    assert_eq!(s.current_ball(), START_MARKER_ID);

    select_mode(&s, "break");
    assert_eq!(s.current_ball(), "ball-white");
}

#[test]
fn collision_gate_follows_counter() {
    let s = session();
    collision_gate(s.surface(), "dist-1", "");
    assert_eq!(s.surface().disabled("dist-1"), Some(true));
    collision_gate(s.surface(), "dist-1", "2");
    assert_eq!(s.surface().disabled("dist-1"), Some(false));
}

// =============================================================
// Precision
// =============================================================

#[test]
fn precision_records_distance_and_labels_control() {
    let s = session();
    s.backend().reply_ok(CAMERA_COORDS, one_ball(600.0, 600.0));

    let distance = block_on(measure_precision(&s, "prec-1", true)).unwrap().unwrap();

    assert!((distance - 55.44).abs() < 0.01);
    assert_eq!(s.surface().label("prec-1").as_deref(), Some("55 mm"));
    assert!(s.surface().has(&Op::Label("prec-1".to_owned(), FINDING_LABEL.to_owned())));
    assert!(s.round().get("prec-1").is_some());
}

#[test]
fn precision_with_two_balls_alerts_and_reverts_control() {
    let s = session();
    s.backend().reply_ok(CAMERA_COORDS, balls(2));

    let err = block_on(measure_precision(&s, "prec-1", true)).unwrap_err();

    assert_eq!(err, FlowError::Measure(MeasureError::MultipleBalls { count: 2 }));
    assert!(s.surface().ops().iter().any(|op| matches!(op, Op::Alert(_))));
    assert_eq!(s.surface().checked("prec-1"), Some(false));
    assert!(s.surface().has(&Op::RestoreLabel("prec-1".to_owned())));
    assert!(s.round().is_empty());
}

#[test]
fn precision_without_ball_alerts() {
    let s = session();
    let err = block_on(measure_precision(&s, "prec-1", true)).unwrap_err();
    assert_eq!(err, FlowError::Measure(MeasureError::NoBall));
    assert!(s.surface().has(&Op::Alert(MeasureError::NoBall.to_string())));
}

#[test]
fn unchecking_measures_nothing() {
    let s = session();
    assert_eq!(block_on(measure_precision(&s, "prec-1", false)), Ok(None));
    assert!(s.backend().calls.borrow().is_empty());
}

#[test]
fn manipulated_ball_is_measured_without_camera() {
    let s = session();
    s.select_ball("ball-1");
    s.place_manual(Point::new(600.0 / 2.23, 600.0 / 2.23));
    block_on(measure_precision(&s, "prec-2", true)).unwrap();
    assert_eq!(s.backend().count(CAMERA_COORDS), 0);
    assert_eq!(s.surface().label("prec-2").as_deref(), Some("55 mm"));
}

#[test]
fn failed_refresh_resets_control() {
    let s = session();
    s.backend().reply(CAMERA_COORDS, Err(ApiError::Timeout(15_000)));
    let err = block_on(measure_precision(&s, "prec-1", true)).unwrap_err();
    assert_eq!(err, FlowError::Api(ApiError::Timeout(15_000)));
    assert_eq!(s.surface().checked("prec-1"), Some(false));
}

// =============================================================
// Distance and counts
// =============================================================

#[test]
fn distance_uses_start_marker_and_collisions() {
    let s = session();
    s.store_mut().place(START_MARKER_ID, Point::new(100.0, 250.0), Layer::Auxiliary);
    s.backend().reply_ok(CAMERA_COORDS, one_ball(300.0 * 2.23, 50.0));

    let distance = block_on(measure_distance(&s, "dist-1", true, 1)).unwrap().unwrap();

    assert!((distance - 3568.0).abs() < 1e-6);
    assert_eq!(s.surface().label("dist-1").as_deref(), Some("3568 mm"));
}

#[test]
fn distance_without_start_marker_alerts() {
    let s = session();
    s.backend().reply_ok(CAMERA_COORDS, one_ball(300.0, 50.0));
    let err = block_on(measure_distance(&s, "dist-1", true, 0)).unwrap_err();
    assert_eq!(err, FlowError::Measure(MeasureError::MissingStartMarker));
    assert_eq!(s.surface().checked("dist-1"), Some(false));
}

#[test]
fn break_counts_against_rack_size() {
    let s = session();
    s.backend().reply_ok(CAMERA_COORDS, balls(9));
    assert_eq!(block_on(count_sunk(&s, "break-button", true, SunkKind::Break)), Ok(Some(7)));
    assert_eq!(s.surface().label("break-button").as_deref(), Some("7 balls were sunk"));
    assert_eq!(s.round().get(BREAK_KEY), Some(&json!(7)));
    assert!(s.surface().has(&Op::Label("break-button".to_owned(), COUNTING_LABEL.to_owned())));
}

#[test]
fn trickshot_counts_against_configured_balls() {
    let s = session();
    s.backend().reply_ok(CAMERA_COORDS, balls(1));
    assert_eq!(block_on(count_sunk(&s, "trickshot-button", true, SunkKind::Trickshot)), Ok(Some(2)));
    assert_eq!(s.round().get(TRICKSHOT_KEY), Some(&json!(2)));
}

// =============================================================
// Round submission
// =============================================================

fn complete_round(s: &TestSession) {
    s.declare_round(["prec-1", BREAK_KEY]);
    s.round_mut().record("prec-1", json!(55.4));
    s.round_mut().record(BREAK_KEY, json!(7));
}

#[test]
fn missing_identity_blocks_submission() {
    let s = session();
    complete_round(&s);
    let err = block_on(submit_round(&s, "Ada", "")).unwrap_err();
    assert_eq!(err, FlowError::Round(RoundError::MissingIdentity { field: TEAM_KEY }));
    assert!(s.surface().has(&Op::Alert("No name/team has been entered!".to_owned())));
    assert!(s.backend().calls.borrow().is_empty());
}

#[test]
fn incomplete_round_blocks_submission() {
    let s = session();
    s.declare_round(["prec-1", BREAK_KEY]);
    s.round_mut().record("prec-1", json!(55.4));
    let err = block_on(submit_round(&s, "Ada", "ISEM")).unwrap_err();
    assert_eq!(err, FlowError::Round(RoundError::Incomplete { missing: vec![BREAK_KEY.to_owned()] }));
    assert!(s.backend().calls.borrow().is_empty());
}

#[test]
fn complete_round_is_submitted_and_cleared() {
    let s = session();
    complete_round(&s);
    s.backend().reply_ok(KP2_ENTER_ROUND, json!({"score": 812, "team-board": "<table/>"}));

    let scores = block_on(submit_round(&s, "Ada", "ISEM")).unwrap();

    assert_eq!(scores.score, Some(json!(812)));
    assert_eq!(scores.boards["team-board"], json!("<table/>"));
    let sent = &s.backend().posts_to(KP2_ENTER_ROUND)[0];
    assert_eq!(sent[PERSON_KEY], json!("Ada"));
    assert_eq!(sent[BREAK_KEY], json!(7));
    assert!(s.surface().has(&Op::Value(SUBMIT_BUTTON_ID.to_owned(), "Last score: 812".to_owned())));
    assert!(s.surface().has(&Op::ResetFields(ROUND_FORM_ID.to_owned())));
    assert!(s.round().is_empty());
}

#[test]
fn load_scores_asks_for_current_board() {
    let s = session();
    s.backend().reply_ok(KP2_ENTER_ROUND, json!({"score": "-", "single-board": "<table/>"}));
    block_on(load_scores(&s)).unwrap();
    assert_eq!(s.backend().posts_to(KP2_ENTER_ROUND), vec![json!({"get": "true"})]);
    assert!(s.surface().has(&Op::Value(SUBMIT_BUTTON_ID.to_owned(), "Last score: -".to_owned())));
    assert!(s.surface().ops().iter().any(|op| matches!(op, Op::Dispatch(event, _) if event == SCORES_LOADED_EVENT)));
}

// =============================================================
// Hand-in
// =============================================================

fn kp2() -> TestSession {
    session_with(ClientConfig { umbrella: Some("kp2".to_owned()), ..ClientConfig::default() })
}

#[test]
fn hand_in_requires_both_forms() {
    let s = kp2();
    let filled = FormValues::new().with_text("semester", "WS");
    let empty = FormValues::new().with_text("name", "");

    assert_eq!(block_on(hand_in(&s, &empty, &filled)), Ok(None));
    assert!(s.surface().has(&Op::Notify("Set user information to continue".to_owned())));
    assert_eq!(block_on(hand_in(&s, &filled, &empty)), Ok(None));
    assert!(s.surface().has(&Op::Notify("Set session information to continue".to_owned())));
    assert!(s.backend().calls.borrow().is_empty());
}

#[test]
fn hand_in_sends_meta_action_and_emits_history() {
    let s = kp2();
    s.gamemode_mut().toggle("precision");
    s.backend().reply_ok(GAMEMODE_CONTROLLER, json!({"history": {"rows": []}, "overview": {"precision": 12}}));
    let filled = FormValues::new().with_text("name", "Ada");

    let resp = block_on(hand_in(&s, &filled, &filled)).unwrap();

    assert!(resp.is_some());
    assert_eq!(
        s.backend().posts_to(GAMEMODE_CONTROLLER),
        vec![json!({"kp2_activity": "hand_in", "action": "game", "gmode": "kp2"})]
    );
    assert!(s.surface().has(&Op::Dispatch(SCOREBOARD_EVENT.to_owned(), json!({"rows": []}))));
    assert!(s.surface().has(&Op::WriteText("body".to_owned(), "#result-overview".to_owned(), "precision: 12".to_owned())));
}
