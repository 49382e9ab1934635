use super::*;
use crate::net::api::{CAMERA_COORDS, GAMEMODE_CONTROLLER};
use crate::state::coords::{Layer, Point};
use crate::state::handshake::Phase;
use crate::test_support::{Op, TestSession, block_on, session};
use serde_json::json;

const CONTROL: &str = "precision-shot-check";

fn activate(s: &TestSession, checked: bool) -> Result<ConfirmOutcome, ApiError> {
    let mut payload = Map::new();
    payload.insert("action".to_owned(), json!("game"));
    block_on(confirm_and_commit(s, CONTROL, checked, payload, |p| s.send(p, true), label_with_message))
}

// =============================================================
// Two-phase cycle
// =============================================================

#[test]
fn first_activation_reviews_with_one_camera_call() {
    let s = session();
    s.backend().reply_ok(CAMERA_COORDS, json!({"1": {"name": "1", "x": 100, "y": 50}}));

    let outcome = activate(&s, true).unwrap();

    assert_eq!(outcome, ConfirmOutcome::AwaitingReview(SyncOutcome::Replaced { count: 1 }));
    assert_eq!(s.handshake().phase(CONTROL), Phase::AwaitingReview);
    assert_eq!(s.backend().count(CAMERA_COORDS), 1);
    assert_eq!(s.backend().count(GAMEMODE_CONTROLLER), 0);
    let ops = s.surface().ops();
    assert_eq!(ops[0], Op::Label(CONTROL.to_owned(), REVIEW_LABEL.to_owned()));
    assert_eq!(ops[1], Op::Disabled(CONTROL.to_owned(), true));
    assert_eq!(s.surface().label(CONTROL).as_deref(), Some(COMMIT_LABEL));
    assert_eq!(s.surface().disabled(CONTROL), Some(false));
}

#[test]
fn second_activation_commits_reviewed_store_once() {
    let s = session();
    s.backend().reply_ok(CAMERA_COORDS, json!({"1": {"name": "1", "x": 100, "y": 50}}));
    s.backend().reply_ok(GAMEMODE_CONTROLLER, json!({"message": "55 mm"}));
    activate(&s, true).unwrap();

    let outcome = activate(&s, false).unwrap();

    assert!(matches!(outcome, ConfirmOutcome::Committed(_)));
    assert_eq!(s.backend().count(CAMERA_COORDS), 1);
    let commits = s.backend().posts_to(GAMEMODE_CONTROLLER);
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0]["coordinates"], s.store().snapshot());
    assert_eq!(commits[0]["coordinates"]["1"]["name"], json!("1"));
    assert_eq!(commits[0]["action"], json!("game"));
    assert_eq!(s.handshake().phase(CONTROL), Phase::Idle);
    assert_eq!(s.surface().checked(CONTROL), Some(true));
    assert_eq!(s.surface().label(CONTROL).as_deref(), Some("55 mm"));
}

#[test]
fn operator_corrections_between_phases_are_committed() {
    let s = session();
    s.backend().reply_ok(CAMERA_COORDS, json!({"1": {"name": "1", "x": 100, "y": 50}}));
    activate(&s, true).unwrap();
    s.select_ball("ball-2");
    s.place_manual(Point::new(500.0, 250.0));

    activate(&s, false).unwrap();

    let commit = &s.backend().posts_to(GAMEMODE_CONTROLLER)[0];
    assert_eq!(commit["coordinates"]["2"]["x"], json!(1115.0));
    assert!(commit["coordinates"].get("1").is_some());
}

#[test]
fn manipulation_commits_without_review() {
    let s = session();
    s.store_mut().place("ball-4", Point::new(10.0, 10.0), Layer::Primary);
    s.manipulation().set(true, s.surface());

    let outcome = activate(&s, true).unwrap();

    assert!(matches!(outcome, ConfirmOutcome::Committed(_)));
    assert_eq!(s.backend().count(CAMERA_COORDS), 0);
    assert_eq!(s.backend().count(GAMEMODE_CONTROLLER), 1);
    assert!(s.backend().posts_to(GAMEMODE_CONTROLLER)[0]["coordinates"].get("4").is_some());
}

#[test]
fn unchecking_idle_control_does_nothing() {
    let s = session();
    assert_eq!(activate(&s, false).unwrap(), ConfirmOutcome::Ignored);
    assert!(s.backend().calls.borrow().is_empty());
    assert!(s.surface().ops().is_empty());
}

#[test]
fn controls_cycle_independently() {
    let s = session();
    activate(&s, true).unwrap();
    let other = block_on(confirm_and_commit(&s, "distance-shot-check", true, Map::new(), |p| s.send(p, true), |_, _, _| {}))
        .unwrap();
    assert!(matches!(other, ConfirmOutcome::AwaitingReview(_)));
    assert_eq!(s.handshake().in_flight(), 2);
    assert_eq!(s.backend().count(CAMERA_COORDS), 2);
}

// =============================================================
// Failures
// =============================================================

#[test]
fn failed_review_fetch_returns_control_to_idle() {
    let s = session();
    s.backend().reply(CAMERA_COORDS, Err(ApiError::Timeout(15_000)));

    assert_eq!(activate(&s, true), Err(ApiError::Timeout(15_000)));

    assert_eq!(s.handshake().phase(CONTROL), Phase::Idle);
    assert_eq!(s.surface().checked(CONTROL), Some(false));
    assert_eq!(s.surface().disabled(CONTROL), Some(false));
    assert!(s.surface().has(&Op::RestoreLabel(CONTROL.to_owned())));
    assert!(s.surface().has(&Op::Notify("request timed out after 15000 ms".to_owned())));
}

#[test]
fn failed_commit_resets_control() {
    let s = session();
    s.manipulation().set(true, s.surface());
    s.backend().reply(GAMEMODE_CONTROLLER, Err(ApiError::Status { path: GAMEMODE_CONTROLLER.to_owned(), status: 500 }));

    assert!(activate(&s, true).is_err());

    assert_eq!(s.surface().checked(CONTROL), Some(false));
    assert!(s.surface().has(&Op::RestoreLabel(CONTROL.to_owned())));
    assert_eq!(s.handshake().phase(CONTROL), Phase::Idle);
}
