#![allow(clippy::float_cmp)]

use super::*;
use serde_json::json;

fn response(value: Value) -> ControllerResponse {
    ControllerResponse::from_value(value).unwrap()
}

// =============================================================
// Decoding
// =============================================================

#[test]
fn empty_object_decodes_to_default() {
    assert_eq!(response(json!({})), ControllerResponse::default());
}

#[test]
fn camera_detection_accepts_mm_aliases() {
    let coords: CameraCoordinates =
        serde_json::from_value(json!({"1": {"name": "1", "x_mm": 100.0, "y_mm": 50.0}})).unwrap();
    assert_eq!(coords["1"], CameraDetection { name: "1".to_owned(), x: 100.0, y: 50.0 });
}

#[test]
fn camera_detection_accepts_plain_keys() {
    let coords: CameraCoordinates =
        serde_json::from_value(json!({"white": {"name": "white", "x": 1, "y": 2}})).unwrap();
    assert_eq!(coords["white"].x, 1.0);
}

#[test]
fn unknown_keys_land_in_extra() {
    let resp = response(json!({"signal": "aim", "kp2_signal": "finished", "overview": {"a": 1}}));
    assert!(resp.has_signal("aim"));
    assert_eq!(resp.extra["kp2_signal"], json!("finished"));
    assert!(resp.extra.contains_key("overview"));
}

#[test]
fn discarded_is_presence_based() {
    assert!(response(json!({"discarded": false})).is_discarded());
    assert!(!response(json!({"was_round": 2})).is_discarded());
}

#[test]
fn wrongly_shaped_known_key_is_an_error() {
    assert!(ControllerResponse::from_value(json!({"enable": "#x"})).is_err());
}

// =============================================================
// Directives
// =============================================================

#[test]
fn directives_follow_application_order() {
    let resp = response(json!({
        "message": "done",
        "notification": "hi",
        "enable": ["#a"],
        "disable": ["#b", ".c"],
        "emit": {"start_long_poll": {}},
        "click": ["#collapse"],
        "log_to": ".log",
        "history": {"single_table": []}
    }));
    assert_eq!(
        resp.directives(),
        vec![
            Directive::Notify { message: "hi".to_owned() },
            Directive::Disable { selectors: vec!["#b".to_owned(), ".c".to_owned()] },
            Directive::Enable { selectors: vec!["#a".to_owned()] },
            Directive::Emit { event: "start_long_poll".to_owned(), detail: json!({}) },
            Directive::Emit { event: SCOREBOARD_EVENT.to_owned(), detail: json!({"single_table": []}) },
            Directive::Click { selectors: vec!["#collapse".to_owned()] },
            Directive::LogTo { selector: ".log".to_owned(), message: "done".to_owned() },
        ]
    );
}

#[test]
fn log_to_without_message_yields_no_directive() {
    assert!(response(json!({"log_to": ".log"})).directives().is_empty());
}

#[test]
fn plain_message_yields_no_directive() {
    assert!(response(json!({"message": "ok", "signal": "next"})).directives().is_empty());
}

// =============================================================
// Narrow endpoint bodies
// =============================================================

#[test]
fn local_round_decodes_dashed_keys() {
    let round: LocalRound = serde_json::from_value(json!({
        "current-player": "Ada",
        "remaining-balls": {"full": 7, "half": 5, "eight": 1},
        "groups": ["half", "full"]
    }))
    .unwrap();
    assert_eq!(round.current_player, "Ada");
    assert_eq!(round.remaining_balls["half"], 5);
    assert_eq!(round.groups, vec!["half".to_owned(), "full".to_owned()]);
}

#[test]
fn trickshot_list_decodes() {
    let list: Vec<Trickshot> =
        serde_json::from_value(json!([{"id": 0, "name": "Massé", "difficulty": 7}])).unwrap();
    assert_eq!(list[0].name, "Massé");
}

#[test]
fn scores_response_keeps_boards() {
    let scores: ScoresResponse =
        serde_json::from_value(json!({"score": 812, "team-board": "<tr></tr>"})).unwrap();
    assert_eq!(scores.score, Some(json!(812)));
    assert!(scores.boards.contains_key("team-board"));
}
