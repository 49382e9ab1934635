use super::*;
use crate::config::ClientConfig;
use crate::net::api::GAMEMODE_CONTROLLER;
use crate::test_support::{Op, TestSession, block_on, session, session_with};
use crate::util::form::FieldValue;
use serde_json::json;

fn kp2() -> TestSession {
    session_with(ClientConfig { umbrella: Some("kp2".to_owned()), ..ClientConfig::default() })
}

#[test]
fn setting_is_sent_for_open_activity_and_printed() {
    let s = kp2();
    s.gamemode_mut().toggle("precision");
    s.backend().reply_ok(GAMEMODE_CONTROLLER, json!({"message": "Difficulty set"}));
    let values = FormValues::new().with_text("difficulty", "3").with("easy", FieldValue::Checked(false));

    block_on(send_setting(&s, "precision-settings", &values, true, false)).unwrap();

    assert_eq!(
        s.backend().posts_to(GAMEMODE_CONTROLLER),
        vec![json!({
            "action": "settings",
            "settings": {"difficulty": "3", "easy": false},
            "container": "precision-settings",
            "gmode": "kp2",
            "kp2_activity": "precision",
        })]
    );
    assert!(s.surface().has(&Op::WriteText(
        "#precision-settings".to_owned(),
        OUTPUT_SELECTOR.to_owned(),
        "Difficulty set".to_owned()
    )));
}

#[test]
fn meta_setting_uses_settings_activity() {
    let s = kp2();
    s.gamemode_mut().toggle("precision");
    block_on(send_setting(&s, "session-info", &FormValues::new(), false, true)).unwrap();
    let sent = &s.backend().posts_to(GAMEMODE_CONTROLLER)[0];
    assert_eq!(sent["kp2_activity"], json!("settings"));
    assert!(s.surface().ops().is_empty());
}

#[test]
fn vanilla_setting_has_no_activity_field() {
    let s = session();
    s.gamemode_mut().toggle("curling");
    block_on(send_setting(&s, "curling-settings", &FormValues::new(), false, true)).unwrap();
    let sent = &s.backend().posts_to(GAMEMODE_CONTROLLER)[0];
    assert_eq!(sent["gmode"], json!("curling"));
    assert!(sent.get("kp2_activity").is_none());
}

#[test]
fn global_config_waits_for_every_input() {
    let s = kp2();
    let partial = FormValues::new().with_text("semester", "WS24").with_text("group", "");
    assert_eq!(block_on(send_global_config(&s, "session-info", &partial)), Ok(None));
    assert!(s.backend().calls.borrow().is_empty());

    let full = partial.with_text("group", "3");
    assert!(block_on(send_global_config(&s, "session-info", &full)).unwrap().is_some());
    assert_eq!(s.backend().count(GAMEMODE_CONTROLLER), 1);
}
