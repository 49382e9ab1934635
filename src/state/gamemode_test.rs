use super::*;
use serde_json::json;

#[test]
fn selection_starts_at_base() {
    assert!(GamemodeSelection::default().is_base());
}

#[test]
fn toggle_opens_then_closes() {
    let mut sel = GamemodeSelection::default();
    assert_eq!(sel.toggle("precision"), "precision");
    assert_eq!(sel.toggle("distance"), "distance");
    assert_eq!(sel.toggle("distance"), BASE_GAMEMODE);
}

#[test]
fn vanilla_route_stamps_gmode() {
    let mut payload = Map::new();
    Route::Vanilla.stamp(&mut payload, "longest_break", true);
    assert_eq!(Value::Object(payload), json!({"gmode": "longest_break"}));
}

#[test]
fn nested_route_stamps_umbrella_and_activity() {
    let route = Route::from_umbrella(Some("kp2"));
    let mut payload = Map::new();
    route.stamp(&mut payload, "precision", true);
    assert_eq!(Value::Object(payload), json!({"gmode": "kp2", "kp2_activity": "precision"}));
}

#[test]
fn nested_route_without_activity_keeps_caller_field() {
    let route = Route::from_umbrella(Some("kp2"));
    let mut payload = Map::new();
    payload.insert("kp2_activity".to_owned(), json!("hand_in"));
    route.stamp(&mut payload, "precision", false);
    assert_eq!(Value::Object(payload), json!({"gmode": "kp2", "kp2_activity": "hand_in"}));
}

#[test]
fn activity_key_only_for_nested() {
    assert_eq!(Route::Vanilla.activity_key(), None);
    assert_eq!(Route::from_umbrella(Some("kp2")).activity_key().as_deref(), Some("kp2_activity"));
}
