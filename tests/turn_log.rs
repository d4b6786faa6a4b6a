use battle_replay::core::error::ReplayError;
use battle_replay::core::turn_log::{BattleDetails, Combatant, TurnEvent, TurnLog};

fn event(turn: i64, attacker: &str, defender: &str, damage: i32, hp_after: i32) -> TurnEvent {
    TurnEvent {
        turn_number: turn,
        attacker: attacker.to_string(),
        defender: defender.to_string(),
        damage,
        defender_hp_after: hp_after,
    }
}

#[test]
fn accepts_sequential_turns() {
    let log = TurnLog::new(vec![
        event(1, "Hero", "Slime", 5, 15),
        event(2, "Slime", "Hero", 3, 97),
    ])
    .expect("valid log");
    assert_eq!(log.len(), 2);
    assert_eq!(log.get(1).map(|e| e.defender.as_str()), Some("Hero"));
    assert_eq!(log.revealed(1).len(), 1);
    assert_eq!(log.revealed(10).len(), 2);
}

#[test]
fn rejects_gap_in_turn_numbers() {
    let err = TurnLog::new(vec![event(1, "Hero", "Slime", 5, 15), event(3, "Slime", "Hero", 3, 97)])
        .expect_err("gap should fail");
    assert!(matches!(err, ReplayError::MalformedLog(_)));
}

#[test]
fn rejects_log_not_starting_at_one() {
    let err = TurnLog::new(vec![event(0, "Hero", "Slime", 5, 15)]).expect_err("turn 0 should fail");
    assert!(matches!(err, ReplayError::MalformedLog(_)));
}

#[test]
fn rejects_negative_damage() {
    let err = TurnLog::new(vec![event(1, "Hero", "Slime", -4, 24)]).expect_err("negative damage");
    assert!(err.to_string().contains("negative damage"));
    assert_eq!(err.user_message(), "Failed to start battle");
}

#[test]
fn missing_logs_field_is_an_empty_battle() {
    let details: BattleDetails = serde_json::from_str(r#"{"id": 12, "logs": null}"#).expect("decode");
    let log = TurnLog::from_details(details).expect("empty log");
    assert!(log.is_empty());
}

#[test]
fn negative_turn_number_is_malformed() {
    let details: BattleDetails = serde_json::from_str(
        r#"{"id": 4, "logs": [{"turnNumber": -1, "attacker": "Hero", "defender": "Slime", "damage": 5, "defenderHpAfter": 15}]}"#,
    )
    .expect("decode");
    let err = TurnLog::from_details(details).expect_err("turn -1");
    assert!(matches!(err, ReplayError::MalformedLog(_)));
    assert!(err.to_string().contains("found turn -1"));
    assert_eq!(err.user_message(), "Failed to start battle");
}

#[test]
fn event_missing_a_field_is_malformed() {
    let details: BattleDetails = serde_json::from_str(
        r#"{"id": 5, "logs": [{"turnNumber": 1, "attacker": "Hero", "damage": 5, "defenderHpAfter": 15}]}"#,
    )
    .expect("details decode even when events do not");
    let err = TurnLog::from_details(details).expect_err("missing defender");
    assert!(matches!(err, ReplayError::MalformedLog(_)));
    assert_eq!(err.user_message(), "Failed to start battle");
}

#[test]
fn gap_message_names_the_index() {
    let err = TurnLog::new(vec![event(1, "Hero", "Slime", 5, 15), event(3, "Slime", "Hero", 3, 97)])
        .expect_err("gap");
    assert_eq!(err.to_string(), "malformed turn log: expected turn 2 at index 1, found turn 3");
}

#[test]
fn decodes_camel_case_wire_format() {
    let details: BattleDetails = serde_json::from_str(
        r#"{"id": 3, "logs": [{"turnNumber": 1, "attacker": "Hero", "defender": "Slime", "damage": 5, "defenderHpAfter": 15}]}"#,
    )
    .expect("decode");
    let log = TurnLog::from_details(details).expect("valid");
    assert_eq!(log.events()[0], event(1, "Hero", "Slime", 5, 15));
}

#[test]
fn combatant_requires_positive_max_hp() {
    assert!(Combatant::new("Slime", 20).is_ok());
    let err = Combatant::new("Ghost", 0).expect_err("zero hp");
    assert!(matches!(err, ReplayError::InvalidCombatant { max_hp: 0, .. }));
}
