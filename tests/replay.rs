use battle_replay::core::error::ReplayError;
use battle_replay::core::replay::{compute_hp, hp_percent, is_finished, winner, ReplaySnapshot};
use battle_replay::core::turn_log::{Combatant, TurnEvent, TurnLog};

fn event(turn: i64, attacker: &str, defender: &str, damage: i32, hp_after: i32) -> TurnEvent {
    TurnEvent {
        turn_number: turn,
        attacker: attacker.to_string(),
        defender: defender.to_string(),
        damage,
        defender_hp_after: hp_after,
    }
}

fn combatant(name: &str, max_hp: i32) -> Combatant {
    Combatant::new(name, max_hp).expect("combatant")
}

fn full_battle() -> TurnLog {
    TurnLog::new(vec![
        event(1, "Hero", "Slime", 8, 12),
        event(2, "Slime", "Hero", 4, 96),
        event(3, "Hero", "Slime", 9, 3),
        event(4, "Slime", "Hero", 5, 91),
        event(5, "Hero", "Slime", 7, -4),
    ])
    .expect("log")
}

#[test]
fn single_hit_reduces_defender_hp() {
    let log = TurnLog::new(vec![event(1, "Hero", "Slime", 5, 15)]).expect("log");
    let slime = combatant("Slime", 20);
    assert_eq!(compute_hp(&log, 0, &slime).unwrap(), 20);
    assert_eq!(compute_hp(&log, 1, &slime).unwrap(), 15);
}

#[test]
fn last_defending_event_wins_over_minimum() {
    let log = TurnLog::new(vec![event(1, "Slime", "Hero", 20, 80), event(2, "Slime", "Hero", 0, 50)])
        .expect("log");
    let hero = combatant("Hero", 100);
    assert_eq!(compute_hp(&log, 2, &hero).unwrap(), 50);

    let healed = TurnLog::new(vec![event(1, "Slime", "Hero", 60, 40), event(2, "Cleric", "Hero", 0, 70)])
        .expect("log");
    assert_eq!(compute_hp(&healed, 2, &hero).unwrap(), 70);
}

#[test]
fn hp_never_goes_negative() {
    let log = full_battle();
    let slime = combatant("Slime", 20);
    for frontier in 0..=log.len() {
        assert!(compute_hp(&log, frontier, &slime).unwrap() >= 0);
    }
    assert_eq!(compute_hp(&log, 5, &slime).unwrap(), 0);
}

#[test]
fn compute_hp_is_idempotent_across_queries() {
    let log = full_battle();
    let hero = combatant("Hero", 100);
    let first = compute_hp(&log, 3, &hero).unwrap();
    let _ = compute_hp(&log, 5, &hero).unwrap();
    let _ = compute_hp(&log, 0, &hero).unwrap();
    assert_eq!(compute_hp(&log, 3, &hero).unwrap(), first);

    let slime = combatant("Slime", 20);
    let a = ReplaySnapshot::capture(&log, 4, &hero, &slime).unwrap();
    let b = ReplaySnapshot::capture(&log, 4, &hero, &slime).unwrap();
    assert_eq!(a, b);
}

#[test]
fn frontier_beyond_log_is_out_of_range() {
    let log = full_battle();
    let hero = combatant("Hero", 100);
    let err = compute_hp(&log, 6, &hero).unwrap_err();
    assert!(matches!(err, ReplayError::OutOfRange { frontier: 6, len: 5 }));
}

#[test]
fn empty_log_is_never_finished() {
    let log = TurnLog::empty();
    assert!(!is_finished(&log, 0));
    let hero = combatant("Hero", 100);
    assert_eq!(compute_hp(&log, 0, &hero).unwrap(), 100);
    assert!(compute_hp(&log, 1, &hero).is_err());
}

#[test]
fn winner_only_known_at_the_end() {
    let log = full_battle();
    let hero = combatant("Hero", 100);
    let slime = combatant("Slime", 20);
    assert!(winner(&log, 4, &hero, &slime).unwrap().is_none());
    assert_eq!(winner(&log, 5, &hero, &slime).unwrap().map(|c| c.name.as_str()), Some("Hero"));

    let lost = TurnLog::new(vec![event(1, "Slime", "Hero", 100, 0)]).expect("log");
    assert_eq!(winner(&lost, 1, &hero, &slime).unwrap().map(|c| c.name.as_str()), Some("Slime"));
}

#[test]
fn snapshot_reports_bars_and_revealed_turns() {
    let log = full_battle();
    let hero = combatant("Hero", 100);
    let slime = combatant("Slime", 20);

    let snapshot = ReplaySnapshot::capture(&log, 2, &hero, &slime).unwrap();
    assert_eq!(snapshot.total, 5);
    assert_eq!(snapshot.revealed.len(), 2);
    assert_eq!(snapshot.hero.hp, 96);
    assert_eq!(snapshot.opponent.hp_percent, 60);
    assert!(!snapshot.finished);
    assert_eq!(snapshot.winner, None);

    let end = ReplaySnapshot::capture(&log, 5, &hero, &slime).unwrap();
    assert!(end.finished);
    assert_eq!(end.winner.as_deref(), Some("Hero"));
}

#[test]
fn hp_percent_rounds_and_clamps() {
    assert_eq!(hp_percent(15, 20), 75);
    assert_eq!(hp_percent(1, 3), 33);
    assert_eq!(hp_percent(2, 3), 67);
    assert_eq!(hp_percent(-5, 20), 0);
    assert_eq!(hp_percent(30, 20), 100);
}
