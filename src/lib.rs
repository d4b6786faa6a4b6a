pub mod core;
pub mod data;
pub mod logging;
pub mod tools;

pub use crate::core::{
    acquisition::{AcquiredBattle, BattleAcquisitionFlow, BattleAuthority, BattleSession, BattleStatus, MonsterCatalog},
    error::{ReplayError, ServiceError},
    playback::{PlaybackController, PlaybackPhase, PlaybackState},
    replay::{compute_hp, hp_percent, is_finished, winner, CombatantView, ReplaySnapshot},
    session::{Session, SessionGate, Theme},
    turn_log::{BattleDetails, BattleSummary, Combatant, TurnEvent, TurnLog},
};
pub use crate::data::{
    roster::{Hero, Monster, NewHero},
    settings::{ApiSettings, ReplaySettings, Settings},
};
