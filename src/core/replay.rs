use crate::core::error::ReplayError;
use crate::core::turn_log::{Combatant, TurnEvent, TurnLog};
use serde::Serialize;

fn check_frontier(log: &TurnLog, frontier: usize) -> Result<(), ReplayError> {
    if frontier > log.len() {
        return Err(ReplayError::OutOfRange {
            frontier,
            len: log.len(),
        });
    }
    Ok(())
}

/// HP of `combatant` after the first `frontier` turns. The last event where
/// it defended wins, so heals in the log are honoured.
pub fn compute_hp(log: &TurnLog, frontier: usize, combatant: &Combatant) -> Result<i32, ReplayError> {
    check_frontier(log, frontier)?;
    let hp = log.events()[..frontier]
        .iter()
        .filter(|event| event.defender == combatant.name)
        .last()
        .map(|event| event.defender_hp_after)
        .unwrap_or(combatant.max_hp);
    Ok(hp.max(0))
}

pub fn is_finished(log: &TurnLog, frontier: usize) -> bool {
    frontier >= log.len() && !log.is_empty()
}

/// Winner once the replay has reached the end: `hero` if still standing,
/// otherwise `opponent`.
pub fn winner<'a>(
    log: &TurnLog,
    frontier: usize,
    hero: &'a Combatant,
    opponent: &'a Combatant,
) -> Result<Option<&'a Combatant>, ReplayError> {
    check_frontier(log, frontier)?;
    if !is_finished(log, frontier) {
        return Ok(None);
    }
    if compute_hp(log, frontier, hero)? > 0 {
        Ok(Some(hero))
    } else {
        Ok(Some(opponent))
    }
}

pub fn hp_percent(current: i32, max: i32) -> u32 {
    if max <= 0 {
        return 0;
    }
    let ratio = current.clamp(0, max) as f64 / max as f64;
    (ratio * 100.0).round() as u32
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CombatantView {
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub hp_percent: u32,
}

impl CombatantView {
    fn capture(log: &TurnLog, frontier: usize, combatant: &Combatant) -> Result<Self, ReplayError> {
        let hp = compute_hp(log, frontier, combatant)?;
        Ok(Self {
            name: combatant.name.clone(),
            hp,
            max_hp: combatant.max_hp,
            hp_percent: hp_percent(hp, combatant.max_hp),
        })
    }
}

/// Everything a shell needs to draw one frame of the replay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReplaySnapshot {
    pub frontier: usize,
    pub total: usize,
    pub hero: CombatantView,
    pub opponent: CombatantView,
    pub revealed: Vec<TurnEvent>,
    pub finished: bool,
    pub winner: Option<String>,
}

impl ReplaySnapshot {
    pub fn capture(
        log: &TurnLog,
        frontier: usize,
        hero: &Combatant,
        opponent: &Combatant,
    ) -> Result<Self, ReplayError> {
        Ok(Self {
            frontier,
            total: log.len(),
            hero: CombatantView::capture(log, frontier, hero)?,
            opponent: CombatantView::capture(log, frontier, opponent)?,
            revealed: log.revealed(frontier).to_vec(),
            finished: is_finished(log, frontier),
            winner: winner(log, frontier, hero, opponent)?.map(|c| c.name.clone()),
        })
    }
}
