use crate::core::error::{ReplayError, ServiceError};
use crate::core::playback::PlaybackController;
use crate::core::replay::ReplaySnapshot;
use crate::core::session::SessionGate;
use crate::core::turn_log::{BattleDetails, BattleSummary, Combatant, TurnLog};
use crate::data::roster::{Hero, Monster};
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Remote service that resolves battles.
#[async_trait]
pub trait BattleAuthority: Send + Sync {
    async fn start_battle(&self, hero_id: i64, monster_id: i64) -> Result<BattleSummary, ServiceError>;
    async fn get_battle_details(&self, battle_id: i64) -> Result<BattleDetails, ServiceError>;
}

#[async_trait]
pub trait MonsterCatalog: Send + Sync {
    async fn get_monsters(&self) -> Result<Vec<Monster>, ServiceError>;
    /// Seeds the default monsters. Safe to call on a non-empty pool.
    async fn populate_monsters(&self) -> Result<(), ServiceError>;
}

#[derive(Clone, Debug)]
pub struct AcquiredBattle {
    pub battle_id: i64,
    pub hero: Combatant,
    pub monster: Combatant,
    pub monster_record: Monster,
    pub log: TurnLog,
}

/// Prepares a battle: checks the session, picks a monster and fetches the
/// resolved turn log. Every step runs after the previous one succeeds.
pub struct BattleAcquisitionFlow {
    authority: Arc<dyn BattleAuthority>,
    catalog: Arc<dyn MonsterCatalog>,
    gate: Arc<dyn SessionGate>,
    rng: Mutex<StdRng>,
}

impl BattleAcquisitionFlow {
    pub fn new(
        authority: Arc<dyn BattleAuthority>,
        catalog: Arc<dyn MonsterCatalog>,
        gate: Arc<dyn SessionGate>,
    ) -> Self {
        Self::with_rng(authority, catalog, gate, StdRng::from_entropy())
    }

    pub fn with_rng(
        authority: Arc<dyn BattleAuthority>,
        catalog: Arc<dyn MonsterCatalog>,
        gate: Arc<dyn SessionGate>,
        rng: StdRng,
    ) -> Self {
        Self {
            authority,
            catalog,
            gate,
            rng: Mutex::new(rng),
        }
    }

    pub async fn acquire(&self, hero: Option<&Hero>) -> Result<AcquiredBattle, ReplayError> {
        if !self.gate.is_authenticated() {
            return Err(ReplayError::Unauthenticated);
        }
        let hero = hero.ok_or(ReplayError::MissingHero)?;
        let hero_combatant = hero.to_combatant()?;

        let pool = self.monster_pool().await?;
        let monster = self.pick_monster(&pool)?;
        let monster_combatant = monster.to_combatant()?;
        if monster_combatant.name == hero_combatant.name {
            warn!(
                name = %hero_combatant.name,
                "hero and monster share a name; replayed HP will be ambiguous"
            );
        }

        let summary = self.authority.start_battle(hero.id, monster.id).await?;
        debug!(battle_id = summary.id, hero_id = hero.id, monster_id = monster.id, "battle started");
        let details = self.authority.get_battle_details(summary.id).await?;
        let log = TurnLog::from_details(details)?;
        info!(
            battle_id = summary.id,
            hero = %hero_combatant.name,
            monster = %monster_combatant.name,
            turns = log.len(),
            "battle acquired"
        );

        Ok(AcquiredBattle {
            battle_id: summary.id,
            hero: hero_combatant,
            monster: monster_combatant,
            monster_record: monster,
            log,
        })
    }

    async fn monster_pool(&self) -> Result<Vec<Monster>, ReplayError> {
        let monsters = self.catalog.get_monsters().await?;
        if !monsters.is_empty() {
            return Ok(monsters);
        }
        info!("monster pool empty, populating defaults");
        self.catalog.populate_monsters().await?;
        let monsters = self.catalog.get_monsters().await?;
        if monsters.is_empty() {
            return Err(ReplayError::EmptyMonsterPool);
        }
        Ok(monsters)
    }

    // Uniform over the pool; spawn_weight is not consulted.
    fn pick_monster(&self, pool: &[Monster]) -> Result<Monster, ReplayError> {
        if pool.is_empty() {
            return Err(ReplayError::EmptyMonsterPool);
        }
        let index = self.rng.lock().gen_range(0..pool.len());
        Ok(pool[index].clone())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BattleStatus {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Clone, Debug)]
pub struct ActiveBattle {
    pub battle_id: i64,
    pub hero: Combatant,
    pub monster: Combatant,
    pub monster_record: Monster,
}

/// One battle screen: the acquisition flow plus the controller replaying
/// whatever battle it produced last.
pub struct BattleSession {
    flow: BattleAcquisitionFlow,
    controller: PlaybackController,
    battle: Option<ActiveBattle>,
    status: BattleStatus,
}

impl BattleSession {
    pub fn new(flow: BattleAcquisitionFlow, controller: PlaybackController) -> Self {
        Self {
            flow,
            controller,
            battle: None,
            status: BattleStatus::Loading,
        }
    }

    /// Drops the current battle and acquires a fresh one. On failure the
    /// session shows no battle and keeps the user-facing message.
    pub async fn new_battle(&mut self, hero: Option<&Hero>) -> Result<(), ReplayError> {
        self.controller.reset(TurnLog::empty());
        self.battle = None;
        self.status = BattleStatus::Loading;

        match self.flow.acquire(hero).await {
            Ok(acquired) => {
                self.controller.reset(acquired.log);
                self.battle = Some(ActiveBattle {
                    battle_id: acquired.battle_id,
                    hero: acquired.hero,
                    monster: acquired.monster,
                    monster_record: acquired.monster_record,
                });
                self.status = BattleStatus::Ready;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "battle acquisition failed");
                self.status = BattleStatus::Failed(err.user_message());
                Err(err)
            }
        }
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn battle(&self) -> Option<&ActiveBattle> {
        self.battle.as_ref()
    }

    pub fn status(&self) -> &BattleStatus {
        &self.status
    }

    pub fn snapshot(&self) -> Result<Option<ReplaySnapshot>, ReplayError> {
        match &self.battle {
            Some(battle) => self
                .controller
                .snapshot(&battle.hero, &battle.monster)
                .map(Some),
            None => Ok(None),
        }
    }
}
