use crate::core::error::ReplayError;
use crate::core::replay::ReplaySnapshot;
use crate::core::turn_log::{Combatant, TurnEvent, TurnLog};
use crate::data::settings::ReplaySettings;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PlaybackPhase {
    Idle,
    Stepping,
    AutoPlaying,
    Finished,
}

/// Observable playback position. `generation` changes on every reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PlaybackState {
    pub generation: u64,
    pub frontier: usize,
    pub total: usize,
    pub auto_playing: bool,
}

impl PlaybackState {
    pub fn phase(&self) -> PlaybackPhase {
        if self.is_finished() {
            PlaybackPhase::Finished
        } else if self.auto_playing {
            PlaybackPhase::AutoPlaying
        } else if self.frontier == 0 {
            PlaybackPhase::Idle
        } else {
            PlaybackPhase::Stepping
        }
    }

    pub fn is_finished(&self) -> bool {
        self.total > 0 && self.frontier >= self.total
    }

    fn has_remaining(&self) -> bool {
        self.frontier < self.total
    }
}

struct ArmedTimer {
    id: u64,
    handle: JoinHandle<()>,
}

struct Inner {
    log: Arc<TurnLog>,
    state: PlaybackState,
    timer: Option<ArmedTimer>,
    next_timer_id: u64,
}

impl Inner {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            trace!(timer_id = timer.id, "auto-play timer cancelled");
            timer.handle.abort();
        }
    }
}

struct Shared {
    inner: Mutex<Inner>,
    tick: Duration,
    runtime: Handle,
    updates: watch::Sender<PlaybackState>,
}

impl Shared {
    fn publish(&self, inner: &Inner) {
        self.updates.send_replace(inner.state);
    }

    fn arm_timer(shared: &Arc<Shared>, inner: &mut Inner) {
        debug_assert!(inner.timer.is_none(), "only one auto-play timer may be armed");
        inner.cancel_timer();

        let id = inner.next_timer_id;
        inner.next_timer_id += 1;
        let generation = inner.state.generation;
        let weak: Weak<Shared> = Arc::downgrade(shared);
        let tick = shared.tick;

        let handle = shared.runtime.spawn(async move {
            tokio::time::sleep(tick).await;
            if let Some(shared) = weak.upgrade() {
                Shared::on_tick(&shared, generation, id);
            }
        });
        trace!(timer_id = id, generation, "auto-play timer armed");
        inner.timer = Some(ArmedTimer { id, handle });
    }

    fn on_tick(shared: &Arc<Shared>, generation: u64, id: u64) {
        let mut inner = shared.inner.lock();
        let is_current = inner.state.generation == generation
            && inner.timer.as_ref().map(|timer| timer.id) == Some(id);
        if !is_current {
            trace!(timer_id = id, generation, "stale auto-play tick ignored");
            return;
        }
        // A fired timer releases its own slot.
        inner.timer = None;

        shared.advance(&mut inner);
        if inner.state.auto_playing && inner.state.has_remaining() {
            Shared::arm_timer(shared, &mut inner);
        }
    }

    fn advance(&self, inner: &mut Inner) -> Option<TurnEvent> {
        if !inner.state.has_remaining() {
            return None;
        }
        let event = inner.log.get(inner.state.frontier).cloned();
        inner.state.frontier += 1;
        if !inner.state.has_remaining() {
            inner.state.auto_playing = false;
            inner.cancel_timer();
            debug!(
                generation = inner.state.generation,
                total = inner.state.total,
                "replay finished"
            );
        } else {
            debug!(frontier = inner.state.frontier, total = inner.state.total, "replay stepped");
        }
        self.publish(inner);
        event
    }
}

/// Drives a replay over one attached turn log: manual stepping, a single
/// timer-driven auto-play loop, and resets when a new battle arrives.
///
/// Dropping the controller cancels any pending auto-play tick.
pub struct PlaybackController {
    shared: Arc<Shared>,
}

impl PlaybackController {
    /// Uses the tokio runtime the caller is running on.
    pub fn new(log: TurnLog, settings: &ReplaySettings) -> Result<Self, ReplayError> {
        let handle = Handle::try_current().map_err(|_| ReplayError::NoRuntime)?;
        Ok(Self::with_handle(log, settings, handle))
    }

    pub fn with_handle(log: TurnLog, settings: &ReplaySettings, runtime: Handle) -> Self {
        let state = PlaybackState {
            generation: 0,
            frontier: 0,
            total: log.len(),
            auto_playing: false,
        };
        let (updates, _) = watch::channel(state);
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    log: Arc::new(log),
                    state,
                    timer: None,
                    next_timer_id: 0,
                }),
                tick: settings.tick_interval(),
                runtime,
                updates,
            }),
        }
    }

    /// Reveals the next turn. Returns `None` once every turn is visible.
    pub fn step(&self) -> Option<TurnEvent> {
        let mut inner = self.shared.inner.lock();
        self.shared.advance(&mut inner)
    }

    /// Flips auto-play and returns the new value. Has no effect once the
    /// replay is finished or when there is nothing to play.
    pub fn toggle_auto_play(&self) -> bool {
        let mut inner = self.shared.inner.lock();
        if inner.state.is_finished() {
            return false;
        }

        if inner.state.auto_playing {
            inner.state.auto_playing = false;
            inner.cancel_timer();
            debug!(frontier = inner.state.frontier, "auto-play stopped");
        } else if inner.state.has_remaining() {
            inner.state.auto_playing = true;
            Shared::arm_timer(&self.shared, &mut inner);
            debug!(frontier = inner.state.frontier, "auto-play started");
        } else {
            trace!("auto-play requested on an empty log");
            return false;
        }

        self.shared.publish(&inner);
        inner.state.auto_playing
    }

    /// Attaches `log`, rewinding to the start and stopping auto-play.
    pub fn reset(&self, log: TurnLog) {
        let mut inner = self.shared.inner.lock();
        inner.cancel_timer();
        inner.state = PlaybackState {
            generation: inner.state.generation + 1,
            frontier: 0,
            total: log.len(),
            auto_playing: false,
        };
        inner.log = Arc::new(log);
        debug!(
            generation = inner.state.generation,
            total = inner.state.total,
            "replay reset"
        );
        self.shared.publish(&inner);
    }

    pub fn state(&self) -> PlaybackState {
        self.shared.inner.lock().state
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.state().phase()
    }

    pub fn log(&self) -> Arc<TurnLog> {
        Arc::clone(&self.shared.inner.lock().log)
    }

    /// True while an auto-play tick is pending.
    pub fn timer_armed(&self) -> bool {
        self.shared.inner.lock().timer.is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.shared.updates.subscribe()
    }

    pub fn snapshot(&self, hero: &Combatant, opponent: &Combatant) -> Result<ReplaySnapshot, ReplayError> {
        let (log, frontier) = {
            let inner = self.shared.inner.lock();
            (Arc::clone(&inner.log), inner.state.frontier)
        };
        ReplaySnapshot::capture(&log, frontier, hero, opponent)
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.shared.inner.lock().cancel_timer();
    }
}
