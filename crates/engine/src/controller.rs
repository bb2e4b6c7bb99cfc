//! Game controller: the one place where input, gravity and lock delay meet
//!
//! Every operation takes the game mutex, runs the pure state transition, then applies the
//! returned [`Directives`] to the timers before releasing the mutex. Timer callbacks go through
//! the same path, so input handlers and both timer threads are serialized on a single lock.
//!
//! Lock order is always game state first, then a timer's internal mutex. Timer workers never
//! hold their own mutex while running a callback, so the two can never deadlock.
//!
//! A lock delay expiry can lose the race for the game mutex to an input that rearms the timer.
//! Once it gets the mutex it checks its arming generation and drops out if that is stale.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, Weak};
use std::time::Duration;

use rand::Rng;

use srs_tetris_core::{Directives, GameSnapshot, GameState, GravityDirective, LockDirective};
use srs_tetris_types::{GameAction, GameStatus, RotateDirection};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::gravity::GravityScheduler;
use crate::lock_delay::LockDelayTimer;
use crate::timer::TimerCallback;

struct Inner {
    state: Mutex<GameState>,
    gravity: GravityScheduler,
    lock_delay: LockDelayTimer,
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, GameState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("game state mutex poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn dispatch(&self, op: impl FnOnce(&mut GameState) -> Directives) -> Directives {
        let mut state = self.lock_state();
        let directives = op(&mut state);
        self.apply_directives(&state, directives);
        directives
    }

    fn apply_directives(&self, state: &GameState, directives: Directives) {
        // Level and soft drop both feed the period; keep it current before (re)arming.
        self.gravity.set_interval(state.gravity_interval());

        match directives.gravity {
            GravityDirective::Keep => {}
            GravityDirective::Resume => self.gravity.start(),
            GravityDirective::Restart => self.gravity.restart(),
            GravityDirective::Halt => self.gravity.stop(),
        }
        match directives.lock_delay {
            LockDirective::Keep => {}
            LockDirective::Start => self.lock_delay.start(),
            LockDirective::Restart => self.lock_delay.reset(),
            LockDirective::ExpireNow => self.lock_delay.request_immediate_expiry(),
            LockDirective::Cancel => self.lock_delay.stop(),
        }
    }
}

type InnerSlot = Arc<OnceLock<Weak<Inner>>>;

type TimerOp = fn(&Inner, &mut GameState, u64) -> Directives;

fn timer_callback(slot: &InnerSlot, op: TimerOp) -> TimerCallback {
    let slot = Arc::clone(slot);
    Box::new(move |generation| {
        let Some(inner) = slot.get().and_then(Weak::upgrade) else {
            return;
        };
        inner.dispatch(|state| op(&*inner, state, generation));
    })
}

fn on_gravity_tick(_: &Inner, state: &mut GameState, _: u64) -> Directives {
    state.gravity_step()
}

fn on_lock_delay_expiry(inner: &Inner, state: &mut GameState, generation: u64) -> Directives {
    if !inner.lock_delay.is_current(generation) {
        tracing::debug!(generation, "ignoring stale lock delay expiry");
        return Directives::NONE;
    }
    state.on_lock_delay_expired()
}

/// Thread-safe handle to a running game. Dropping it stops and joins both timer threads.
pub struct GameController {
    inner: Arc<Inner>,
}

impl GameController {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let state = GameState::new(seed, config.rules.clamped());
        tracing::debug!(seed, ?config, "creating game controller");

        let slot: InnerSlot = Arc::new(OnceLock::new());
        let gravity = GravityScheduler::new(
            state.gravity_interval(),
            config.busy_wait_threshold,
            timer_callback(&slot, on_gravity_tick),
        )?;
        let lock_delay = LockDelayTimer::new(
            config.lock_delay,
            config.busy_wait_threshold,
            timer_callback(&slot, on_lock_delay_expiry),
        )?;

        let inner = Arc::new(Inner {
            state: Mutex::new(state),
            gravity,
            lock_delay,
        });
        // Both timers are disarmed until the first directive, so nothing fires before this.
        let _ = slot.set(Arc::downgrade(&inner));

        Ok(Self { inner })
    }

    pub fn start(&self) {
        self.inner.dispatch(GameState::start);
    }

    pub fn toggle_pause(&self) {
        self.inner.dispatch(GameState::toggle_pause);
    }

    pub fn move_left(&self) {
        self.inner.dispatch(GameState::move_left);
    }

    pub fn move_right(&self) {
        self.inner.dispatch(GameState::move_right);
    }

    pub fn rotate(&self, direction: RotateDirection) {
        self.inner.dispatch(|state| state.rotate(direction));
    }

    pub fn soft_drop(&self, active: bool) {
        self.inner.dispatch(|state| state.soft_drop(active));
    }

    pub fn hard_drop(&self) {
        self.inner.dispatch(GameState::hard_drop);
    }

    pub fn hold(&self) {
        self.inner.dispatch(GameState::hold);
    }

    pub fn restart(&self) {
        self.inner.dispatch(GameState::restart);
    }

    /// Route a decoded input action
    pub fn apply(&self, action: GameAction) {
        self.inner.dispatch(|state| state.apply(action));
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.inner.lock_state().snapshot()
    }

    /// Refresh a caller-owned snapshot without allocating
    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.inner.lock_state().snapshot_into(out);
    }

    pub fn status(&self) -> GameStatus {
        self.inner.lock_state().status()
    }

    /// Read the model under the game lock
    pub fn inspect<R>(&self, f: impl FnOnce(&GameState) -> R) -> R {
        f(&self.inner.lock_state())
    }

    /// Mutate the model directly and reconcile the timers with the directives `f` returns.
    ///
    /// Meant for scenario setup in hosts and tests.
    pub fn with_state(&self, f: impl FnOnce(&mut GameState) -> Directives) {
        self.inner.dispatch(f);
    }

    pub fn is_gravity_running(&self) -> bool {
        self.inner.gravity.is_running()
    }

    pub fn is_lock_delay_running(&self) -> bool {
        self.inner.lock_delay.is_running()
    }

    pub fn gravity_interval(&self) -> Duration {
        self.inner.gravity.interval()
    }

    pub fn lock_delay(&self) -> Duration {
        self.inner.lock_delay.delay()
    }
}
