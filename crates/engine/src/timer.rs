//! Precision timer primitive shared by gravity and lock delay
//!
//! Each timer owns one long-lived worker thread. State lives behind a `Mutex` paired with a
//! `Condvar`, so every control call (start, stop, rearm, fire now) wakes a blocked worker
//! immediately. While more than `busy_wait_threshold` remains the worker blocks on the condvar;
//! the final stretch is busy-polled for accuracy.
//!
//! Callbacks run on the worker thread with the timer's own mutex released, so a callback may
//! call back into any timer, including its own. Each arming gets a new generation number and the
//! callback receives the one it fired for; comparing it with [`PrecisionTimer::generation`] tells
//! a callback whether the timer was rearmed while it waited on other locks.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{EngineError, Result};

/// Invoked with the arming generation that fired
pub type TimerCallback = Box<dyn FnMut(u64) + Send + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    /// Fires every interval until stopped
    Periodic,
    /// Fires once per arming, then disarms itself
    OneShot,
}

#[derive(Debug)]
struct TimerState {
    running: bool,
    interval: Duration,
    deadline: Instant,
    fire_now: bool,
    shutdown: bool,
    fired: u64,
    generation: u64,
}

#[derive(Debug)]
struct Shared {
    name: &'static str,
    mode: TimerMode,
    busy_wait_threshold: Duration,
    state: Mutex<TimerState>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, TimerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct PrecisionTimer {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl PrecisionTimer {
    /// Spawn the worker thread. The timer starts disarmed.
    pub fn new(
        name: &'static str,
        mode: TimerMode,
        interval: Duration,
        busy_wait_threshold: Duration,
        callback: TimerCallback,
    ) -> Result<Self> {
        let shared = Arc::new(Shared {
            name,
            mode,
            busy_wait_threshold,
            state: Mutex::new(TimerState {
                running: false,
                interval,
                deadline: Instant::now(),
                fire_now: false,
                shutdown: false,
                fired: 0,
                generation: 0,
            }),
            wake: Condvar::new(),
        });

        let worker = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || run(worker, callback))
            .map_err(|source| EngineError::Spawn { name, source })?;

        Ok(Self {
            shared,
            handle: Some(handle),
        })
    }

    /// Arm with a fresh deadline. No-op if already running.
    pub fn start(&self) {
        let mut state = self.shared.lock();
        if state.running {
            return;
        }
        state.running = true;
        state.fire_now = false;
        state.deadline = Instant::now() + state.interval;
        state.generation += 1;
        self.shared.wake.notify_one();
    }

    /// Disarm. No-op if not running.
    pub fn stop(&self) {
        let mut state = self.shared.lock();
        if !state.running {
            return;
        }
        state.running = false;
        state.fire_now = false;
        state.generation += 1;
        self.shared.wake.notify_one();
    }

    /// Arm with a fresh deadline whether or not it was running
    pub fn restart(&self) {
        let mut state = self.shared.lock();
        state.running = true;
        state.fire_now = false;
        state.deadline = Instant::now() + state.interval;
        state.generation += 1;
        self.shared.wake.notify_one();
    }

    /// Arm if needed and collapse the remaining wait to zero
    pub fn fire_now(&self) {
        let mut state = self.shared.lock();
        state.running = true;
        state.fire_now = true;
        state.generation += 1;
        self.shared.wake.notify_one();
    }

    /// Change the period. A running timer never waits longer than the new interval from now.
    pub fn set_interval(&self, interval: Duration) {
        let mut state = self.shared.lock();
        if state.interval == interval {
            return;
        }
        state.interval = interval;
        if state.running {
            let candidate = Instant::now() + interval;
            if candidate < state.deadline {
                state.deadline = candidate;
            }
            self.shared.wake.notify_one();
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().running
    }

    pub fn interval(&self) -> Duration {
        self.shared.lock().interval
    }

    /// Number of times the callback has been invoked
    pub fn fired(&self) -> u64 {
        self.shared.lock().fired
    }

    /// Bumped by every start, stop, restart and fire now
    pub fn generation(&self) -> u64 {
        self.shared.lock().generation
    }

    pub fn name(&self) -> &'static str {
        self.shared.name
    }
}

impl Drop for PrecisionTimer {
    fn drop(&mut self) {
        {
            let mut state = self.shared.lock();
            state.shutdown = true;
            state.running = false;
            self.shared.wake.notify_one();
        }
        if let Some(handle) = self.handle.take() {
            // Dropped from inside our own callback: the worker exits on its own.
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

fn run(shared: Arc<Shared>, mut callback: TimerCallback) {
    let mut state = shared.lock();
    loop {
        if state.shutdown {
            return;
        }
        if !state.running {
            state = shared.wake.wait(state).unwrap_or_else(PoisonError::into_inner);
            continue;
        }

        if state.fire_now {
            state.fire_now = false;
        } else {
            let now = Instant::now();
            if now < state.deadline {
                let remaining = state.deadline - now;
                if remaining > shared.busy_wait_threshold {
                    let block_for = remaining - shared.busy_wait_threshold;
                    state = shared
                        .wake
                        .wait_timeout(state, block_for)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0;
                } else {
                    drop(state);
                    std::hint::spin_loop();
                    state = shared.lock();
                }
                continue;
            }
        }

        match shared.mode {
            TimerMode::Periodic => state.deadline = Instant::now() + state.interval,
            TimerMode::OneShot => state.running = false,
        }
        state.fired += 1;
        let generation = state.generation;
        drop(state);

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(generation))) {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            tracing::error!(timer = shared.name, panic = %message, "timer callback panicked");
        }

        state = shared.lock();
    }
}
