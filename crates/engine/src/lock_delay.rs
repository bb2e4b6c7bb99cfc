//! Lock delay: a one-shot grace period that starts once the active piece touches down.
//!
//! The per-piece reset budget is bookkept by the game model; this timer only arms, rearms and
//! expires.

use std::time::Duration;

use crate::error::Result;
use crate::timer::{PrecisionTimer, TimerCallback, TimerMode};

pub struct LockDelayTimer {
    timer: PrecisionTimer,
}

impl LockDelayTimer {
    pub fn new(
        delay: Duration,
        busy_wait_threshold: Duration,
        on_expire: TimerCallback,
    ) -> Result<Self> {
        let timer = PrecisionTimer::new(
            "lock-delay",
            TimerMode::OneShot,
            delay,
            busy_wait_threshold,
            on_expire,
        )?;
        Ok(Self { timer })
    }

    /// Arm unless already counting down
    pub fn start(&self) {
        self.timer.start();
    }

    pub fn stop(&self) {
        self.timer.stop();
    }

    /// Rearm the full delay from now
    pub fn reset(&self) {
        self.timer.restart();
    }

    /// Expire on the worker thread as soon as possible; used by hard drop
    pub fn request_immediate_expiry(&self) {
        self.timer.fire_now();
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn delay(&self) -> Duration {
        self.timer.interval()
    }

    pub fn expirations(&self) -> u64 {
        self.timer.fired()
    }

    pub fn generation(&self) -> u64 {
        self.timer.generation()
    }

    /// True if no start, stop or reset happened since the arming that fired `generation`
    pub fn is_current(&self, generation: u64) -> bool {
        self.timer.generation() == generation
    }
}
