//! Gravity scheduler: a periodic tick whose period follows the level and soft drop state

use std::time::Duration;

use crate::error::Result;
use crate::timer::{PrecisionTimer, TimerCallback, TimerMode};

pub struct GravityScheduler {
    timer: PrecisionTimer,
}

impl GravityScheduler {
    pub fn new(
        interval: Duration,
        busy_wait_threshold: Duration,
        on_tick: TimerCallback,
    ) -> Result<Self> {
        let timer = PrecisionTimer::new(
            "gravity",
            TimerMode::Periodic,
            interval,
            busy_wait_threshold,
            on_tick,
        )?;
        Ok(Self { timer })
    }

    pub fn start(&self) {
        self.timer.start();
    }

    pub fn stop(&self) {
        self.timer.stop();
    }

    /// Begin a fresh period from now
    pub fn restart(&self) {
        self.timer.restart();
    }

    /// Takes effect no later than one new interval from now
    pub fn set_interval(&self, interval: Duration) {
        self.timer.set_interval(interval);
    }

    pub fn interval(&self) -> Duration {
        self.timer.interval()
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn ticks(&self) -> u64 {
        self.timer.fired()
    }
}
