//! Engine configuration
//!
//! Defaults come from the rule constants; [`EngineConfig::from_env`] lets a host override them
//! with `TETRIS_*` environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use srs_tetris_core::RulesConfig;
use srs_tetris_types::{BAG_SIZE, BUSY_WAIT_THRESHOLD_NS, LOCK_DELAY_MS};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub rules: RulesConfig,
    /// Grace period before a grounded piece locks
    pub lock_delay: Duration,
    /// Waits shorter than this spin instead of blocking
    pub busy_wait_threshold: Duration,
    /// Bag seed; a random one is drawn when absent
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rules: RulesConfig::default(),
            lock_delay: Duration::from_millis(LOCK_DELAY_MS),
            busy_wait_threshold: Duration::from_nanos(BUSY_WAIT_THRESHOLD_NS),
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Create from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let rules = RulesConfig {
            level_cap: env_or("TETRIS_LEVEL_CAP", defaults.rules.level_cap),
            lock_reset_limit: env_or("TETRIS_LOCK_RESET_LIMIT", defaults.rules.lock_reset_limit),
            soft_drop_divisor: env_or("TETRIS_SOFT_DROP_DIVISOR", defaults.rules.soft_drop_divisor),
            preview_len: env_or("TETRIS_PREVIEW_LEN", defaults.rules.preview_len),
        };
        let lock_delay_ms = env_or("TETRIS_LOCK_DELAY_MS", LOCK_DELAY_MS);
        let seed = env_parse::<u64>("TETRIS_SEED");

        Self {
            rules,
            lock_delay: Duration::from_millis(lock_delay_ms),
            busy_wait_threshold: defaults.busy_wait_threshold,
            seed,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_lock_delay(mut self, lock_delay: Duration) -> Self {
        self.lock_delay = lock_delay;
        self
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.lock_delay.is_zero() {
            return Err(EngineError::InvalidConfig("lock_delay must be positive".into()));
        }
        if self.rules.level_cap == 0 {
            return Err(EngineError::InvalidConfig("level_cap must be at least 1".into()));
        }
        if self.rules.soft_drop_divisor == 0 {
            return Err(EngineError::InvalidConfig(
                "soft_drop_divisor must be at least 1".into(),
            ));
        }
        if self.rules.preview_len > BAG_SIZE {
            return Err(EngineError::InvalidConfig(format!(
                "preview_len {} exceeds {BAG_SIZE}",
                self.rules.preview_len
            )));
        }
        Ok(())
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable config value");
            None
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env_parse(key).unwrap_or(default)
}
