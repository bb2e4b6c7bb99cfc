//! Rule parameters that a session may tune

use serde::{Deserialize, Serialize};

use crate::types::{BAG_SIZE, LEVEL_CAP, LOCK_RESET_LIMIT, PREVIEW_LEN, SOFT_DROP_DIVISOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Highest reachable level (at least 1)
    pub level_cap: u32,
    /// Lock delay restarts allowed per piece
    pub lock_reset_limit: u8,
    /// Soft drop divides the gravity interval by this
    pub soft_drop_divisor: u32,
    /// Upcoming pieces exposed in snapshots, at most one bag
    pub preview_len: usize,
}

impl RulesConfig {
    /// Copy with every field forced into its legal range
    pub fn clamped(self) -> Self {
        Self {
            level_cap: self.level_cap.max(1),
            lock_reset_limit: self.lock_reset_limit,
            soft_drop_divisor: self.soft_drop_divisor.max(1),
            preview_len: self.preview_len.min(BAG_SIZE),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            level_cap: LEVEL_CAP,
            lock_reset_limit: LOCK_RESET_LIMIT,
            soft_drop_divisor: SOFT_DROP_DIVISOR,
            preview_len: PREVIEW_LEN,
        }
    }
}
