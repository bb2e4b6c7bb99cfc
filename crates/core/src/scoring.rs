//! Scoring module - line clears, T-spins, combo, back-to-back and level
//!
//! Every lock is classified into a [`ScoreAction`] and awarded `level × base` points, using the
//! level in effect before this lock's lines are counted.
//!
//! - T-Spin: both front corners and at least one back corner occupied, and the rotation that
//!   put the T there succeeded on the fifth (last-resort) kick.
//! - Mini T-Spin: both back corners and at least one front corner occupied. No kick gate.
//! - Combo: +1 on every clearing lock, reset to 0 on a lock that clears nothing.
//! - Back-to-back: a qualifying clear (Tetris or a line-clearing T-spin) while the chain is
//!   active earns `base × level / 2` extra. An ordinary clear breaks the chain.
//! - Level: `min(lines / 10 + 1, level_cap)`.

use std::time::Duration;

use crate::grid::Grid;
use crate::pieces::t_corner_offsets;
use crate::types::{
    PieceKind, Rotation, ScoreAction, TSpinKind, HARD_DROP_POINTS, LINES_PER_LEVEL,
    MIN_DROP_INTERVAL_NS, SOFT_DROP_POINTS, START_LEVEL,
};

/// Kick ordinal required for a full T-spin
pub const T_SPIN_KICK_ORDINAL: u8 = 5;

/// Probe the T piece's four diagonal corners at (x, y).
///
/// Out-of-bounds corners count as occupied. Order: front-left, front-right, back-left, back-right.
pub fn capture_corners(grid: &Grid, rotation: Rotation, x: i8, y: i8) -> [bool; 4] {
    t_corner_offsets(rotation).map(|(dx, dy)| !grid.is_valid(x + dx, y + dy))
}

/// Classify corner occupancy into a T-spin kind
pub fn classify_t_spin(corners: [bool; 4], kick_ordinal: u8) -> TSpinKind {
    let [front_left, front_right, back_left, back_right] = corners;
    if kick_ordinal == T_SPIN_KICK_ORDINAL && front_left && front_right && (back_left || back_right)
    {
        TSpinKind::Full
    } else if back_left && back_right && (front_left || front_right) {
        TSpinKind::Mini
    } else {
        TSpinKind::None
    }
}

/// Map a T-spin kind and cleared line count to the scored action.
///
/// A Mini T-spin that clears two or more lines scores as the plain clear.
pub fn classify_action(tspin: TSpinKind, lines: u32) -> ScoreAction {
    match (tspin, lines) {
        (TSpinKind::Full, 0) => ScoreAction::TSpin,
        (TSpinKind::Full, 1) => ScoreAction::TSpinSingle,
        (TSpinKind::Full, 2) => ScoreAction::TSpinDouble,
        (TSpinKind::Full, 3) => ScoreAction::TSpinTriple,
        (TSpinKind::Mini, 0) => ScoreAction::MiniTSpin,
        (TSpinKind::Mini, 1) => ScoreAction::MiniTSpinSingle,
        (_, 0) => ScoreAction::Nothing,
        (_, 1) => ScoreAction::Single,
        (_, 2) => ScoreAction::Double,
        (_, 3) => ScoreAction::Triple,
        _ => ScoreAction::Tetris,
    }
}

/// Calculate drop score
/// soft_drop: +1 per cell
/// hard_drop: +2 per cell
pub fn calculate_drop_score(cells: u32, is_hard_drop: bool) -> u32 {
    if is_hard_drop {
        cells * HARD_DROP_POINTS
    } else {
        cells * SOFT_DROP_POINTS
    }
}

/// Level for a total line count, starting at 1
pub fn calculate_level(total_lines: u32, level_cap: u32) -> u32 {
    (total_lines / LINES_PER_LEVEL + START_LEVEL).min(level_cap)
}

/// Gravity interval for a level: `(0.8 - (level - 1) * 0.007) ^ (level - 1)` seconds.
///
/// Clamped so it never drops below 1ms.
pub fn drop_interval(level: u32) -> Duration {
    let steps = level.saturating_sub(1);
    let base = 0.8 - steps as f64 * 0.007;
    let nanos = (base.powi(steps as i32) * 1_000_000_000.0) as u64;
    Duration::from_nanos(nanos.max(MIN_DROP_INTERVAL_NS))
}

/// Gravity interval while soft drop is held
pub fn soft_drop_interval(level: u32, divisor: u32) -> Duration {
    let interval = drop_interval(level) / divisor.max(1);
    interval.max(Duration::from_nanos(MIN_DROP_INTERVAL_NS))
}

/// Score calculation result for one lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    pub action: ScoreAction,
    /// `level × base`
    pub base_points: u32,
    /// Back-to-back bonus added on top of `base_points`
    pub b2b_bonus: u32,
    pub total: u32,
    /// Level after this lock's lines were counted
    pub level: u32,
    pub level_changed: bool,
}

/// Running score, level, combo and back-to-back chain for one game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreState {
    score: u64,
    level: u32,
    total_lines: u32,
    combo: u32,
    back_to_back: bool,
    last_action: ScoreAction,
    corners: [bool; 4],
    tetris_count: u32,
    t_spin_count: u32,
    level_cap: u32,
}

impl ScoreState {
    pub fn new(level_cap: u32) -> Self {
        Self {
            score: 0,
            level: START_LEVEL,
            total_lines: 0,
            combo: 0,
            back_to_back: false,
            last_action: ScoreAction::Nothing,
            corners: [false; 4],
            tetris_count: 0,
            t_spin_count: 0,
            level_cap: level_cap.max(START_LEVEL),
        }
    }

    /// Snapshot the T corners at lock time, before the cascade moves anything
    pub fn capture_corners(&mut self, grid: &Grid, rotation: Rotation, x: i8, y: i8) {
        self.corners = capture_corners(grid, rotation, x, y);
    }

    /// Score one lock.
    ///
    /// `spin_attempted` is whether the last manipulation before the lock was a rotation attempt.
    pub fn record_lock(
        &mut self,
        kind: PieceKind,
        spin_attempted: bool,
        kick_ordinal: u8,
        lines: u32,
    ) -> ScoreResult {
        let tspin = if spin_attempted && kind == PieceKind::T {
            classify_t_spin(self.corners, kick_ordinal)
        } else {
            TSpinKind::None
        };
        self.corners = [false; 4];

        let action = classify_action(tspin, lines);
        let base_points = self.level * action.base_score();
        let mut b2b_bonus = 0;

        if action.is_t_spin() {
            self.t_spin_count += 1;
        }
        if action == ScoreAction::Tetris {
            self.tetris_count += 1;
        }

        if lines == 0 {
            self.combo = 0;
        } else {
            self.combo += 1;
            if action.qualifies_for_b2b() {
                if self.back_to_back {
                    b2b_bonus = base_points / 2;
                }
                self.back_to_back = true;
            } else {
                self.back_to_back = false;
            }
        }

        let total = base_points + b2b_bonus;
        self.score += total as u64;
        self.last_action = action;

        let previous_level = self.level;
        self.total_lines += lines;
        self.level = calculate_level(self.total_lines, self.level_cap);

        ScoreResult {
            action,
            base_points,
            b2b_bonus,
            total,
            level: self.level,
            level_changed: self.level != previous_level,
        }
    }

    /// Add points for rows descended by a drop
    pub fn add_drop_points(&mut self, rows: u32, is_hard_drop: bool) -> u32 {
        let points = calculate_drop_score(rows, is_hard_drop);
        self.score += points as u64;
        points
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn total_lines(&self) -> u32 {
        self.total_lines
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn back_to_back(&self) -> bool {
        self.back_to_back
    }

    pub fn last_action(&self) -> ScoreAction {
        self.last_action
    }

    pub fn corners(&self) -> [bool; 4] {
        self.corners
    }

    pub fn tetris_count(&self) -> u32 {
        self.tetris_count
    }

    pub fn t_spin_count(&self) -> u32 {
        self.t_spin_count
    }
}

impl Default for ScoreState {
    fn default() -> Self {
        Self::new(crate::types::LEVEL_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LEVEL_CAP;

    const ALL: [bool; 4] = [true; 4];

    #[test]
    fn test_full_t_spin_needs_last_kick() {
        let corners = [true, true, true, false];
        assert_eq!(classify_t_spin(corners, 5), TSpinKind::Full);
        // Same corners through an earlier kick fall through to the mini check.
        assert_eq!(classify_t_spin(corners, 1), TSpinKind::None);
        assert_eq!(classify_t_spin(ALL, 1), TSpinKind::Mini);
    }

    #[test]
    fn test_mini_t_spin_has_no_kick_gate() {
        assert_eq!(classify_t_spin([true, false, true, true], 1), TSpinKind::Mini);
        assert_eq!(classify_t_spin([false, true, true, true], 3), TSpinKind::Mini);
        assert_eq!(classify_t_spin([false, false, true, true], 5), TSpinKind::None);
        assert_eq!(classify_t_spin([true, true, false, false], 5), TSpinKind::None);
    }

    #[test]
    fn test_classify_action_table() {
        assert_eq!(classify_action(TSpinKind::None, 0), ScoreAction::Nothing);
        assert_eq!(classify_action(TSpinKind::None, 4), ScoreAction::Tetris);
        assert_eq!(classify_action(TSpinKind::Full, 0), ScoreAction::TSpin);
        assert_eq!(classify_action(TSpinKind::Full, 2), ScoreAction::TSpinDouble);
        assert_eq!(classify_action(TSpinKind::Mini, 1), ScoreAction::MiniTSpinSingle);
        assert_eq!(classify_action(TSpinKind::Mini, 2), ScoreAction::Double);
    }

    #[test]
    fn test_line_clear_scores_scale_with_level() {
        let mut state = ScoreState::new(LEVEL_CAP);
        let result = state.record_lock(PieceKind::I, false, 0, 1);
        assert_eq!(result.total, 100);

        let mut state = ScoreState::new(LEVEL_CAP);
        for _ in 0..3 {
            state.record_lock(PieceKind::I, false, 0, 4);
        }
        assert_eq!(state.level(), 2);
        let before = state.score();
        let result = state.record_lock(PieceKind::O, false, 0, 2);
        assert_eq!(result.base_points, 600);
        assert_eq!(state.score() - before, 600);
    }

    #[test]
    fn test_back_to_back_bonus_on_second_tetris() {
        let mut state = ScoreState::new(LEVEL_CAP);
        let first = state.record_lock(PieceKind::I, false, 0, 4);
        assert_eq!(first.b2b_bonus, 0);
        assert!(state.back_to_back());

        let second = state.record_lock(PieceKind::I, false, 0, 4);
        assert_eq!(second.b2b_bonus, 400);
        assert_eq!(second.total, 1200);
        assert_eq!(state.score(), 2000);
        assert_eq!(state.tetris_count(), 2);
    }

    #[test]
    fn test_ordinary_clear_breaks_chain() {
        let mut state = ScoreState::new(LEVEL_CAP);
        state.record_lock(PieceKind::I, false, 0, 4);
        state.record_lock(PieceKind::L, false, 0, 1);
        assert!(!state.back_to_back());
        let result = state.record_lock(PieceKind::I, false, 0, 4);
        assert_eq!(result.b2b_bonus, 0);
    }

    #[test]
    fn test_non_clearing_lock_keeps_chain_resets_combo() {
        let mut state = ScoreState::new(LEVEL_CAP);
        state.record_lock(PieceKind::I, false, 0, 4);
        assert_eq!(state.combo(), 1);
        state.record_lock(PieceKind::O, false, 0, 0);
        assert_eq!(state.combo(), 0);
        assert!(state.back_to_back());
        assert_eq!(state.last_action(), ScoreAction::Nothing);
    }

    #[test]
    fn test_t_spin_uses_captured_corners() {
        let mut grid = Grid::new();
        // T pointing East at anchor (3, 36): front corners at x=5, back at x=3.
        grid.set_cell(5, 36, PieceKind::Z);
        grid.set_cell(5, 38, PieceKind::Z);
        grid.set_cell(3, 38, PieceKind::Z);

        let mut state = ScoreState::new(LEVEL_CAP);
        state.capture_corners(&grid, Rotation::East, 3, 36);
        assert_eq!(state.corners(), [true, true, false, true]);

        let result = state.record_lock(PieceKind::T, true, 5, 0);
        assert_eq!(result.action, ScoreAction::TSpin);
        assert_eq!(result.total, 400);
        assert_eq!(state.t_spin_count(), 1);
    }

    #[test]
    fn test_failed_classification_does_not_count() {
        let mut state = ScoreState::new(LEVEL_CAP);
        let result = state.record_lock(PieceKind::T, true, 5, 0);
        assert_eq!(result.action, ScoreAction::Nothing);
        assert_eq!(state.t_spin_count(), 0);
    }

    #[test]
    fn test_level_calculation() {
        assert_eq!(calculate_level(0, 15), 1);
        assert_eq!(calculate_level(9, 15), 1);
        assert_eq!(calculate_level(10, 15), 2);
        assert_eq!(calculate_level(500, 15), 15);
    }

    #[test]
    fn test_level_up_reported() {
        let mut state = ScoreState::new(LEVEL_CAP);
        state.record_lock(PieceKind::I, false, 0, 4);
        state.record_lock(PieceKind::I, false, 0, 4);
        let result = state.record_lock(PieceKind::I, false, 0, 2);
        assert!(result.level_changed);
        assert_eq!(result.level, 2);
        // The level-up lock is still scored at the old level.
        assert_eq!(result.base_points, 300);
    }

    #[test]
    fn test_drop_intervals() {
        assert_eq!(drop_interval(1), Duration::from_secs(1));
        assert!(drop_interval(2) < drop_interval(1));
        assert!(drop_interval(15) >= Duration::from_millis(1));
        assert!(drop_interval(15) < Duration::from_millis(20));
        assert_eq!(soft_drop_interval(1, 20), Duration::from_millis(50));
    }

    #[test]
    fn test_drop_scores() {
        assert_eq!(calculate_drop_score(10, false), 10);
        assert_eq!(calculate_drop_score(10, true), 20);
    }
}
