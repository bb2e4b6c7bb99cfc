//! Game state module - manages the complete game state
//!
//! This module ties together the grid, bag, rotation system, cascade and scoring, and hosts the
//! `Ready -> Playing <-> Paused -> GameOver` state machine.
//!
//! `GameState` owns no clocks. Operations that affect timing return [`Directives`] telling the
//! owner what to do with its gravity and lock delay timers; [`GameState::gravity_step`] and
//! [`GameState::on_lock_delay_expired`] are the entry points those timers call back into.

use arrayvec::ArrayVec;
use std::time::Duration;

use crate::bag::PieceBag;
use crate::cascade;
use crate::collision::{absolute_cells, can_place_at};
use crate::config::RulesConfig;
use crate::grid::Grid;
use crate::pieces::{self, PieceShape};
use crate::scoring::{drop_interval, soft_drop_interval, ScoreState};
use crate::snapshot::{ActiveSnapshot, GameSnapshot, LockReport};
use crate::types::*;

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub rotation: Rotation,
    /// Anchor column
    pub x: i8,
    /// Anchor row
    pub y: i8,
    /// Offsets from the anchor for the current rotation
    pub minos: PieceShape,
}

impl ActivePiece {
    /// Create a piece at the spawn anchor facing North
    pub fn spawn(kind: PieceKind) -> Self {
        Self::new(kind, Rotation::North, SPAWN_X, SPAWN_Y)
    }

    pub fn new(kind: PieceKind, rotation: Rotation, x: i8, y: i8) -> Self {
        Self {
            kind,
            rotation,
            x,
            y,
            minos: pieces::get_shape(kind, rotation),
        }
    }

    /// Absolute coordinates of the four minos
    pub fn cells(&self) -> [(i8, i8); 4] {
        absolute_cells(&self.minos, self.x, self.y)
    }

    /// Check if all minos are at valid positions on the grid
    pub fn fits(&self, grid: &Grid) -> bool {
        can_place_at(grid, &self.minos, self.x, self.y)
    }

    /// Check if the piece is grounded (cannot descend one row)
    pub fn is_grounded(&self, grid: &Grid) -> bool {
        !can_place_at(grid, &self.minos, self.x, self.y + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HoldSlot {
    pub piece: Option<PieceKind>,
    pub used_this_turn: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockDelayState {
    pub running: bool,
    pub reset_count: u8,
}

/// What the gravity timer should do after an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GravityDirective {
    #[default]
    Keep,
    /// Start ticking if stopped
    Resume,
    /// Stop and start again from a fresh period
    Restart,
    /// Stop ticking
    Halt,
}

/// What the lock delay timer should do after an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockDirective {
    #[default]
    Keep,
    /// Arm if not already running
    Start,
    /// Rearm from zero
    Restart,
    /// Arm if needed and fire immediately
    ExpireNow,
    /// Disarm
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Directives {
    pub gravity: GravityDirective,
    pub lock_delay: LockDirective,
}

impl Directives {
    pub const NONE: Self = Self::new(GravityDirective::Keep, LockDirective::Keep);

    pub const fn new(gravity: GravityDirective, lock_delay: LockDirective) -> Self {
        Self {
            gravity,
            lock_delay,
        }
    }

    pub const fn halt_all() -> Self {
        Self::new(GravityDirective::Halt, LockDirective::Cancel)
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    grid: Grid,
    bag: PieceBag,
    active: Option<ActivePiece>,
    hold: HoldSlot,
    lock_delay: LockDelayState,
    score: ScoreState,
    status: GameStatus,
    config: RulesConfig,
    /// Last player action on the active piece was a rotation attempt
    spin_attempted: bool,
    /// Kick ordinal of the latest rotation attempt; 0 when it failed or a player move followed
    last_kick_ordinal: u8,
    soft_dropping: bool,
    /// Hard drop moved the piece to rest; the lock delay callback finishes the lock
    hard_drop_pending: bool,
    last_lock: Option<LockReport>,
    /// Monotonic episode id (increments on restart).
    episode_id: u32,
    /// Monotonic id for spawned pieces (increments only on spawn from the bag).
    piece_id: u32,
}

impl GameState {
    /// Create a new game with the given RNG seed
    pub fn new(seed: u64, config: RulesConfig) -> Self {
        let config = config.clamped();
        Self {
            grid: Grid::new(),
            bag: PieceBag::new(seed),
            active: None,
            hold: HoldSlot::default(),
            lock_delay: LockDelayState::default(),
            score: ScoreState::new(config.level_cap),
            status: GameStatus::Ready,
            config,
            spin_attempted: false,
            last_kick_ordinal: 0,
            soft_dropping: false,
            hard_drop_pending: false,
            last_lock: None,
            episode_id: 0,
            piece_id: 0,
        }
    }

    /// Leave `Ready` and spawn the first piece
    pub fn start(&mut self) -> Directives {
        if self.status != GameStatus::Ready {
            return Directives::NONE;
        }
        self.status = GameStatus::Playing;
        tracing::info!(seed = self.bag.seed(), episode = self.episode_id, "game started");

        if !self.spawn() {
            return Directives::halt_all();
        }
        Directives::new(GravityDirective::Resume, LockDirective::Keep)
    }

    /// `Playing -> Paused` stops both timers; `Paused -> Playing` resumes gravity only
    pub fn toggle_pause(&mut self) -> Directives {
        match self.status {
            GameStatus::Playing => {
                self.status = GameStatus::Paused;
                self.lock_delay.running = false;
                Directives::halt_all()
            }
            GameStatus::Paused => {
                self.status = GameStatus::Playing;
                Directives::new(GravityDirective::Resume, LockDirective::Keep)
            }
            _ => Directives::NONE,
        }
    }

    /// Recreate the whole model with a fresh seed and start playing
    pub fn restart(&mut self) -> Directives {
        let seed = self.bag.next_seed();
        let episode_id = self.episode_id.wrapping_add(1);
        *self = Self::new(seed, self.config);
        self.episode_id = episode_id;
        tracing::info!(seed, episode = episode_id, "game restarted");

        let started = self.start();
        Directives {
            gravity: match started.gravity {
                GravityDirective::Resume => GravityDirective::Restart,
                other => other,
            },
            lock_delay: LockDirective::Cancel,
        }
    }

    /// Draw the next piece from the bag and place it at the spawn anchor.
    ///
    /// Returns false and ends the game if the spawn position collides (block out).
    pub fn spawn(&mut self) -> bool {
        let kind = self.bag.draw();
        let piece = ActivePiece::spawn(kind);

        self.lock_delay = LockDelayState::default();
        self.spin_attempted = false;
        self.last_kick_ordinal = 0;
        self.hard_drop_pending = false;

        if !piece.fits(&self.grid) {
            self.active = None;
            self.game_over("block out");
            return false;
        }

        self.active = Some(piece);
        self.piece_id = self.piece_id.wrapping_add(1);
        true
    }

    fn game_over(&mut self, reason: &'static str) {
        self.status = GameStatus::GameOver;
        self.soft_dropping = false;
        tracing::info!(
            reason,
            score = self.score.score(),
            lines = self.score.total_lines(),
            "game over"
        );
    }

    /// Playing, with a piece that is not already committed by a hard drop
    fn is_manipulable(&self) -> bool {
        self.status == GameStatus::Playing && self.active.is_some() && !self.hard_drop_pending
    }

    /// Check if piece can move in given direction
    pub fn can_move(&self, dx: i8, dy: i8) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        can_place_at(&self.grid, &active.minos, active.x + dx, active.y + dy)
    }

    /// Translate the active piece if the target is free. No-op otherwise.
    ///
    /// Leaves the spin history alone; gravity moves through here too.
    pub fn move_by(&mut self, dx: i8, dy: i8) -> bool {
        if !self.can_move(dx, dy) {
            return false;
        }
        if let Some(active) = self.active.as_mut() {
            active.x += dx;
            active.y += dy;
        }
        true
    }

    /// A player action other than rotation ends any spin
    fn clear_spin(&mut self) {
        self.spin_attempted = false;
        self.last_kick_ordinal = 0;
    }

    pub fn move_left(&mut self) -> Directives {
        self.shift(-1)
    }

    pub fn move_right(&mut self) -> Directives {
        self.shift(1)
    }

    fn shift(&mut self, dx: i8) -> Directives {
        if !self.is_manipulable() || !self.move_by(dx, 0) {
            return Directives::NONE;
        }
        self.clear_spin();
        self.after_manipulation()
    }

    /// Rotate the active piece with SRS wall kicks.
    ///
    /// Every attempt marks the last action as a spin, whether or not a kick fits. The kick
    /// ordinal always describes this attempt: 0 if no kick fits.
    pub fn rotate(&mut self, direction: RotateDirection) -> Directives {
        if !self.is_manipulable() {
            return Directives::NONE;
        }
        let Some(active) = self.active else {
            return Directives::NONE;
        };
        self.spin_attempted = true;
        self.last_kick_ordinal = 0;

        let Some(outcome) = pieces::try_rotate(
            &self.grid,
            active.kind,
            active.rotation,
            &active.minos,
            active.x,
            active.y,
            direction,
        ) else {
            return Directives::NONE;
        };

        self.active = Some(ActivePiece {
            rotation: outcome.rotation,
            x: outcome.x,
            y: outcome.y,
            minos: outcome.shape,
            ..active
        });
        self.last_kick_ordinal = outcome.kick_ordinal;
        self.after_manipulation()
    }

    /// Restart the lock delay after a successful move or rotation while grounded.
    ///
    /// Refused once the per-piece reset limit is spent, so the timer then expires on schedule.
    fn after_manipulation(&mut self) -> Directives {
        if !self.lock_delay.running || self.can_move(0, 1) {
            return Directives::NONE;
        }
        if self.lock_delay.reset_count >= self.config.lock_reset_limit {
            return Directives::NONE;
        }
        self.lock_delay.reset_count += 1;
        Directives::new(GravityDirective::Keep, LockDirective::Restart)
    }

    /// Begin or end soft drop. The owner re-reads [`GameState::gravity_interval`] afterwards.
    ///
    /// Only a playable piece can start soft dropping; releasing is always accepted.
    pub fn soft_drop(&mut self, active: bool) -> Directives {
        if active {
            if !self.is_manipulable() {
                return Directives::NONE;
            }
            self.clear_spin();
        }
        self.soft_dropping = active;
        Directives::NONE
    }

    /// Resting anchor row and rows descended, without mutating anything
    pub fn hard_drop_target(&self) -> Option<(i8, u32)> {
        let active = self.active?;
        let mut rows: i8 = 0;
        while can_place_at(&self.grid, &active.minos, active.x, active.y + rows + 1) {
            rows += 1;
        }
        Some((active.y + rows, rows as u32))
    }

    /// Absolute cells of the hard-drop projection
    pub fn ghost(&self) -> Option<[(i8, i8); 4]> {
        let active = self.active?;
        let (y, _) = self.hard_drop_target()?;
        Some(absolute_cells(&active.minos, active.x, y))
    }

    /// Move the piece to rest and award the drop bonus.
    ///
    /// The lock itself happens when the owner fires the lock delay immediately
    /// ([`LockDirective::ExpireNow`]); until then the piece accepts no further input.
    pub fn hard_drop(&mut self) -> Directives {
        if !self.is_manipulable() {
            return Directives::NONE;
        }
        let Some((y, rows)) = self.hard_drop_target() else {
            return Directives::NONE;
        };
        if rows > 0 {
            if let Some(active) = self.active.as_mut() {
                active.y = y;
            }
            self.clear_spin();
        }
        self.score.add_drop_points(rows, true);
        self.hard_drop_pending = true;
        self.lock_delay.running = true;
        Directives::new(GravityDirective::Halt, LockDirective::ExpireNow)
    }

    /// Swap the active piece with the hold slot, once per lock
    pub fn hold(&mut self) -> Directives {
        if !self.is_manipulable() || self.hold.used_this_turn {
            return Directives::NONE;
        }
        let Some(active) = self.active.take() else {
            return Directives::NONE;
        };

        let swapped = self.hold.piece.replace(active.kind);
        self.hold.used_this_turn = true;
        self.lock_delay = LockDelayState::default();
        self.clear_spin();

        match swapped {
            Some(kind) => {
                let piece = ActivePiece::spawn(kind);
                if !piece.fits(&self.grid) {
                    self.game_over("block out");
                    return Directives::halt_all();
                }
                self.active = Some(piece);
            }
            None => {
                if !self.spawn() {
                    return Directives::halt_all();
                }
            }
        }
        Directives::new(GravityDirective::Resume, LockDirective::Cancel)
    }

    /// Fix the active piece into the grid, clear lines and score.
    ///
    /// Does not spawn the next piece. Ends the game if any mino rests in the buffer (lock out).
    pub fn lock_piece(&mut self) -> Option<LockReport> {
        let active = self.active.take()?;
        let cells = active.cells();
        let lock_out = cells.iter().any(|&(_, y)| Grid::is_buffer_row(y));

        if !self.grid.lock_piece(&cells, active.kind) {
            tracing::warn!(?cells, kind = ?active.kind, "active piece overlaps the grid at lock");
        }

        if active.kind == PieceKind::T {
            self.score
                .capture_corners(&self.grid, active.rotation, active.x, active.y);
        }
        let lines = cascade::resolve(&mut self.grid);
        let result = self.score.record_lock(
            active.kind,
            self.spin_attempted,
            self.last_kick_ordinal,
            lines,
        );
        if result.level_changed {
            tracing::info!(level = result.level, "level up");
        }

        self.spin_attempted = false;
        self.last_kick_ordinal = 0;
        self.hard_drop_pending = false;
        self.lock_delay = LockDelayState::default();
        self.hold.used_this_turn = false;

        let report = LockReport {
            kind: active.kind,
            lines_cleared: lines,
            action: result.action,
            points: result.total,
            b2b_bonus: result.b2b_bonus,
            combo: self.score.combo(),
            back_to_back: self.score.back_to_back(),
            lock_out,
        };
        tracing::debug!(?report, "piece locked");
        self.last_lock = Some(report);

        if lock_out {
            self.game_over("lock out");
        }
        Some(report)
    }

    /// One gravity tick: descend a row, or halt gravity and arm the lock delay when grounded
    pub fn gravity_step(&mut self) -> Directives {
        match self.status {
            GameStatus::Playing => {}
            GameStatus::GameOver => return Directives::halt_all(),
            _ => return Directives::NONE,
        }
        if self.active.is_none() {
            return Directives::NONE;
        }
        if self.hard_drop_pending {
            self.lock_delay.running = true;
            return Directives::new(GravityDirective::Halt, LockDirective::ExpireNow);
        }

        if self.move_by(0, 1) {
            if self.soft_dropping {
                self.score.add_drop_points(1, false);
            }
            return Directives::NONE;
        }

        self.lock_delay.running = true;
        Directives::new(GravityDirective::Halt, LockDirective::Start)
    }

    /// Lock delay expiry: lock and spawn if still grounded, otherwise let gravity take over
    pub fn on_lock_delay_expired(&mut self) -> Directives {
        if self.status != GameStatus::Playing || !self.lock_delay.running {
            return Directives::NONE;
        }
        self.lock_delay.running = false;
        if self.active.is_none() {
            return Directives::NONE;
        }

        if !self.hard_drop_pending && self.can_move(0, 1) {
            return Directives::new(GravityDirective::Resume, LockDirective::Keep);
        }

        self.lock_piece();
        if self.status == GameStatus::GameOver || !self.spawn() {
            return Directives::halt_all();
        }
        Directives::new(GravityDirective::Resume, LockDirective::Keep)
    }

    /// Apply a game action
    pub fn apply(&mut self, action: GameAction) -> Directives {
        match action {
            GameAction::Start => self.start(),
            GameAction::MoveLeft => self.move_left(),
            GameAction::MoveRight => self.move_right(),
            GameAction::SoftDropStart => self.soft_drop(true),
            GameAction::SoftDropStop => self.soft_drop(false),
            GameAction::HardDrop => self.hard_drop(),
            GameAction::RotateCw => self.rotate(RotateDirection::Clockwise),
            GameAction::RotateCcw => self.rotate(RotateDirection::CounterClockwise),
            GameAction::Hold => self.hold(),
            GameAction::Pause => self.toggle_pause(),
            GameAction::Restart => self.restart(),
        }
    }

    /// Current gravity period, accounting for soft drop
    pub fn gravity_interval(&self) -> Duration {
        if self.soft_dropping {
            soft_drop_interval(self.score.level(), self.config.soft_drop_divisor)
        } else {
            drop_interval(self.score.level())
        }
    }

    /// Put a specific piece in play, replacing the active one.
    ///
    /// For scenario setup and tooling. Returns false if the piece does not fit.
    pub fn place_active(&mut self, piece: ActivePiece) -> bool {
        if !piece.fits(&self.grid) {
            return false;
        }
        self.active = Some(piece);
        self.spin_attempted = false;
        self.last_kick_ordinal = 0;
        self.hard_drop_pending = false;
        true
    }

    pub fn is_grounded(&self) -> bool {
        self.active.is_some_and(|p| p.is_grounded(&self.grid))
    }

    pub fn next_queue(&self) -> ArrayVec<PieceKind, BAG_SIZE> {
        self.bag.preview(self.config.preview_len)
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.grid.write_visible(&mut out.board);
        out.active = self.active.map(ActiveSnapshot::from);
        out.ghost = self.ghost();
        out.hold = self.hold.piece;
        out.can_hold = !self.hold.used_this_turn;
        out.next_queue = self.next_queue();
        out.score = self.score.score();
        out.level = self.score.level();
        out.lines = self.score.total_lines();
        out.combo = self.score.combo();
        out.back_to_back = self.score.back_to_back();
        out.last_action = self.score.last_action();
        out.tetris_count = self.score.tetris_count();
        out.t_spin_count = self.score.t_spin_count();
        out.status = self.status;
        out.episode_id = self.episode_id;
        out.piece_id = self.piece_id;
        out.seed = self.bag.seed();
        out.last_lock = self.last_lock;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable grid access for scenario setup
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn bag(&self) -> &PieceBag {
        &self.bag
    }

    pub fn active(&self) -> Option<ActivePiece> {
        self.active
    }

    pub fn hold_slot(&self) -> HoldSlot {
        self.hold
    }

    pub fn can_hold(&self) -> bool {
        !self.hold.used_this_turn
    }

    pub fn lock_delay(&self) -> LockDelayState {
        self.lock_delay
    }

    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn config(&self) -> RulesConfig {
        self.config
    }

    pub fn spin_attempted(&self) -> bool {
        self.spin_attempted
    }

    pub fn last_kick_ordinal(&self) -> u8 {
        self.last_kick_ordinal
    }

    pub fn is_soft_dropping(&self) -> bool {
        self.soft_dropping
    }

    pub fn is_hard_drop_pending(&self) -> bool {
        self.hard_drop_pending
    }

    pub fn last_lock(&self) -> Option<LockReport> {
        self.last_lock
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn piece_id(&self) -> u32 {
        self.piece_id
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(1, RulesConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing(seed: u64) -> GameState {
        let mut state = GameState::new(seed, RulesConfig::default());
        state.start();
        state
    }

    fn fill_row(grid: &mut Grid, y: i8, holes: &[i8]) {
        for x in 0..GRID_WIDTH as i8 {
            if !holes.contains(&x) {
                grid.set_cell(x, y, PieceKind::Z);
            }
        }
    }

    /// Drive gravity until the piece asks for the lock delay
    fn drop_to_ground(state: &mut GameState) -> Directives {
        loop {
            let d = state.gravity_step();
            if d != Directives::NONE {
                return d;
            }
        }
    }

    #[test]
    fn test_new_game_state() {
        let state = GameState::new(12345, RulesConfig::default());

        assert_eq!(state.status, GameStatus::Ready);
        assert_eq!(state.score.score(), 0);
        assert_eq!(state.score.level(), 1);
        assert_eq!(state.score.total_lines(), 0);
        assert_eq!(state.episode_id, 0);
        assert!(state.active.is_none());
        assert!(state.hold.piece.is_none());
        assert_eq!(state.next_queue().len(), PREVIEW_LEN);
    }

    #[test]
    fn test_game_start() {
        let mut state = GameState::new(12345, RulesConfig::default());
        let first = state.bag.peek(0, 0);

        let d = state.start();
        assert_eq!(d.gravity, GravityDirective::Resume);
        assert_eq!(state.status, GameStatus::Playing);
        let active = state.active.unwrap();
        assert_eq!(active.kind, first);
        assert_eq!((active.x, active.y), (SPAWN_X, SPAWN_Y));
        assert_eq!(active.rotation, Rotation::North);
        assert_eq!(state.piece_id, 1);

        // Starting twice is a no-op.
        assert_eq!(state.start(), Directives::NONE);
        assert_eq!(state.piece_id, 1);
    }

    #[test]
    fn test_next_queue_leads_spawn_order() {
        let mut state = playing(77);
        let queue = state.next_queue();
        for expected in queue.iter().take(3) {
            state.active = None;
            assert!(state.spawn());
            assert_eq!(state.active.unwrap().kind, *expected);
        }
    }

    #[test]
    fn test_move_and_walls() {
        let mut state = playing(12345);
        let initial_x = state.active.unwrap().x;

        state.move_right();
        assert_eq!(state.active.unwrap().x, initial_x + 1);
        state.move_left();
        assert_eq!(state.active.unwrap().x, initial_x);

        for _ in 0..10 {
            state.move_left();
        }
        let cells = state.active.unwrap().cells();
        assert_eq!(cells.iter().map(|c| c.0).min(), Some(0));
    }

    #[test]
    fn test_rotate_sets_spin_flag_even_when_blocked() {
        let mut state = playing(1);
        state.place_active(ActivePiece::new(PieceKind::O, Rotation::North, 3, 30));

        state.rotate(RotateDirection::Clockwise);
        assert!(state.spin_attempted);
        assert_eq!(state.active.unwrap().rotation, Rotation::North);

        state.move_right();
        assert!(!state.spin_attempted);
    }

    #[test]
    fn test_rotate_round_trip() {
        let mut state = playing(1);
        state.place_active(ActivePiece::new(PieceKind::J, Rotation::North, 3, 30));

        state.rotate(RotateDirection::Clockwise);
        assert_eq!(state.active.unwrap().rotation, Rotation::East);
        assert_eq!(state.last_kick_ordinal, 1);
        state.rotate(RotateDirection::CounterClockwise);

        let active = state.active.unwrap();
        assert_eq!(active.rotation, Rotation::North);
        assert_eq!((active.x, active.y), (3, 30));
    }

    #[test]
    fn test_t_spin_through_last_kick() {
        let mut state = playing(1);
        let grid = state.grid_mut();
        grid.set_cell(4, 34, PieceKind::Z);
        grid.set_cell(5, 36, PieceKind::Z);
        grid.set_cell(5, 38, PieceKind::Z);
        grid.set_cell(3, 38, PieceKind::Z);
        assert!(state.place_active(ActivePiece::new(PieceKind::T, Rotation::North, 4, 34)));

        state.rotate(RotateDirection::Clockwise);
        let active = state.active.unwrap();
        assert_eq!(active.rotation, Rotation::East);
        assert_eq!((active.x, active.y), (3, 36));
        assert_eq!(state.last_kick_ordinal, 5);

        let report = state.lock_piece().unwrap();
        assert_eq!(report.action, ScoreAction::TSpin);
        assert_eq!(report.lines_cleared, 0);
        assert_eq!(report.points, 400);
        assert_eq!(state.score.t_spin_count(), 1);
    }

    #[test]
    fn test_mini_t_spin_through_plain_rotation() {
        let mut state = playing(1);
        let grid = state.grid_mut();
        grid.set_cell(4, 37, PieceKind::Z);
        grid.set_cell(4, 39, PieceKind::Z);
        grid.set_cell(6, 37, PieceKind::Z);
        assert!(state.place_active(ActivePiece::new(PieceKind::T, Rotation::North, 4, 37)));

        state.rotate(RotateDirection::Clockwise);
        assert_eq!(state.last_kick_ordinal, 1);

        let report = state.lock_piece().unwrap();
        assert_eq!(report.action, ScoreAction::MiniTSpin);
        assert_eq!(report.points, 100);
    }

    #[test]
    fn test_gravity_descent_keeps_spin() {
        let mut state = playing(1);
        assert!(state.place_active(ActivePiece::new(PieceKind::T, Rotation::North, 3, 30)));
        state.rotate(RotateDirection::Clockwise);
        assert_eq!(state.last_kick_ordinal, 1);

        assert_eq!(state.gravity_step(), Directives::NONE);
        assert_eq!(state.active.unwrap().y, 31);
        assert!(state.spin_attempted);

        // Both back corners and one front corner around the fallen T.
        let grid = state.grid_mut();
        grid.set_cell(3, 31, PieceKind::Z);
        grid.set_cell(3, 33, PieceKind::Z);
        grid.set_cell(5, 33, PieceKind::Z);

        let report = state.lock_piece().unwrap();
        assert_eq!(report.action, ScoreAction::MiniTSpin);
        assert_eq!(report.points, 100);
    }

    #[test]
    fn test_hard_drop_awards_two_per_row() {
        let mut state = playing(1);
        assert!(state.place_active(ActivePiece::new(PieceKind::O, Rotation::North, 3, 33)));

        let d = state.hard_drop();
        assert_eq!(d, Directives::new(GravityDirective::Halt, LockDirective::ExpireNow));
        assert_eq!(state.active.unwrap().y, 38);
        assert_eq!(state.score.score(), 10);
        assert!(state.hard_drop_pending);

        // Input is ignored until the lock lands.
        assert_eq!(state.move_left(), Directives::NONE);
        assert_eq!(state.active.unwrap().x, 3);

        let d = state.on_lock_delay_expired();
        assert_eq!(d.gravity, GravityDirective::Resume);
        assert!(state.grid.is_occupied(4, 39));
        assert!(state.grid.is_occupied(5, 38));
        assert_eq!(state.piece_id, 2);
        assert!(!state.hard_drop_pending);
    }

    #[test]
    fn test_gravity_grounds_then_lock_delay_locks() {
        let mut state = playing(5);
        let d = drop_to_ground(&mut state);
        assert_eq!(d, Directives::new(GravityDirective::Halt, LockDirective::Start));
        assert!(state.lock_delay.running);
        assert!(state.is_grounded());

        state.on_lock_delay_expired();
        assert_eq!(state.grid.row_fill_count(39) + state.grid.row_fill_count(38), 4);
        assert_eq!(state.piece_id, 2);
        assert!(!state.lock_delay.running);
    }

    #[test]
    fn test_escaped_piece_resumes_gravity() {
        let mut state = playing(1);
        // I piece resting on a one-cell ledge at x=3.
        state.grid_mut().set_cell(3, 39, PieceKind::L);
        assert!(state.place_active(ActivePiece::new(PieceKind::I, Rotation::North, 0, 37)));
        assert_eq!(
            state.gravity_step(),
            Directives::new(GravityDirective::Halt, LockDirective::Start)
        );

        // Slide the vertical edge off the ledge.
        for _ in 0..4 {
            state.move_right();
        }
        assert!(!state.is_grounded());

        let d = state.on_lock_delay_expired();
        assert_eq!(d, Directives::new(GravityDirective::Resume, LockDirective::Keep));
        assert!(state.active.is_some());
        assert_eq!(state.piece_id, 1);
    }

    #[test]
    fn test_lock_reset_limit() {
        let mut state = playing(1);
        assert!(state.place_active(ActivePiece::new(PieceKind::T, Rotation::North, 3, 38)));
        state.gravity_step();
        assert!(state.lock_delay.running);

        for i in 0..LOCK_RESET_LIMIT {
            let d = if i % 2 == 0 {
                state.move_right()
            } else {
                state.move_left()
            };
            assert_eq!(d.lock_delay, LockDirective::Restart);
        }
        assert_eq!(state.lock_delay.reset_count, LOCK_RESET_LIMIT);

        // Still moves, no longer restarts the timer.
        let x = state.active.unwrap().x;
        assert_eq!(state.move_right(), Directives::NONE);
        assert_eq!(state.active.unwrap().x, x + 1);

        state.on_lock_delay_expired();
        assert_eq!(state.piece_id, 2);
    }

    #[test]
    fn test_cascade_scores_double() {
        let mut state = playing(1);
        let grid = state.grid_mut();
        fill_row(grid, 39, &[0, 1]);
        fill_row(grid, 38, &[0, 1]);
        assert!(state.place_active(ActivePiece::new(PieceKind::O, Rotation::North, -1, 38)));

        let report = state.lock_piece().unwrap();
        assert_eq!(report.lines_cleared, 2);
        assert_eq!(report.action, ScoreAction::Double);
        assert_eq!(report.points, 300);
        assert_eq!(report.combo, 1);
        assert!(state.grid.verify_fill_counts());
        assert_eq!(state.grid.row_fill_count(39), 0);
    }

    #[test]
    fn test_back_to_back_tetris() {
        let mut state = playing(1);
        for round in 0..2 {
            let grid = state.grid_mut();
            for y in 36..40 {
                fill_row(grid, y, &[9]);
            }
            // Vertical I occupies offset column 2, so anchor x=7 lands in column 9.
            assert!(state.place_active(ActivePiece::new(PieceKind::I, Rotation::East, 7, 36)));
            let report = state.lock_piece().unwrap();
            assert_eq!(report.action, ScoreAction::Tetris);
            if round == 0 {
                assert_eq!(report.b2b_bonus, 0);
                assert_eq!(report.points, 800);
            } else {
                assert_eq!(report.b2b_bonus, 400);
                assert_eq!(report.points, 1200);
            }
        }
        assert_eq!(state.score.score(), 2000);
        assert_eq!(state.score.combo(), 2);
    }

    #[test]
    fn test_lock_out_in_buffer() {
        let mut state = playing(1);
        assert!(state.place_active(ActivePiece::new(PieceKind::O, Rotation::North, 3, 18)));
        let report = state.lock_piece().unwrap();
        assert!(report.lock_out);
        assert_eq!(state.status, GameStatus::GameOver);
        assert_eq!(state.gravity_step(), Directives::halt_all());
    }

    #[test]
    fn test_block_out_on_spawn() {
        let mut state = playing(1);
        let grid = state.grid_mut();
        for x in 0..GRID_WIDTH as i8 {
            grid.set_cell(x, 20, PieceKind::S);
            grid.set_cell(x, 19, PieceKind::S);
        }
        state.active = None;
        assert!(!state.spawn());
        assert_eq!(state.status, GameStatus::GameOver);
    }

    #[test]
    fn test_hold() {
        let mut state = playing(12345);
        let first = state.active.unwrap().kind;
        let next = state.next_queue()[0];

        let d = state.hold();
        assert_eq!(d.lock_delay, LockDirective::Cancel);
        assert_eq!(state.hold.piece, Some(first));
        assert_eq!(state.active.unwrap().kind, next);
        assert!(!state.can_hold());

        // Second hold in the same turn is ignored.
        assert_eq!(state.hold(), Directives::NONE);
        assert_eq!(state.active.unwrap().kind, next);

        state.hard_drop();
        state.on_lock_delay_expired();
        assert!(state.can_hold());
        state.rotate(RotateDirection::Clockwise);
        state.hold();
        let active = state.active.unwrap();
        assert_eq!(active.kind, first);
        assert_eq!(active.rotation, Rotation::North);
        assert_eq!((active.x, active.y), (SPAWN_X, SPAWN_Y));
    }

    #[test]
    fn test_pause_toggles() {
        let mut state = playing(1);
        state.gravity_step();

        assert_eq!(state.toggle_pause(), Directives::halt_all());
        assert_eq!(state.status, GameStatus::Paused);
        let y = state.active.unwrap().y;
        assert_eq!(state.gravity_step(), Directives::NONE);
        assert_eq!(state.move_left(), Directives::NONE);
        assert_eq!(state.active.unwrap().y, y);

        let d = state.toggle_pause();
        assert_eq!(d, Directives::new(GravityDirective::Resume, LockDirective::Keep));
        assert_eq!(state.status, GameStatus::Playing);
    }

    #[test]
    fn test_pause_not_reachable_from_ready() {
        let mut state = GameState::new(1, RulesConfig::default());
        assert_eq!(state.toggle_pause(), Directives::NONE);
        assert_eq!(state.status, GameStatus::Ready);
    }

    #[test]
    fn test_restart_recreates_model() {
        let mut state = playing(12345);
        state.hard_drop();
        state.on_lock_delay_expired();
        assert!(state.score.score() > 0);

        let d = state.apply(GameAction::Restart);
        assert_eq!(d.gravity, GravityDirective::Restart);
        assert_eq!(d.lock_delay, LockDirective::Cancel);
        assert_eq!(state.episode_id, 1);
        assert_eq!(state.status, GameStatus::Playing);
        assert_eq!(state.score.score(), 0);
        assert_eq!(state.piece_id, 1);
        assert!(state.grid.cells().iter().all(|c| c.is_none()));
    }

    #[test]
    fn test_soft_drop_scoring_and_interval() {
        let mut state = playing(1);
        let normal = state.gravity_interval();
        state.soft_drop(true);
        assert_eq!(state.gravity_interval(), normal / SOFT_DROP_DIVISOR);

        state.gravity_step();
        assert_eq!(state.score.score(), 1);

        state.soft_drop(false);
        state.gravity_step();
        assert_eq!(state.score.score(), 1);
        assert_eq!(state.gravity_interval(), normal);
    }

    #[test]
    fn test_ghost_matches_hard_drop_target() {
        let state = playing(3);
        let (y, rows) = state.hard_drop_target().unwrap();
        let active = state.active.unwrap();
        assert_eq!(y, active.y + rows as i8);
        let ghost = state.ghost().unwrap();
        assert_eq!(ghost.iter().map(|c| c.1).max(), Some(39));
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut state = playing(9);
        state.hold();
        let snap = state.snapshot();
        assert_eq!(snap.status, GameStatus::Playing);
        assert!(snap.active.is_some());
        assert!(snap.ghost.is_some());
        assert!(snap.hold.is_some());
        assert!(!snap.can_hold);
        assert_eq!(snap.next_queue.len(), PREVIEW_LEN);
        assert_eq!(snap.seed, 9);
    }
}
