use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::game_state::ActivePiece;
use crate::types::{
    GameStatus, PieceKind, Rotation, ScoreAction, BAG_SIZE, GRID_WIDTH, VISIBLE_HEIGHT,
};

/// Visible playfield as cell codes, row 0 is the top visible row
pub type VisibleBoard = [[u8; GRID_WIDTH as usize]; VISIBLE_HEIGHT as usize];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
    /// Absolute grid coordinates (buffer rows included)
    pub cells: [(i8, i8); 4],
}

impl From<ActivePiece> for ActiveSnapshot {
    fn from(value: ActivePiece) -> Self {
        Self {
            kind: value.kind,
            rotation: value.rotation,
            x: value.x,
            y: value.y,
            cells: value.cells(),
        }
    }
}

/// What happened at the most recent lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockReport {
    pub kind: PieceKind,
    pub lines_cleared: u32,
    pub action: ScoreAction,
    /// Line-clear points including the back-to-back bonus
    pub points: u32,
    pub b2b_bonus: u32,
    pub combo: u32,
    pub back_to_back: bool,
    /// The piece locked with a mino in the hidden buffer
    pub lock_out: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub board: VisibleBoard,
    pub active: Option<ActiveSnapshot>,
    pub ghost: Option<[(i8, i8); 4]>,
    pub hold: Option<PieceKind>,
    pub can_hold: bool,
    pub next_queue: ArrayVec<PieceKind, BAG_SIZE>,
    pub score: u64,
    pub level: u32,
    pub lines: u32,
    pub combo: u32,
    pub back_to_back: bool,
    pub last_action: ScoreAction,
    pub tetris_count: u32,
    pub t_spin_count: u32,
    pub status: GameStatus,
    pub episode_id: u32,
    pub piece_id: u32,
    pub seed: u64,
    pub last_lock: Option<LockReport>,
}

impl GameSnapshot {
    pub fn playable(&self) -> bool {
        self.status == GameStatus::Playing
    }

    /// Number of filled visible cells
    pub fn filled_cells(&self) -> usize {
        self.board.iter().flatten().filter(|&&c| c != 0).count()
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            board: [[0u8; GRID_WIDTH as usize]; VISIBLE_HEIGHT as usize],
            active: None,
            ghost: None,
            hold: None,
            can_hold: true,
            next_queue: ArrayVec::new(),
            score: 0,
            level: 1,
            lines: 0,
            combo: 0,
            back_to_back: false,
            last_action: ScoreAction::Nothing,
            tetris_count: 0,
            t_spin_count: 0,
            status: GameStatus::Ready,
            episode_id: 0,
            piece_id: 0,
            seed: 0,
            last_lock: None,
        }
    }
}
