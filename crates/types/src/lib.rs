//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the rules engine.
//! All types are plain data with no behaviour beyond small lookups, making them
//! usable in any context (core rules, timer engine, presentation snapshots).
//!
//! # Grid Dimensions
//!
//! The playfield is a visible region with a hidden buffer stacked on top of it:
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Buffer**: 20 hidden rows (indexed 0-19)
//! - **Visible**: 20 rows (indexed 20-39)
//! - **Spawn anchor**: (3, 19), the last buffer row
//!
//! Coordinates are `(x, y)` with `y` growing downwards, so row 39 is the floor.
//!
//! # Timing Defaults
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `LOCK_DELAY_MS` | 500 | Grace period before a grounded piece locks |
//! | `LOCK_RESET_LIMIT` | 15 | Max lock delay restarts per piece |
//! | `SOFT_DROP_DIVISOR` | 20 | Soft drop divides the gravity interval |
//! | `BUSY_WAIT_THRESHOLD_NS` | 2 000 000 | Below this, timers spin instead of blocking |
//! | `MIN_DROP_INTERVAL_NS` | 1 000 000 | Gravity never gets faster than this |
//!
//! # Examples
//!
//! ```
//! use srs_tetris_types::{PieceKind, Rotation, GameAction, GRID_WIDTH, TOTAL_HEIGHT};
//!
//! let piece = PieceKind::T;
//! let parsed = PieceKind::from_str("t").unwrap();
//! assert_eq!(piece, parsed);
//!
//! let rotation = Rotation::North;
//! assert_eq!(rotation.rotate_cw(), Rotation::East);
//!
//! let action = GameAction::from_str("hardDrop").unwrap();
//! assert_eq!(action, GameAction::HardDrop);
//!
//! assert_eq!(GRID_WIDTH, 10);
//! assert_eq!(TOTAL_HEIGHT, 40);
//! ```

use serde::{Deserialize, Serialize};

/// Grid width in cells (10 columns)
pub const GRID_WIDTH: u8 = 10;

/// Visible playfield height in rows
pub const VISIBLE_HEIGHT: u8 = 20;

/// Hidden rows above the visible playfield, used for spawning and lock-out detection
pub const BUFFER_HEIGHT: u8 = 20;

/// Total number of rows held by the grid
pub const TOTAL_HEIGHT: u8 = VISIBLE_HEIGHT + BUFFER_HEIGHT;

/// Spawn anchor column
pub const SPAWN_X: i8 = 3;

/// Spawn anchor row (last buffer row)
pub const SPAWN_Y: i8 = BUFFER_HEIGHT as i8 - 1;

/// Lock delay when a piece is grounded (500ms)
pub const LOCK_DELAY_MS: u64 = 500;

/// Maximum number of lock delay restarts per piece
pub const LOCK_RESET_LIMIT: u8 = 15;

/// Highest reachable level
pub const LEVEL_CAP: u32 = 15;

/// Level a fresh game starts at
pub const START_LEVEL: u32 = 1;

/// Lines needed per level
pub const LINES_PER_LEVEL: u32 = 10;

/// Soft drop divides the current gravity interval by this value
pub const SOFT_DROP_DIVISOR: u32 = 20;

/// Number of upcoming pieces exposed for preview
pub const PREVIEW_LEN: usize = 6;

/// Number of distinct piece kinds (one bag)
pub const BAG_SIZE: usize = 7;

/// Remaining waits longer than this block on a condition variable; shorter ones busy-poll
pub const BUSY_WAIT_THRESHOLD_NS: u64 = 2_000_000;

/// Gravity interval floor
pub const MIN_DROP_INTERVAL_NS: u64 = 1_000_000;

/// Points per row descended while soft dropping
pub const SOFT_DROP_POINTS: u32 = 1;

/// Points per row descended by a hard drop
pub const HARD_DROP_POINTS: u32 = 2;


/// The seven tetromino piece kinds
///
/// An empty cell is `None` in [`Cell`], so there is no "empty" piece kind:
/// an active piece can never be the empty sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    /// All kinds in canonical order (the unshuffled bag)
    pub const ALL: [PieceKind; BAG_SIZE] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use srs_tetris_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("O"), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            "o" => Some(PieceKind::O),
            "s" => Some(PieceKind::S),
            "t" => Some(PieceKind::T),
            "z" => Some(PieceKind::Z),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::J => "j",
            PieceKind::L => "l",
            PieceKind::O => "o",
            PieceKind::S => "s",
            PieceKind::T => "t",
            PieceKind::Z => "z",
        }
    }

    /// Position in [`PieceKind::ALL`]
    pub fn index(&self) -> usize {
        match self {
            PieceKind::I => 0,
            PieceKind::J => 1,
            PieceKind::L => 2,
            PieceKind::O => 3,
            PieceKind::S => 4,
            PieceKind::T => 5,
            PieceKind::Z => 6,
        }
    }

    /// Compact cell code used by snapshots (0 is reserved for empty)
    pub fn cell_code(&self) -> u8 {
        self.index() as u8 + 1
    }
}

/// Rotation states following the Super Rotation System (SRS)
///
/// - **North**: Spawn orientation (0°)
/// - **East**: Rotated 90° clockwise
/// - **South**: Rotated 180°
/// - **West**: Rotated 270° clockwise
///
/// The states form a cyclic group of order 4: clockwise is +1, counter-clockwise is -1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    North,
    East,
    South,
    West,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::North,
        Rotation::East,
        Rotation::South,
        Rotation::West,
    ];

    /// Rotate clockwise (90°)
    ///
    /// # Examples
    ///
    /// ```
    /// use srs_tetris_types::Rotation;
    ///
    /// assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
    /// assert_eq!(Rotation::West.rotate_cw(), Rotation::North);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Rotate counter-clockwise (-90°)
    ///
    /// # Examples
    ///
    /// ```
    /// use srs_tetris_types::Rotation;
    ///
    /// assert_eq!(Rotation::North.rotate_ccw(), Rotation::West);
    /// assert_eq!(Rotation::East.rotate_ccw(), Rotation::North);
    /// ```
    pub fn rotate_ccw(&self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// Rotate one step in the given direction
    pub fn rotate(&self, direction: RotateDirection) -> Self {
        match direction {
            RotateDirection::Clockwise => self.rotate_cw(),
            RotateDirection::CounterClockwise => self.rotate_ccw(),
        }
    }

    /// 0 for North through 3 for West
    pub fn index(&self) -> usize {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }

    /// Inverse of [`Rotation::index`], taken modulo 4
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }

    /// Parse rotation from string
    ///
    /// Accepts full names or single letters (case-insensitive):
    /// "north" | "n", "east" | "e", "south" | "s", "west" | "w"
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "north" | "n" => Some(Rotation::North),
            "east" | "e" => Some(Rotation::East),
            "south" | "s" => Some(Rotation::South),
            "west" | "w" => Some(Rotation::West),
            _ => None,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::North => "north",
            Rotation::East => "east",
            Rotation::South => "south",
            Rotation::West => "west",
        }
    }
}

/// Direction of a rotation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RotateDirection {
    Clockwise,
    CounterClockwise,
}

impl RotateDirection {
    pub fn inverse(&self) -> Self {
        match self {
            RotateDirection::Clockwise => RotateDirection::CounterClockwise,
            RotateDirection::CounterClockwise => RotateDirection::Clockwise,
        }
    }
}

/// Lifecycle of a game session
///
/// `Ready -> Playing <-> Paused`, and `Playing -> GameOver`. `GameOver` is terminal until
/// an explicit restart recreates the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameStatus {
    #[default]
    Ready,
    Playing,
    Paused,
    GameOver,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Ready => "ready",
            GameStatus::Playing => "playing",
            GameStatus::Paused => "paused",
            GameStatus::GameOver => "gameOver",
        }
    }
}

/// Game actions that can be applied to modify game state
///
/// These are the intents an input collaborator forwards into the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameAction {
    /// Leave the Ready state and spawn the first piece
    Start,
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Begin accelerated gravity
    SoftDropStart,
    /// Return to normal gravity
    SoftDropStop,
    /// Instantly drop piece to lowest valid position and lock it
    HardDrop,
    /// Rotate piece 90° clockwise
    RotateCw,
    /// Rotate piece 90° counter-clockwise
    RotateCcw,
    /// Hold current piece (once per turn)
    Hold,
    /// Toggle pause state
    Pause,
    /// Recreate the whole model and start playing
    Restart,
}

impl GameAction {
    /// Parse action from string
    ///
    /// # Examples
    ///
    /// ```
    /// use srs_tetris_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("moveLeft"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("rotateCw"), Some(GameAction::RotateCw));
    /// assert_eq!(GameAction::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "start" => Some(GameAction::Start),
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "softdropstart" | "softdrop" => Some(GameAction::SoftDropStart),
            "softdropstop" => Some(GameAction::SoftDropStop),
            "harddrop" => Some(GameAction::HardDrop),
            "rotatecw" => Some(GameAction::RotateCw),
            "rotateccw" => Some(GameAction::RotateCcw),
            "hold" => Some(GameAction::Hold),
            "pause" => Some(GameAction::Pause),
            "restart" => Some(GameAction::Restart),
            _ => None,
        }
    }

    /// Convert to camelCase string
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::Start => "start",
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::SoftDropStart => "softDropStart",
            GameAction::SoftDropStop => "softDropStop",
            GameAction::HardDrop => "hardDrop",
            GameAction::RotateCw => "rotateCw",
            GameAction::RotateCcw => "rotateCcw",
            GameAction::Hold => "hold",
            GameAction::Pause => "pause",
            GameAction::Restart => "restart",
        }
    }
}

/// T-Spin classification result
///
/// - **None**: Not a T-spin
/// - **Mini**: both back corners and at least one front corner occupied
/// - **Full**: both front corners and at least one back corner occupied, reached through the
///   last-resort wall kick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TSpinKind {
    None,
    Mini,
    Full,
}

impl TSpinKind {
    /// Convert to optional string representation
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            TSpinKind::None => None,
            TSpinKind::Mini => Some("mini"),
            TSpinKind::Full => Some("full"),
        }
    }
}

/// Scoring classification of a single lock
///
/// Base points (multiplied by the level at lock time):
///
/// | Action | Base |
/// |--------|------|
/// | Single / Double / Triple / Tetris | 100 / 300 / 500 / 800 |
/// | Mini T-Spin / Mini T-Spin Single | 100 / 200 |
/// | T-Spin / Single / Double / Triple | 400 / 800 / 1200 / 1600 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoreAction {
    #[default]
    Nothing,
    Single,
    Double,
    Triple,
    Tetris,
    MiniTSpin,
    MiniTSpinSingle,
    TSpin,
    TSpinSingle,
    TSpinDouble,
    TSpinTriple,
}

impl ScoreAction {
    pub fn base_score(&self) -> u32 {
        match self {
            ScoreAction::Nothing => 0,
            ScoreAction::Single => 100,
            ScoreAction::Double => 300,
            ScoreAction::Triple => 500,
            ScoreAction::Tetris => 800,
            ScoreAction::MiniTSpin => 100,
            ScoreAction::MiniTSpinSingle => 200,
            ScoreAction::TSpin => 400,
            ScoreAction::TSpinSingle => 800,
            ScoreAction::TSpinDouble => 1200,
            ScoreAction::TSpinTriple => 1600,
        }
    }

    /// Whether this action is any T-spin variant (with or without lines)
    pub fn is_t_spin(&self) -> bool {
        matches!(
            self,
            ScoreAction::MiniTSpin
                | ScoreAction::MiniTSpinSingle
                | ScoreAction::TSpin
                | ScoreAction::TSpinSingle
                | ScoreAction::TSpinDouble
                | ScoreAction::TSpinTriple
        )
    }

    /// Clears that keep or start a back-to-back chain: Tetris and line-clearing T-spins
    pub fn qualifies_for_b2b(&self) -> bool {
        matches!(
            self,
            ScoreAction::Tetris
                | ScoreAction::MiniTSpinSingle
                | ScoreAction::TSpinSingle
                | ScoreAction::TSpinDouble
                | ScoreAction::TSpinTriple
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreAction::Nothing => "nothing",
            ScoreAction::Single => "single",
            ScoreAction::Double => "double",
            ScoreAction::Triple => "triple",
            ScoreAction::Tetris => "tetris",
            ScoreAction::MiniTSpin => "miniTSpin",
            ScoreAction::MiniTSpinSingle => "miniTSpinSingle",
            ScoreAction::TSpin => "tSpin",
            ScoreAction::TSpinSingle => "tSpinSingle",
            ScoreAction::TSpinDouble => "tSpinDouble",
            ScoreAction::TSpinTriple => "tSpinTriple",
        }
    }
}

/// A cell on the grid
///
/// - `None`: Empty cell
/// - `Some(PieceKind)`: Cell filled by a locked mino of that kind
pub type Cell = Option<PieceKind>;
