//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains all the game rules and state management. It has **no threads and no
//! clocks**: timing lives in `srs-tetris-engine`, which owns the gravity and lock delay timers
//! and calls back into [`GameState`] under a single mutex. That makes the core:
//!
//! - **Deterministic**: Same seed produces identical piece sequences
//! - **Testable**: Every rule can be driven step by step from a unit test
//! - **Portable**: Can run headless, behind a terminal, or behind a GUI
//!
//! # Module Structure
//!
//! - [`grid`]: 10x40 grid (20 hidden buffer rows) with incremental row fill counters
//! - [`collision`]: the single placement legality check
//! - [`pieces`]: Tetromino shapes and SRS rotation with wall kicks
//! - [`bag`]: 7-bag random piece generation with a shuffled look-ahead bag
//! - [`cascade`]: bottom-up line clear and row shifting
//! - [`scoring`]: T-spin classification, combos, back-to-back, level curve
//! - [`game_state`]: the game model and its state machine
//! - [`snapshot`]: read-only views for a presentation layer
//!
//! # Game Rules
//!
//! - **7-Bag Randomizer**: each of the 7 kinds appears once per bag, uniformly shuffled
//! - **SRS Rotation**: geometric rotation plus up to 5 kick offsets (none for O)
//! - **Lock Delay**: 500ms once grounded, restartable up to 15 times per piece
//! - **Hold**: once per lock, held piece re-enters at the spawn anchor facing North
//! - **T-Spin Detection**: corner occupancy; a full T-spin also needs the fifth kick
//! - **Game Over**: block out at spawn, or lock out with a mino left in the buffer
//!
//! # Example
//!
//! ```
//! use srs_tetris_core::{GameState, RulesConfig};
//! use srs_tetris_types::{GameAction, GameStatus};
//!
//! let mut game = GameState::new(12345, RulesConfig::default());
//! game.apply(GameAction::Start);
//!
//! game.apply(GameAction::MoveRight);
//! game.apply(GameAction::RotateCw);
//! game.apply(GameAction::HardDrop);
//!
//! // Hard drop awards points at once; the lock lands when the lock delay fires.
//! assert!(game.score().score() > 0);
//! game.on_lock_delay_expired();
//! assert_eq!(game.piece_id(), 2);
//! assert_eq!(game.status(), GameStatus::Playing);
//! ```

pub mod bag;
pub mod cascade;
pub mod collision;
pub mod config;
pub mod game_state;
pub mod grid;
pub mod pieces;
pub mod scoring;
pub mod snapshot;

pub use srs_tetris_types as types;

// Re-export commonly used types for convenience
pub use bag::PieceBag;
pub use config::RulesConfig;
pub use game_state::{
    ActivePiece, Directives, GameState, GravityDirective, HoldSlot, LockDelayState, LockDirective,
};
pub use grid::Grid;
pub use pieces::{get_shape, try_rotate, RotationOutcome};
pub use scoring::{calculate_drop_score, drop_interval, ScoreResult, ScoreState};
pub use snapshot::{ActiveSnapshot, GameSnapshot, LockReport};
