//! Real-time driver for the rules in `srs-tetris-core`
//!
//! The core model is pure; this crate adds the clocks. A [`GameController`] owns the
//! [`GameState`](srs_tetris_core::GameState) behind a mutex plus two timer threads:
//!
//! - [`gravity`]: periodic tick, period derived from level and soft drop
//! - [`lock_delay`]: one-shot grace period once the piece is grounded
//!
//! Both are built on [`timer::PrecisionTimer`], which blocks on a condvar for long waits and
//! busy-polls the last couple of milliseconds.
//!
//! # Example
//!
//! ```no_run
//! use srs_tetris_engine::{EngineConfig, GameController};
//!
//! # fn main() -> Result<(), srs_tetris_engine::EngineError> {
//! let game = GameController::new(EngineConfig::from_env())?;
//! game.start();
//! game.hard_drop();
//! println!("score: {}", game.snapshot().score);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod gravity;
pub mod lock_delay;
pub mod timer;

pub use config::EngineConfig;
pub use controller::GameController;
pub use error::{EngineError, Result};
pub use gravity::GravityScheduler;
pub use lock_delay::LockDelayTimer;
pub use timer::{PrecisionTimer, TimerMode};
