//! SRS Tetris (workspace facade crate).
//!
//! Re-exports the rules, the real-time engine and the shared types under one name so hosts and
//! integration tests can depend on a single package while the implementation lives in dedicated
//! crates under `crates/`.

pub use srs_tetris_core as core;
pub use srs_tetris_engine as engine;
pub use srs_tetris_types as types;
