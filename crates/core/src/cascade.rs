//! Cascade resolution - removes full rows and drops the stack down
//!
//! Scans bottom-up using the grid's row fill counters. Full rows are counted; every non-full
//! row above a cleared one is copied down by the number cleared so far. The scan stops at the
//! first empty row, and the vacated rows above the settled stack are emptied.
//!
//! Callers hold exclusive access to the grid (`&mut`), so no other mutation can interleave.

use crate::grid::Grid;
use crate::types::{GRID_WIDTH, TOTAL_HEIGHT};

/// Clear full rows and return how many were removed
pub fn resolve(grid: &mut Grid) -> u32 {
    let mut cleared = 0usize;
    let mut top = TOTAL_HEIGHT as usize;

    for y in (0..TOTAL_HEIGHT as usize).rev() {
        let fill = grid.row_fill_count(y);
        if fill == 0 {
            break;
        }
        top = y;
        if fill == GRID_WIDTH {
            cleared += 1;
        } else if cleared > 0 {
            grid.move_row(y, y + cleared);
        }
    }

    for y in top..(top + cleared).min(TOTAL_HEIGHT as usize) {
        grid.clear_row(y);
    }

    debug_assert!(grid.verify_fill_counts());
    cleared as u32
}
