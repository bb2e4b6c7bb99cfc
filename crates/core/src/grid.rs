//! Grid module - owns the cell matrix and per-row fill counters
//!
//! The grid is 10 columns by 40 rows: 20 hidden buffer rows on top of the 20 visible rows.
//! Uses a flat array for cache locality and zero allocation.
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..39 (top to bottom).
//!
//! Every cell mutation keeps `row_fill[y]` equal to the number of filled cells in row `y`.
//! The counters are never recomputed by scanning, except by [`Grid::verify_fill_counts`].

use crate::types::{Cell, PieceKind, BUFFER_HEIGHT, GRID_WIDTH, TOTAL_HEIGHT, VISIBLE_HEIGHT};

/// Total number of cells on the grid
const GRID_SIZE: usize = GRID_WIDTH as usize * TOTAL_HEIGHT as usize;

const WIDTH: usize = GRID_WIDTH as usize;
const HEIGHT: usize = TOTAL_HEIGHT as usize;

/// The playing grid including the hidden buffer
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; GRID_SIZE],
    /// Filled cells per row, maintained incrementally
    row_fill: [u8; HEIGHT],
}

impl Grid {
    /// Create a new empty grid
    pub fn new() -> Self {
        Self {
            cells: [None; GRID_SIZE],
            row_fill: [0; HEIGHT],
        }
    }

    /// Flat index for in-bounds coordinates
    #[inline(always)]
    fn checked_index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= GRID_WIDTH as i8 || y < 0 || y >= TOTAL_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * WIDTH + (x as usize))
    }

    /// Flat index for coordinates the caller has already validated.
    ///
    /// Panics on out-of-bounds input: that is a caller bug, not a game state.
    #[inline(always)]
    fn index(x: i8, y: i8) -> usize {
        match Self::checked_index(x, y) {
            Some(idx) => idx,
            None => panic!("grid coordinate ({x}, {y}) out of bounds"),
        }
    }

    pub fn width(&self) -> u8 {
        GRID_WIDTH
    }

    pub fn total_height(&self) -> u8 {
        TOTAL_HEIGHT
    }

    /// Fill cell (x, y) with a mino of `kind`.
    ///
    /// Precondition: (x, y) is in bounds.
    pub fn set_cell(&mut self, x: i8, y: i8, kind: PieceKind) {
        let idx = Self::index(x, y);
        if self.cells[idx].is_none() {
            self.row_fill[y as usize] += 1;
        }
        self.cells[idx] = Some(kind);
    }

    /// Empty cell (x, y).
    ///
    /// Precondition: (x, y) is in bounds.
    pub fn clear_cell(&mut self, x: i8, y: i8) {
        let idx = Self::index(x, y);
        if self.cells[idx].take().is_some() {
            self.row_fill[y as usize] -= 1;
        }
    }

    /// Read cell (x, y).
    ///
    /// Precondition: (x, y) is in bounds.
    pub fn cell_at(&self, x: i8, y: i8) -> Cell {
        self.cells[Self::index(x, y)]
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::checked_index(x, y).map(|idx| self.cells[idx])
    }

    /// Number of filled cells in row `y`
    pub fn row_fill_count(&self, y: usize) -> u8 {
        self.row_fill[y]
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        y < HEIGHT && self.row_fill[y] == GRID_WIDTH
    }

    pub fn is_row_empty(&self, y: usize) -> bool {
        y < HEIGHT && self.row_fill[y] == 0
    }

    /// Check if position is valid (within bounds and empty)
    pub fn is_valid(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(None))
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Check if position is out of bounds
    pub fn is_out_of_bounds(&self, x: i8, y: i8) -> bool {
        Self::checked_index(x, y).is_none()
    }

    /// Whether row `y` lies in the hidden buffer
    pub fn is_buffer_row(y: i8) -> bool {
        y < BUFFER_HEIGHT as i8
    }

    /// Write four minos of `kind` at absolute coordinates.
    /// Returns false (and writes nothing) if any cell is out of bounds or occupied.
    pub fn lock_piece(&mut self, cells: &[(i8, i8)], kind: PieceKind) -> bool {
        if !cells.iter().all(|&(x, y)| self.is_valid(x, y)) {
            return false;
        }
        for &(x, y) in cells {
            self.set_cell(x, y, kind);
        }
        true
    }

    /// Copy row `src` (cells and fill count) onto row `dst`. `src` is left untouched.
    pub(crate) fn move_row(&mut self, src: usize, dst: usize) {
        if src == dst {
            return;
        }
        self.cells
            .copy_within(src * WIDTH..src * WIDTH + WIDTH, dst * WIDTH);
        self.row_fill[dst] = self.row_fill[src];
    }

    /// Empty every cell of row `y`.
    pub(crate) fn clear_row(&mut self, y: usize) {
        for cell in &mut self.cells[y * WIDTH..y * WIDTH + WIDTH] {
            *cell = None;
        }
        self.row_fill[y] = 0;
    }

    /// Clear all cells and fill counts
    pub fn reset(&mut self) {
        self.cells = [None; GRID_SIZE];
        self.row_fill = [0; HEIGHT];
    }

    /// Rescan every row and compare with the incremental counters.
    pub fn verify_fill_counts(&self) -> bool {
        (0..HEIGHT).all(|y| {
            let filled = self.cells[y * WIDTH..y * WIDTH + WIDTH]
                .iter()
                .filter(|cell| cell.is_some())
                .count();
            filled == self.row_fill[y] as usize
        })
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Write the visible region as cell codes (0 = empty, see [`PieceKind::cell_code`]).
    pub fn write_visible(&self, out: &mut [[u8; WIDTH]; VISIBLE_HEIGHT as usize]) {
        let top = BUFFER_HEIGHT as usize;
        for (row, out_row) in out.iter_mut().enumerate() {
            let start = (top + row) * WIDTH;
            for (x, cell) in self.cells[start..start + WIDTH].iter().enumerate() {
                out_row[x] = cell.map_or(0, |kind| kind.cell_code());
            }
        }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}
