//! Collision checks - the single authority on whether a placement is legal

use crate::grid::Grid;
use crate::pieces::PieceShape;

/// True iff every absolute coordinate is inside the grid and its cell is empty.
pub fn can_place(grid: &Grid, cells: &[(i8, i8)]) -> bool {
    cells.iter().all(|&(x, y)| grid.is_valid(x, y))
}

/// Same as [`can_place`] for a shape anchored at (x, y).
pub fn can_place_at(grid: &Grid, shape: &PieceShape, x: i8, y: i8) -> bool {
    shape
        .iter()
        .all(|&(dx, dy)| grid.is_valid(x + dx, y + dy))
}

/// Absolute coordinates of a shape anchored at (x, y)
pub fn absolute_cells(shape: &PieceShape, x: i8, y: i8) -> [(i8, i8); 4] {
    shape.map(|(dx, dy)| (x + dx, y + dy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieceKind;

    #[test]
    fn test_can_place_bounds_and_occupancy() {
        let mut grid = Grid::new();
        let shape: PieceShape = [(0, 0), (1, 0), (0, 1), (1, 1)];

        assert!(can_place_at(&grid, &shape, 0, 38));
        assert!(!can_place_at(&grid, &shape, 0, 39));
        assert!(!can_place_at(&grid, &shape, -1, 0));
        assert!(!can_place_at(&grid, &shape, 9, 0));

        grid.set_cell(1, 39, PieceKind::J);
        assert!(!can_place_at(&grid, &shape, 0, 38));
        assert!(can_place(&grid, &absolute_cells(&shape, 2, 38)));
    }
}
