//! Pieces module - Tetromino shapes and SRS rotation system
//!
//! Shapes are stored once, in their spawn (North) orientation. Other orientations are derived
//! geometrically inside the piece's rotation box: N=4 for I, N=3 for the rest, and O never
//! rotates. A rotation then walks the wall kick table for (kind, from-rotation, direction) and
//! accepts the first offset that fits.
//!
//! Kick offsets use the grid's y-down convention.
//! Reference: https://tetris.wiki/SRS

use crate::collision::can_place_at;
use crate::grid::Grid;
use crate::types::{PieceKind, RotateDirection, Rotation};

/// Offset of a single mino relative to piece anchor
pub type MinoOffset = (i8, i8);

/// Shape of a piece - 4 mino offsets from piece anchor
pub type PieceShape = [MinoOffset; 4];

/// Ordered kick offsets for one (from-rotation, direction) pair
pub type KickRow = [MinoOffset; 5];

/// Get the spawn (North) shape for a piece kind
pub fn spawn_shape(kind: PieceKind) -> PieceShape {
    match kind {
        PieceKind::I => [(0, 1), (1, 1), (2, 1), (3, 1)],
        PieceKind::O => [(1, 0), (2, 0), (1, 1), (2, 1)],
        PieceKind::T => [(1, 0), (0, 1), (1, 1), (2, 1)],
        PieceKind::S => [(1, 0), (2, 0), (0, 1), (1, 1)],
        PieceKind::Z => [(0, 0), (1, 0), (1, 1), (2, 1)],
        PieceKind::J => [(0, 0), (0, 1), (1, 1), (2, 1)],
        PieceKind::L => [(2, 0), (0, 1), (1, 1), (2, 1)],
    }
}

/// Side length of the box a piece rotates inside
pub fn rotation_box_size(kind: PieceKind) -> i8 {
    match kind {
        PieceKind::I | PieceKind::O => 4,
        _ => 3,
    }
}

/// Rotate mino offsets 90° inside the piece's rotation box.
///
/// Clockwise maps `(x, y)` to `(N-1-y, x)`; counter-clockwise maps `(x, y)` to `(y, N-1-x)`.
/// The O piece is returned unchanged.
pub fn rotate_shape(kind: PieceKind, shape: &PieceShape, direction: RotateDirection) -> PieceShape {
    if kind == PieceKind::O {
        return *shape;
    }
    let n = rotation_box_size(kind);
    match direction {
        RotateDirection::Clockwise => shape.map(|(x, y)| (n - 1 - y, x)),
        RotateDirection::CounterClockwise => shape.map(|(x, y)| (y, n - 1 - x)),
    }
}

/// Get the shape (mino offsets) for a piece kind and rotation
pub fn get_shape(kind: PieceKind, rotation: Rotation) -> PieceShape {
    let mut shape = spawn_shape(kind);
    for _ in 0..rotation.index() {
        shape = rotate_shape(kind, &shape, RotateDirection::Clockwise);
    }
    shape
}

/// JLSTZ kicks, indexed by from-rotation
const JLSTZ_CW: [KickRow; 4] = [
    // N -> E
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    // E -> S
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // S -> W
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // W -> N
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
];

const JLSTZ_CCW: [KickRow; 4] = [
    // N -> W
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // E -> N
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // S -> E
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    // W -> S
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
];

const I_CW: [KickRow; 4] = [
    // N -> E
    [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],
    // E -> S
    [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)],
    // S -> W
    [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],
    // W -> N
    [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)],
];

const I_CCW: [KickRow; 4] = [
    // N -> W
    [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)],
    // E -> N
    [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],
    // S -> E
    [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)],
    // W -> S
    [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],
];

/// Ordered kick offsets to try for a rotation out of `from`.
///
/// Always starts with (0, 0) when non-empty. The O piece has no table.
pub fn kick_offsets(kind: PieceKind, from: Rotation, direction: RotateDirection) -> &'static [MinoOffset] {
    let table = match (kind, direction) {
        (PieceKind::O, _) => return &[],
        (PieceKind::I, RotateDirection::Clockwise) => &I_CW,
        (PieceKind::I, RotateDirection::CounterClockwise) => &I_CCW,
        (_, RotateDirection::Clockwise) => &JLSTZ_CW,
        (_, RotateDirection::CounterClockwise) => &JLSTZ_CCW,
    };
    &table[from.index()]
}

/// Result of an accepted rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationOutcome {
    pub shape: PieceShape,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
    /// 1-based position of the kick that fit
    pub kick_ordinal: u8,
}

/// Try to rotate a piece with wall kicks.
/// Returns `None` if every kick collides; the caller's piece is left as it was.
pub fn try_rotate(
    grid: &Grid,
    kind: PieceKind,
    rotation: Rotation,
    shape: &PieceShape,
    x: i8,
    y: i8,
    direction: RotateDirection,
) -> Option<RotationOutcome> {
    let rotated = rotate_shape(kind, shape, direction);
    let target = rotation.rotate(direction);

    kick_offsets(kind, rotation, direction)
        .iter()
        .enumerate()
        .find(|(_, &(dx, dy))| can_place_at(grid, &rotated, x + dx, y + dy))
        .map(|(i, &(dx, dy))| RotationOutcome {
            shape: rotated,
            rotation: target,
            x: x + dx,
            y: y + dy,
            kick_ordinal: i as u8 + 1,
        })
}

/// Diagonal corners around the T piece's center, relative to its anchor.
///
/// Order: front-left, front-right, back-left, back-right. "Front" is the side the T points to.
pub fn t_corner_offsets(rotation: Rotation) -> [MinoOffset; 4] {
    match rotation {
        Rotation::North => [(0, 0), (2, 0), (0, 2), (2, 2)],
        Rotation::East => [(2, 0), (2, 2), (0, 0), (0, 2)],
        Rotation::South => [(2, 2), (0, 2), (2, 0), (0, 0)],
        Rotation::West => [(0, 2), (0, 0), (2, 2), (2, 0)],
    }
}
