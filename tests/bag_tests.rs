//! Bag tests - 7-bag permutations, preview and determinism

use std::collections::HashSet;

use proptest::prelude::*;
use srs_tetris::core::PieceBag;
use srs_tetris::types::{PieceKind, BAG_SIZE};

fn is_permutation(pieces: &[PieceKind]) -> bool {
    let unique: HashSet<PieceKind> = pieces.iter().copied().collect();
    pieces.len() == BAG_SIZE && unique.len() == BAG_SIZE
}

#[test]
fn test_same_seed_same_sequence() {
    let mut a = PieceBag::new(2024);
    let mut b = PieceBag::new(2024);
    for _ in 0..70 {
        assert_eq!(a.draw(), b.draw());
    }
}

#[test]
fn test_different_seeds_diverge() {
    let mut a = PieceBag::new(1);
    let mut b = PieceBag::new(2);
    let seq_a: Vec<PieceKind> = (0..28).map(|_| a.draw()).collect();
    let seq_b: Vec<PieceKind> = (0..28).map(|_| b.draw()).collect();
    assert_ne!(seq_a, seq_b);
}

#[test]
fn test_preview_crosses_bag_boundary() {
    let mut bag = PieceBag::new(99);
    for _ in 0..5 {
        bag.draw();
    }
    assert_eq!(bag.index(), 5);

    let preview = bag.preview(6);
    assert_eq!(preview.len(), 6);
    assert_eq!(preview[0], bag.peek(0, 5));
    assert_eq!(preview[1], bag.peek(0, 6));
    assert_eq!(preview[2], bag.peek(1, 0));

    // Preview is a promise: draws follow it exactly.
    for expected in preview {
        assert_eq!(bag.draw(), expected);
    }
}

#[test]
fn test_preview_is_capped_at_bag_size() {
    let bag = PieceBag::new(5);
    assert_eq!(bag.preview(20).len(), BAG_SIZE);
    assert!(bag.preview(0).is_empty());
}

#[test]
fn test_index_wraps_after_seven_draws() {
    let mut bag = PieceBag::new(11);
    let upcoming: Vec<PieceKind> = (0..BAG_SIZE).map(|slot| bag.peek(1, slot)).collect();
    for _ in 0..BAG_SIZE {
        bag.draw();
    }
    assert_eq!(bag.index(), 0);
    let current: Vec<PieceKind> = (0..BAG_SIZE).map(|slot| bag.peek(0, slot)).collect();
    assert_eq!(current, upcoming);
    assert!(bag.is_valid());
}

#[test]
fn test_next_seed_is_deterministic() {
    let mut a = PieceBag::new(77);
    let mut b = PieceBag::new(77);
    assert_eq!(a.next_seed(), b.next_seed());
    assert_eq!(a.seed(), 77);
}

proptest! {
    #[test]
    fn every_window_of_seven_is_a_permutation(seed in any::<u64>(), bags in 1usize..12) {
        let mut bag = PieceBag::new(seed);
        for _ in 0..bags {
            let window: Vec<PieceKind> = (0..BAG_SIZE).map(|_| bag.draw()).collect();
            prop_assert!(is_permutation(&window), "{:?}", window);
        }
        prop_assert!(bag.is_valid());
    }

    #[test]
    fn same_kind_recurs_within_thirteen_draws(seed in any::<u64>()) {
        let mut bag = PieceBag::new(seed);
        let sequence: Vec<PieceKind> = (0..70).map(|_| bag.draw()).collect();
        for kind in PieceKind::ALL {
            let positions: Vec<usize> = sequence
                .iter()
                .enumerate()
                .filter(|(_, &k)| k == kind)
                .map(|(i, _)| i)
                .collect();
            for pair in positions.windows(2) {
                prop_assert!(pair[1] - pair[0] <= 13);
            }
        }
    }
}
