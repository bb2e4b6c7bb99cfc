//! Bag module - 7-bag random piece generation
//!
//! Two sets of seven pieces are kept: `current`, being drawn from, and `next`, already shuffled
//! so previews can look across the boundary. When `current` runs out, `next` is promoted and a
//! fresh permutation is shuffled into its place.
//!
//! Shuffling is Fisher-Yates over a seeded `StdRng`, so every one of the 7! orders is equally
//! likely and a given seed replays the same sequence.

use arrayvec::ArrayVec;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::{PieceKind, BAG_SIZE};

const CURRENT: usize = 0;
const NEXT: usize = 1;

/// 7-bag piece generator
#[derive(Debug, Clone)]
pub struct PieceBag {
    /// `[current, next]`
    sets: [[PieceKind; BAG_SIZE]; 2],
    /// Next slot to draw from `current`, always 0..=6
    index: usize,
    rng: StdRng,
    seed: u64,
}

impl PieceBag {
    /// Create a bag with both sets freshly shuffled
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut sets = [PieceKind::ALL; 2];
        shuffle(&mut rng, &mut sets[CURRENT]);
        shuffle(&mut rng, &mut sets[NEXT]);
        Self {
            sets,
            index: 0,
            rng,
            seed,
        }
    }

    /// Promote `next` to `current` and shuffle a new `next`
    pub fn advance(&mut self) {
        self.sets[CURRENT] = self.sets[NEXT];
        self.sets[NEXT] = PieceKind::ALL;
        shuffle(&mut self.rng, &mut self.sets[NEXT]);
        self.index = 0;
        self.validate_or_repair();
    }

    /// Read-only lookup: `set` 0 is current, 1 is next
    pub fn peek(&self, set: usize, slot: usize) -> PieceKind {
        self.sets[set][slot]
    }

    /// Draw the next piece, advancing to a new bag when `current` is exhausted
    pub fn draw(&mut self) -> PieceKind {
        let piece = self.sets[CURRENT][self.index];
        self.index += 1;
        if self.index == BAG_SIZE {
            self.advance();
        }
        piece
    }

    /// The next `n` pieces in draw order, reading across the bag boundary.
    ///
    /// At least eight pieces are always available, so `n` is clamped to [`BAG_SIZE`].
    pub fn preview(&self, n: usize) -> ArrayVec<PieceKind, BAG_SIZE> {
        let remaining = &self.sets[CURRENT][self.index..];
        remaining
            .iter()
            .chain(self.sets[NEXT].iter())
            .take(n.min(BAG_SIZE))
            .copied()
            .collect()
    }

    /// Position of the next draw inside `current`
    pub fn index(&self) -> usize {
        self.index
    }

    /// Seed this bag was created with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draw a seed for a follow-up session from this bag's generator
    pub fn next_seed(&mut self) -> u64 {
        self.rng.random()
    }

    /// Check both sets are permutations of the seven kinds
    pub fn is_valid(&self) -> bool {
        self.sets.iter().all(is_permutation)
    }

    /// Reshuffle any set that is not a permutation of the seven kinds.
    ///
    /// Returns true if a repair was needed.
    pub fn validate_or_repair(&mut self) -> bool {
        let mut repaired = false;
        for set in 0..self.sets.len() {
            if !is_permutation(&self.sets[set]) {
                tracing::error!(set, contents = ?self.sets[set], "bag integrity violated, reshuffling");
                self.sets[set] = PieceKind::ALL;
                shuffle(&mut self.rng, &mut self.sets[set]);
                if set == CURRENT {
                    self.index = 0;
                }
                repaired = true;
            }
        }
        repaired
    }

    #[cfg(test)]
    pub(crate) fn sets_mut(&mut self) -> &mut [[PieceKind; BAG_SIZE]; 2] {
        &mut self.sets
    }
}

impl Default for PieceBag {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Unbiased Fisher-Yates
fn shuffle(rng: &mut StdRng, slice: &mut [PieceKind]) {
    for i in (1..slice.len()).rev() {
        let j = rng.random_range(0..=i);
        slice.swap(i, j);
    }
}

fn is_permutation(set: &[PieceKind; BAG_SIZE]) -> bool {
    let mut seen = [false; BAG_SIZE];
    for kind in set {
        let idx = kind.index();
        if seen[idx] {
            return false;
        }
        seen[idx] = true;
    }
    true
}
