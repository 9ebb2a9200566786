//! RNG module - 7-bag random piece generation
//!
//! Implements the "7-bag" randomization algorithm: each bag holds one of every
//! kind (I, J, L, O, S, T, Z) in Fisher-Yates shuffled order. Pieces are drawn
//! front to back; a new bag is shuffled only once the previous one is empty.
//!
//! Every board owns its own seeded [`GameRng`], so a fixed seed reproduces the
//! whole piece sequence.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

use crate::types::{PieceKind, PIECE_KIND_COUNT};

/// Reproducible PRNG used by the engine
pub type GameRng = ChaCha12Rng;

/// Build a [`GameRng`] from a 64-bit seed
pub fn rng_from_seed(seed: u64) -> GameRng {
    GameRng::seed_from_u64(seed)
}

/// 7-bag piece generator
#[derive(Debug, Clone)]
pub struct PieceBag {
    /// Pending kinds, front is drawn next. Never longer than one bag.
    pending: VecDeque<PieceKind>,
    rng: GameRng,
}

impl PieceBag {
    /// Create an empty bag; the first draw shuffles the first batch
    pub fn new(rng: GameRng) -> Self {
        Self {
            pending: VecDeque::with_capacity(PIECE_KIND_COUNT),
            rng,
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::new(rng_from_seed(seed))
    }

    /// Append a freshly shuffled batch of all seven kinds.
    ///
    /// Only called on an empty queue.
    fn refill(&mut self) {
        debug_assert!(self.pending.is_empty());

        let mut batch = PieceKind::ALL;
        for i in (1..batch.len()).rev() {
            let j = self.rng.random_range(0..=i);
            batch.swap(i, j);
        }
        self.pending.extend(batch);
    }

    /// Draw the next piece, shuffling a new bag first if the current one is empty
    pub fn draw(&mut self) -> PieceKind {
        if self.pending.is_empty() {
            self.refill();
        }
        match self.pending.pop_front() {
            Some(kind) => kind,
            // refill() always leaves seven pieces behind
            None => unreachable!("bag is empty right after refill"),
        }
    }

    /// Peek at the next piece without removing it. `None` when a new bag
    /// has yet to be shuffled.
    pub fn peek(&self) -> Option<PieceKind> {
        self.pending.front().copied()
    }

    /// Number of pieces left in the current bag
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Shared access to the bag's PRNG for draws outside the bag
    pub fn rng_mut(&mut self) -> &mut GameRng {
        &mut self.rng
    }
}
