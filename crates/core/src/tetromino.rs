//! Tetromino module - a piece instance: shape matrix plus board position

use arrayvec::ArrayVec;
use rand::Rng;

use crate::pieces::{template, Shape};
use crate::types::{PieceKind, Rgb};

/// Board coordinates of a piece's four filled cells
pub type Minos = ArrayVec<(i8, i8), 4>;

/// A falling (or previewed) piece
///
/// `x`/`y` is the board position of the shape matrix's top-left corner. Cells
/// may sit above row 0 (`y < 0`) while the piece settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tetromino {
    kind: PieceKind,
    shape: Shape,
    x: i8,
    y: i8,
}

impl Tetromino {
    /// Create a piece in its spawn orientation at the unset origin (0, 0)
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            shape: template(kind),
            x: 0,
            y: 0,
        }
    }

    /// Create a piece of a uniformly random kind.
    ///
    /// This does not consult any bag, so it carries no fairness guarantee.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let kind = PieceKind::ALL[rng.random_range(0..PieceKind::ALL.len())];
        Self::new(kind)
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn color(&self) -> Rgb {
        self.kind.color()
    }

    pub fn x(&self) -> i8 {
        self.x
    }

    pub fn y(&self) -> i8 {
        self.y
    }

    pub fn position(&self) -> (i8, i8) {
        (self.x, self.y)
    }

    pub fn set_position(&mut self, x: i8, y: i8) {
        self.x = x;
        self.y = y;
    }

    /// Move by an offset
    pub fn shift(&mut self, dx: i8, dy: i8) {
        self.x += dx;
        self.y += dy;
    }

    /// Replace the shape with its 90° clockwise rotation.
    ///
    /// Does not look at any board; the caller validates the result.
    pub fn rotate(&mut self) {
        self.shape = self.shape.rotated_cw();
    }

    /// Board coordinates of the filled cells at the current position
    pub fn minos(&self) -> Minos {
        self.shape
            .filled()
            .map(|(col, row, _)| (self.x + col as i8, self.y + row as i8))
            .collect()
    }
}
