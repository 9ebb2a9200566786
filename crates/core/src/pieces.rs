//! Pieces module - tetromino shape templates and the cell matrix type
//!
//! Each kind has one spawn template: a small matrix whose filled cells carry
//! the kind itself, so a merged cell keeps its identity for rendering.
//! Rotation is pure geometry on the matrix (see [`Shape::rotated_cw`]); the
//! kick policy lives on the board.
//!
//! ```text
//! I  ####      J  #..     L  ..#     O  ##
//!                 ###        ###        ##
//!
//! S  .##       T  .#.     Z  ##.
//!    ##.          ###        .##
//! ```

use crate::types::{cell_value, Cell, PieceKind};

/// Largest edge of any shape matrix (the I piece stood up)
pub const MAX_SHAPE_EDGE: usize = 4;

const MAX_SHAPE_CELLS: usize = MAX_SHAPE_EDGE * MAX_SHAPE_EDGE;

/// A `rows x cols` matrix of cells, stored row-major.
///
/// Cells past `rows * cols` are always empty so that two shapes compare equal
/// exactly when their visible matrices match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: u8,
    cols: u8,
    cells: [Cell; MAX_SHAPE_CELLS],
}

impl Shape {
    /// Build a shape from rows of cell values (0 = empty, 1-7 = kind id).
    ///
    /// Panics if the matrix exceeds 4x4, is ragged, or holds a value above 7.
    /// Only used with the static templates below and in tests.
    pub(crate) fn from_rows(rows: &[&[u8]]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.len());
        assert!(height <= MAX_SHAPE_EDGE && width <= MAX_SHAPE_EDGE);

        let mut cells = [None; MAX_SHAPE_CELLS];
        for (r, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), width, "ragged shape row {r}");
            for (c, &value) in row.iter().enumerate() {
                cells[r * width + c] = match value {
                    0 => None,
                    id => Some(PieceKind::from_id(id).expect("shape value out of range")),
                };
            }
        }

        Self {
            rows: height as u8,
            cols: width as u8,
            cells,
        }
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    /// Cell at `(row, col)`; `None` outside the matrix.
    pub fn get(&self, row: u8, col: u8) -> Cell {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells[row as usize * self.cols as usize + col as usize]
    }

    /// Filled cells as `(col, row, kind)`, row-major.
    pub fn filled(&self) -> impl Iterator<Item = (u8, u8, PieceKind)> + '_ {
        let cols = self.cols as usize;
        self.cells[..self.rows as usize * cols]
            .iter()
            .enumerate()
            .filter_map(move |(i, cell)| cell.map(|kind| ((i % cols) as u8, (i / cols) as u8, kind)))
    }

    /// Rotate 90° clockwise: rows become columns in reverse order.
    ///
    /// A `rows x cols` matrix becomes `cols x rows`, with
    /// `rotated[c][rows - 1 - r] = self[r][c]`.
    pub fn rotated_cw(&self) -> Self {
        let (rows, cols) = (self.rows as usize, self.cols as usize);
        let mut cells = [None; MAX_SHAPE_CELLS];
        for r in 0..rows {
            for c in 0..cols {
                // new matrix is `cols` rows by `rows` columns
                cells[c * rows + (rows - 1 - r)] = self.cells[r * cols + c];
            }
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            cells,
        }
    }

    /// Row-major cell values (0-7), `rows * cols` long
    pub fn values(&self) -> Vec<u8> {
        self.cells[..self.rows as usize * self.cols as usize]
            .iter()
            .map(|&cell| cell_value(cell))
            .collect()
    }
}

/// Spawn template for a piece kind
pub fn template(kind: PieceKind) -> Shape {
    match kind {
        PieceKind::I => Shape::from_rows(&[&[1, 1, 1, 1]]),
        PieceKind::J => Shape::from_rows(&[&[2, 0, 0], &[2, 2, 2]]),
        PieceKind::L => Shape::from_rows(&[&[0, 0, 3], &[3, 3, 3]]),
        PieceKind::O => Shape::from_rows(&[&[4, 4], &[4, 4]]),
        PieceKind::S => Shape::from_rows(&[&[0, 5, 5], &[5, 5, 0]]),
        PieceKind::T => Shape::from_rows(&[&[0, 6, 0], &[6, 6, 6]]),
        PieceKind::Z => Shape::from_rows(&[&[7, 7, 0], &[0, 7, 7]]),
    }
}
