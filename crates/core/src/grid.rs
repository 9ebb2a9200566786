//! Grid module - the locked cells of one board
//!
//! The grid is a `width x height` field where each cell is empty or holds the
//! kind of the piece that was merged there. Storage is a flat row-major vector
//! (`y * width + x`); `(0, 0)` is the top-left corner and y grows downward.

use crate::types::{cell_value, Cell, PieceKind, BOARD_HEIGHT, BOARD_WIDTH, MAX_BOARD_EDGE};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    width: u8,
    height: u8,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an empty grid. Play limits are validated by
    /// [`BoardConfig`](crate::BoardConfig).
    ///
    /// # Panics
    ///
    /// If either edge is zero or larger than `MAX_BOARD_EDGE`.
    pub fn new(width: u8, height: u8) -> Self {
        let edge = 1..=MAX_BOARD_EDGE;
        assert!(
            edge.contains(&width) && edge.contains(&height),
            "grid edges must be 1..={MAX_BOARD_EDGE}, got {width}x{height}"
        );
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(&self, x: i8, y: i8) -> Option<usize> {
        if self.is_out_of_bounds(x, y) {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    pub fn is_out_of_bounds(&self, x: i8, y: i8) -> bool {
        x < 0 || x >= self.width as i8 || y < 0 || y >= self.height as i8
    }

    /// One row of cells, left to right
    pub fn row(&self, y: usize) -> &[Cell] {
        let width = self.width as usize;
        &self.cells[y * width..(y + 1) * width]
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= self.height as usize {
            return false;
        }
        self.row(y).iter().all(|cell| cell.is_some())
    }

    /// Remove row `y`: every row above moves down by one and the top row
    /// becomes empty.
    fn collapse_row(&mut self, y: usize) {
        let width = self.width as usize;

        // copy_within handles the overlapping ranges
        for row in (1..=y).rev() {
            let src_start = (row - 1) * width;
            self.cells
                .copy_within(src_start..src_start + width, row * width);
        }

        for cell in &mut self.cells[..width] {
            *cell = None;
        }
    }

    /// Remove every full row and return how many were removed.
    ///
    /// Rows are scanned bottom to top. After a full row collapses, the same
    /// index is examined again because the row above has just moved into it,
    /// so several full rows (adjacent or not) go away in one pass.
    pub fn clear_lines(&mut self) -> u32 {
        let mut cleared = 0;
        let mut y = self.height as usize;

        while y > 0 {
            let row = y - 1;
            if self.is_row_full(row) {
                cleared += 1;
                self.collapse_row(row);
            } else {
                y -= 1;
            }
        }

        cleared
    }

    /// True when the top row holds any locked cell
    pub fn top_row_occupied(&self) -> bool {
        self.row(0).iter().any(|cell| cell.is_some())
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Write the grid as cell values (0-7), row-major, reusing `out`
    pub fn write_values(&self, out: &mut Vec<u8>) {
        out.clear();
        out.extend(self.cells.iter().map(|&cell| cell_value(cell)));
    }

    /// Cell values (0-7), row-major
    pub fn values(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.cells.len());
        self.write_values(&mut out);
        out
    }

    /// Build a grid from rows of cell values, top row first (for tests and
    /// puzzle setups). Values outside 1-7 are read as empty.
    ///
    /// # Panics
    ///
    /// If the rows differ in length or either edge is outside
    /// `1..=MAX_BOARD_EDGE`.
    pub fn from_values(rows: &[&[u8]]) -> Self {
        let width = rows.first().map_or(0, |row| row.len());
        assert!(rows.iter().all(|row| row.len() == width), "rows differ in length");
        let (Ok(width), Ok(height)) = (u8::try_from(width), u8::try_from(rows.len())) else {
            panic!("grid edges must be 1..={MAX_BOARD_EDGE}, got {width}x{}", rows.len());
        };

        let mut grid = Self::new(width, height);
        // edges are at most MAX_BOARD_EDGE, so every index fits in i8
        for (y, row) in (0i8..).zip(rows.iter()) {
            for (x, &value) in (0i8..).zip(row.iter()) {
                grid.set(x, y, PieceKind::from_id(value));
            }
        }
        grid
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(BOARD_WIDTH, BOARD_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_row(grid: &mut Grid, y: i8, kind: PieceKind) {
        for x in 0..grid.width() as i8 {
            grid.set(x, y, Some(kind));
        }
    }

    #[test]
    fn test_grid_index_calculation() {
        let grid = Grid::default();
        assert_eq!(grid.index(0, 0), Some(0));
        assert_eq!(grid.index(9, 0), Some(9));
        assert_eq!(grid.index(0, 1), Some(10));
        assert_eq!(grid.index(9, 19), Some(199));
        assert_eq!(grid.index(-1, 0), None);
        assert_eq!(grid.index(10, 0), None);
        assert_eq!(grid.index(0, 20), None);
    }

    #[test]
    fn test_grid_flat_array() {
        let mut grid = Grid::default();

        grid.set(0, 0, Some(PieceKind::I));
        grid.set(5, 10, Some(PieceKind::T));

        assert_eq!(grid.get(0, 0), Some(Some(PieceKind::I)));
        assert_eq!(grid.get(5, 10), Some(Some(PieceKind::T)));
        assert_eq!(grid.cells[0], Some(PieceKind::I));
        assert_eq!(grid.cells[10 * 10 + 5], Some(PieceKind::T));
    }

    #[test]
    fn test_non_default_dimensions() {
        let grid = Grid::new(12, 8);
        assert_eq!(grid.cells().len(), 96);
        assert_eq!(grid.index(11, 7), Some(95));
        assert_eq!(grid.index(12, 0), None);
        assert_eq!(grid.index(0, 8), None);
    }

    #[test]
    fn test_clear_bottom_row_pulls_row_above_down() {
        let mut grid = Grid::default();
        fill_row(&mut grid, 19, PieceKind::I);
        grid.set(0, 18, Some(PieceKind::T));
        grid.set(4, 18, Some(PieceKind::Z));

        assert_eq!(grid.clear_lines(), 1);

        let bottom: Vec<u8> = grid.row(19).iter().map(|&c| cell_value(c)).collect();
        assert_eq!(bottom, vec![6, 0, 0, 0, 7, 0, 0, 0, 0, 0]);
        assert!(grid.row(18).iter().all(|c| c.is_none()));
        assert!(!grid.top_row_occupied());
    }

    #[test]
    fn test_clear_two_separated_rows() {
        let mut grid = Grid::default();
        fill_row(&mut grid, 19, PieceKind::I);
        grid.set(1, 18, Some(PieceKind::J));
        fill_row(&mut grid, 17, PieceKind::O);
        grid.set(2, 16, Some(PieceKind::L));

        assert_eq!(grid.clear_lines(), 2);

        assert_eq!(grid.get(1, 19), Some(Some(PieceKind::J)));
        assert_eq!(grid.get(2, 18), Some(Some(PieceKind::L)));
        assert_eq!(grid.cells().iter().filter(|c| c.is_some()).count(), 2);
    }

    #[test]
    fn test_clear_adjacent_rows() {
        let mut grid = Grid::default();
        for y in 16..20 {
            fill_row(&mut grid, y, PieceKind::I);
        }
        grid.set(9, 15, Some(PieceKind::S));

        assert_eq!(grid.clear_lines(), 4);
        assert_eq!(grid.get(9, 19), Some(Some(PieceKind::S)));
        assert_eq!(grid.cells().iter().filter(|c| c.is_some()).count(), 1);
    }

    #[test]
    fn test_clear_full_top_row_leaves_it_empty() {
        let mut grid = Grid::default();
        fill_row(&mut grid, 0, PieceKind::T);

        assert_eq!(grid.clear_lines(), 1);
        assert!(!grid.top_row_occupied());
        assert!(grid.cells().iter().all(|c| c.is_none()));
    }

    #[test]
    fn test_clear_nothing() {
        let mut grid = Grid::default();
        grid.set(3, 19, Some(PieceKind::O));
        let before = grid.clone();

        assert_eq!(grid.clear_lines(), 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_top_row_occupied() {
        let mut grid = Grid::default();
        for y in 1..20 {
            fill_row(&mut grid, y, PieceKind::L);
        }
        assert!(!grid.top_row_occupied());

        grid.set(7, 0, Some(PieceKind::L));
        assert!(grid.top_row_occupied());
    }

    proptest::proptest! {
        #[test]
        fn test_clear_lines_removes_exactly_the_full_rows(
            rows in proptest::collection::vec(proptest::collection::vec(0u8..8, 10), 20),
        ) {
            let rows: Vec<&[u8]> = rows.iter().map(Vec::as_slice).collect();
            let mut grid = Grid::from_values(&rows);
            let full = (0..20).filter(|&y| grid.is_row_full(y)).count() as u32;
            let kept: Vec<Vec<u8>> = (0..20)
                .filter(|&y| !grid.is_row_full(y))
                .map(|y| grid.row(y).iter().map(|&c| cell_value(c)).collect())
                .collect();

            proptest::prop_assert_eq!(grid.clear_lines(), full);
            proptest::prop_assert!((0..20).all(|y| !grid.is_row_full(y)));

            // surviving rows keep their order and settle at the bottom
            let offset = full as usize;
            for (i, row) in kept.iter().enumerate() {
                let actual: Vec<u8> = grid.row(offset + i).iter().map(|&c| cell_value(c)).collect();
                proptest::prop_assert_eq!(&actual, row);
            }
            proptest::prop_assert!(grid.cells()[..offset * 10].iter().all(|c| c.is_none()));
        }
    }

    #[test]
    #[should_panic(expected = "grid edges")]
    fn test_new_rejects_empty_grid() {
        Grid::new(0, 0);
    }

    #[test]
    #[should_panic(expected = "grid edges")]
    fn test_new_rejects_oversized_grid() {
        Grid::new(MAX_BOARD_EDGE + 1, 4);
    }

    #[test]
    #[should_panic(expected = "grid edges")]
    fn test_from_values_rejects_wide_rows() {
        let row = vec![1u8; 259];
        Grid::from_values(&[&row]);
    }

    #[test]
    #[should_panic(expected = "rows differ in length")]
    fn test_from_values_rejects_ragged_rows() {
        Grid::from_values(&[&[0, 0, 0, 0], &[0, 0, 0]]);
    }

    #[test]
    fn test_values_and_from_values() {
        let grid = Grid::from_values(&[&[0, 0, 0, 0, 0, 0, 0], &[1, 2, 3, 4, 5, 6, 7]]);
        assert_eq!((grid.width(), grid.height()), (7, 2));
        assert_eq!(grid.values(), vec![0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]);
        assert!(grid.is_row_full(1));
        assert!(!grid.is_row_full(0));
        assert!(!grid.is_row_full(2));
    }
}
