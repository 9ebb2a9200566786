//! Board module - one player's playfield and falling piece
//!
//! A board owns its grid, the current piece, the previewed next piece and a
//! seeded 7-bag. Every operation keeps the current piece at a legal position:
//! a tentative move or rotation that collides is reverted before returning.
//!
//! Lifecycle of a piece (all transitions happen synchronously inside
//! [`Board::step`]):
//!
//! ```text
//! Idle --spawn--> Falling --move down fails--> merge -> clear lines
//!                    ^                                      |
//!                    +--------- spawn <-- row 0 empty <-----+
//!                                         row 0 filled --> GameOver
//! ```

use tracing::{debug, info, trace, warn};

use crate::config::{BoardConfig, InitialNext};
use crate::error::{ConfigError, MergeError};
use crate::grid::Grid;
use crate::rng::PieceBag;
use crate::tetromino::Tetromino;
use crate::types::{SPAWN_X, SPAWN_Y};

/// Offsets tried, in order, when a rotated piece collides in place.
pub const WALL_KICKS: [(i8, i8); 5] = [(-1, 0), (1, 0), (-2, 0), (2, 0), (0, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum BoardPhase {
    /// No piece has spawned yet
    Idle,
    /// A piece is falling
    Falling,
    /// Terminal: the stack reached the top row
    GameOver,
}

/// What one gravity step did to a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum BoardStep {
    /// The first piece was spawned
    Spawned,
    /// The piece moved down one row
    Fell,
    /// The piece locked, `lines` rows were cleared and the next piece spawned
    Locked { lines: u32 },
    /// The piece locked and the board is now over
    ToppedOut { lines: u32 },
    /// The board was already over; nothing changed
    Halted,
}

impl BoardStep {
    /// Rows cleared by this step
    pub fn lines(&self) -> u32 {
        match self {
            BoardStep::Locked { lines } | BoardStep::ToppedOut { lines } => *lines,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Board {
    config: BoardConfig,
    seed: u64,
    grid: Grid,
    current: Option<Tetromino>,
    next: Tetromino,
    bag: PieceBag,
    /// Number of pieces spawned so far
    piece_id: u32,
    /// A merged piece had cells above the top row
    locked_out: bool,
    /// Terminal state reached through `step`
    topped_out: bool,
}

impl Board {
    /// Create a default 10x20 board. No piece is spawned yet.
    pub fn new(seed: u64) -> Self {
        Self::build(BoardConfig::default(), seed)
    }

    /// Create a board with custom dimensions. No piece is spawned yet.
    pub fn with_config(config: BoardConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, seed))
    }

    /// Start from a prepared grid (puzzles, tests). No piece is spawned yet.
    pub fn from_grid(grid: Grid, seed: u64) -> Result<Self, ConfigError> {
        let config = BoardConfig {
            width: grid.width(),
            height: grid.height(),
            ..BoardConfig::default()
        };
        config.validate()?;

        let mut board = Self::build(config, seed);
        board.grid = grid;
        Ok(board)
    }

    fn build(config: BoardConfig, seed: u64) -> Self {
        let mut bag = PieceBag::from_seed(seed);
        let next = match config.initial_next {
            InitialNext::Uniform => Tetromino::random(bag.rng_mut()),
            InitialNext::Bag => Tetromino::new(bag.draw()),
        };

        Self {
            config,
            seed,
            grid: Grid::new(config.width, config.height),
            current: None,
            next,
            bag,
            piece_id: 0,
            locked_out: false,
            topped_out: false,
        }
    }

    /// Back to the freshly built state for the same seed (no piece spawned)
    pub fn reset(&mut self) {
        *self = Self::build(self.config, self.seed);
    }

    /// Reset onto a different seed
    pub fn reseed(&mut self, seed: u64) {
        *self = Self::build(self.config, seed);
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn current(&self) -> Option<&Tetromino> {
        self.current.as_ref()
    }

    pub fn next(&self) -> &Tetromino {
        &self.next
    }

    pub fn piece_id(&self) -> u32 {
        self.piece_id
    }

    pub fn phase(&self) -> BoardPhase {
        if self.is_game_over() {
            BoardPhase::GameOver
        } else if self.current.is_some() {
            BoardPhase::Falling
        } else {
            BoardPhase::Idle
        }
    }

    /// Promote the next piece to current at the spawn position and draw a new
    /// next piece from the bag.
    ///
    /// The spawn cell is not checked; a blocked spawn shows up as a failed
    /// merge or a filled top row on the following lock.
    pub fn spawn_new_piece(&mut self) {
        let upcoming = Tetromino::new(self.bag.draw());
        let mut piece = std::mem::replace(&mut self.next, upcoming);
        piece.set_position(SPAWN_X, SPAWN_Y);
        self.current = Some(piece);
        self.piece_id = self.piece_id.wrapping_add(1);

        debug!(
            piece_id = self.piece_id,
            kind = piece.kind().as_str(),
            next = self.next.kind().as_str(),
            "spawned piece"
        );
    }

    /// Whether `piece` overlaps a wall, the floor or a locked cell.
    ///
    /// Cells above the top row only collide with the side walls.
    fn collides(grid: &Grid, piece: &Tetromino) -> bool {
        piece.minos().iter().any(|&(x, y)| {
            x < 0
                || x >= grid.width() as i8
                || y >= grid.height() as i8
                || (y >= 0 && grid.is_occupied(x, y))
        })
    }

    /// Whether the current piece collides at its position. `true` when there
    /// is no current piece.
    pub fn check_collision(&self) -> bool {
        match &self.current {
            Some(piece) => Self::collides(&self.grid, piece),
            None => true,
        }
    }

    /// Try to shift the current piece; revert on collision
    fn try_shift(&mut self, dx: i8, dy: i8) -> bool {
        let Some(piece) = self.current.as_mut() else {
            return false;
        };

        piece.shift(dx, dy);
        if Self::collides(&self.grid, piece) {
            piece.shift(-dx, -dy);
            return false;
        }
        true
    }

    /// Move down one row. `false` means the piece rests on something and
    /// should lock.
    pub fn move_piece_down(&mut self) -> bool {
        self.try_shift(0, 1)
    }

    pub fn move_piece_left(&mut self) -> bool {
        self.try_shift(-1, 0)
    }

    pub fn move_piece_right(&mut self) -> bool {
        self.try_shift(1, 0)
    }

    /// Rotate clockwise, kicking if needed
    pub fn right_rotate_piece(&mut self) -> bool {
        self.rotate_with_kicks(1)
    }

    /// Rotate counter-clockwise (three clockwise turns), kicking if needed
    pub fn left_rotate_piece(&mut self) -> bool {
        self.rotate_with_kicks(3)
    }

    /// Apply `turns` clockwise rotations. If the result collides in place,
    /// try each of [`WALL_KICKS`] from the pre-rotation position and keep the
    /// first that fits; otherwise restore shape and position.
    fn rotate_with_kicks(&mut self, turns: u8) -> bool {
        let Some(piece) = self.current.as_mut() else {
            return false;
        };

        let original = *piece;
        for _ in 0..turns {
            piece.rotate();
        }
        if !Self::collides(&self.grid, piece) {
            return true;
        }

        for (dx, dy) in WALL_KICKS {
            piece.set_position(original.x() + dx, original.y() + dy);
            if !Self::collides(&self.grid, piece) {
                trace!(dx, dy, kind = piece.kind().as_str(), "wall kick");
                return true;
            }
        }

        *piece = original;
        false
    }

    /// Hard drop: fall until blocked. Returns the rows travelled.
    ///
    /// The piece is not locked here; the next gravity step does that.
    pub fn drop_piece(&mut self) -> u32 {
        let mut rows = 0;
        while self.move_piece_down() {
            rows += 1;
        }
        rows
    }

    /// Write the current piece's cells into the grid.
    ///
    /// Every visible cell must be inside the board and empty; otherwise an
    /// error is returned and the grid is untouched. Cells above the top row
    /// are dropped and mark the board as locked out. Without a current piece
    /// this does nothing.
    pub fn merge_piece(&mut self) -> Result<(), MergeError> {
        let Some(piece) = self.current else {
            return Ok(());
        };

        for (x, y) in piece.minos() {
            if x < 0 || x >= self.grid.width() as i8 || y >= self.grid.height() as i8 {
                return Err(MergeError::OutOfBounds { x, y });
            }
            if y >= 0 && self.grid.is_occupied(x, y) {
                return Err(MergeError::Occupied { x, y });
            }
        }

        for (col, row, kind) in piece.shape().filled() {
            let (x, y) = (piece.x() + col as i8, piece.y() + row as i8);
            if y < 0 {
                self.locked_out = true;
                continue;
            }
            self.grid.set(x, y, Some(kind));
        }
        Ok(())
    }

    /// Remove full rows; returns how many
    pub fn clear_lines(&mut self) -> u32 {
        self.grid.clear_lines()
    }

    /// True once the top row holds a locked cell, a piece locked above it or
    /// a piece failed to lock
    pub fn is_game_over(&self) -> bool {
        self.topped_out || self.locked_out || self.grid.top_row_occupied()
    }

    /// One gravity step: fall a row, or lock, clear, check and spawn.
    ///
    /// A board that is already over (including one built on a grid with a
    /// filled top row) stays halted.
    pub fn step(&mut self) -> BoardStep {
        if self.is_game_over() {
            self.topped_out = true;
            return BoardStep::Halted;
        }
        if self.current.is_none() {
            self.spawn_new_piece();
            return BoardStep::Spawned;
        }
        if self.move_piece_down() {
            return BoardStep::Fell;
        }
        self.lock()
    }

    fn lock(&mut self) -> BoardStep {
        let merged = self.merge_piece();
        let piece = self.current.take();

        if let Err(err) = merged {
            // only reachable when the spawn cell was already blocked
            warn!(%err, piece_id = self.piece_id, "piece could not lock");
            self.topped_out = true;
            return BoardStep::ToppedOut { lines: 0 };
        }

        let lines = self.clear_lines();
        if lines > 0 {
            info!(lines, piece_id = self.piece_id, "cleared lines");
        }
        debug!(
            piece_id = self.piece_id,
            kind = ?piece.map(|p| p.kind()),
            lines,
            "piece locked"
        );

        if self.is_game_over() {
            info!(piece_id = self.piece_id, "board topped out");
            self.topped_out = true;
            return BoardStep::ToppedOut { lines };
        }

        self.spawn_new_piece();
        BoardStep::Locked { lines }
    }

    #[cfg(test)]
    pub(crate) fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    #[cfg(test)]
    pub(crate) fn set_current(&mut self, piece: Option<Tetromino>) {
        self.current = piece;
    }

    #[cfg(test)]
    pub(crate) fn set_next(&mut self, piece: Tetromino) {
        self.next = piece;
    }
}
