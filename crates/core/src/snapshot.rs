//! Read-only views of a session for renderers and hosts.
//!
//! Snapshots own their data and serialize with serde, so a host can log them,
//! diff them between frames or ship them as JSON.

use serde::Serialize;

use crate::board::Board;
use crate::session::Outcome;
use crate::tetromino::Tetromino;
use crate::types::{GameMode, PieceKind, Rgb};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PieceView {
    pub kind: PieceKind,
    pub id: u8,
    pub color: Rgb,
    pub x: i8,
    pub y: i8,
    pub rows: u8,
    pub cols: u8,
    /// Row-major shape matrix as cell values
    pub cells: Vec<u8>,
}

impl From<&Tetromino> for PieceView {
    fn from(value: &Tetromino) -> Self {
        let shape = value.shape();
        Self {
            kind: value.kind(),
            id: value.kind().id(),
            color: value.color(),
            x: value.x(),
            y: value.y(),
            rows: shape.rows(),
            cols: shape.cols(),
            cells: shape.values(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BoardSnapshot {
    pub width: u8,
    pub height: u8,
    /// Locked cells, row-major, values 0-7
    pub grid: Vec<u8>,
    pub current: Option<PieceView>,
    pub next: PieceView,
    pub score: u32,
    pub game_over: bool,
    pub piece_id: u32,
}

impl BoardSnapshot {
    pub fn from_board(board: &Board, score: u32, game_over: bool) -> Self {
        let grid = board.grid();
        Self {
            width: grid.width(),
            height: grid.height(),
            grid: grid.values(),
            current: board.current().map(PieceView::from),
            next: PieceView::from(board.next()),
            score,
            game_over,
            piece_id: board.piece_id(),
        }
    }

    /// Locked cell value at `(x, y)`; 0 outside the board
    pub fn cell(&self, x: usize, y: usize) -> u8 {
        if x >= self.width as usize || y >= self.height as usize {
            return 0;
        }
        self.grid[y * self.width as usize + x]
    }

    /// Grid values with the current piece drawn in, as a renderer paints them
    pub fn composite(&self) -> Vec<u8> {
        let mut out = self.grid.clone();
        let Some(piece) = &self.current else {
            return out;
        };

        let (width, height) = (self.width as i16, self.height as i16);
        for row in 0..piece.rows as i16 {
            for col in 0..piece.cols as i16 {
                let value = piece.cells[(row * piece.cols as i16 + col) as usize];
                let (x, y) = (piece.x as i16 + col, piece.y as i16 + row);
                if value == 0 || x < 0 || x >= width || y < 0 || y >= height {
                    continue;
                }
                out[(y * width + x) as usize] = value;
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SessionSnapshot {
    pub mode: GameMode,
    pub boards: Vec<BoardSnapshot>,
    pub paused: bool,
    pub outcome: Outcome,
    pub ticks: u64,
    pub episode_id: u32,
}

impl SessionSnapshot {
    pub fn playable(&self) -> bool {
        !self.paused && self.outcome == Outcome::InProgress
    }
}
