//! Error types for the engine.
//!
//! Blocked moves and failed rotations are ordinary game states and are
//! reported as booleans. Only configuration mistakes and misuse of
//! [`Board::merge_piece`](crate::Board::merge_piece) surface as errors.

use thiserror::Error;

/// Rejected session or board configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board width {width} is outside {min}..={max}")]
    Width { width: u8, min: u8, max: u8 },
    #[error("board height {height} is outside {min}..={max}")]
    Height { height: u8, min: u8, max: u8 },
    #[error("tick interval must be at least 1 ms")]
    ZeroTickInterval,
}

/// A piece was merged at a position it could not legally occupy.
///
/// The grid is left untouched when this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("piece cell ({x}, {y}) is outside the board")]
    OutOfBounds { x: i8, y: i8 },
    #[error("piece cell ({x}, {y}) overlaps a locked cell")]
    Occupied { x: i8, y: i8 },
}
