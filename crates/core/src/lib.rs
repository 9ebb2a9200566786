//! Core game logic - pure, deterministic, and testable
//!
//! This crate holds the whole simulation for one or two falling-block boards
//! under a shared gravity clock. It has no dependency on rendering, input
//! devices or wall-clock time:
//!
//! - **Deterministic**: every board owns a seeded PRNG, so a fixed seed
//!   replays the same game
//! - **Synchronous**: each operation runs to completion; there is no hidden
//!   timer or thread
//! - **Observable**: state is read through borrowed accessors or owned,
//!   serializable [`snapshot`]s, and notable events are logged with `tracing`
//!
//! # Module Structure
//!
//! - [`pieces`]: spawn templates and the shape matrix with clockwise rotation
//! - [`tetromino`]: a shape plus its board position
//! - [`rng`]: seeded 7-bag piece generator
//! - [`grid`]: locked cells and line clearing
//! - [`board`]: one player's field: spawn, movement, kicks, lock, game over
//! - [`session`]: one or two boards, scores, pause, restart and outcome
//! - [`snapshot`]: read-only views for renderers
//! - [`config`] / [`error`]: validated settings and their errors
//!
//! # Game Rules
//!
//! - Pieces spawn at column 3, row 0 without a collision check
//! - Rotation tries the turned shape in place, then the kicks
//!   `(-1,0) (+1,0) (-2,0) (+2,0) (0,-1)` in order
//! - A piece that cannot fall locks immediately (no lock delay)
//! - Each cleared row scores 100
//! - A board is over once its top row holds a locked cell
//!
//! # Example
//!
//! ```
//! use tetra_duel_core::{Session, SessionConfig};
//! use tetra_duel_core::types::{GameAction, PlayerId};
//!
//! let mut session = Session::new(SessionConfig::two_player().with_seed(7)).unwrap();
//!
//! session.apply_action(PlayerId::One, GameAction::MoveLeft);
//! session.apply_action(PlayerId::Two, GameAction::HardDrop);
//! session.tick();
//!
//! assert_eq!(session.ticks(), 1);
//! assert!(!session.is_finished());
//! ```

pub mod board;
pub mod config;
pub mod error;
pub mod grid;
pub mod pieces;
pub mod rng;
pub mod session;
pub mod snapshot;
pub mod tetromino;

pub use tetra_duel_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, BoardPhase, BoardStep, WALL_KICKS};
pub use config::{BoardConfig, EndRule, InitialNext, SessionConfig};
pub use error::{ConfigError, MergeError};
pub use grid::Grid;
pub use pieces::{template, Shape};
pub use rng::{GameRng, PieceBag};
pub use session::{Outcome, Session, TickReport};
pub use snapshot::{BoardSnapshot, PieceView, SessionSnapshot};
pub use tetromino::Tetromino;
