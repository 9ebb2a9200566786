//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! All types are plain data with no game logic, making them usable in any
//! context (simulation core, renderer, input glue, headless hosts).
//!
//! # Board Dimensions
//!
//! Default playfield dimensions:
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19, row 0 at the top)
//! - **Spawn position**: (3, 0) for every piece
//!
//! # Timing
//!
//! The engine advances on a fixed tick. There is no level curve.
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_INTERVAL_MS` | 1000 | One gravity step per second |
//! | `LINE_CLEAR_POINTS` | 100 | Points per cleared row |
//! | `MAX_CATCH_UP_TICKS` | 1024 | Most ticks one `advance` call runs |
//!
//! # Examples
//!
//! ```
//! use tetra_duel_types::{GameAction, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! let piece = PieceKind::T;
//! assert_eq!(piece.id(), 6);
//! assert_eq!(PieceKind::from_id(6), Some(piece));
//! assert_eq!(PieceKind::from_str("t"), Some(piece));
//!
//! let action = GameAction::from_str("hardDrop").unwrap();
//! assert_eq!(action, GameAction::HardDrop);
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! ```

use serde::{Deserialize, Serialize};

/// Default board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Default board height in cells (20 rows)
pub const BOARD_HEIGHT: u8 = 20;

/// Largest board edge accepted by the engine (coordinates are `i8`)
pub const MAX_BOARD_EDGE: u8 = 64;

/// Narrowest board where a horizontal I piece fits at the spawn column
pub const MIN_BOARD_WIDTH: u8 = 7;

/// Shortest board where a vertical I piece fits
pub const MIN_BOARD_HEIGHT: u8 = 4;

/// Column where a freshly spawned piece is placed
pub const SPAWN_X: i8 = 3;

/// Row where a freshly spawned piece is placed
pub const SPAWN_Y: i8 = 0;

/// Gravity interval in milliseconds (one row per tick)
pub const TICK_INTERVAL_MS: u32 = 1000;

/// Points awarded per row removed in a single clear pass
pub const LINE_CLEAR_POINTS: u32 = 100;

/// Most ticks a single batch of elapsed time may run; a larger backlog is
/// dropped
pub const MAX_CATCH_UP_TICKS: u32 = 1024;

/// Number of distinct piece kinds (and the size of one bag)
pub const PIECE_KIND_COUNT: usize = 7;

/// The seven tetromino piece kinds
///
/// The numeric id (1-7) is what the board stores and what renderers use for
/// color lookup:
/// - **I** (1): Cyan, horizontal bar
/// - **J** (2): Blue
/// - **L** (3): Orange
/// - **O** (4): Yellow, 2x2 square
/// - **S** (5): Green
/// - **T** (6): Purple
/// - **Z** (7): Red
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    /// All kinds in id order.
    pub const ALL: [PieceKind; PIECE_KIND_COUNT] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Numeric cell value for this kind (1-7)
    pub const fn id(self) -> u8 {
        match self {
            PieceKind::I => 1,
            PieceKind::J => 2,
            PieceKind::L => 3,
            PieceKind::O => 4,
            PieceKind::S => 5,
            PieceKind::T => 6,
            PieceKind::Z => 7,
        }
    }

    /// Inverse of [`PieceKind::id`]. Returns `None` for 0 and anything above 7.
    ///
    /// ```
    /// use tetra_duel_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_id(1), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_id(0), None);
    /// assert_eq!(PieceKind::from_id(8), None);
    /// ```
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(PieceKind::I),
            2 => Some(PieceKind::J),
            3 => Some(PieceKind::L),
            4 => Some(PieceKind::O),
            5 => Some(PieceKind::S),
            6 => Some(PieceKind::T),
            7 => Some(PieceKind::Z),
            _ => None,
        }
    }

    /// Display color of this kind
    pub const fn color(self) -> Rgb {
        color_for_id(self.id())
    }

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tetra_duel_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("O"), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            "o" => Some(PieceKind::O),
            "s" => Some(PieceKind::S),
            "t" => Some(PieceKind::T),
            "z" => Some(PieceKind::Z),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::J => "j",
            PieceKind::L => "l",
            PieceKind::O => "o",
            PieceKind::S => "s",
            PieceKind::T => "t",
            PieceKind::Z => "z",
        }
    }
}

/// 24-bit display color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const CYAN: Rgb = Rgb::new(0, 255, 255);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
    pub const ORANGE: Rgb = Rgb::new(255, 165, 0);
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
    pub const GREEN: Rgb = Rgb::new(0, 128, 0);
    pub const PURPLE: Rgb = Rgb::new(128, 0, 128);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
}

/// Map a raw cell value to its display color.
///
/// Unknown values fall back to black instead of failing, so a renderer can feed
/// any grid value through this.
///
/// ```
/// use tetra_duel_types::{color_for_id, Rgb};
///
/// assert_eq!(color_for_id(1), Rgb::CYAN);
/// assert_eq!(color_for_id(0), Rgb::BLACK);
/// assert_eq!(color_for_id(42), Rgb::BLACK);
/// ```
pub const fn color_for_id(id: u8) -> Rgb {
    match id {
        1 => Rgb::CYAN,
        2 => Rgb::BLUE,
        3 => Rgb::ORANGE,
        4 => Rgb::YELLOW,
        5 => Rgb::GREEN,
        6 => Rgb::PURPLE,
        7 => Rgb::RED,
        _ => Rgb::BLACK,
    }
}

/// A cell on the game board
///
/// - `None`: Empty cell
/// - `Some(PieceKind)`: Cell filled with the specified piece kind
pub type Cell = Option<PieceKind>;

/// Integer form of a cell: 0 when empty, otherwise the kind id (1-7).
#[inline]
pub const fn cell_value(cell: Cell) -> u8 {
    match cell {
        Some(kind) => kind.id(),
        None => 0,
    }
}

/// Player slot in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    /// Zero-based slot index
    pub const fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(PlayerId::One),
            1 => Some(PlayerId::Two),
            _ => None,
        }
    }

    /// The other player in a two-player session
    pub const fn opponent(self) -> Self {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }
}

/// Number of boards in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    SinglePlayer,
    TwoPlayer,
}

impl GameMode {
    pub const fn player_count(self) -> usize {
        match self {
            GameMode::SinglePlayer => 1,
            GameMode::TwoPlayer => 2,
        }
    }

    /// Parse mode from string: "single" | "1" | "duel" | "two" | "2"
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "single" | "solo" | "1" => Some(GameMode::SinglePlayer),
            "duel" | "two" | "2" => Some(GameMode::TwoPlayer),
            _ => None,
        }
    }
}

/// Game actions that a host can apply to one player's board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameAction {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Move piece one cell down
    SoftDrop,
    /// Drop piece to the lowest legal row (locks on the next tick)
    HardDrop,
    /// Rotate piece 90° clockwise
    RotateCw,
    /// Rotate piece 90° counter-clockwise
    RotateCcw,
    /// Toggle the shared pause flag
    Pause,
    /// Reset every board and score
    Restart,
}

impl GameAction {
    /// Parse action from string (camelCase or lowercase)
    ///
    /// ```
    /// use tetra_duel_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("moveLeft"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("rotateccw"), Some(GameAction::RotateCcw));
    /// assert_eq!(GameAction::from_str("hold"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "softdrop" => Some(GameAction::SoftDrop),
            "harddrop" => Some(GameAction::HardDrop),
            "rotatecw" => Some(GameAction::RotateCw),
            "rotateccw" => Some(GameAction::RotateCcw),
            "pause" => Some(GameAction::Pause),
            "restart" => Some(GameAction::Restart),
            _ => None,
        }
    }

    /// Convert to camelCase string
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::SoftDrop => "softDrop",
            GameAction::HardDrop => "hardDrop",
            GameAction::RotateCw => "rotateCw",
            GameAction::RotateCcw => "rotateCcw",
            GameAction::Pause => "pause",
            GameAction::Restart => "restart",
        }
    }

    /// Whether this action moves a piece (as opposed to session control)
    pub const fn is_piece_action(self) -> bool {
        !matches!(self, GameAction::Pause | GameAction::Restart)
    }
}
