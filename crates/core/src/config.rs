//! Session and board configuration.
//!
//! Defaults reproduce the classic game: a 10x20 board, one gravity step per
//! second, and a session that ends as soon as any player tops out.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{
    GameMode, BOARD_HEIGHT, BOARD_WIDTH, MAX_BOARD_EDGE, MIN_BOARD_HEIGHT, MIN_BOARD_WIDTH,
    TICK_INTERVAL_MS,
};

/// Where the very first "next" piece comes from, before any spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InitialNext {
    /// Uniformly random kind, drawn outside the bag. The first bag still
    /// yields all seven kinds, so the opening preview may repeat one of them.
    #[default]
    Uniform,
    /// Drawn from the bag like every later piece.
    Bag,
}

/// When a two-player session stops ticking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EndRule {
    /// Stop as soon as any board tops out.
    #[default]
    FirstTopOut,
    /// Keep the survivor running until every board has topped out.
    LastStanding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardConfig {
    pub width: u8,
    pub height: u8,
    pub initial_next: InitialNext,
}

impl BoardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_BOARD_WIDTH..=MAX_BOARD_EDGE).contains(&self.width) {
            return Err(ConfigError::Width {
                width: self.width,
                min: MIN_BOARD_WIDTH,
                max: MAX_BOARD_EDGE,
            });
        }
        if !(MIN_BOARD_HEIGHT..=MAX_BOARD_EDGE).contains(&self.height) {
            return Err(ConfigError::Height {
                height: self.height,
                min: MIN_BOARD_HEIGHT,
                max: MAX_BOARD_EDGE,
            });
        }
        Ok(())
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            initial_next: InitialNext::default(),
        }
    }
}

/// Everything needed to build a [`Session`](crate::Session).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionConfig {
    pub mode: GameMode,
    pub board: BoardConfig,
    /// Milliseconds of wall time per gravity tick (used by `Session::advance`)
    pub tick_interval_ms: u32,
    /// Fixed seed for reproducible piece sequences. `None` draws a fresh
    /// seed on every start and restart.
    pub seed: Option<u64>,
    pub end_rule: EndRule,
}

impl SessionConfig {
    pub fn single_player() -> Self {
        Self::default()
    }

    pub fn two_player() -> Self {
        Self {
            mode: GameMode::TwoPlayer,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        self.board.validate()
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::SinglePlayer,
            board: BoardConfig::default(),
            tick_interval_ms: TICK_INTERVAL_MS,
            seed: None,
            end_rule: EndRule::default(),
        }
    }
}
