//! Placement autoplayer for the headless runner and soak tests.
//!
//! For the falling piece every reachable rotation and column is tried on a
//! cloned board (rotate, shift, drop, merge, clear). The resulting stack is
//! scored with a weighted sum of its features and the best placement is
//! returned as the list of [`GameAction`]s that reproduces it, ending in a
//! hard drop. The next gravity tick locks the piece.

use tracing::{debug, trace};

use crate::core::pieces::MAX_SHAPE_EDGE;
use crate::core::{Board, Grid, Session};
use crate::types::{GameAction, PlayerId};

/// Feature weights. Positive rewards, negative penalizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub aggregate_height: f64,
    pub holes: f64,
    pub bumpiness: f64,
    pub lines: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            aggregate_height: -0.510066,
            holes: -0.35663,
            bumpiness: -0.184483,
            lines: 0.760666,
        }
    }
}

/// Shape of a locked stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Features {
    /// Sum of column heights
    pub aggregate_height: u32,
    pub max_height: u32,
    /// Empty cells with a filled cell somewhere above them
    pub holes: u32,
    /// Sum of height differences between neighbouring columns
    pub bumpiness: u32,
}

impl Features {
    pub fn of(grid: &Grid) -> Self {
        let (width, height) = (grid.width() as i8, grid.height() as i8);
        let mut features = Features::default();
        let mut previous: Option<u32> = None;

        for x in 0..width {
            let mut column_height = 0;
            let mut seen_block = false;
            for y in 0..height {
                if grid.is_occupied(x, y) {
                    if !seen_block {
                        column_height = (height - y) as u32;
                        seen_block = true;
                    }
                } else if seen_block {
                    features.holes += 1;
                }
            }

            features.aggregate_height += column_height;
            features.max_height = features.max_height.max(column_height);
            if let Some(prev) = previous {
                features.bumpiness += prev.abs_diff(column_height);
            }
            previous = Some(column_height);
        }
        features
    }
}

/// A chosen placement
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    /// Clockwise turns applied before shifting
    pub rotations: u8,
    /// Final column of the shape's left edge
    pub x: i8,
    pub lines: u32,
    pub score: f64,
    pub actions: Vec<GameAction>,
}

#[derive(Debug, Clone, Default)]
pub struct Autoplayer {
    weights: Weights,
}

impl Autoplayer {
    pub fn new(weights: Weights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    pub fn score(&self, features: &Features, lines: u32) -> f64 {
        let w = &self.weights;
        w.aggregate_height * features.aggregate_height as f64
            + w.holes * features.holes as f64
            + w.bumpiness * features.bumpiness as f64
            + w.lines * lines as f64
    }

    /// Best placement for the board's falling piece; `None` without one.
    ///
    /// Placements that end the game are only chosen when nothing else is
    /// reachable. Ties keep the first candidate (fewest turns, leftmost).
    pub fn plan(&self, board: &Board) -> Option<Plan> {
        board.current()?;
        let width = board.grid().width() as i8;
        let mut best: Option<Plan> = None;

        for rotations in 0..4u8 {
            let mut rotated = board.clone();
            if !(0..rotations).all(|_| rotated.right_rotate_piece()) {
                continue;
            }

            for target in -(MAX_SHAPE_EDGE as i8)..width {
                let Some(candidate) = self.try_placement(&rotated, rotations, target) else {
                    continue;
                };
                trace!(rotations, target, score = candidate.score, "candidate");
                match &best {
                    Some(current) if candidate.score <= current.score => {}
                    _ => best = Some(candidate),
                }
            }
        }
        best
    }

    fn try_placement(&self, rotated: &Board, rotations: u8, target: i8) -> Option<Plan> {
        let mut trial = rotated.clone();
        let mut actions: Vec<GameAction> = (0..rotations).map(|_| GameAction::RotateCw).collect();

        loop {
            let x = trial.current()?.x();
            if x == target {
                break;
            }
            let (moved, action) = if target < x {
                (trial.move_piece_left(), GameAction::MoveLeft)
            } else {
                (trial.move_piece_right(), GameAction::MoveRight)
            };
            if !moved {
                return None;
            }
            actions.push(action);
        }

        trial.drop_piece();
        actions.push(GameAction::HardDrop);
        trial.merge_piece().ok()?;
        let lines = trial.clear_lines();

        let score = if trial.is_game_over() {
            f64::MIN
        } else {
            self.score(&Features::of(trial.grid()), lines)
        };

        Some(Plan {
            rotations,
            x: target,
            lines,
            score,
            actions,
        })
    }
}

/// Plays every live board of a session, planning once per spawned piece
#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    player: Autoplayer,
    /// (episode, piece id) last planned per player
    planned: [Option<(u32, u32)>; 2],
}

impl Autopilot {
    pub fn new(player: Autoplayer) -> Self {
        Self {
            player,
            planned: [None; 2],
        }
    }

    /// Plan and apply moves for every board whose falling piece has not been
    /// handled yet. Returns the number of actions applied.
    pub fn act(&mut self, session: &mut Session) -> usize {
        let players: Vec<PlayerId> = session.players().collect();
        players
            .into_iter()
            .map(|player| self.act_for(session, player))
            .sum()
    }

    /// Same as [`Autopilot::act`] for a single player
    pub fn act_for(&mut self, session: &mut Session, player: PlayerId) -> usize {
        if session.is_game_over(player) {
            return 0;
        }
        let episode = session.episode_id();
        let plan = {
            let Some(board) = session.board(player) else {
                return 0;
            };
            if board.current().is_none() {
                return 0;
            }
            let key = Some((episode, board.piece_id()));
            if self.planned[player.index()] == key {
                return 0;
            }
            self.planned[player.index()] = key;
            self.player.plan(board)
        };

        let Some(plan) = plan else {
            return 0;
        };
        debug!(
            ?player,
            rotations = plan.rotations,
            x = plan.x,
            lines = plan.lines,
            "placing piece"
        );
        plan.actions
            .into_iter()
            .filter(|&action| session.apply_action(player, action))
            .count()
    }
}
