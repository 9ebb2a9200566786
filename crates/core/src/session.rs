//! Session module - one or two boards under a shared gravity clock
//!
//! The session owns every board, the per-player score and game-over flags, the
//! pause flag and the tick accumulator. Boards never share state; the session
//! only aggregates their results.
//!
//! Time is fed in from outside, either one gravity step at a time with
//! [`Session::tick`] or as elapsed wall time with [`Session::advance`].

use arrayvec::ArrayVec;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::board::{Board, BoardStep};
use crate::config::{EndRule, SessionConfig};
use crate::error::ConfigError;
use crate::snapshot::{BoardSnapshot, SessionSnapshot};
use crate::types::{GameAction, GameMode, PlayerId, LINE_CLEAR_POINTS, MAX_CATCH_UP_TICKS};

/// How a session ended, or that it has not yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Outcome {
    #[default]
    InProgress,
    /// Single player topped out
    GameOver { score: u32 },
    /// Two players: the other board topped out first
    Winner(PlayerId),
    /// Two players topped out on the same tick
    Draw,
}

/// Per-board results of one tick, in player order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub steps: ArrayVec<(PlayerId, BoardStep), 2>,
}

impl TickReport {
    /// Whether the tick changed anything
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, player: PlayerId) -> Option<BoardStep> {
        self.steps
            .iter()
            .find(|(p, _)| *p == player)
            .map(|&(_, step)| step)
    }

    /// Total rows cleared across boards
    pub fn lines(&self) -> u32 {
        self.steps.iter().map(|(_, step)| step.lines()).sum()
    }
}

#[derive(Debug, Clone)]
struct PlayerSlot {
    board: Board,
    score: u32,
    game_over: bool,
    /// Tick on which the board topped out
    topped_out_at: Option<u64>,
}

impl PlayerSlot {
    fn new(board: Board) -> Self {
        Self {
            board,
            score: 0,
            game_over: false,
            topped_out_at: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    base_seed: u64,
    slots: ArrayVec<PlayerSlot, 2>,
    paused: bool,
    /// Wall time not yet turned into ticks
    accumulator_ms: u64,
    ticks: u64,
    episode_id: u32,
    outcome: Outcome,
}

impl Session {
    /// Validate `config`, build the boards and spawn their first pieces.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let base_seed = config.seed.unwrap_or_else(rand::random);
        let mut slots = ArrayVec::new();
        for offset in 0..config.mode.player_count() as u64 {
            let board = Board::with_config(config.board, base_seed.wrapping_add(offset))?;
            slots.push(PlayerSlot::new(board));
        }

        let mut session = Self {
            config,
            base_seed,
            slots,
            paused: false,
            accumulator_ms: 0,
            ticks: 0,
            episode_id: 0,
            outcome: Outcome::InProgress,
        };
        session.spawn_all();

        info!(
            mode = ?config.mode,
            seed = base_seed,
            width = config.board.width,
            height = config.board.height,
            "session started"
        );
        Ok(session)
    }

    fn spawn_all(&mut self) {
        for slot in &mut self.slots {
            slot.board.spawn_new_piece();
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn mode(&self) -> GameMode {
        self.config.mode
    }

    /// Seed of player one's board; player `i` uses `seed + i`
    pub fn seed(&self) -> u64 {
        self.base_seed
    }

    fn slot(&self, player: PlayerId) -> Option<&PlayerSlot> {
        self.slots.get(player.index())
    }

    pub fn board(&self, player: PlayerId) -> Option<&Board> {
        self.slot(player).map(|slot| &slot.board)
    }

    /// Direct board access for hosts that drive movement themselves
    pub fn board_mut(&mut self, player: PlayerId) -> Option<&mut Board> {
        self.slots.get_mut(player.index()).map(|slot| &mut slot.board)
    }

    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        (0..self.slots.len()).filter_map(PlayerId::from_index)
    }

    /// Score of `player`; 0 for a player not in this session
    pub fn score(&self, player: PlayerId) -> u32 {
        self.slot(player).map_or(0, |slot| slot.score)
    }

    pub fn is_game_over(&self, player: PlayerId) -> bool {
        self.slot(player).is_some_and(|slot| slot.game_over)
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome != Outcome::InProgress
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Number of ticks processed since the last (re)start
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Number of restarts
    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    /// Whether piece movement is meaningful right now
    pub fn accepts_input(&self) -> bool {
        !self.paused && !self.is_finished()
    }

    pub fn toggle_pause(&mut self) {
        self.set_paused(!self.paused);
    }

    /// Finished sessions stay unpaused until restarted.
    pub fn set_paused(&mut self, paused: bool) {
        if paused && self.is_finished() {
            return;
        }
        if self.paused != paused {
            self.paused = paused;
            info!(paused, "pause toggled");
        }
    }

    /// Advance every live board by one gravity step, in player order.
    ///
    /// Ignored while paused or after the session has finished.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        if self.paused || self.is_finished() {
            return report;
        }

        self.ticks += 1;
        let tick = self.ticks;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.game_over {
                continue;
            }
            let Some(player) = PlayerId::from_index(index) else {
                continue;
            };

            let step = slot.board.step();
            slot.score = slot.score.saturating_add(step.lines() * LINE_CLEAR_POINTS);
            if let BoardStep::ToppedOut { .. } | BoardStep::Halted = step {
                slot.game_over = true;
                slot.topped_out_at = Some(tick);
                info!(?player, score = slot.score, tick, "player topped out");
            }
            report.steps.push((player, step));
        }

        self.update_outcome();
        report
    }

    /// Feed elapsed wall time; runs one tick per whole tick interval and
    /// returns how many ran. Time does not accumulate while paused or finished.
    ///
    /// At most [`MAX_CATCH_UP_TICKS`] run per call. Whole intervals beyond
    /// that are dropped and only the partial interval is carried over.
    pub fn advance(&mut self, elapsed_ms: u64) -> u32 {
        self.advance_capped(elapsed_ms, MAX_CATCH_UP_TICKS)
    }

    fn advance_capped(&mut self, elapsed_ms: u64, max_ticks: u32) -> u32 {
        if self.paused || self.is_finished() {
            return 0;
        }

        let interval = u64::from(self.config.tick_interval_ms);
        self.accumulator_ms = self.accumulator_ms.saturating_add(elapsed_ms);

        let mut ran = 0;
        while self.accumulator_ms >= interval {
            if ran == max_ticks {
                let dropped = self.accumulator_ms / interval;
                warn!(dropped, "tick backlog dropped");
                self.accumulator_ms %= interval;
                break;
            }
            self.accumulator_ms -= interval;
            self.tick();
            ran += 1;
            if self.is_finished() {
                self.accumulator_ms = 0;
                break;
            }
        }
        ran
    }

    fn update_outcome(&mut self) {
        let over = self.slots.iter().filter(|slot| slot.game_over).count();
        let finished = match self.config.end_rule {
            EndRule::FirstTopOut => over > 0,
            EndRule::LastStanding => over == self.slots.len(),
        };
        if !finished {
            return;
        }

        self.outcome = match self.config.mode {
            GameMode::SinglePlayer => Outcome::GameOver {
                score: self.score(PlayerId::One),
            },
            GameMode::TwoPlayer => {
                let first = self.slots.first().and_then(|slot| slot.topped_out_at);
                let second = self.slots.get(1).and_then(|slot| slot.topped_out_at);
                match (first, second) {
                    (Some(a), Some(b)) if a == b => Outcome::Draw,
                    (Some(a), Some(b)) if a < b => Outcome::Winner(PlayerId::Two),
                    (Some(_), Some(_)) => Outcome::Winner(PlayerId::One),
                    (Some(_), None) => Outcome::Winner(PlayerId::Two),
                    (None, Some(_)) => Outcome::Winner(PlayerId::One),
                    (None, None) => Outcome::Draw,
                }
            }
        };
        // a finished session is never shown as paused
        self.paused = false;

        info!(outcome = ?self.outcome, ticks = self.ticks, "session finished");
    }

    /// Reset every board, score and flag and resume ticking.
    ///
    /// With a configured seed the replay is identical; otherwise a fresh seed
    /// is drawn.
    pub fn restart(&mut self) {
        self.base_seed = self.config.seed.unwrap_or_else(rand::random);
        for (offset, slot) in (0u64..).zip(self.slots.iter_mut()) {
            slot.board.reseed(self.base_seed.wrapping_add(offset));
            slot.score = 0;
            slot.game_over = false;
            slot.topped_out_at = None;
        }
        self.spawn_all();

        self.paused = false;
        self.accumulator_ms = 0;
        self.ticks = 0;
        self.outcome = Outcome::InProgress;
        self.episode_id = self.episode_id.wrapping_add(1);

        info!(seed = self.base_seed, episode_id = self.episode_id, "session restarted");
    }

    /// Apply one input for `player`. Returns whether it changed anything.
    ///
    /// Once the session has finished only `Restart` is accepted. Piece
    /// actions are also rejected for a player outside this session and for a
    /// board that is over. Pause does not block movement; hosts that want
    /// that check [`Session::accepts_input`].
    pub fn apply_action(&mut self, player: PlayerId, action: GameAction) -> bool {
        match action {
            GameAction::Pause => {
                if self.is_finished() {
                    return false;
                }
                self.toggle_pause();
                return true;
            }
            GameAction::Restart => {
                self.restart();
                return true;
            }
            _ => {}
        }

        if self.is_finished() {
            return false;
        }
        let Some(slot) = self.slots.get_mut(player.index()) else {
            return false;
        };
        if slot.game_over {
            return false;
        }

        let board = &mut slot.board;
        match action {
            GameAction::MoveLeft => board.move_piece_left(),
            GameAction::MoveRight => board.move_piece_right(),
            GameAction::SoftDrop => board.move_piece_down(),
            GameAction::HardDrop => {
                let rows = board.drop_piece();
                debug!(?player, rows, "hard drop");
                board.current().is_some()
            }
            GameAction::RotateCw => board.right_rotate_piece(),
            GameAction::RotateCcw => board.left_rotate_piece(),
            GameAction::Pause | GameAction::Restart => false,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            mode: self.config.mode,
            boards: self
                .slots
                .iter()
                .map(|slot| BoardSnapshot::from_board(&slot.board, slot.score, slot.game_over))
                .collect(),
            paused: self.paused,
            outcome: self.outcome,
            ticks: self.ticks,
            episode_id: self.episode_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use crate::tetromino::Tetromino;
    use crate::types::PieceKind;

    fn seeded(config: SessionConfig) -> Session {
        Session::new(config.with_seed(42)).unwrap()
    }

    /// Leave `player` one gravity step away from topping out: an O resting on
    /// an almost full row 2 (the gap keeps the row from clearing).
    fn doom(session: &mut Session, player: PlayerId) {
        let board = session.board_mut(player).unwrap();
        for x in 1..board.grid().width() as i8 {
            board.grid_mut().set(x, 2, Some(PieceKind::Z));
        }
        let mut piece = Tetromino::new(PieceKind::O);
        piece.set_position(4, 0);
        board.set_current(Some(piece));
    }

    #[test]
    fn test_new_session_spawns_every_board() {
        let session = seeded(SessionConfig::two_player());
        for player in [PlayerId::One, PlayerId::Two] {
            let piece = session.board(player).unwrap().current().unwrap();
            assert_eq!(piece.position(), (3, 0));
        }
        assert_eq!(session.outcome(), Outcome::InProgress);
        assert_eq!(session.players().count(), 2);
    }

    #[test]
    fn test_single_player_has_no_second_board() {
        let mut session = seeded(SessionConfig::single_player());
        assert!(session.board(PlayerId::Two).is_none());
        assert!(!session.apply_action(PlayerId::Two, GameAction::MoveLeft));
        assert_eq!(session.score(PlayerId::Two), 0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = SessionConfig {
            tick_interval_ms: 0,
            ..SessionConfig::default()
        };
        assert_eq!(Session::new(config).unwrap_err(), ConfigError::ZeroTickInterval);

        let config = SessionConfig {
            board: BoardConfig {
                width: 80,
                ..BoardConfig::default()
            },
            ..SessionConfig::default()
        };
        assert!(matches!(Session::new(config), Err(ConfigError::Width { .. })));
    }

    #[test]
    fn test_tick_moves_piece_down() {
        let mut session = seeded(SessionConfig::single_player());
        let report = session.tick();

        assert_eq!(report.step(PlayerId::One), Some(BoardStep::Fell));
        let piece = session.board(PlayerId::One).unwrap().current().unwrap();
        assert_eq!(piece.position(), (3, 1));
        assert_eq!(session.ticks(), 1);
    }

    #[test]
    fn test_paused_tick_changes_nothing() {
        let mut session = seeded(SessionConfig::single_player());
        session.toggle_pause();
        let before = session.snapshot();

        assert!(session.tick().is_empty());
        assert_eq!(session.advance(5_000), 0);
        assert_eq!(session.snapshot(), before);

        session.toggle_pause();
        assert_eq!(session.advance(1_000), 1);
    }

    #[test]
    fn test_pause_does_not_block_movement() {
        let mut session = seeded(SessionConfig::single_player());
        session.set_paused(true);
        assert!(!session.accepts_input());
        assert!(session.apply_action(PlayerId::One, GameAction::SoftDrop));
    }

    #[test]
    fn test_advance_runs_whole_intervals() {
        let mut session = seeded(SessionConfig::single_player());
        assert_eq!(session.advance(999), 0);
        assert_eq!(session.advance(1), 1);
        assert_eq!(session.advance(2_500), 2);
        assert_eq!(session.advance(500), 1);
        assert_eq!(session.ticks(), 4);
    }

    #[test]
    fn test_advance_drops_backlog_past_the_cap() {
        let mut session = seeded(SessionConfig::single_player());
        assert_eq!(session.advance_capped(10_500, 3), 3);
        assert_eq!(session.ticks(), 3);
        assert_eq!(session.accumulator_ms, 500);
        assert_eq!(session.advance(499), 0);
        assert_eq!(session.advance(1), 1);
    }

    #[test]
    fn test_advance_with_huge_elapsed_time_is_bounded() {
        let config = SessionConfig {
            tick_interval_ms: 1,
            ..SessionConfig::single_player()
        };
        let mut session = seeded(config);
        let ran = session.advance(u64::MAX);
        assert!((1..=MAX_CATCH_UP_TICKS).contains(&ran));
        assert_eq!(u64::from(ran), session.ticks());
        assert_eq!(session.accumulator_ms, 0);
    }

    #[test]
    fn test_line_clear_scores_hundred_per_row() {
        let mut session = seeded(SessionConfig::single_player());
        let board = session.board_mut(PlayerId::One).unwrap();
        for y in 18..20 {
            for x in 0..8 {
                board.grid_mut().set(x, y, Some(PieceKind::L));
            }
        }
        let mut piece = Tetromino::new(PieceKind::O);
        piece.set_position(8, 18);
        board.set_current(Some(piece));

        let report = session.tick();
        assert_eq!(report.step(PlayerId::One), Some(BoardStep::Locked { lines: 2 }));
        assert_eq!(report.lines(), 2);
        assert_eq!(session.score(PlayerId::One), 200);
    }

    /// Replace `player`'s falling piece with a fresh one at the spawn cell
    fn force_spawn(session: &mut Session, player: PlayerId, kind: PieceKind) {
        let mut piece = Tetromino::new(kind);
        piece.set_position(3, 0);
        session.board_mut(player).unwrap().set_current(Some(piece));
    }

    fn press(session: &mut Session, action: GameAction, times: usize) {
        for _ in 0..times {
            assert!(session.apply_action(PlayerId::One, action), "{action:?}");
        }
    }

    #[test]
    fn test_four_pieces_fill_bottom_row() {
        let mut session = seeded(SessionConfig::single_player());

        // two flat bars cover columns 0-7
        force_spawn(&mut session, PlayerId::One, PieceKind::I);
        press(&mut session, GameAction::MoveLeft, 3);
        press(&mut session, GameAction::HardDrop, 1);
        assert_eq!(session.tick().step(PlayerId::One), Some(BoardStep::Locked { lines: 0 }));

        force_spawn(&mut session, PlayerId::One, PieceKind::I);
        press(&mut session, GameAction::MoveRight, 1);
        press(&mut session, GameAction::HardDrop, 1);
        assert_eq!(session.tick().step(PlayerId::One), Some(BoardStep::Locked { lines: 0 }));

        // two columns finish it
        force_spawn(&mut session, PlayerId::One, PieceKind::I);
        press(&mut session, GameAction::RotateCw, 1);
        press(&mut session, GameAction::MoveRight, 5);
        press(&mut session, GameAction::HardDrop, 1);
        assert_eq!(session.tick().step(PlayerId::One), Some(BoardStep::Locked { lines: 0 }));
        assert_eq!(session.score(PlayerId::One), 0);

        force_spawn(&mut session, PlayerId::One, PieceKind::I);
        press(&mut session, GameAction::RotateCw, 1);
        press(&mut session, GameAction::MoveRight, 6);
        press(&mut session, GameAction::HardDrop, 1);
        assert_eq!(session.tick().step(PlayerId::One), Some(BoardStep::Locked { lines: 1 }));
        assert_eq!(session.score(PlayerId::One), 100);

        // the two columns dropped by one row; everything else is gone
        let grid = session.board(PlayerId::One).unwrap().grid();
        for y in 17..20 {
            assert_eq!(grid.get(8, y), Some(Some(PieceKind::I)));
            assert_eq!(grid.get(9, y), Some(Some(PieceKind::I)));
        }
        assert_eq!(grid.values().iter().filter(|&&v| v != 0).count(), 6);
    }

    #[test]
    fn test_single_player_game_over() {
        let mut session = seeded(SessionConfig::single_player());
        doom(&mut session, PlayerId::One);

        session.tick();
        assert!(session.is_game_over(PlayerId::One));
        assert_eq!(session.outcome(), Outcome::GameOver { score: 0 });

        // frozen
        assert!(session.tick().is_empty());
        assert!(!session.apply_action(PlayerId::One, GameAction::MoveLeft));
    }

    #[test]
    fn test_finished_session_rejects_pause() {
        let mut session = seeded(SessionConfig::single_player());
        doom(&mut session, PlayerId::One);
        session.tick();
        assert!(session.is_finished());

        assert!(!session.apply_action(PlayerId::One, GameAction::Pause));
        assert!(!session.is_paused());
        session.toggle_pause();
        assert!(!session.is_paused());
        assert_eq!(session.outcome(), Outcome::GameOver { score: 0 });

        assert!(session.apply_action(PlayerId::One, GameAction::Restart));
        assert!(session.apply_action(PlayerId::One, GameAction::Pause));
        assert!(session.is_paused());
    }

    #[test]
    fn test_first_top_out_names_the_survivor() {
        let mut session = seeded(SessionConfig::two_player());
        doom(&mut session, PlayerId::One);

        session.tick();
        assert_eq!(session.outcome(), Outcome::Winner(PlayerId::Two));
        assert!(!session.is_game_over(PlayerId::Two));
    }

    #[test]
    fn test_simultaneous_top_out_is_a_draw() {
        let mut session = seeded(SessionConfig::two_player());
        doom(&mut session, PlayerId::One);
        doom(&mut session, PlayerId::Two);

        session.tick();
        assert_eq!(session.outcome(), Outcome::Draw);
    }

    #[test]
    fn test_last_standing_keeps_survivor_running() {
        let config = SessionConfig {
            end_rule: EndRule::LastStanding,
            ..SessionConfig::two_player()
        };
        let mut session = seeded(config);
        doom(&mut session, PlayerId::Two);

        session.tick();
        assert!(session.is_game_over(PlayerId::Two));
        assert_eq!(session.outcome(), Outcome::InProgress);

        let report = session.tick();
        assert_eq!(report.step(PlayerId::Two), None);
        assert!(report.step(PlayerId::One).is_some());
        assert!(!session.apply_action(PlayerId::Two, GameAction::MoveLeft));

        doom(&mut session, PlayerId::One);
        session.tick();
        assert_eq!(session.outcome(), Outcome::Winner(PlayerId::One));
    }

    #[test]
    fn test_restart_unpauses() {
        let mut session = seeded(SessionConfig::single_player());
        session.set_paused(true);
        session.restart();
        assert!(!session.is_paused());
        assert_eq!(session.tick().step(PlayerId::One), Some(BoardStep::Fell));
    }

    #[test]
    fn test_restart_replays_seeded_sequence() {
        let mut session = seeded(SessionConfig::two_player());
        let opening = session.snapshot();

        for _ in 0..30 {
            session.apply_action(PlayerId::One, GameAction::HardDrop);
            session.tick();
        }
        assert!(session.apply_action(PlayerId::One, GameAction::Restart));

        let replay = session.snapshot();
        assert_eq!(replay.boards, opening.boards);
        assert_eq!(replay.ticks, 0);
        assert_eq!(replay.episode_id, 1);
        assert_eq!(session.outcome(), Outcome::InProgress);
    }

    #[test]
    fn test_restart_after_game_over_resumes() {
        let mut session = seeded(SessionConfig::single_player());
        doom(&mut session, PlayerId::One);
        session.tick();
        assert!(session.is_finished());

        assert!(session.apply_action(PlayerId::One, GameAction::Restart));
        assert!(!session.is_finished());
        assert!(!session.is_game_over(PlayerId::One));
        assert_eq!(session.tick().step(PlayerId::One), Some(BoardStep::Fell));
    }

    #[test]
    fn test_boards_use_consecutive_seeds() {
        let session = seeded(SessionConfig::two_player());
        assert_eq!(session.seed(), 42);
        assert_eq!(session.config().seed, Some(42));
        assert_eq!(session.board(PlayerId::One).unwrap().seed(), 42);
        assert_eq!(session.board(PlayerId::Two).unwrap().seed(), 43);
    }

    #[test]
    fn test_unseeded_sessions_still_start() {
        let session = Session::new(SessionConfig::default()).unwrap();
        assert!(session.board(PlayerId::One).unwrap().current().is_some());
    }

    #[test]
    fn test_snapshot_reports_state() {
        let mut session = seeded(SessionConfig::two_player());
        session.toggle_pause();

        let snap = session.snapshot();
        assert_eq!(snap.mode, GameMode::TwoPlayer);
        assert_eq!(snap.boards.len(), 2);
        assert!(snap.paused);
        assert!(!snap.playable());
        assert!(snap.boards.iter().all(|b| b.current.is_some()));
    }
}
