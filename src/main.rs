//! Headless Tetra Duel runner (default binary).
//!
//! Builds a session from the command line, lets the built-in autoplayer drive
//! every board on simulated time, and prints a summary (or the final snapshot
//! as JSON). There is no renderer; this exists to drive and observe the engine.

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

use tetra_duel::autoplay::Autopilot;
use tetra_duel::core::{
    BoardConfig, BoardSnapshot, EndRule, InitialNext, Outcome, Session, SessionConfig,
};
use tetra_duel::types::{
    GameMode, PieceKind, PlayerId, BOARD_HEIGHT, BOARD_WIDTH, TICK_INTERVAL_MS,
};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum EndRuleArg {
    FirstTopOut,
    LastStanding,
}

impl From<EndRuleArg> for EndRule {
    fn from(value: EndRuleArg) -> Self {
        match value {
            EndRuleArg::FirstTopOut => EndRule::FirstTopOut,
            EndRuleArg::LastStanding => EndRule::LastStanding,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum InitialNextArg {
    Uniform,
    Bag,
}

impl From<InitialNextArg> for InitialNext {
    fn from(value: InitialNextArg) -> Self {
        match value {
            InitialNextArg::Uniform => InitialNext::Uniform,
            InitialNextArg::Bag => InitialNext::Bag,
        }
    }
}

fn parse_mode(s: &str) -> Result<GameMode, String> {
    GameMode::from_str(s).ok_or_else(|| format!("unknown mode '{s}' (expected single or duel)"))
}

#[derive(Debug, Parser)]
#[command(name = "tetra-duel", version, about = "Run an autoplayed Tetra Duel session")]
struct Cli {
    #[arg(short = 'v', long, action = clap::ArgAction::Count, help = "Increase verbosity (-v = INFO, -vv = DEBUG, -vvv = TRACE)")]
    verbose: u8,

    #[arg(long, default_value = "single", value_parser = parse_mode, help = "single or duel")]
    mode: GameMode,

    #[arg(long, help = "Seed for reproducible piece sequences")]
    seed: Option<u64>,

    #[arg(long, default_value_t = 10_000, help = "Stop after this many ticks")]
    max_ticks: u64,

    #[arg(long, default_value_t = BOARD_WIDTH)]
    width: u8,

    #[arg(long, default_value_t = BOARD_HEIGHT)]
    height: u8,

    #[arg(long, default_value_t = TICK_INTERVAL_MS, help = "Simulated milliseconds per tick")]
    tick_ms: u32,

    #[arg(long, value_enum, default_value = "first-top-out")]
    end_rule: EndRuleArg,

    #[arg(long, value_enum, default_value = "uniform")]
    initial_next: InitialNextArg,

    #[arg(long, help = "Print the final snapshot as JSON")]
    json: bool,

    #[arg(long, help = "Draw the final boards")]
    show_boards: bool,
}

impl Cli {
    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            mode: self.mode,
            board: BoardConfig {
                width: self.width,
                height: self.height,
                initial_next: self.initial_next.into(),
            },
            tick_interval_ms: self.tick_ms,
            seed: self.seed,
            end_rule: self.end_rule.into(),
        }
    }
}

fn level_filter(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(level_filter(cli.verbose))
        .init();

    if cli.max_ticks == 0 {
        bail!("--max-ticks must be at least 1");
    }

    let mut session = Session::new(cli.session_config())?;
    info!(seed = session.seed(), "running session");

    let mut autopilot = Autopilot::default();
    let step_ms = u64::from(cli.tick_ms);
    while !session.is_finished() && session.ticks() < cli.max_ticks {
        autopilot.act(&mut session);
        session.advance(step_ms);
    }

    let snapshot = session.snapshot();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("seed:    {}", session.seed());
    println!("ticks:   {}", snapshot.ticks);
    println!("outcome: {}", describe(snapshot.outcome));
    for (player, board) in session.players().zip(&snapshot.boards) {
        println!(
            "{player:?}: score {} after {} pieces{}",
            board.score,
            board.piece_id,
            if board.game_over { " (topped out)" } else { "" }
        );
        if cli.show_boards {
            print!("{}", draw(board));
        }
    }
    Ok(())
}

fn describe(outcome: Outcome) -> String {
    match outcome {
        Outcome::InProgress => "still running (tick limit reached)".to_string(),
        Outcome::GameOver { score } => format!("game over, score {score}"),
        Outcome::Winner(PlayerId::One) => "Player 1 wins".to_string(),
        Outcome::Winner(PlayerId::Two) => "Player 2 wins".to_string(),
        Outcome::Draw => "draw".to_string(),
    }
}

/// Text rendering of a board with the falling piece drawn in
fn draw(board: &BoardSnapshot) -> String {
    let width = board.width as usize;
    let mut out = String::new();
    for row in board.composite().chunks(width) {
        out.push('|');
        for &value in row {
            out.push_str(match PieceKind::from_id(value) {
                Some(kind) => kind.as_str(),
                None => ".",
            });
        }
        out.push_str("|\n");
    }
    out.push('+');
    out.push_str(&"-".repeat(width));
    out.push_str("+\n");
    out
}
