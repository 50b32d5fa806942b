#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a headless Life Defence game.

use std::{path::PathBuf, str::FromStr};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use life_defence_core::Difficulty;
use life_defence_session::{EngineConfig, GameState, SessionManager, StepOutcome};
use tracing::{info, warn, Level};

/// Runs a seeded game for a fixed number of generations and reports the outcome.
#[derive(Debug, Parser)]
#[command(name = "life-defence", version, about)]
struct Cli {
    /// TOML engine configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the configured global seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Difficulty of the game.
    #[arg(long, value_enum, default_value_t = DifficultyArg::Normal)]
    difficulty: DifficultyArg,
    /// Number of generations to play.
    #[arg(long, default_value_t = 200)]
    generations: u64,
    /// Player pattern placed before the first generation, as `name@row,col`.
    #[arg(long = "place", value_name = "PATTERN@ROW,COL")]
    placements: Vec<Placement>,
    /// Prints the final game state as JSON.
    #[arg(long)]
    json: bool,
    /// Raises the log level; repeat for more detail.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DifficultyArg {
    Easy,
    Normal,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::Easy => Self::Easy,
            DifficultyArg::Normal => Self::Normal,
            DifficultyArg::Hard => Self::Hard,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Placement {
    pattern: String,
    row: i64,
    col: i64,
}

impl FromStr for Placement {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (pattern, position) = value
            .split_once('@')
            .ok_or_else(|| format!("expected PATTERN@ROW,COL, got `{value}`"))?;
        let (row, col) = position
            .split_once(',')
            .ok_or_else(|| format!("expected ROW,COL after `@`, got `{position}`"))?;
        let parse = |text: &str| {
            text.trim()
                .parse::<i64>()
                .map_err(|error| format!("invalid coordinate `{text}`: {error}"))
        };
        Ok(Self {
            pattern: pattern.trim().to_owned(),
            row: parse(row)?,
            col: parse(col)?,
        })
    }
}

/// Entry point for the Life Defence command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("could not load {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let state = play(&cli, config)?;
    if cli.json {
        println!(
            "{}",
            serde_json::to_string(&state).context("failed to encode game state")?
        );
    } else {
        println!("{}", summary(&state));
    }
    Ok(())
}

fn play(cli: &Cli, config: EngineConfig) -> Result<GameState> {
    let manager = SessionManager::new(config);
    let id = manager.create(cli.difficulty.into()).game_id;
    info!(
        game_id = %id,
        seed = manager.config().seed,
        difficulty = ?cli.difficulty,
        generations = cli.generations,
        "game created"
    );

    for placement in &cli.placements {
        match manager.place(id, &placement.pattern, placement.row, placement.col) {
            Ok(instance) => info!(%instance, pattern = %placement.pattern, "placed"),
            Err(error) => warn!(
                pattern = %placement.pattern,
                row = placement.row,
                col = placement.col,
                %error,
                "placement rejected"
            ),
        }
    }

    for _ in 0..cli.generations {
        match manager.step(id)? {
            StepOutcome::Accepted(_) => {}
            StepOutcome::Rejected(reason) => {
                info!(%reason, "stopping early");
                break;
            }
        }
    }

    manager.get_state(id).context("session vanished mid-game")
}

fn summary(state: &GameState) -> String {
    let status = if state.game_over { "game over" } else { "running" };
    format!(
        "generation {} ({status}): score {}, wave {}, destroyed {}, escaped {}",
        state.generation,
        state.score,
        state.stats.wave,
        state.stats.patterns_destroyed,
        state.stats.enemies_escaped,
    )
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}
