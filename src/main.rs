//! Headless SRS Tetris runner (default binary).
//!
//! Drives a [`GameController`] from a scripted action list on the main thread while the
//! gravity and lock delay timers run on their own threads, then prints the final state as
//! text or JSON.

use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use srs_tetris::core::GameSnapshot;
use srs_tetris::engine::{EngineConfig, GameController};
use srs_tetris::types::{GameAction, GameStatus, PieceKind};

const DEFAULT_SCRIPT: &str = "moveleft,moveleft,harddrop,rotatecw,moveright,moveright,harddrop,\
hold,moveright,moveright,moveright,moveright,harddrop,rotateccw,harddrop,softdrop,softdropstop";

#[derive(Debug, Parser)]
#[command(name = "srs-tetris", version, about = "Scripted headless SRS Tetris session")]
struct Args {
    /// Bag seed (random when omitted; TETRIS_SEED is also honored)
    #[arg(long)]
    seed: Option<u64>,

    /// Comma-separated actions, repeated until the session ends
    #[arg(long, default_value = DEFAULT_SCRIPT)]
    script: String,

    /// Stop after this many pieces have spawned
    #[arg(long, default_value_t = 40)]
    pieces: u32,

    /// Delay between scripted inputs
    #[arg(long, default_value_t = 40)]
    step_ms: u64,

    /// Wall-clock limit for the whole session
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();

    let script = parse_script(&args.script)?;

    let mut config = EngineConfig::from_env();
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    let game = GameController::new(config).context("failed to create game controller")?;

    let snapshot = run(&game, &script, &args);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_summary(&snapshot);
    }
    Ok(())
}

fn parse_script(raw: &str) -> Result<Vec<GameAction>> {
    let mut actions = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match GameAction::from_str(token) {
            // The runner owns the session lifecycle.
            Some(GameAction::Start | GameAction::Restart | GameAction::Pause) => {}
            Some(action) => actions.push(action),
            None => bail!("unknown action `{token}` in script"),
        }
    }
    if actions.is_empty() {
        bail!("script has no playable actions");
    }
    Ok(actions)
}

fn run(game: &GameController, script: &[GameAction], args: &Args) -> GameSnapshot {
    let deadline = Instant::now() + Duration::from_secs(args.timeout_secs);
    let step = Duration::from_millis(args.step_ms);

    game.start();
    let mut snapshot = game.snapshot();
    tracing::info!(seed = snapshot.seed, "session started");

    'session: loop {
        for &action in script {
            game.snapshot_into(&mut snapshot);
            if snapshot.status == GameStatus::GameOver {
                tracing::info!(score = snapshot.score, "game over");
                break 'session;
            }
            if snapshot.piece_id > args.pieces {
                break 'session;
            }
            if Instant::now() >= deadline {
                tracing::warn!("session timed out");
                break 'session;
            }

            game.apply(action);
            std::thread::sleep(step);
        }
    }

    game.soft_drop(false);
    game.snapshot_into(&mut snapshot);
    snapshot
}

fn print_summary(snapshot: &GameSnapshot) {
    for row in &snapshot.board {
        let line: String = row
            .iter()
            .map(|&code| match code {
                0 => '.',
                code => PieceKind::ALL
                    .get(code as usize - 1)
                    .and_then(|kind| kind.as_str().chars().next())
                    .map_or('?', |c| c.to_ascii_uppercase()),
            })
            .collect();
        println!("|{line}|");
    }
    println!();
    println!("status:   {}", snapshot.status.as_str());
    println!("score:    {}", snapshot.score);
    println!("level:    {}", snapshot.level);
    println!("lines:    {}", snapshot.lines);
    println!("pieces:   {}", snapshot.piece_id);
    println!("tetrises: {}", snapshot.tetris_count);
    println!("t-spins:  {}", snapshot.t_spin_count);
    println!("seed:     {}", snapshot.seed);
}
