#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless frame driver for Collie Defence.

mod campaign;
mod generate;
mod script;

use std::{collections::BTreeMap, fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use collie_defence_core::{Event, GameState};
use collie_defence_game::Game;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::script::Script;

#[derive(Parser, Debug)]
#[command(name = "collie-defence")]
#[command(about = "Headless Collie Defence simulation driver")]
struct Cli {
    /// Log filter, e.g. `debug` or `collie_defence_world=trace`. Overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate a campaign against a scripted input sequence.
    Run {
        /// Campaign or single-level TOML file. Uses the built-in campaign when omitted.
        #[arg(long)]
        campaign: Option<PathBuf>,

        /// TOML file listing the signals pressed on each frame.
        #[arg(long)]
        script: Option<PathBuf>,

        /// Maximum number of frames to simulate.
        #[arg(long, default_value_t = 20_000)]
        frames: u64,
    },
    /// Write a random, valid level to TOML.
    Generate {
        /// Seed for the level generator.
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Grid columns.
        #[arg(long, default_value_t = 15)]
        columns: u32,

        /// Grid rows.
        #[arg(long, default_value_t = 10)]
        rows: u32,

        /// Destination file. Prints to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Entry point for the Collie Defence command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref())?;

    match cli.command {
        Command::Run {
            campaign,
            script,
            frames,
        } => run(campaign, script, frames),
        Command::Generate {
            seed,
            columns,
            rows,
            output,
        } => {
            let level = generate::level(seed, columns, rows)?;
            let text = toml::to_string(&level).context("failed to serialise generated level")?;
            match output {
                Some(path) => fs::write(&path, text)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => print!("{text}"),
            }
            Ok(())
        }
    }
}

fn init_tracing(filter: Option<&str>) -> Result<()> {
    let filter = match filter {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter `{directives}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

fn run(campaign: Option<PathBuf>, script: Option<PathBuf>, frames: u64) -> Result<()> {
    let campaign = campaign::load(campaign.as_deref())?
        .build()
        .context("campaign failed validation")?;
    let script = match script {
        Some(path) => Script::load(&path)?,
        None => Script::start_only(),
    };
    let mut game = Game::new(campaign).context("cannot create game")?;

    let mut events = Vec::new();
    let mut tally: BTreeMap<&'static str, u64> = BTreeMap::new();
    let mut state = game.state();
    let mut frame = 0;
    while frame < frames {
        events.clear();
        state = game.tick(&script.input_at(frame), &mut events);
        for event in &events {
            debug!(frame, ?event, "event");
            *tally.entry(event_name(event)).or_default() += 1;
        }
        frame += 1;
        if matches!(state, GameState::GameOver | GameState::Victory) {
            break;
        }
    }

    info!(frame, ?state, "simulation stopped");
    println!("state:  {state:?}");
    println!("frames: {frame}");
    println!("money:  {}", game.player().get_money());
    println!("health: {}", game.player().health());
    for (name, count) in &tally {
        println!("{name:>24}: {count}");
    }
    Ok(())
}

fn event_name(event: &Event) -> &'static str {
    match event {
        Event::LevelStateChanged { .. } => "level_state_changed",
        Event::GameStateChanged { .. } => "game_state_changed",
        Event::EnemySpawned { .. } => "enemy_spawned",
        Event::EnemyLeaked { .. } => "enemy_leaked",
        Event::EnemyKilled { .. } => "enemy_killed",
        Event::TowerPlaced { .. } => "tower_placed",
        Event::TowerPlacementRejected { .. } => "tower_placement_rejected",
        Event::BulletFired { .. } => "bullet_fired",
        Event::BulletHit { .. } => "bullet_hit",
        Event::BulletDiscarded { .. } => "bullet_discarded",
        Event::MoneyChanged { .. } => "money_changed",
        Event::PlayerDamaged { .. } => "player_damaged",
    }
}
