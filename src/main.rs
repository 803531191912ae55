use std::io::{self, BufRead};
use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;
use grid_2048::config::Config;
use grid_2048::engine::{Grid, Move};
use grid_2048::serialization::{FileStore, MemoryStore, StateStore};
use grid_2048::session::{Actuator, GameManager, InputEvent, Metadata};
use log::info;
use rand::{rngs::StdRng, SeedableRng};

#[derive(Parser, Debug)]
#[command(name = "grid-2048", version, about = "Play the sliding-tile merge puzzle in the terminal")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Board dimension (overrides the config file)
    #[arg(long)]
    size: Option<usize>,
    /// Starting layout code, one character per cell, column-major
    #[arg(long, value_name = "CODE")]
    layout: Option<String>,
    /// Directory for the saved game and best score
    #[arg(long, value_name = "DIR")]
    state_dir: Option<PathBuf>,
    /// Seed the tile spawner for a reproducible game
    #[arg(long)]
    seed: Option<u64>,
}

/// Prints the board and status after every effective move.
struct TerminalActuator;

impl Actuator for TerminalActuator {
    fn actuate(&mut self, grid: &Grid, metadata: &Metadata) {
        let status = if metadata.over {
            " | Game over! (r to restart)"
        } else if metadata.won && metadata.terminated {
            " | You win! (c to keep playing, r to restart)"
        } else {
            ""
        };
        println!("\n{grid}Score: {} | Best: {}{status}", metadata.score, metadata.best_score);
    }
}

enum Command {
    Event(InputEvent),
    Quit,
}

fn parse_command(c: char) -> Option<Command> {
    let event = match c.to_ascii_lowercase() {
        'w' | 'k' => InputEvent::Move(Move::Up),
        'd' | 'l' => InputEvent::Move(Move::Right),
        's' | 'j' => InputEvent::Move(Move::Down),
        'a' | 'h' => InputEvent::Move(Move::Left),
        'r' => InputEvent::Restart,
        'c' => InputEvent::KeepPlaying,
        'q' => return Some(Command::Quit),
        other => {
            let code = other.to_digit(10)?;
            InputEvent::from_direction_code(code as u8)?
        }
    };
    Some(Command::Event(event))
}

fn run<S: StateStore>(config: &Config, store: S, rng: StdRng) -> anyhow::Result<()> {
    let mut session = GameManager::new(config, store, TerminalActuator, rng);
    for line in io::stdin().lock().lines() {
        for c in line?.chars() {
            match parse_command(c) {
                Some(Command::Quit) => return Ok(()),
                Some(Command::Event(event)) => {
                    session.handle(event);
                }
                None => {}
            }
        }
    }
    info!("input closed at score {}", session.game().score());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_toml(path)?,
        None => Config::default(),
    };
    if let Some(size) = args.size {
        config.size = size;
    }
    if args.layout.is_some() {
        config.layout = args.layout.clone();
    }
    if args.state_dir.is_some() {
        config.storage.state_dir = args.state_dir.clone();
    }
    config.validate()?;

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    println!("w/a/s/d (or h/j/k/l) to move, r to restart, c to keep playing, q to quit");
    match &config.storage.state_dir {
        Some(dir) => {
            info!("saving games under {}", dir.display());
            let store = FileStore::new(dir, config.storage.format);
            run(&config, store, rng)
        }
        None => run(&config, MemoryStore::default(), rng),
    }
}
