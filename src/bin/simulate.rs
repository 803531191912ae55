use std::collections::BTreeMap;
use std::time::Instant;

use clap::Parser;
use env_logger::Env;
use grid_2048::config::Config;
use grid_2048::engine::{Game, Move};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;

#[derive(Parser, Debug)]
#[command(
    name = "simulate",
    version,
    about = "Play many random-policy games in parallel and report score statistics"
)]
struct Args {
    /// Number of games to play
    #[arg(short = 'n', long, default_value_t = 1000)]
    games: u64,
    /// Board dimension
    #[arg(long, default_value_t = 4)]
    size: usize,
    /// Base seed; game `i` uses `seed + i`
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Stop each game after this many effective moves
    #[arg(long)]
    max_moves: Option<u64>,
    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy)]
struct GameSummary {
    score: u64,
    highest_tile: u32,
    moves: u64,
}

fn play_random_game(config: &Config, seed: u64, max_moves: Option<u64>) -> anyhow::Result<GameSummary> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut game = Game::new(config.size, config.rules())?;
    game.add_start_tiles(&mut rng);
    // Random play never stops at the winning tile.
    game.keep_playing();

    let mut moves = 0u64;
    let mut directions = Move::ALL;
    while !game.is_over() && max_moves.map_or(true, |limit| moves < limit) {
        directions.shuffle(&mut rng);
        let moved = directions.iter().any(|&dir| game.make_move(dir, &mut rng).moved);
        if !moved {
            break;
        }
        moves += 1;
    }
    debug!("seed {seed}: score={}, moves={moves}", game.score());
    Ok(GameSummary { score: game.score(), highest_tile: game.grid().max_value(), moves })
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = Config { size: args.size, ..Config::default() };
    config.validate()?;

    let pb = if args.quiet { ProgressBar::hidden() } else { ProgressBar::new(args.games) };
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} games ({eta})")?
            .progress_chars("=>-"),
    );

    let start = Instant::now();
    let summaries: Vec<GameSummary> = (0..args.games)
        .into_par_iter()
        .map(|i| {
            let summary = play_random_game(&config, args.seed.wrapping_add(i), args.max_moves);
            pb.inc(1);
            summary
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    pb.finish_and_clear();

    if summaries.is_empty() {
        anyhow::bail!("no games played");
    }
    let elapsed = start.elapsed().as_secs_f64().max(1e-6);
    let total_moves: u64 = summaries.iter().map(|s| s.moves).sum();
    let total_score: u64 = summaries.iter().map(|s| s.score).sum();
    let best = summaries.iter().map(|s| s.score).max().unwrap_or(0);
    let mut tiles: BTreeMap<u32, u64> = BTreeMap::new();
    for s in &summaries {
        *tiles.entry(s.highest_tile).or_default() += 1;
    }

    info!("played {} games in {:.2}s", summaries.len(), elapsed);
    println!(
        "Games: {} | mean score: {:.1} | best score: {} | moves/sec: {:.1}",
        summaries.len(),
        total_score as f64 / summaries.len() as f64,
        best,
        total_moves as f64 / elapsed
    );
    println!("Highest tile reached:");
    for (tile, count) in tiles.iter().rev() {
        println!("  {tile:>6}: {count:>6} ({:.1}%)", 100.0 * *count as f64 / summaries.len() as f64);
    }
    Ok(())
}
