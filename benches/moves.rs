use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use grid_2048::engine::{Game, Move, Rules};
use grid_2048::serialization::{self as ser, Format};
use rand::{rngs::StdRng, SeedableRng};
use std::hint::black_box;

fn corpus() -> Vec<Game> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut games = Vec::new();
    let mut game = Game::new(4, Rules::default()).expect("valid size");
    game.add_start_tiles(&mut rng);
    game.keep_playing();
    games.push(game.clone());
    // Derive a variety of densities deterministically
    let seq = [Move::Left, Move::Up, Move::Right, Move::Down];
    for i in 0..40 {
        game.make_move(seq[i % seq.len()], &mut rng);
        if game.is_over() {
            break;
        }
        games.push(game.clone());
    }
    games
}

fn bench_shift(c: &mut Criterion) {
    let games = corpus();
    for dir in Move::ALL {
        c.bench_function(&format!("shift/{dir:?}").to_lowercase(), |bch| {
            bch.iter_batched(
                || games.clone(),
                |mut batch| {
                    let mut merges = 0u32;
                    for game in &mut batch {
                        merges += game.shift(dir).merges;
                    }
                    black_box(merges)
                },
                BatchSize::SmallInput,
            )
        });
    }
}

fn bench_make_move(c: &mut Criterion) {
    let games = corpus();
    c.bench_function("make_move/left", |bch| {
        let mut rng = StdRng::seed_from_u64(7);
        bch.iter_batched(
            || games.clone(),
            |mut batch| {
                for game in &mut batch {
                    black_box(game.make_move(Move::Left, &mut rng));
                }
            },
            BatchSize::SmallInput,
        )
    });
    c.bench_function("moves_available", |bch| {
        bch.iter(|| games.iter().filter(|g| g.moves_available()).count())
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let games = corpus();
    for format in [Format::Json, Format::Postcard] {
        c.bench_function(&format!("snapshot/{format:?}").to_lowercase(), |bch| {
            bch.iter(|| {
                let mut bytes = 0usize;
                for game in &games {
                    bytes += ser::encode(&game.snapshot(), format).expect("encode").len();
                }
                black_box(bytes)
            })
        });
    }
}

criterion_group!(moves, bench_shift, bench_make_move, bench_snapshot);
criterion_main!(moves);
