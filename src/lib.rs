//! grid-2048: a sliding-tile merge puzzle engine
//!
//! This crate provides:
//! - A `Grid` of `Tile`s with bounds-checked queries and placement (`engine::grid`)
//! - Move resolution with the merge-once rule, random spawns and game-over detection (`engine::moves`)
//! - Fixed starting layouts encoded one character per cell (`engine::layout`)
//! - Saved games as JSON or postcard, with memory and file stores (`serialization`)
//! - A `GameManager` tying a game to persistence, presentation and input (`session`)
//!
//! Quick start:
//! ```
//! use grid_2048::engine::{Game, Move, Rules};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Deterministic setup with a seeded RNG
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut game = Game::new(4, Rules::default()).unwrap();
//! game.add_start_tiles(&mut rng);
//! assert_eq!(game.grid().tile_count(), 2);
//!
//! // Play until no move changes the board (or a few moves pass)
//! let mut moves = 0;
//! while !game.is_terminated() && moves < 8 {
//!     for dir in Move::ALL {
//!         if game.make_move(dir, &mut rng).moved {
//!             moves += 1;
//!             break;
//!         }
//!     }
//! }
//! let _final_score = game.score();
//! ```
//!
//! Sessions with persistence:
//! ```
//! use grid_2048::config::Config;
//! use grid_2048::engine::{Grid, Move};
//! use grid_2048::serialization::MemoryStore;
//! use grid_2048::session::{Actuator, GameManager, InputEvent, Metadata};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! struct Silent;
//! impl Actuator for Silent {
//!     fn actuate(&mut self, _grid: &Grid, _metadata: &Metadata) {}
//! }
//!
//! let config = Config { layout: Some("11".into()), ..Config::default() };
//! let mut session = GameManager::new(&config, MemoryStore::default(), Silent, StdRng::seed_from_u64(1));
//! let outcome = session.handle(InputEvent::Move(Move::Up));
//! assert_eq!(outcome.score_delta, 4);
//! assert_eq!(session.store().best_score, 4);
//! ```
//!
pub mod config;
pub mod engine;
pub mod error;
pub mod serialization;
pub mod session;
