//! Game sessions: wiring a [`Game`] to persistence, presentation and input.
//!
//! A [`GameManager`] owns the current game and reacts to [`InputEvent`]s. After
//! setup, restart and every move that changes the board it saves (or clears)
//! the game through its [`StateStore`] and hands the grid to its [`Actuator`].
//! Moves that change nothing touch neither.

use log::{info, warn};
use rand::Rng;

use crate::config::Config;
use crate::engine::{Game, Grid, Move, MoveOutcome, Rules};
use crate::serialization::StateStore;

/// Status passed to the presentation layer alongside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    pub score: u64,
    pub over: bool,
    pub won: bool,
    pub best_score: u64,
    pub terminated: bool,
}

/// Presentation boundary.
pub trait Actuator {
    /// Draw the current grid and status.
    fn actuate(&mut self, grid: &Grid, metadata: &Metadata);

    /// Dismiss any won/lost message.
    fn continue_game(&mut self) {}
}

/// Discrete events delivered by the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Move(Move),
    Restart,
    KeepPlaying,
}

impl InputEvent {
    /// Event for a raw direction code; codes outside 0..=3 yield `None`.
    pub fn from_direction_code(code: u8) -> Option<Self> {
        Move::from_code(code).map(InputEvent::Move)
    }
}

pub struct GameManager<S: StateStore, A: Actuator, R: Rng> {
    game: Game,
    size: usize,
    rules: Rules,
    layout: Option<String>,
    store: S,
    actuator: A,
    rng: R,
}

impl<S: StateStore, A: Actuator, R: Rng> GameManager<S, A, R> {
    /// Start a session: resume the stored game if there is one, else begin a new game.
    ///
    /// `config` is expected to be validated.
    pub fn new(config: &Config, store: S, actuator: A, rng: R) -> Self {
        let rules = config.rules();
        let mut manager = GameManager {
            game: Game::from_grid(Grid::new(config.size), rules.clone()),
            size: config.size,
            rules,
            layout: config.layout.clone(),
            store,
            actuator,
            rng,
        };
        manager.setup();
        manager
    }

    #[inline]
    pub fn game(&self) -> &Game { &self.game }

    #[inline]
    pub fn store(&self) -> &S { &self.store }

    #[inline]
    pub fn actuator(&self) -> &A { &self.actuator }

    pub fn handle(&mut self, event: InputEvent) -> MoveOutcome {
        match event {
            InputEvent::Move(direction) => self.move_tiles(direction),
            InputEvent::Restart => {
                self.restart();
                MoveOutcome::default()
            }
            InputEvent::KeepPlaying => {
                self.keep_playing();
                MoveOutcome::default()
            }
        }
    }

    /// Play a move; only a move that changed the board is saved and rendered.
    pub fn move_tiles(&mut self, direction: Move) -> MoveOutcome {
        let outcome = self.game.make_move(direction, &mut self.rng);
        if outcome.moved {
            self.actuate();
        }
        outcome
    }

    /// Drop the saved game and start a fresh one. The store is not read back.
    pub fn restart(&mut self) {
        if let Err(e) = self.store.clear_state() {
            warn!("could not clear saved game: {e}");
        }
        self.actuator.continue_game();
        self.game = self.fresh_game();
        self.actuate();
    }

    /// Continue past the winning tile.
    pub fn keep_playing(&mut self) {
        self.game.keep_playing();
        self.actuator.continue_game();
    }

    fn setup(&mut self) {
        self.game = match self.restore() {
            Some(game) => {
                info!("resumed game: score={}, tiles={}", game.score(), game.grid().tile_count());
                game
            }
            None => self.fresh_game(),
        };
        self.actuate();
    }

    fn restore(&mut self) -> Option<Game> {
        let snapshot = match self.store.load_state() {
            Ok(snapshot) => snapshot?,
            Err(e) => {
                warn!("could not load saved game, starting fresh: {e}");
                return None;
            }
        };
        match Game::from_snapshot(&snapshot, self.rules.clone()) {
            Ok(game) => Some(game),
            Err(e) => {
                warn!("discarding invalid saved game: {e}");
                None
            }
        }
    }

    fn fresh_game(&mut self) -> Game {
        if let Some(layout) = self.layout.as_deref() {
            match Game::from_layout(self.size, self.rules.clone(), layout) {
                Ok(game) => {
                    info!("new {}x{} game from layout {layout:?}", self.size, self.size);
                    return game;
                }
                Err(e) => warn!("ignoring layout {layout:?}: {e}"),
            }
        }
        let mut game = Game::from_grid(Grid::new(self.size), self.rules.clone());
        game.add_start_tiles(&mut self.rng);
        info!("new {}x{} game", self.size, self.size);
        game
    }

    /// Update the best score, save or clear the game, then render.
    fn actuate(&mut self) {
        let score = self.game.score();
        let mut best_score = self.store.best_score().unwrap_or_else(|e| {
            warn!("could not read best score: {e}");
            0
        });
        if best_score < score {
            if let Err(e) = self.store.set_best_score(score) {
                warn!("could not save best score: {e}");
            }
            best_score = score;
        }

        // A lost game is not resumable; a won one is.
        let saved = if self.game.is_over() {
            self.store.clear_state()
        } else {
            self.store.save_state(&self.game.snapshot())
        };
        if let Err(e) = saved {
            warn!("could not save game: {e}");
        }

        let metadata = Metadata {
            score,
            over: self.game.is_over(),
            won: self.game.is_won(),
            best_score,
            terminated: self.game.is_terminated(),
        };
        self.actuator.actuate(self.game.grid(), &metadata);
    }
}
