use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::grid::{Grid, Position, Tile, MAX_SIZE, MIN_SIZE};
use crate::error::GameError;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Move {
    Up,
    Right,
    Down,
    Left,
}

impl Move {
    /// All directions, in input-code order.
    pub const ALL: [Move; 4] = [Move::Up, Move::Right, Move::Down, Move::Left];

    /// Decode an input code: 0 up, 1 right, 2 down, 3 left. Other codes are ignored.
    pub fn from_code(code: u8) -> Option<Move> {
        Move::ALL.get(code as usize).copied()
    }

    pub fn code(self) -> u8 {
        match self {
            Move::Up => 0,
            Move::Right => 1,
            Move::Down => 2,
            Move::Left => 3,
        }
    }

    /// Unit step for this direction, `x` rightward and `y` downward.
    pub fn vector(self) -> Vector {
        match self {
            Move::Up => Vector { x: 0, y: -1 },
            Move::Right => Vector { x: 1, y: 0 },
            Move::Down => Vector { x: 0, y: 1 },
            Move::Left => Vector { x: -1, y: 0 },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vector {
    pub x: i32,
    pub y: i32,
}

/// Column and row visitation order for one move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traversals {
    pub x: Vec<i32>,
    pub y: Vec<i32>,
}

/// Visit cells starting from the edge tiles are moving towards.
pub fn build_traversals(size: usize, vector: Vector) -> Traversals {
    let mut x: Vec<i32> = (0..size as i32).collect();
    let mut y = x.clone();
    if vector.x == 1 {
        x.reverse();
    }
    if vector.y == 1 {
        y.reverse();
    }
    Traversals { x, y }
}

/// Result of sliding one tile as far as it goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FarthestPosition {
    /// Last empty cell reached (the starting cell if the tile is blocked).
    pub farthest: Position,
    /// The cell just beyond `farthest`: off the board or occupied.
    pub next: Position,
}

pub fn find_farthest_position(grid: &Grid, cell: Position, vector: Vector) -> FarthestPosition {
    let mut farthest = cell;
    let mut next = cell.step(vector);
    while grid.cell_available(next) {
        farthest = next;
        next = next.step(vector);
    }
    FarthestPosition { farthest, next }
}

/// Tunable rules for a game. Defaults preserve the classic game.
///
/// - `win_value`: a merge producing a tile at least this large sets the won flag; 0 disables it.
/// - `four_probability`: chance that a spawned tile is a 4 rather than a 2.
/// - `start_tiles`: random tiles placed on a fresh board.
#[derive(Debug, Clone, PartialEq)]
pub struct Rules {
    pub win_value: u32,
    pub four_probability: f64,
    pub start_tiles: usize,
}

impl Default for Rules {
    fn default() -> Self {
        Self { win_value: 2048, four_probability: 0.1, start_tiles: 2 }
    }
}

/// What a single move did to the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    /// At least one tile changed cell. Only moves that change the board spawn a tile.
    pub moved: bool,
    pub merges: u32,
    pub score_delta: u64,
    pub spawned: Option<Position>,
}

/// A game in progress: one grid plus the score and status flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    grid: Grid,
    score: u64,
    over: bool,
    won: bool,
    keep_playing: bool,
    rules: Rules,
}

impl Game {
    /// A fresh game on an empty board of `size * size` cells.
    pub fn new(size: usize, rules: Rules) -> Result<Self, GameError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(GameError::InvalidSize(size));
        }
        Ok(Self::from_grid(Grid::new(size), rules))
    }

    /// Wrap an existing grid with a zero score and cleared flags.
    pub fn from_grid(grid: Grid, rules: Rules) -> Self {
        Game { grid, score: 0, over: false, won: false, keep_playing: false, rules }
    }

    pub(crate) fn from_parts(grid: Grid, score: u64, over: bool, won: bool, keep_playing: bool, rules: Rules) -> Self {
        Game { grid, score, over, won, keep_playing, rules }
    }

    #[inline]
    pub fn grid(&self) -> &Grid { &self.grid }

    #[inline]
    pub fn score(&self) -> u64 { self.score }

    #[inline]
    pub fn is_over(&self) -> bool { self.over }

    #[inline]
    pub fn is_won(&self) -> bool { self.won }

    #[inline]
    pub fn keeps_playing(&self) -> bool { self.keep_playing }

    #[inline]
    pub fn rules(&self) -> &Rules { &self.rules }

    /// Lost, or won without opting to continue. Moves are ignored while terminated.
    pub fn is_terminated(&self) -> bool {
        self.over || (self.won && !self.keep_playing)
    }

    /// Allow play to continue past the winning tile.
    pub fn keep_playing(&mut self) {
        self.keep_playing = true;
    }

    /// Place the configured number of random start tiles.
    pub fn add_start_tiles<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for _ in 0..self.rules.start_tiles {
            self.add_random_tile(rng);
        }
    }

    /// Spawn a 2 (or a 4 with `four_probability`) in a random empty cell.
    ///
    /// Returns the spawn position, or `None` when the board is full.
    pub fn add_random_tile<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Position> {
        let cell = self.grid.random_available_cell(rng)?;
        let value = if rng.gen::<f64>() < self.rules.four_probability { 4 } else { 2 };
        self.grid.insert_tile(Tile::new(cell, value));
        Some(cell)
    }

    /// Play one full move: slide and merge, then spawn and re-check for game over.
    ///
    /// Terminated games and moves that change nothing leave the game untouched.
    ///
    /// ```
    /// use grid_2048::engine::{Game, Grid, Move, Position, Rules, Tile};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut grid = Grid::new(4);
    /// grid.insert_tile(Tile::new(Position::new(0, 0), 2));
    /// grid.insert_tile(Tile::new(Position::new(1, 0), 2));
    /// let mut game = Game::from_grid(grid, Rules::default());
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let outcome = game.make_move(Move::Left, &mut rng);
    /// assert!(outcome.moved);
    /// assert_eq!(game.score(), 4);
    /// assert_eq!(game.grid().tile_count(), 2);
    /// ```
    pub fn make_move<R: Rng + ?Sized>(&mut self, direction: Move, rng: &mut R) -> MoveOutcome {
        if self.is_terminated() {
            return MoveOutcome::default();
        }
        let mut outcome = self.shift(direction);
        if outcome.moved {
            outcome.spawned = self.add_random_tile(rng);
            if !self.moves_available() {
                self.over = true;
                info!("game over: score={}, highest tile={}", self.score, self.grid.max_value());
            }
            debug!(
                "move {:?}: merges={}, +{} points, spawned at {:?}",
                direction, outcome.merges, outcome.score_delta, outcome.spawned
            );
        }
        outcome
    }

    /// Slide and merge tiles in `direction` without spawning or checking for game over.
    ///
    /// Each tile can be the target of at most one merge: a merged tile carries a
    /// marker until the next move clears it, and marked tiles are never merged into.
    pub fn shift(&mut self, direction: Move) -> MoveOutcome {
        let vector = direction.vector();
        let traversals = build_traversals(self.grid.size(), vector);
        let mut outcome = MoveOutcome::default();

        self.prepare_tiles();

        for &x in &traversals.x {
            for &y in &traversals.y {
                let cell = Position::new(x, y);
                let Some(value) = self.grid.cell_content(cell).map(Tile::value) else {
                    continue;
                };

                let positions = find_farthest_position(&self.grid, cell, vector);
                // Tiles whose doubling would overflow stay put.
                let merge = match (self.grid.cell_content(positions.next), value.checked_mul(2)) {
                    (Some(next), Some(merged_value)) if next.value() == value && next.merged_from().is_none() => {
                        Some((next.previous_position().unwrap_or(positions.next), merged_value))
                    }
                    _ => None,
                };

                let destination = match merge {
                    Some((next_source, merged_value)) => {
                        let mut merged = Tile::new(positions.next, merged_value);
                        merged.set_merged_from([cell, next_source]);
                        self.grid.remove_tile(cell);
                        self.grid.remove_tile(positions.next);
                        self.grid.insert_tile(merged);

                        self.score += u64::from(merged_value);
                        outcome.score_delta += u64::from(merged_value);
                        outcome.merges += 1;
                        if self.rules.win_value != 0 && merged_value >= self.rules.win_value && !self.won {
                            self.won = true;
                            info!("reached {} (score {})", merged_value, self.score);
                        }
                        positions.next
                    }
                    None => {
                        self.grid.move_tile(cell, positions.farthest);
                        positions.farthest
                    }
                };

                if destination != cell {
                    outcome.moved = true;
                }
            }
        }
        outcome
    }

    /// True while any move could still change the board.
    pub fn moves_available(&self) -> bool {
        self.grid.cells_available() || self.tile_matches_available()
    }

    /// True if some tile has an equal-valued orthogonal neighbour.
    pub fn tile_matches_available(&self) -> bool {
        self.grid.tiles().any(|tile| {
            Move::ALL.iter().any(|dir| {
                self.grid
                    .cell_content(tile.position().step(dir.vector()))
                    .is_some_and(|other| other.value() == tile.value() && tile.value().checked_mul(2).is_some())
            })
        })
    }

    /// Snapshot pre-move positions and clear last move's merge markers.
    fn prepare_tiles(&mut self) {
        for tile in self.grid.tiles_mut() {
            tile.save_position();
        }
    }
}
