//! Grid model and move resolution.
//!
//! - [`grid`]: the board, its tiles and their serialized form.
//! - [`moves`]: directions, traversal order, merging and game-over detection.
//! - [`layout`]: fixed starting positions encoded one character per cell.

pub mod grid;
pub mod layout;
pub mod moves;

pub use grid::{Grid, GridState, Position, Tile, MAX_SIZE, MAX_TILE, MIN_SIZE};
pub use moves::{build_traversals, find_farthest_position, FarthestPosition, Game, Move, MoveOutcome, Rules, Traversals, Vector};

use crate::error::GameError;

impl Game {
    /// A game whose board is pre-populated from a layout code instead of random tiles.
    pub fn from_layout(size: usize, rules: Rules, layout: &str) -> Result<Self, GameError> {
        let grid = Grid::from_state(&layout::parse_layout(layout, size))?;
        Ok(Game::from_grid(grid, rules))
    }
}
