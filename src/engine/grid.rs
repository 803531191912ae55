use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::moves::Vector;
use crate::error::GameError;

/// Smallest supported board dimension.
pub const MIN_SIZE: usize = 2;
/// Largest supported board dimension.
pub const MAX_SIZE: usize = 16;
/// Largest tile value a restored grid may hold; anything bigger could not merge
/// without overflowing `u32`.
pub const MAX_TILE: u32 = 1 << 30;

/// A cell coordinate. `x` is the column, `y` the row, growing downward.
///
/// Coordinates are signed so that stepping off the edge of the board yields a
/// position that bounds checks reject instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// The neighbouring position one step along `vector`.
    #[inline]
    pub fn step(self, vector: Vector) -> Self {
        Position::new(self.x + vector.x, self.y + vector.y)
    }
}

/// A numbered tile. Values are powers of two, starting at 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    position: Position,
    value: u32,
    previous_position: Option<Position>,
    merged_from: Option<[Position; 2]>,
}

impl Tile {
    pub fn new(position: Position, value: u32) -> Self {
        Tile { position, value, previous_position: None, merged_from: None }
    }

    #[inline]
    pub fn position(&self) -> Position { self.position }

    #[inline]
    pub fn value(&self) -> u32 { self.value }

    /// Where this tile sat before the current move started.
    ///
    /// `None` for tiles created during the move (merges and spawns).
    #[inline]
    pub fn previous_position(&self) -> Option<Position> { self.previous_position }

    /// Pre-move positions of the two tiles that merged into this one during the
    /// current move, if any. A tile carrying this marker cannot merge again
    /// until the next move clears it.
    #[inline]
    pub fn merged_from(&self) -> Option<[Position; 2]> { self.merged_from }

    pub(crate) fn save_position(&mut self) {
        self.previous_position = Some(self.position);
        self.merged_from = None;
    }

    pub(crate) fn update_position(&mut self, position: Position) {
        self.position = position;
    }

    pub(crate) fn set_merged_from(&mut self, sources: [Position; 2]) {
        self.merged_from = Some(sources);
    }
}

/// Serialized form of a grid: the size and one optional value per cell.
///
/// Cells are enumerated column-major: the cell at column `x`, row `y` lives at
/// index `x * size + y`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridState {
    pub size: usize,
    pub cells: Vec<Option<u32>>,
}

/// Square board of `size * size` cells, each holding at most one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Option<Tile>>,
}

impl Grid {
    /// An empty board. Callers validate `size` against [`MIN_SIZE`]..=[`MAX_SIZE`].
    pub fn new(size: usize) -> Self {
        Grid { size, cells: vec![None; size * size] }
    }

    /// Rebuild a grid from its serialized form.
    pub fn from_state(state: &GridState) -> Result<Self, GameError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&state.size) {
            return Err(GameError::InvalidSize(state.size));
        }
        let expected = state.size * state.size;
        if state.cells.len() != expected {
            return Err(GameError::CellCount { expected, found: state.cells.len() });
        }
        let mut grid = Grid::new(state.size);
        for (idx, cell) in state.cells.iter().enumerate() {
            if let Some(value) = *cell {
                if value < 2 || value > MAX_TILE || !value.is_power_of_two() {
                    return Err(GameError::InvalidTile(value));
                }
                let position = grid.position_of(idx);
                grid.insert_tile(Tile::new(position, value));
            }
        }
        Ok(grid)
    }

    /// Serialize to the column-major [`GridState`] form.
    pub fn state(&self) -> GridState {
        GridState {
            size: self.size,
            cells: self.cells.iter().map(|cell| cell.as_ref().map(Tile::value)).collect(),
        }
    }

    #[inline]
    pub fn size(&self) -> usize { self.size }

    #[inline]
    pub fn within_bounds(&self, position: Position) -> bool {
        let size = self.size as i32;
        position.x >= 0 && position.x < size && position.y >= 0 && position.y < size
    }

    /// The tile at `position`, or `None` for empty and out-of-bounds cells.
    #[inline]
    pub fn cell_content(&self, position: Position) -> Option<&Tile> {
        self.index_of(position).and_then(|idx| self.cells[idx].as_ref())
    }

    #[inline]
    pub fn cell_occupied(&self, position: Position) -> bool {
        self.cell_content(position).is_some()
    }

    /// True iff `position` is on the board and empty.
    #[inline]
    pub fn cell_available(&self, position: Position) -> bool {
        self.index_of(position).is_some_and(|idx| self.cells[idx].is_none())
    }

    pub fn cells_available(&self) -> bool {
        self.cells.iter().any(Option::is_none)
    }

    /// All empty cells in enumeration order.
    pub fn available_cells(&self) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(idx, _)| self.position_of(idx))
            .collect()
    }

    /// An empty cell chosen uniformly at random, or `None` when the board is full.
    pub fn random_available_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Position> {
        self.available_cells().choose(rng).copied()
    }

    /// Place `tile` at its recorded position. The slot must be empty.
    pub fn insert_tile(&mut self, tile: Tile) {
        let Some(idx) = self.index_of(tile.position) else {
            debug_assert!(false, "tile inserted outside the grid at {:?}", tile.position);
            return;
        };
        debug_assert!(self.cells[idx].is_none(), "cell {:?} already occupied", tile.position);
        self.cells[idx] = Some(tile);
    }

    /// Take the tile out of `position`, leaving the cell empty.
    pub fn remove_tile(&mut self, position: Position) -> Option<Tile> {
        self.index_of(position).and_then(|idx| self.cells[idx].take())
    }

    /// Relocate the tile at `from` to the empty cell `to`.
    pub fn move_tile(&mut self, from: Position, to: Position) {
        if from == to {
            return;
        }
        if let Some(mut tile) = self.remove_tile(from) {
            tile.update_position(to);
            self.insert_tile(tile);
        }
    }

    /// Live tiles in enumeration order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.cells.iter().flatten()
    }

    pub(crate) fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.cells.iter_mut().flatten()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles().count()
    }

    /// Highest tile value on the board (0 when empty).
    pub fn max_value(&self) -> u32 {
        self.tiles().map(Tile::value).max().unwrap_or(0)
    }

    #[inline]
    fn index_of(&self, position: Position) -> Option<usize> {
        self.within_bounds(position)
            .then(|| position.x as usize * self.size + position.y as usize)
    }

    #[inline]
    fn position_of(&self, idx: usize) -> Position {
        Position::new((idx / self.size) as i32, (idx % self.size) as i32)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat((self.size * 8).saturating_sub(1));
        for y in 0..self.size {
            if y > 0 {
                writeln!(f, "{rule}")?;
            }
            let row: Vec<String> = (0..self.size)
                .map(|x| format_val(self.cell_content(Position::new(x as i32, y as i32))))
                .collect();
            writeln!(f, "{}", row.join("|"))?;
        }
        Ok(())
    }
}

fn format_val(tile: Option<&Tile>) -> String {
    match tile {
        None => " ".repeat(7),
        Some(tile) => format!("{:^7}", tile.value()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn tile(x: i32, y: i32, value: u32) -> Tile {
        Tile::new(Position::new(x, y), value)
    }

    #[test]
    fn out_of_bounds_queries_are_empty() {
        let mut grid = Grid::new(4);
        grid.insert_tile(tile(3, 3, 2));
        for pos in [Position::new(-1, 0), Position::new(0, -1), Position::new(4, 0), Position::new(0, 4)] {
            assert!(!grid.within_bounds(pos));
            assert!(grid.cell_content(pos).is_none());
            assert!(!grid.cell_available(pos));
            assert!(grid.remove_tile(pos).is_none());
        }
        assert!(grid.cell_occupied(Position::new(3, 3)));
        assert!(!grid.cell_available(Position::new(3, 3)));
        assert!(grid.cell_available(Position::new(0, 0)));
    }

    #[test]
    fn insert_remove_and_move() {
        let mut grid = Grid::new(4);
        grid.insert_tile(tile(1, 2, 8));
        assert_eq!(grid.tile_count(), 1);

        grid.move_tile(Position::new(1, 2), Position::new(1, 0));
        assert!(grid.cell_available(Position::new(1, 2)));
        let moved = grid.cell_content(Position::new(1, 0)).unwrap();
        assert_eq!(moved.position(), Position::new(1, 0));
        assert_eq!(moved.value(), 8);

        let removed = grid.remove_tile(Position::new(1, 0)).unwrap();
        assert_eq!(removed.value(), 8);
        assert_eq!(grid.tile_count(), 0);
    }

    #[test]
    fn cells_available_tracks_fullness() {
        let mut grid = Grid::new(2);
        assert!(grid.cells_available());
        assert_eq!(grid.available_cells().len(), 4);
        for x in 0..2 {
            for y in 0..2 {
                grid.insert_tile(tile(x, y, 2));
            }
        }
        assert!(!grid.cells_available());
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(grid.random_available_cell(&mut rng), None);
    }

    #[test]
    fn random_available_cell_only_returns_empty_cells() {
        let mut grid = Grid::new(4);
        for y in 0..4 {
            grid.insert_tile(tile(0, y, 2));
            grid.insert_tile(tile(2, y, 4));
        }
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            let pos = grid.random_available_cell(&mut rng).unwrap();
            assert!(grid.cell_available(pos));
            seen.insert(pos);
        }
        // All eight free cells are reachable.
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn state_is_column_major() {
        let mut grid = Grid::new(2);
        grid.insert_tile(tile(1, 0, 4));
        grid.insert_tile(tile(0, 1, 2));
        let state = grid.state();
        assert_eq!(state.cells, vec![None, Some(2), Some(4), None]);

        let restored = Grid::from_state(&state).unwrap();
        assert_eq!(restored, grid);
        assert_eq!(restored.cell_content(Position::new(1, 0)).unwrap().value(), 4);
    }

    #[test]
    fn from_state_rejects_bad_input() {
        let bad_size = GridState { size: 1, cells: vec![None] };
        assert_eq!(Grid::from_state(&bad_size), Err(GameError::InvalidSize(1)));

        let short = GridState { size: 3, cells: vec![None; 4] };
        assert_eq!(Grid::from_state(&short), Err(GameError::CellCount { expected: 9, found: 4 }));

        let odd = GridState { size: 2, cells: vec![Some(6), None, None, None] };
        assert_eq!(Grid::from_state(&odd), Err(GameError::InvalidTile(6)));

        let one = GridState { size: 2, cells: vec![Some(1), None, None, None] };
        assert_eq!(Grid::from_state(&one), Err(GameError::InvalidTile(1)));

        let huge = GridState { size: 2, cells: vec![Some(1 << 31), None, None, None] };
        assert_eq!(Grid::from_state(&huge), Err(GameError::InvalidTile(1 << 31)));

        let ceiling = GridState { size: 2, cells: vec![Some(MAX_TILE), None, None, None] };
        assert!(Grid::from_state(&ceiling).is_ok());
    }

    #[test]
    fn display_renders_rows() {
        let mut grid = Grid::new(2);
        grid.insert_tile(tile(1, 0, 2048));
        grid.insert_tile(tile(0, 1, 2));
        let text = grid.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "       | 2048  ");
        assert_eq!(lines[1], "---------------");
        assert_eq!(lines[2], "   2   |       ");
        assert_eq!(grid.max_value(), 2048);
    }

    #[test]
    fn display_of_empty_grid_does_not_panic() {
        assert_eq!(Grid::new(0).to_string(), "");
    }
}
