//! Error types for restoring grids and games from external data.
//!
//! Bounds and occupancy mistakes inside a move are prevented by construction
//! and never surface here; these errors only describe data that arrives from a
//! boundary (snapshots, layouts, configuration).

use crate::engine::grid::{MAX_SIZE, MAX_TILE, MIN_SIZE};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("grid size {0} is outside the supported range {min}..={max}", min = MIN_SIZE, max = MAX_SIZE)]
    InvalidSize(usize),
    #[error("snapshot holds {found} cells, expected {expected}")]
    CellCount { expected: usize, found: usize },
    #[error("tile value {0} is not a power of two in 2..={max}", max = MAX_TILE)]
    InvalidTile(u32),
}
