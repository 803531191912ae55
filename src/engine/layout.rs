//! Initial-layout codes: one character per cell, used to start a game from a
//! fixed position instead of random start tiles.
//!
//! - `0` (or any unrecognised character) is an empty cell.
//! - A hex digit `1`..=`f` is the exponent of the tile value: `1` is 2, `b` is 2048, `f` is 32768.
//! - `g` is the 65536 tile.
//!
//! Cells are read column-major (`x * size + y`), matching [`GridState`]. Codes
//! shorter than `size * size` are padded with empty cells and longer codes are
//! truncated. A practice link such as `https://host/p/1100...` is accepted;
//! only the segment after the last `/` is read.

use super::grid::GridState;

/// Character reserved for the 65536 tile.
pub const MILESTONE_CHAR: char = 'g';
/// Value of the tile written as [`MILESTONE_CHAR`].
pub const MILESTONE_VALUE: u32 = 65_536;

/// Decode one layout character into a tile value.
pub fn parse_char(c: char) -> Option<u32> {
    if c == MILESTONE_CHAR {
        return Some(MILESTONE_VALUE);
    }
    match c.to_digit(16) {
        Some(0) | None => None,
        Some(exponent) => Some(1 << exponent),
    }
}

/// Encode one tile value as a layout character, if it has one.
pub fn encode_value(value: Option<u32>) -> Option<char> {
    match value {
        None => Some('0'),
        Some(MILESTONE_VALUE) => Some(MILESTONE_CHAR),
        Some(v) if v.is_power_of_two() && (2..=32_768).contains(&v) => {
            char::from_digit(v.trailing_zeros(), 16)
        }
        Some(_) => None,
    }
}

/// Parse a layout code (or practice link) for a `size * size` board.
pub fn parse_layout(input: &str, size: usize) -> GridState {
    let code = input.trim().rsplit('/').next().unwrap_or_default();
    let cells_len = size * size;
    let mut cells: Vec<Option<u32>> = code.chars().take(cells_len).map(parse_char).collect();
    cells.resize(cells_len, None);
    GridState { size, cells }
}

/// Render a grid state back into a layout code.
///
/// Returns `None` if some tile has no single-character encoding.
pub fn encode_layout(state: &GridState) -> Option<String> {
    state.cells.iter().map(|&cell| encode_value(cell)).collect()
}
