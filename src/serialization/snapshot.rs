use std::io;

use serde::{Deserialize, Serialize};

use crate::engine::{Game, Grid, GridState, Rules};
use crate::error::GameError;

/// Saved game: the grid plus score and status flags.
///
/// The grid is deliberately nested, `{grid: {size, cells}, score, over, won, keepPlaying}`,
/// rather than flattened into a `gridSize`/`cells` pair: it is the same shape
/// existing browser saves use. The JSON form uses camelCase keys, and the grid's
/// cells are enumerated column-major as described on [`GridState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub grid: GridState,
    pub score: u64,
    pub over: bool,
    pub won: bool,
    pub keep_playing: bool,
}

/// On-disk encoding for saved games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
    Postcard,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Postcard => "bin",
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SerializationError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("postcard error: {0}")]
    Postcard(#[from] postcard::Error),
}

impl Game {
    /// Capture everything needed to rebuild this game.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            grid: self.grid().state(),
            score: self.score(),
            over: self.is_over(),
            won: self.is_won(),
            keep_playing: self.keeps_playing(),
        }
    }

    /// Rebuild a game from a snapshot, validating the grid.
    pub fn from_snapshot(snapshot: &Snapshot, rules: Rules) -> Result<Self, GameError> {
        let grid = Grid::from_state(&snapshot.grid)?;
        Ok(Game::from_parts(
            grid,
            snapshot.score,
            snapshot.over,
            snapshot.won,
            snapshot.keep_playing,
            rules,
        ))
    }
}

pub fn to_json(snapshot: &Snapshot) -> Result<String, SerializationError> {
    Ok(serde_json::to_string(snapshot)?)
}

pub fn from_json(text: &str) -> Result<Snapshot, SerializationError> {
    Ok(serde_json::from_str(text)?)
}

/// Encode a snapshot to postcard bytes.
pub fn to_postcard_bytes(snapshot: &Snapshot) -> Result<Vec<u8>, SerializationError> {
    Ok(postcard::to_allocvec(snapshot)?)
}

/// Decode a snapshot from postcard bytes.
pub fn from_postcard_bytes(bytes: &[u8]) -> Result<Snapshot, SerializationError> {
    Ok(postcard::from_bytes(bytes)?)
}

pub fn encode(snapshot: &Snapshot, format: Format) -> Result<Vec<u8>, SerializationError> {
    match format {
        Format::Json => Ok(serde_json::to_vec(snapshot)?),
        Format::Postcard => to_postcard_bytes(snapshot),
    }
}

pub fn decode(bytes: &[u8], format: Format) -> Result<Snapshot, SerializationError> {
    match format {
        Format::Json => Ok(serde_json::from_slice(bytes)?),
        Format::Postcard => from_postcard_bytes(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Move, Position, Tile};
    use rand::{rngs::StdRng, SeedableRng};

    fn played_game() -> Game {
        let mut rng = StdRng::seed_from_u64(77);
        let mut game = Game::new(4, Rules::default()).unwrap();
        game.add_start_tiles(&mut rng);
        for dir in [Move::Left, Move::Up, Move::Right, Move::Down, Move::Left, Move::Up] {
            game.make_move(dir, &mut rng);
        }
        game.keep_playing();
        game
    }

    #[test]
    fn json_uses_camel_case_keys() {
        let mut grid = Grid::new(2);
        grid.insert_tile(Tile::new(Position::new(1, 1), 8));
        let game = Game::from_grid(grid, Rules::default());
        let text = to_json(&game.snapshot()).unwrap();
        assert_eq!(
            text,
            r#"{"grid":{"size":2,"cells":[null,null,null,8]},"score":0,"over":false,"won":false,"keepPlaying":false}"#
        );
    }

    #[test]
    fn restore_reproduces_game_state() {
        let game = played_game();
        for format in [Format::Json, Format::Postcard] {
            let bytes = encode(&game.snapshot(), format).unwrap();
            let snapshot = decode(&bytes, format).unwrap();
            let restored = Game::from_snapshot(&snapshot, Rules::default()).unwrap();
            assert_eq!(restored.snapshot(), game.snapshot());
            assert_eq!(restored.grid().state(), game.grid().state());
            assert_eq!(restored.score(), game.score());
            assert!(restored.keeps_playing());
        }
    }

    #[test]
    fn restore_rejects_invalid_grid() {
        let snapshot = Snapshot {
            grid: GridState { size: 2, cells: vec![Some(3), None, None, None] },
            score: 0,
            over: false,
            won: false,
            keep_playing: false,
        };
        assert_eq!(
            Game::from_snapshot(&snapshot, Rules::default()),
            Err(GameError::InvalidTile(3))
        );
    }

    #[test]
    fn restore_rejects_tiles_too_large_to_merge() {
        let top = 1u32 << 31;
        // Row 0 of columns 0 and 1.
        let mut cells = vec![None; 16];
        cells[0] = Some(top);
        cells[4] = Some(top);
        let snapshot = Snapshot {
            grid: GridState { size: 4, cells },
            score: 0,
            over: false,
            won: false,
            keep_playing: false,
        };
        assert_eq!(
            Game::from_snapshot(&snapshot, Rules::default()),
            Err(GameError::InvalidTile(top))
        );
    }

    #[test]
    fn decode_garbage_fails() {
        assert!(matches!(from_json("{not json"), Err(SerializationError::Json(_))));
        assert!(matches!(from_postcard_bytes(&[0xff]), Err(SerializationError::Postcard(_))));
    }
}
