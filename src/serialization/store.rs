use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use super::snapshot::{decode, encode, Format, SerializationError, Snapshot};

/// Persistence boundary for sessions: the saved game and the best score.
pub trait StateStore {
    fn load_state(&mut self) -> Result<Option<Snapshot>, SerializationError>;
    fn save_state(&mut self, snapshot: &Snapshot) -> Result<(), SerializationError>;
    fn clear_state(&mut self) -> Result<(), SerializationError>;
    fn best_score(&self) -> Result<u64, SerializationError>;
    fn set_best_score(&mut self, score: u64) -> Result<(), SerializationError>;
}

/// In-process store; nothing survives the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    pub state: Option<Snapshot>,
    pub best_score: u64,
}

impl StateStore for MemoryStore {
    fn load_state(&mut self) -> Result<Option<Snapshot>, SerializationError> {
        Ok(self.state.clone())
    }

    fn save_state(&mut self, snapshot: &Snapshot) -> Result<(), SerializationError> {
        self.state = Some(snapshot.clone());
        Ok(())
    }

    fn clear_state(&mut self) -> Result<(), SerializationError> {
        self.state = None;
        Ok(())
    }

    fn best_score(&self) -> Result<u64, SerializationError> {
        Ok(self.best_score)
    }

    fn set_best_score(&mut self, score: u64) -> Result<(), SerializationError> {
        self.best_score = score;
        Ok(())
    }
}

/// Directory-backed store: `game_state.{json,bin}` plus `best_score.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    format: Format,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(dir: P, format: Format) -> Self {
        FileStore { dir: dir.as_ref().to_path_buf(), format }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.join(format!("game_state.{}", self.format.extension()))
    }

    pub fn best_score_path(&self) -> PathBuf {
        self.dir.join("best_score.json")
    }
}

impl StateStore for FileStore {
    fn load_state(&mut self) -> Result<Option<Snapshot>, SerializationError> {
        let Some(bytes) = read_if_exists(&self.state_path())? else {
            return Ok(None);
        };
        Ok(Some(decode(&bytes, self.format)?))
    }

    fn save_state(&mut self, snapshot: &Snapshot) -> Result<(), SerializationError> {
        fs::create_dir_all(&self.dir)?;
        let bytes = encode(snapshot, self.format)?;
        fs::write(self.state_path(), bytes)?;
        debug!("saved game state to {}", self.state_path().display());
        Ok(())
    }

    fn clear_state(&mut self) -> Result<(), SerializationError> {
        match fs::remove_file(self.state_path()) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    fn best_score(&self) -> Result<u64, SerializationError> {
        match read_if_exists(&self.best_score_path())? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(0),
        }
    }

    fn set_best_score(&mut self, score: u64) -> Result<(), SerializationError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.best_score_path(), serde_json::to_vec(&score)?)?;
        Ok(())
    }
}

fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>, SerializationError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
