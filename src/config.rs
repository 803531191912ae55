use std::io::Read;
use std::path::{Path, PathBuf};

use crate::engine::{Rules, MAX_SIZE, MIN_SIZE};
use crate::serialization::Format;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Config {
    /// Board dimension.
    #[serde(default = "defaults::size")]
    pub size: usize,
    /// Random tiles placed on a fresh board when no layout is given.
    #[serde(default = "defaults::start_tiles")]
    pub start_tiles: usize,
    /// Merging into a tile at least this large wins the game. 0 disables winning.
    #[serde(default = "defaults::win_value")]
    pub win_value: u32,
    /// Chance that a spawned tile is a 4.
    #[serde(default = "defaults::four_probability")]
    pub four_probability: f64,
    /// Fixed starting layout code, see [`crate::engine::layout`].
    #[serde(default)]
    pub layout: Option<String>,

    #[serde(default)]
    pub storage: Storage,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, Default)]
pub struct Storage {
    /// Directory for saved games. Without it, state lives in memory only.
    #[serde(default)]
    pub state_dir: Option<PathBuf>,
    #[serde(default)]
    pub format: Format,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            size: defaults::size(),
            start_tiles: defaults::start_tiles(),
            win_value: defaults::win_value(),
            four_probability: defaults::four_probability(),
            layout: None,
            storage: Storage::default(),
        }
    }
}

impl Config {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = std::fs::File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&self.size) {
            return Err(ConfigError::Invalid(format!(
                "size {} must be within {MIN_SIZE}..={MAX_SIZE}",
                self.size
            )));
        }
        if !(0.0..=1.0).contains(&self.four_probability) {
            return Err(ConfigError::Invalid(format!(
                "four_probability {} must be within 0..=1",
                self.four_probability
            )));
        }
        if self.start_tiles > self.size * self.size {
            return Err(ConfigError::Invalid(format!(
                "start_tiles {} exceeds the {} cells of the board",
                self.start_tiles,
                self.size * self.size
            )));
        }
        if self.win_value != 0 && (self.win_value < 4 || !self.win_value.is_power_of_two()) {
            return Err(ConfigError::Invalid(format!(
                "win_value {} must be 0 or a power of two >= 4",
                self.win_value
            )));
        }
        Ok(())
    }

    pub fn rules(&self) -> Rules {
        Rules {
            win_value: self.win_value,
            four_probability: self.four_probability,
            start_tiles: self.start_tiles,
        }
    }
}

mod defaults {
    pub fn size() -> usize { 4 }
    pub fn start_tiles() -> usize { 2 }
    pub fn win_value() -> u32 { 2048 }
    pub fn four_probability() -> f64 { 0.1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = Config::from_toml_str("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.rules(), Rules::default());
    }

    #[test]
    fn parses_all_fields() {
        let cfg = Config::from_toml_str(
            r#"
            size = 5
            start_tiles = 3
            win_value = 0
            four_probability = 0.25
            layout = "1100"

            [storage]
            state_dir = "/tmp/grid-2048"
            format = "postcard"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.size, 5);
        assert_eq!(cfg.start_tiles, 3);
        assert_eq!(cfg.win_value, 0);
        assert_eq!(cfg.layout.as_deref(), Some("1100"));
        assert_eq!(cfg.storage.state_dir, Some(PathBuf::from("/tmp/grid-2048")));
        assert_eq!(cfg.storage.format, Format::Postcard);
        assert_eq!(cfg.rules().four_probability, 0.25);
    }

    #[test]
    fn rejects_out_of_range_values() {
        for bad in [
            "size = 1",
            "size = 17",
            "four_probability = 1.5",
            "win_value = 100",
            "size = 2\nstart_tiles = 5",
        ] {
            assert!(
                matches!(Config::from_toml_str(bad), Err(ConfigError::Invalid(_))),
                "accepted: {bad}"
            );
        }
        assert!(matches!(Config::from_toml_str("size = \"big\""), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn reads_from_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "size = 3\n").unwrap();
        let cfg = Config::from_toml(tmp.path()).unwrap();
        assert_eq!(cfg.size, 3);
    }
}
