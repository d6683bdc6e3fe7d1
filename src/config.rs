use crate::error::Result;
use crate::map::validate_board_size;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings for a single game.
///
/// Every field has a default, so a configuration file only needs the values it changes.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct GameConfig {
    /// Length of a side of the square board.
    pub board_size: usize,
    /// Jars of honey placed on the board for every bear.
    pub honey_per_bear: usize,
    /// Seed for the random number generator. A random seed is used if `None`.
    pub seed: Option<u64>,
    /// Whether to stop early once no more than one bear is left.
    pub stop_when_settled: bool,
    /// The file to save the replay of the game to. If `None`, no replay is saved.
    pub replay_filename: Option<String>,
}

impl Default for GameConfig {
    fn default() -> GameConfig {
        GameConfig {
            board_size: 10,
            honey_per_bear: 2,
            seed: None,
            stop_when_settled: true,
            replay_filename: None,
        }
    }
}

impl GameConfig {
    pub fn from_json(contents: &str) -> Result<GameConfig> {
        let config: GameConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<GameConfig> {
        GameConfig::from_json(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        validate_board_size(self.board_size)
    }

    /// Number of cells a population of `bears` needs, counting their honey.
    ///
    /// Saturates at `usize::MAX`, which no board can hold.
    pub fn required_cells(&self, bears: usize) -> usize {
        bears
            .checked_mul(self.honey_per_bear)
            .and_then(|honey| honey.checked_add(bears))
            .unwrap_or(usize::MAX)
    }
}
