//! TOML configuration file format.

use super::{BlurSchedule, ConfigError, GameConfig, Puzzle, PuzzleSet};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default = "default_puzzles")]
    pub puzzles: Vec<Puzzle>,
    #[serde(default)]
    pub blur: BlurConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

fn default_puzzles() -> Vec<Puzzle> {
    PuzzleSet::default().iter().cloned().collect()
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            puzzles: default_puzzles(),
            blur: BlurConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

/// Blur schedule section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlurConfig {
    #[serde(default)]
    pub schedule: BlurSchedule,
}

/// Filesystem locations used by the front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory the puzzle images are loaded from.
    pub images_dir: PathBuf,
    /// CSV ledger of completed rounds.
    pub ledger: PathBuf,
    /// Where blurred frames and the timing report are written.
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from("static/images"),
            ledger: PathBuf::from("data/scores.csv"),
            output_dir: PathBuf::from("out"),
        }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        // Surface puzzle errors at load time rather than at first session.
        PuzzleSet::new(config.puzzles.clone())?;
        Ok(config)
    }

    /// Builds the immutable game configuration.
    pub fn game_config(&self) -> Result<GameConfig, ConfigError> {
        Ok(GameConfig::new(
            PuzzleSet::new(self.puzzles.clone())?,
            self.blur.schedule.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = FileConfig::from_toml("").unwrap();
        let game = config.game_config().unwrap();
        assert_eq!(game, GameConfig::default());
        assert_eq!(config.paths.ledger, PathBuf::from("data/scores.csv"));
    }

    #[test]
    fn test_full_file() {
        let toml = r#"
            [[puzzles]]
            image = "cat.jpg"
            answer = "cat"

            [[puzzles]]
            image = "dog.jpg"
            answer = "dog"

            [blur]
            schedule = [15, 7, 1]

            [paths]
            images_dir = "imgs"
            ledger = "ledger.csv"
            output_dir = "frames"
        "#;
        let config = FileConfig::from_toml(toml).unwrap();
        let game = config.game_config().unwrap();

        assert_eq!(game.puzzles.image_ids(), vec!["cat.jpg", "dog.jpg"]);
        assert_eq!(game.schedule.levels(), &[15, 7, 1]);
        assert_eq!(config.paths.images_dir, PathBuf::from("imgs"));
    }

    #[test]
    fn test_bad_schedule_is_parse_error() {
        let toml = "[blur]\nschedule = [1, 5]\n";
        assert!(matches!(
            FileConfig::from_toml(toml),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_duplicate_puzzle_rejected() {
        let toml = r#"
            [[puzzles]]
            image = "cat.jpg"
            answer = "cat"

            [[puzzles]]
            image = "cat.jpg"
            answer = "kitty"
        "#;
        assert!(matches!(
            FileConfig::from_toml(toml),
            Err(ConfigError::DuplicatePuzzle(_))
        ));
    }
}
