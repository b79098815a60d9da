//! Training configuration loaded from `training.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wizard_core::Difficulty;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// The configuration parsed but cannot be used.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// A named competitor in self-play: a difficulty and a selection weight.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct StrategyConfig {
    pub name: String,
    #[serde(with = "difficulty_label")]
    pub difficulty: Difficulty,
    /// Relative chance of being picked for a side. Defaults to 1.
    #[serde(default = "default_weight")]
    pub weight: u32,
}

impl StrategyConfig {
    pub fn new(name: &str, difficulty: Difficulty, weight: u32) -> Self {
        StrategyConfig {
            name: name.to_string(),
            difficulty,
            weight,
        }
    }
}

fn default_weight() -> u32 {
    1
}

/// Self-play settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Games per training run. Defaults to 100.
    #[serde(default = "default_games")]
    pub games: u32,
    /// Plies after which a game is drawn. Defaults to 80.
    #[serde(default = "default_max_plies")]
    pub max_plies: u32,
    /// Consecutive plies on already-seen boards before a game is drawn as
    /// stuck. Defaults to 6.
    #[serde(default = "default_stuck_plies")]
    pub stuck_plies: u32,
    /// Plies that must pass before material adjudication applies.
    /// Defaults to 40.
    #[serde(default = "default_material_floor_plies")]
    pub material_floor_plies: u32,
    /// Material lead in centipawns that ends a game. Defaults to 1500.
    #[serde(default = "default_material_threshold")]
    pub material_threshold: i32,
    /// Plies between cooperative yields. Defaults to 16; 0 disables.
    #[serde(default = "default_yield_interval")]
    pub yield_interval: u32,
    /// Seed for strategy selection and AI randomness.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_strategies")]
    pub strategies: Vec<StrategyConfig>,
}

fn default_games() -> u32 {
    100
}

fn default_max_plies() -> u32 {
    80
}

fn default_stuck_plies() -> u32 {
    6
}

fn default_material_floor_plies() -> u32 {
    40
}

fn default_material_threshold() -> i32 {
    1500
}

fn default_yield_interval() -> u32 {
    16
}

fn default_strategies() -> Vec<StrategyConfig> {
    vec![
        StrategyConfig::new("Apprentice", Difficulty::Easy, 2),
        StrategyConfig::new("Journeyman", Difficulty::Medium, 3),
        StrategyConfig::new("Adept", Difficulty::Hard, 2),
        StrategyConfig::new("Archmage", Difficulty::Expert, 1),
    ]
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            games: default_games(),
            max_plies: default_max_plies(),
            stuck_plies: default_stuck_plies(),
            material_floor_plies: default_material_floor_plies(),
            material_threshold: default_material_threshold(),
            yield_interval: default_yield_interval(),
            seed: None,
            strategies: default_strategies(),
        }
    }
}

impl TrainingConfig {
    /// Loads the configuration from `path`. A missing file gives defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// [`ConfigError::ParseError`] if it is not valid TOML, or
    /// [`ConfigError::Invalid`] if it fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::parse(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parses and validates TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Default location of the configuration file.
    pub fn config_path() -> PathBuf {
        PathBuf::from("training.toml")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.strategies.is_empty() {
            return Err(ConfigError::Invalid("no strategies configured".into()));
        }
        if self.strategies.iter().all(|s| s.weight == 0) {
            return Err(ConfigError::Invalid("all strategy weights are zero".into()));
        }
        if self.max_plies == 0 {
            return Err(ConfigError::Invalid("max_plies must be positive".into()));
        }
        Ok(())
    }
}

mod difficulty_label {
    use serde::{Deserialize, Deserializer, Serializer};
    use wizard_core::Difficulty;

    pub fn serialize<S: Serializer>(difficulty: &Difficulty, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(difficulty.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Difficulty, D::Error> {
        let label = String::deserialize(d)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}
