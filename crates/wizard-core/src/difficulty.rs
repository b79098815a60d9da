//! Difficulty labels for the AI opponent.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// AI strength label, from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Expert,
    Master,
}

/// Error returned when a difficulty label is not recognised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown difficulty '{0}'")]
pub struct ParseDifficultyError(pub String);

impl Difficulty {
    /// All labels in ascending strength.
    pub const ALL: [Difficulty; 5] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
        Difficulty::Master,
    ];

    /// Lowercase label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
            Difficulty::Master => "master",
        }
    }

    /// The next stronger label, saturating at `Master`.
    pub const fn harder(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Expert,
            Difficulty::Expert | Difficulty::Master => Difficulty::Master,
        }
    }

    /// The next weaker label, saturating at `Easy`.
    pub const fn easier(self) -> Self {
        match self {
            Difficulty::Easy | Difficulty::Medium => Difficulty::Easy,
            Difficulty::Hard => Difficulty::Medium,
            Difficulty::Expert => Difficulty::Hard,
            Difficulty::Master => Difficulty::Expert,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str() == lower)
            .ok_or(ParseDifficultyError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_labels() {
        assert_eq!("easy".parse(), Ok(Difficulty::Easy));
        assert_eq!("Master".parse(), Ok(Difficulty::Master));
        assert_eq!(
            "godlike".parse::<Difficulty>(),
            Err(ParseDifficultyError("godlike".to_string()))
        );
    }

    #[test]
    fn stepping_saturates() {
        assert_eq!(Difficulty::Master.harder(), Difficulty::Master);
        assert_eq!(Difficulty::Easy.easier(), Difficulty::Easy);
        assert_eq!(Difficulty::Medium.harder(), Difficulty::Hard);
        assert_eq!(Difficulty::Hard.easier(), Difficulty::Medium);
    }

    #[test]
    fn ordering_follows_strength() {
        assert!(Difficulty::Easy < Difficulty::Master);
        assert_eq!(Difficulty::default(), Difficulty::Medium);
    }
}
