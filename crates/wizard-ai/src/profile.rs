//! Difficulty to search parameters.

use wizard_core::Difficulty;

/// How hard the AI thinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchProfile {
    /// Maximum search depth in plies.
    pub depth: u8,
    /// Root scores are perturbed by a uniform amount in `-noise..=noise`.
    pub noise: i32,
    /// Node limit; the deepest fully completed iteration is used once hit.
    pub node_budget: u64,
}

impl SearchProfile {
    /// Returns the profile for a difficulty label.
    ///
    /// | Difficulty | Depth | Noise | Nodes   |
    /// |------------|-------|-------|---------|
    /// | Easy       | 1     | 150   | 2 000   |
    /// | Medium     | 2     | 50    | 10 000  |
    /// | Hard       | 3     | 15    | 40 000  |
    /// | Expert     | 3     | 0     | 80 000  |
    /// | Master     | 4     | 0     | 200 000 |
    pub const fn for_difficulty(difficulty: Difficulty) -> Self {
        let (depth, noise, node_budget) = match difficulty {
            Difficulty::Easy => (1, 150, 2_000),
            Difficulty::Medium => (2, 50, 10_000),
            Difficulty::Hard => (3, 15, 40_000),
            Difficulty::Expert => (3, 0, 80_000),
            Difficulty::Master => (4, 0, 200_000),
        };
        SearchProfile {
            depth,
            noise,
            node_budget,
        }
    }
}

impl From<Difficulty> for SearchProfile {
    fn from(difficulty: Difficulty) -> Self {
        Self::for_difficulty(difficulty)
    }
}
