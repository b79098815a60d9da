//! The AI opponent.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use wizard_core::{Color, Difficulty, Move};
use wizard_engine::{Board, GamePhase, GameState, WizardChess};

use crate::profile::SearchProfile;
use crate::search::{SearchResult, Searcher};

/// An AI player with a difficulty-derived search profile and its own random
/// source. Inject a seeded generator for reproducible play.
#[derive(Debug, Clone)]
pub struct AiPlayer<R = StdRng> {
    difficulty: Difficulty,
    profile: SearchProfile,
    rng: R,
}

impl AiPlayer<StdRng> {
    /// Creates a player seeded from system entropy.
    pub fn new(difficulty: Difficulty) -> Self {
        Self::with_rng(difficulty, StdRng::from_entropy())
    }

    /// Creates a player with a fixed seed.
    pub fn seeded(difficulty: Difficulty, seed: u64) -> Self {
        Self::with_rng(difficulty, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> AiPlayer<R> {
    pub fn with_rng(difficulty: Difficulty, rng: R) -> Self {
        AiPlayer {
            difficulty,
            profile: SearchProfile::for_difficulty(difficulty),
            rng,
        }
    }

    /// Overrides the difficulty's profile.
    pub fn with_profile(mut self, profile: SearchProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn profile(&self) -> &SearchProfile {
        &self.profile
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.profile = SearchProfile::for_difficulty(difficulty);
    }

    /// Picks a move for `color` in the given game.
    ///
    /// `None` means there is nothing to play: the game is over or `color`
    /// has no legal moves. Callers treat it as a terminal signal.
    pub fn choose_move(&mut self, state: &GameState, color: Color) -> Option<Move> {
        if state.phase() == GamePhase::Ended {
            return None;
        }
        self.best_move(state.board(), color)
    }

    /// Picks a move for `color` on a bare board.
    pub fn best_move(&mut self, board: &Board, color: Color) -> Option<Move> {
        self.search(board, color).map(|r| r.best_move)
    }

    /// Runs a full search and returns its details.
    pub fn search(&mut self, board: &Board, color: Color) -> Option<SearchResult> {
        let mut searcher = Searcher::new(&WizardChess, self.profile.node_budget);
        let result = searcher.search(board, color, &self.profile, &mut self.rng);
        if result.is_none() {
            info!(side = %color, "no legal moves for AI");
        }
        result
    }
}
