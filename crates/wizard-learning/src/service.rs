//! The learning service: ingests finished games and keeps the persisted
//! record in sync.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info, warn};
use wizard_core::{Color, Difficulty};
use wizard_engine::{GameResult, GameState};

use crate::codec::{self, CodecError};
use crate::data::{GameRecord, LearningData, Opponent, Outcome, PatternStats};
use crate::store::{KeyValueStore, StoreError};
use crate::strategy::{classify_moves, classify_summary, StrategyLabel};

/// Key the learning record is stored under.
pub const STORAGE_KEY: &str = "wizard_chess_learning_data";

/// Recent human games needed before difficulty is adjusted.
pub const MIN_GAMES_FOR_ADJUSTMENT: usize = 5;
/// Below this AI win rate against humans, play harder.
pub const STEP_UP_BELOW: f64 = 0.35;
/// Above this AI win rate against humans, play easier.
pub const STEP_DOWN_ABOVE: f64 = 0.70;

/// Errors from persisting learning state.
#[derive(Debug, Error)]
pub enum LearningError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// A self-play game summarized for bulk ingestion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingSummary {
    pub result: GameResult,
    pub plies: u32,
}

/// Read-only snapshot for display.
#[derive(Debug, Clone, PartialEq)]
pub struct LearningStats {
    pub games_played: u64,
    pub win_rate_vs_human: f64,
    pub win_rate_vs_ai: f64,
    pub move_patterns: usize,
    pub position_patterns: usize,
    pub recent_games: usize,
    pub preferred_strategies: Vec<StrategyLabel>,
    /// Most used move patterns, most used first.
    pub top_move_patterns: Vec<(String, PatternStats)>,
}

impl fmt::Display for LearningStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Games played:       {}", self.games_played)?;
        writeln!(f, "Win rate vs human:  {:.1}%", self.win_rate_vs_human * 100.0)?;
        writeln!(f, "Win rate vs AI:     {:.1}%", self.win_rate_vs_ai * 100.0)?;
        writeln!(f, "Move patterns:      {}", self.move_patterns)?;
        writeln!(f, "Position patterns:  {}", self.position_patterns)?;
        writeln!(f, "Recent games:       {}", self.recent_games)?;
        let labels: Vec<&str> = self.preferred_strategies.iter().map(|s| s.as_str()).collect();
        writeln!(f, "Preferred styles:   {}", labels.join(", "))?;
        for (key, stats) in &self.top_move_patterns {
            writeln!(
                f,
                "  {:<40} {:>5} uses  {:>5.1}%",
                key,
                stats.times_used,
                stats.success_rate * 100.0
            )?;
        }
        Ok(())
    }
}

/// Learning layer over a key-value store.
pub struct LearningService<S: KeyValueStore> {
    store: S,
    data: LearningData,
}

impl<S: KeyValueStore> LearningService<S> {
    /// Loads learned state from the store. Missing or unreadable state
    /// silently starts fresh.
    pub fn load(store: S) -> Self {
        let data = match store.get(STORAGE_KEY) {
            Ok(Some(text)) => match codec::decode(&text) {
                Ok(data) => data,
                Err(e) => {
                    warn!(error = %e, "discarding unreadable learning data");
                    LearningData::new()
                }
            },
            Ok(None) => LearningData::new(),
            Err(e) => {
                warn!(error = %e, "learning store unavailable, starting fresh");
                LearningData::new()
            }
        };
        debug!(games = data.games_played, "learning data loaded");
        LearningService { store, data }
    }

    pub fn data(&self) -> &LearningData {
        &self.data
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Writes the current state to the store.
    pub fn save(&mut self) -> Result<(), LearningError> {
        let text = codec::encode(&self.data)?;
        self.store.set(STORAGE_KEY, &text)?;
        Ok(())
    }

    /// Learns from a finished game the AI played as `ai_color`.
    ///
    /// Updates move and position patterns for the AI's moves, appends the
    /// game to the recent buffer and persists.
    pub fn analyze_game(
        &mut self,
        state: &GameState,
        ai_color: Color,
        opponent: Opponent,
    ) -> Result<GameRecord, LearningError> {
        let outcome = Outcome::for_color(state.winner(), ai_color);
        let score = outcome.score();
        let moves = state.move_history();

        self.data.games_played += 1;
        let hashes = state.hashes_before_moves();
        for (ply, (m, hash)) in moves.iter().zip(hashes).enumerate() {
            if m.piece().color != ai_color {
                continue;
            }
            self.data.record_move(m, ply, score);
            self.data.record_position(hash, m, score);
        }
        let evicted = self.data.evict_positions();

        let strategy = classify_moves(moves, ai_color);
        let record = GameRecord::new(opponent, outcome, moves.len() as u32, strategy);
        self.data.push_game(record.clone());

        info!(
            ?opponent,
            ?outcome,
            plies = moves.len(),
            %strategy,
            evicted,
            "analyzed game"
        );
        self.save()?;
        Ok(record)
    }

    /// Records self-play games that have no move lists. Each counts as an
    /// AI-vs-AI game seen from White.
    pub fn ingest_training_games(&mut self, games: &[TrainingSummary]) -> Result<(), LearningError> {
        if games.is_empty() {
            return Ok(());
        }
        for game in games {
            let outcome = Outcome::for_color(game.result.winner(), Color::White);
            let strategy = classify_summary(game.plies, outcome);
            self.data.games_played += 1;
            self.data
                .push_game(GameRecord::new(Opponent::Ai, outcome, game.plies, strategy));
        }
        info!(games = games.len(), total = self.data.games_played, "ingested training games");
        self.save()
    }

    pub fn stats(&self) -> LearningStats {
        let mut top: Vec<(String, PatternStats)> = self
            .data
            .move_patterns
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        top.sort_by(|a, b| b.1.times_used.cmp(&a.1.times_used).then(a.0.cmp(&b.0)));
        top.truncate(5);

        LearningStats {
            games_played: self.data.games_played,
            win_rate_vs_human: self.data.win_rate_vs_human,
            win_rate_vs_ai: self.data.win_rate_vs_ai,
            move_patterns: self.data.move_patterns.len(),
            position_patterns: self.data.position_patterns.len(),
            recent_games: self.data.recent_games.len(),
            preferred_strategies: self.data.preferred_strategies.clone(),
            top_move_patterns: top,
        }
    }

    /// Clears all learned state and the persisted record.
    pub fn reset(&mut self) -> Result<(), LearningError> {
        self.store.remove(STORAGE_KEY)?;
        self.data = LearningData::new();
        info!("learning data reset");
        Ok(())
    }

    /// Serializes the full learning state.
    pub fn export(&self) -> Result<String, LearningError> {
        Ok(codec::encode(&self.data)?)
    }

    /// Replaces the learning state with an exported blob and persists it.
    /// Returns false, leaving the state untouched, if the blob is invalid.
    pub fn import(&mut self, blob: &str) -> bool {
        let data = match codec::decode(blob) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "rejected learning data import");
                return false;
            }
        };
        let previous = std::mem::replace(&mut self.data, data);
        if let Err(e) = self.save() {
            warn!(error = %e, "could not persist imported learning data");
            self.data = previous;
            return false;
        }
        info!(games = self.data.games_played, "imported learning data");
        true
    }

    /// Suggests the next difficulty from recent results against humans.
    pub fn suggested_difficulty(&self, current: Difficulty) -> Difficulty {
        if self.data.recent_count(Opponent::Human) < MIN_GAMES_FOR_ADJUSTMENT {
            return current;
        }
        let rate = self.data.win_rate_vs_human;
        if rate < STEP_UP_BELOW {
            current.harder()
        } else if rate > STEP_DOWN_ABOVE {
            current.easier()
        } else {
            current
        }
    }
}
