//! Learned state and its update rules.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wizard_core::{Color, Move, MoveFlag};

use crate::strategy::StrategyLabel;

/// Recent games kept for win rates and strategy ranking.
pub const RECENT_GAMES_CAPACITY: usize = 100;
/// Position patterns kept before eviction.
pub const POSITION_PATTERN_CAPACITY: usize = 5_000;
/// Eviction trims the position table down to this size.
pub const POSITION_PATTERN_RETAIN: usize = POSITION_PATTERN_CAPACITY * 9 / 10;
/// Number of preferred strategies retained.
pub const TOP_STRATEGIES: usize = 5;

/// Plies below which a move counts as opening play.
const OPENING_PLIES: usize = 20;
/// Plies below which a move counts as middlegame play.
const MIDDLEGAME_PLIES: usize = 60;

/// Who the AI played against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opponent {
    Human,
    Ai,
}

/// A finished game from the AI's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    /// Outcome for `color` given the game's winner.
    pub fn for_color(winner: Option<Color>, color: Color) -> Self {
        match winner {
            Some(w) if w == color => Outcome::Win,
            Some(_) => Outcome::Loss,
            None => Outcome::Draw,
        }
    }

    /// Win 1, draw 0.5, loss 0.
    pub const fn score(self) -> f64 {
        match self {
            Outcome::Win => 1.0,
            Outcome::Draw => 0.5,
            Outcome::Loss => 0.0,
        }
    }
}

/// Game phase bucket for move patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Opening,
    Middlegame,
    Endgame,
}

impl Phase {
    pub const fn from_ply(ply: usize) -> Self {
        if ply < OPENING_PLIES {
            Phase::Opening
        } else if ply < MIDDLEGAME_PLIES {
            Phase::Middlegame
        } else {
            Phase::Endgame
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Opening => "opening",
            Phase::Middlegame => "middlegame",
            Phase::Endgame => "endgame",
        }
    }
}

/// Key for a move pattern: piece, phase, capture and move type.
///
/// For example `wizard_opening_quiet_teleport`.
pub fn move_pattern_key(m: &Move, ply: usize) -> String {
    let capture = if m.is_capture() { "capture" } else { "quiet" };
    let kind = match m.flag() {
        MoveFlag::WizardTeleport => "teleport",
        MoveFlag::WizardAttack => "attack",
        MoveFlag::Normal | MoveFlag::Castling => "normal",
    };
    format!(
        "{}_{}_{}_{}",
        m.piece().kind.name(),
        Phase::from_ply(ply).as_str(),
        capture,
        kind
    )
}

/// Key for a position pattern: the board hash as 16 hex digits.
pub fn position_key(hash: u64) -> String {
    format!("{:016x}", hash)
}

/// Running success average for a move pattern.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PatternStats {
    pub success_rate: f64,
    pub times_used: u32,
}

impl PatternStats {
    /// Folds one more outcome score into the running average.
    pub fn record(&mut self, score: f64) {
        let n = self.times_used as f64;
        self.success_rate = (self.success_rate * n + score) / (n + 1.0);
        self.times_used += 1;
    }
}

/// What was played from a position and how it turned out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionPattern {
    /// Move notation of the most successful move seen here.
    pub best_move: String,
    pub success_rate: f64,
    pub times_seen: u32,
    /// Value of the games-played counter when last updated.
    pub last_seen: u64,
}

impl PositionPattern {
    fn new(best_move: String) -> Self {
        PositionPattern {
            best_move,
            success_rate: 0.0,
            times_seen: 0,
            last_seen: 0,
        }
    }

    /// Folds an outcome into the average. A move that scored at least as
    /// well as the running average becomes the recommended move.
    pub fn record(&mut self, played: &str, score: f64, game_index: u64) {
        if self.times_seen == 0 || score >= self.success_rate {
            self.best_move = played.to_string();
        }
        let n = self.times_seen as f64;
        self.success_rate = (self.success_rate * n + score) / (n + 1.0);
        self.times_seen += 1;
        self.last_seen = game_index;
    }
}

/// Summary of one finished game in the recent-games buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: Uuid,
    pub opponent: Opponent,
    pub outcome: Outcome,
    pub move_count: u32,
    pub strategy: StrategyLabel,
    pub played_at: DateTime<Utc>,
}

impl GameRecord {
    pub fn new(opponent: Opponent, outcome: Outcome, move_count: u32, strategy: StrategyLabel) -> Self {
        GameRecord {
            id: Uuid::new_v4(),
            opponent,
            outcome,
            move_count,
            strategy,
            played_at: Utc::now(),
        }
    }
}

/// Everything the learning layer knows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LearningData {
    pub games_played: u64,
    pub move_patterns: HashMap<String, PatternStats>,
    pub position_patterns: HashMap<String, PositionPattern>,
    pub recent_games: VecDeque<GameRecord>,
    pub win_rate_vs_human: f64,
    pub win_rate_vs_ai: f64,
    pub preferred_strategies: Vec<StrategyLabel>,
}

impl LearningData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the pattern for a move played at the given ply.
    pub fn record_move(&mut self, m: &Move, ply: usize, score: f64) {
        self.move_patterns
            .entry(move_pattern_key(m, ply))
            .or_default()
            .record(score);
    }

    /// Updates the pattern for the position a move was played from.
    pub fn record_position(&mut self, hash: u64, m: &Move, score: f64) {
        let played = m.to_notation();
        let game_index = self.games_played;
        self.position_patterns
            .entry(position_key(hash))
            .or_insert_with(|| PositionPattern::new(played.clone()))
            .record(&played, score, game_index);
    }

    /// Adds a finished game to the ring buffer, dropping the oldest when full,
    /// and refreshes the derived fields.
    pub fn push_game(&mut self, record: GameRecord) {
        if self.recent_games.len() == RECENT_GAMES_CAPACITY {
            self.recent_games.pop_front();
        }
        self.recent_games.push_back(record);
        self.refresh_derived();
    }

    /// Recomputes win rates and preferred strategies from the ring buffer.
    pub fn refresh_derived(&mut self) {
        self.win_rate_vs_human = self.win_rate(Opponent::Human);
        self.win_rate_vs_ai = self.win_rate(Opponent::Ai);

        let mut counts: HashMap<StrategyLabel, usize> = HashMap::new();
        for game in &self.recent_games {
            *counts.entry(game.strategy).or_default() += 1;
        }
        let mut ranked: Vec<(StrategyLabel, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        self.preferred_strategies = ranked
            .into_iter()
            .take(TOP_STRATEGIES)
            .map(|(label, _)| label)
            .collect();
    }

    /// Fraction of recent games against `opponent` that the AI won.
    pub fn win_rate(&self, opponent: Opponent) -> f64 {
        let (games, wins) = self
            .recent_games
            .iter()
            .filter(|g| g.opponent == opponent)
            .fold((0usize, 0usize), |(games, wins), g| {
                (games + 1, wins + usize::from(g.outcome == Outcome::Win))
            });
        if games == 0 {
            0.0
        } else {
            wins as f64 / games as f64
        }
    }

    /// Number of recent games against `opponent`.
    pub fn recent_count(&self, opponent: Opponent) -> usize {
        self.recent_games.iter().filter(|g| g.opponent == opponent).count()
    }

    /// Evicts the least recently seen position patterns once the table
    /// exceeds its capacity. Ties go to the least seen. Returns the number
    /// of evicted entries.
    pub fn evict_positions(&mut self) -> usize {
        if self.position_patterns.len() <= POSITION_PATTERN_CAPACITY {
            return 0;
        }
        let mut ranked: Vec<(u64, u32, String)> = self
            .position_patterns
            .iter()
            .map(|(key, p)| (p.last_seen, p.times_seen, key.clone()))
            .collect();
        ranked.sort();
        let excess = self.position_patterns.len() - POSITION_PATTERN_RETAIN;
        for (_, _, key) in ranked.into_iter().take(excess) {
            self.position_patterns.remove(&key);
        }
        excess
    }
}
