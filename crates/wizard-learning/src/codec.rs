//! Text encoding of [`LearningData`].
//!
//! The record is JSON. Maps are written as key-sorted lists of pairs so the
//! output is stable, and a version field guards against incompatible blobs.
//! Decoding validates what it reads; a blob that fails any check is
//! rejected whole.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::{GameRecord, LearningData, PatternStats, PositionPattern, RECENT_GAMES_CAPACITY};
use crate::strategy::StrategyLabel;

/// Current record version.
pub const FORMAT_VERSION: u32 = 1;

/// Errors from decoding a learning record.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported record version {0}")]
    UnsupportedVersion(u32),
    #[error("rate out of range for {key}: {value}")]
    RateOutOfRange { key: String, value: f64 },
    #[error("duplicate key {0}")]
    DuplicateKey(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct Record {
    version: u32,
    games_played: u64,
    move_patterns: Vec<(String, PatternStats)>,
    position_patterns: Vec<(String, PositionPattern)>,
    recent_games: Vec<GameRecord>,
    win_rate_vs_human: f64,
    win_rate_vs_ai: f64,
    preferred_strategies: Vec<StrategyLabel>,
}

/// Encodes learning data as a JSON string.
pub fn encode(data: &LearningData) -> Result<String, CodecError> {
    let record = Record {
        version: FORMAT_VERSION,
        games_played: data.games_played,
        move_patterns: sorted_pairs(&data.move_patterns),
        position_patterns: sorted_pairs(&data.position_patterns),
        recent_games: data.recent_games.iter().cloned().collect(),
        win_rate_vs_human: data.win_rate_vs_human,
        win_rate_vs_ai: data.win_rate_vs_ai,
        preferred_strategies: data.preferred_strategies.clone(),
    };
    Ok(serde_json::to_string(&record)?)
}

/// Decodes and validates learning data.
pub fn decode(text: &str) -> Result<LearningData, CodecError> {
    let record: Record = serde_json::from_str(text)?;
    if record.version != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion(record.version));
    }

    check_rate("win_rate_vs_human", record.win_rate_vs_human)?;
    check_rate("win_rate_vs_ai", record.win_rate_vs_ai)?;
    for (key, stats) in &record.move_patterns {
        check_rate(key, stats.success_rate)?;
    }
    for (key, pattern) in &record.position_patterns {
        check_rate(key, pattern.success_rate)?;
    }

    let mut recent_games: VecDeque<GameRecord> = record.recent_games.into();
    while recent_games.len() > RECENT_GAMES_CAPACITY {
        recent_games.pop_front();
    }

    let mut data = LearningData {
        games_played: record.games_played,
        move_patterns: into_map(record.move_patterns)?,
        position_patterns: into_map(record.position_patterns)?,
        recent_games,
        win_rate_vs_human: record.win_rate_vs_human,
        win_rate_vs_ai: record.win_rate_vs_ai,
        preferred_strategies: record.preferred_strategies,
    };
    data.evict_positions();
    Ok(data)
}

fn sorted_pairs<V: Clone>(map: &HashMap<String, V>) -> Vec<(String, V)> {
    let mut pairs: Vec<(String, V)> = map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    pairs
}

fn into_map<V>(pairs: Vec<(String, V)>) -> Result<HashMap<String, V>, CodecError> {
    let mut map = HashMap::with_capacity(pairs.len());
    for (key, value) in pairs {
        if map.contains_key(&key) {
            return Err(CodecError::DuplicateKey(key));
        }
        map.insert(key, value);
    }
    Ok(map)
}

fn check_rate(key: &str, value: f64) -> Result<(), CodecError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(CodecError::RateOutOfRange {
            key: key.to_string(),
            value,
        })
    }
}
