//! Learning and adaptation for the wizard chess AI.
//!
//! Finished games update:
//! - move patterns keyed by piece, phase, capture and move type
//! - position patterns keyed by board hash, bounded with LRU-style eviction
//! - a ring buffer of recent games, from which win rates and preferred
//!   strategy labels are derived
//!
//! State is persisted as one text record in a [`KeyValueStore`]. Unreadable
//! state is discarded rather than reported to the caller.

pub mod codec;
mod data;
mod service;
mod store;
mod strategy;

pub use codec::CodecError;
pub use data::{
    move_pattern_key, position_key, GameRecord, LearningData, Opponent, Outcome, PatternStats,
    Phase, PositionPattern, POSITION_PATTERN_CAPACITY, RECENT_GAMES_CAPACITY, TOP_STRATEGIES,
};
pub use service::{
    LearningError, LearningService, LearningStats, TrainingSummary, MIN_GAMES_FOR_ADJUSTMENT,
    STORAGE_KEY,
};
pub use store::{KeyValueStore, MemoryStore, SqliteStore, StoreError};
pub use strategy::{classify_moves, classify_summary, StrategyLabel};
