//! Wizard Arena - self-play training and the session facade for wizard chess.
//!
//! # Modules
//!
//! - [`config`] - Training configuration loaded from TOML
//! - [`trainer`] - Single self-play game execution with early termination
//! - [`harness`] - Batches of self-play games with weighted strategy pairing
//! - [`session`] - The interactive game, AI and learning layer behind one API

pub mod config;
pub mod harness;
pub mod session;
pub mod trainer;

pub use config::{ConfigError, StrategyConfig, TrainingConfig};
pub use harness::{MassTrainer, PlayerFactory, Progress, StrategyRecord, TrainingRun, TrainingStats};
pub use session::Session;
pub use trainer::{GameRunner, MoveSource, Termination, TrainingError, TrainingGame};
