//! Mass self-play training.
//!
//! [`MassTrainer`] plays a batch of games between weighted-random strategy
//! pairings, reports progress after each game and aggregates the results.
//! A game that fails is logged and skipped; the run carries on.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info};
use wizard_ai::AiPlayer;
use wizard_core::Color;
use wizard_engine::GameResult;
use wizard_learning::TrainingSummary;

use crate::config::{ConfigError, StrategyConfig, TrainingConfig};
use crate::trainer::{GameRunner, MoveSource, TrainingGame};

/// Builds the move source for one side of one game.
pub type PlayerFactory =
    Box<dyn FnMut(&StrategyConfig, &mut StdRng) -> Box<dyn MoveSource> + Send>;

/// Snapshot passed to the progress callback after every attempted game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: u32,
    pub total: u32,
    pub white_wins: u32,
    pub black_wins: u32,
    pub draws: u32,
}

/// Results of one strategy across a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrategyRecord {
    pub games: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

impl StrategyRecord {
    fn record(&mut self, score: f64) {
        self.games += 1;
        if score >= 1.0 {
            self.wins += 1;
        } else if score > 0.0 {
            self.draws += 1;
        } else {
            self.losses += 1;
        }
    }
}

/// Aggregate statistics for a training run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingStats {
    pub games_played: u32,
    pub white_wins: u32,
    pub black_wins: u32,
    pub draws: u32,
    pub failed_games: u32,
    pub total_plies: u64,
    pub average_length: f64,
    pub strategies: BTreeMap<String, StrategyRecord>,
    /// Whether the run stopped early on the cancellation flag.
    pub cancelled: bool,
}

impl TrainingStats {
    fn record(&mut self, game: &TrainingGame) {
        self.games_played += 1;
        self.total_plies += u64::from(game.plies());
        match game.result {
            GameResult::WhiteWins => self.white_wins += 1,
            GameResult::BlackWins => self.black_wins += 1,
            GameResult::Draw(_) => self.draws += 1,
        }
        self.average_length = self.total_plies as f64 / f64::from(self.games_played);

        let white_score = game.result.score_for(Color::White);
        self.strategies
            .entry(game.white.clone())
            .or_default()
            .record(white_score);
        self.strategies
            .entry(game.black.clone())
            .or_default()
            .record(1.0 - white_score);
    }

    /// Wins credited to a strategy name, either color.
    pub fn wins_for(&self, strategy: &str) -> u32 {
        self.strategies.get(strategy).map_or(0, |r| r.wins)
    }
}

impl fmt::Display for TrainingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Games played:    {}", self.games_played)?;
        writeln!(f, "White wins:      {}", self.white_wins)?;
        writeln!(f, "Black wins:      {}", self.black_wins)?;
        writeln!(f, "Draws:           {}", self.draws)?;
        writeln!(f, "Failed games:    {}", self.failed_games)?;
        writeln!(f, "Average length:  {:.1} plies", self.average_length)?;
        if self.cancelled {
            writeln!(f, "(cancelled)")?;
        }
        for (name, r) in &self.strategies {
            writeln!(
                f,
                "  {:<12} {:>4} games  +{} ={} -{}",
                name, r.games, r.wins, r.draws, r.losses
            )?;
        }
        Ok(())
    }
}

/// The games and statistics of a finished run.
#[derive(Debug, Clone, Default)]
pub struct TrainingRun {
    pub stats: TrainingStats,
    pub games: Vec<TrainingGame>,
}

impl TrainingRun {
    /// Summaries for bulk ingestion by the learning layer.
    pub fn summaries(&self) -> Vec<TrainingSummary> {
        self.games
            .iter()
            .map(|g| TrainingSummary {
                result: g.result,
                plies: g.plies(),
            })
            .collect()
    }
}

/// Runs batches of self-play games.
pub struct MassTrainer {
    config: TrainingConfig,
    rng: StdRng,
    factory: PlayerFactory,
}

impl MassTrainer {
    /// Creates a trainer with AI players seeded from the trainer's RNG.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the configuration cannot drive a run.
    pub fn new(config: TrainingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(MassTrainer {
            config,
            rng,
            factory: Box::new(
                |strategy: &StrategyConfig, rng: &mut StdRng| -> Box<dyn MoveSource> {
                    Box::new(AiPlayer::seeded(strategy.difficulty, rng.gen()))
                },
            ),
        })
    }

    /// Replaces how players are built for each game.
    pub fn with_factory(mut self, factory: PlayerFactory) -> Self {
        self.factory = factory;
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Plays up to `count` games.
    ///
    /// `on_progress` runs after every attempted game, failed ones included.
    /// `cancel` is checked between games.
    pub fn run(
        &mut self,
        count: u32,
        mut on_progress: impl FnMut(&Progress),
        cancel: &AtomicBool,
    ) -> TrainingRun {
        let mut run = TrainingRun::default();
        info!(games = count, "starting training run");

        for index in 0..count {
            if cancel.load(Ordering::SeqCst) {
                info!(completed = index, "training run cancelled");
                run.stats.cancelled = true;
                break;
            }

            let white = self.pick_strategy().clone();
            let black = self.pick_strategy().clone();
            let mut white_player = (self.factory)(&white, &mut self.rng);
            let mut black_player = (self.factory)(&black, &mut self.rng);

            let runner = GameRunner::new(&self.config);
            match runner.play_game(
                &white.name,
                white_player.as_mut(),
                &black.name,
                black_player.as_mut(),
            ) {
                Ok(game) => {
                    debug!(
                        game = index + 1,
                        white = %game.white,
                        black = %game.black,
                        result = %game.result,
                        termination = %game.termination,
                        plies = game.plies(),
                        "training game finished"
                    );
                    run.stats.record(&game);
                    run.games.push(game);
                }
                Err(e) => {
                    error!(game = index + 1, white = %white.name, black = %black.name, error = %e, "training game failed");
                    run.stats.failed_games += 1;
                }
            }

            on_progress(&Progress {
                completed: index + 1,
                total: count,
                white_wins: run.stats.white_wins,
                black_wins: run.stats.black_wins,
                draws: run.stats.draws,
            });
        }

        info!(
            played = run.stats.games_played,
            failed = run.stats.failed_games,
            average_length = run.stats.average_length,
            "training run finished"
        );
        run
    }

    /// Weighted random strategy. Zero-weight entries are never picked.
    fn pick_strategy(&mut self) -> &StrategyConfig {
        let strategies = &self.config.strategies;
        let total_weight: u64 = strategies.iter().map(|s| u64::from(s.weight)).sum();
        let mut choice = self.rng.gen_range(0..total_weight);
        for strategy in strategies {
            let weight = u64::from(strategy.weight);
            if choice < weight {
                return strategy;
            }
            choice -= weight;
        }
        &strategies[strategies.len() - 1]
    }
}
