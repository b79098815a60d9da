//! One place for everything a front end drives: the interactive game, the
//! AI opponent, the learning layer and mass training.

use std::sync::atomic::AtomicBool;

use tracing::{info, warn};
use wizard_ai::AiPlayer;
use wizard_core::{Color, Difficulty, FenError, Move, Position};
use wizard_engine::{Game, GameError, GameMode, GamePhase, Selection};
use wizard_learning::{
    GameRecord, KeyValueStore, LearningError, LearningService, LearningStats, Opponent,
};

use crate::config::{ConfigError, TrainingConfig};
use crate::harness::{MassTrainer, Progress, TrainingStats};

/// A game session bound to a learning store.
pub struct Session<S: KeyValueStore> {
    game: Game,
    ai: AiPlayer,
    learning: LearningService<S>,
    trainer: MassTrainer,
    analyzed: bool,
}

impl<S: KeyValueStore> Session<S> {
    /// Opens a session over `store`. Unreadable learning state starts fresh.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the training configuration is unusable.
    pub fn new(store: S, config: TrainingConfig) -> Result<Self, ConfigError> {
        let ai = match config.seed {
            Some(seed) => AiPlayer::seeded(Difficulty::default(), seed),
            None => AiPlayer::new(Difficulty::default()),
        };
        Ok(Session {
            game: Game::new(),
            ai,
            learning: LearningService::load(store),
            trainer: MassTrainer::new(config)?,
            analyzed: false,
        })
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn config(&self) -> &TrainingConfig {
        self.trainer.config()
    }

    pub fn learning(&self) -> &LearningService<S> {
        &self.learning
    }

    /// Resets the board and starts a game in `mode`.
    pub fn start_game(&mut self, mode: GameMode, difficulty: Difficulty) {
        self.game.start_game(mode, difficulty);
        self.ai.set_difficulty(difficulty);
        self.analyzed = false;
        info!(?mode, %difficulty, "game started");
    }

    /// Starts a game from a board in text notation.
    pub fn start_from_fen(
        &mut self,
        fen: &str,
        mode: GameMode,
        difficulty: Difficulty,
    ) -> Result<(), FenError> {
        self.game = Game::from_fen(fen, mode, difficulty)?;
        self.ai.set_difficulty(difficulty);
        self.analyzed = false;
        Ok(())
    }

    pub fn select_square(&mut self, pos: Option<Position>) -> Selection {
        let selection = self.game.select_square(pos);
        if let Selection::Moved(_) = selection {
            self.after_move();
        }
        selection
    }

    pub fn apply_move(&mut self, m: Move) -> Result<(), GameError> {
        self.game.apply_move(m)?;
        self.after_move();
        Ok(())
    }

    pub fn make_player_move(&mut self, from: Position, to: Position) -> Result<Move, GameError> {
        let m = self.game.make_player_move(from, to)?;
        self.after_move();
        Ok(m)
    }

    pub fn undo(&mut self) -> Result<Move, GameError> {
        self.game.undo()
    }

    pub fn return_to_menu(&mut self) {
        self.game.return_to_menu();
    }

    /// The AI's choice for the side to move, or `None` if the game is over
    /// or has not started.
    pub fn get_ai_move(&mut self) -> Option<Move> {
        if self.game.phase() != GamePhase::Playing {
            return None;
        }
        let side = self.game.state().current_player();
        self.ai.choose_move(self.game.state(), side)
    }

    /// Plays the AI's move if it is the AI's turn.
    pub fn play_ai_turn(&mut self) -> Result<Option<Move>, GameError> {
        if !self.game.is_ai_turn() {
            return Ok(None);
        }
        match self.get_ai_move() {
            Some(m) => {
                self.apply_move(m)?;
                Ok(Some(m))
            }
            None => Ok(None),
        }
    }

    /// Feeds the current game to the learning layer.
    pub fn analyze_game(
        &mut self,
        ai_color: Color,
        opponent: Opponent,
    ) -> Result<GameRecord, LearningError> {
        let record = self
            .learning
            .analyze_game(self.game.state(), ai_color, opponent)?;
        self.analyzed = true;
        Ok(record)
    }

    pub fn learning_stats(&self) -> LearningStats {
        self.learning.stats()
    }

    pub fn reset_learning(&mut self) -> Result<(), LearningError> {
        self.learning.reset()
    }

    /// Difficulty the learning layer recommends for the next human game.
    pub fn suggested_difficulty(&self) -> Difficulty {
        self.learning.suggested_difficulty(self.game.difficulty())
    }

    /// Plays `count` self-play games and hands them to the learning layer.
    pub fn run_mass_training(
        &mut self,
        count: u32,
        on_progress: impl FnMut(&Progress),
        cancel: &AtomicBool,
    ) -> TrainingStats {
        let run = self.trainer.run(count, on_progress, cancel);
        if let Err(e) = self.learning.ingest_training_games(&run.summaries()) {
            warn!(error = %e, "could not persist training results");
        }
        run.stats
    }

    pub fn export_training_data(&self) -> Result<String, LearningError> {
        self.learning.export()
    }

    /// Replaces learned state with an exported blob. Returns false and keeps
    /// the current state if the blob is rejected.
    pub fn import_training_data(&mut self, blob: &str) -> bool {
        self.learning.import(blob)
    }

    /// Human-vs-AI games are learned from once, as soon as they end.
    fn after_move(&mut self) {
        if self.analyzed || self.game.phase() != GamePhase::Ended {
            return;
        }
        if let GameMode::HumanVsAi { ai_color } = self.game.mode() {
            if let Err(e) = self.analyze_game(ai_color, Opponent::Human) {
                warn!(error = %e, "could not record finished game");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wizard_learning::MemoryStore;

    fn session() -> Session<MemoryStore> {
        let config = TrainingConfig {
            max_plies: 6,
            seed: Some(3),
            strategies: vec![crate::config::StrategyConfig::new(
                "Apprentice",
                Difficulty::Easy,
                1,
            )],
            ..TrainingConfig::default()
        };
        Session::new(MemoryStore::default(), config).unwrap()
    }

    #[test]
    fn starts_in_menu() {
        let mut s = session();
        assert_eq!(s.game().phase(), GamePhase::Menu);
        assert_eq!(s.get_ai_move(), None);
        s.start_game(GameMode::HumanVsHuman, Difficulty::Easy);
        assert_eq!(s.game().phase(), GamePhase::Playing);
    }

    #[test]
    fn ai_answers_the_human() {
        let mut s = session();
        s.start_game(
            GameMode::HumanVsAi {
                ai_color: Color::Black,
            },
            Difficulty::Easy,
        );
        assert_eq!(s.play_ai_turn().unwrap(), None);
        s.make_player_move(Position::at(8, 4), Position::at(6, 4))
            .unwrap();
        let reply = s.play_ai_turn().unwrap();
        assert!(reply.is_some());
        assert_eq!(s.game().state().ply_count(), 2);
    }

    #[test]
    fn finished_human_game_is_learned_once() {
        let mut s = session();
        s.start_from_fen(
            "k9/10/10/10/10/r9/10/10/4PPP3/5K4 b",
            GameMode::HumanVsAi {
                ai_color: Color::White,
            },
            Difficulty::Medium,
        )
        .unwrap();
        // a5-a1 mates the AI.
        s.make_player_move(Position::at(5, 0), Position::at(9, 0))
            .unwrap();
        assert_eq!(s.game().phase(), GamePhase::Ended);
        let stats = s.learning_stats();
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.win_rate_vs_human, 0.0);
        assert!(s.make_player_move(Position::at(0, 0), Position::at(1, 0)).is_err());
        assert_eq!(s.learning_stats().games_played, 1);
    }

    #[test]
    fn mass_training_feeds_learning() {
        let mut s = session();
        let mut calls = 0;
        let stats = s.run_mass_training(2, |_| calls += 1, &AtomicBool::new(false));
        assert_eq!(calls, 2);
        assert_eq!(stats.games_played, 2);
        assert_eq!(s.learning_stats().games_played, 2);
        assert_eq!(s.learning_stats().recent_games, 2);
    }

    #[test]
    fn zero_training_games_changes_nothing() {
        let mut s = session();
        let mut calls = 0;
        let stats = s.run_mass_training(0, |_| calls += 1, &AtomicBool::new(false));
        assert_eq!(calls, 0);
        assert_eq!(stats, TrainingStats::default());
        assert_eq!(s.learning_stats().games_played, 0);
    }

    #[test]
    fn export_import_and_reset() {
        let mut s = session();
        s.run_mass_training(1, |_| {}, &AtomicBool::new(false));
        let blob = s.export_training_data().unwrap();

        let mut other = session();
        assert!(other.import_training_data(&blob));
        assert_eq!(other.learning_stats(), s.learning_stats());

        assert!(!other.import_training_data("not a record"));
        assert_eq!(other.learning_stats(), s.learning_stats());

        other.reset_learning().unwrap();
        assert_eq!(other.learning_stats().games_played, 0);
    }
}
