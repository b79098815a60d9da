//! Single self-play game execution.
//!
//! [`GameRunner`] drives one game between two [`MoveSource`]s on the normal
//! game state machine, and ends games early that would otherwise drag on:
//! a ply cap, a stuck detector and material adjudication.

use std::collections::HashSet;
use std::fmt;

use rand::Rng;
use thiserror::Error;
use tracing::trace;
use wizard_ai::{material, AiPlayer};
use wizard_core::{Color, Move};
use wizard_engine::{Board, DrawReason, GameError, GameResult, GameState};

use crate::config::TrainingConfig;

/// Errors that can occur during a self-play game.
#[derive(Error, Debug)]
pub enum TrainingError {
    /// A player proposed a move the rules reject.
    #[error("{side} played {notation} at ply {ply}: {source}")]
    IllegalMove {
        side: Color,
        notation: String,
        ply: usize,
        #[source]
        source: GameError,
    },
    /// A player returned nothing in a position that still has moves.
    #[error("{side} produced no move at ply {ply}")]
    NoMove { side: Color, ply: usize },
}

/// Anything that can pick moves for one side.
pub trait MoveSource {
    fn choose_move(&mut self, state: &GameState, color: Color) -> Option<Move>;
}

impl<R: Rng> MoveSource for AiPlayer<R> {
    fn choose_move(&mut self, state: &GameState, color: Color) -> Option<Move> {
        AiPlayer::choose_move(self, state, color)
    }
}

/// Why a self-play game stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Termination {
    Checkmate,
    Stalemate,
    MoveCap,
    Stuck,
    MaterialAdjudication,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Termination::Checkmate => "checkmate",
            Termination::Stalemate => "stalemate",
            Termination::MoveCap => "move cap",
            Termination::Stuck => "stuck",
            Termination::MaterialAdjudication => "material adjudication",
        };
        f.write_str(s)
    }
}

/// A finished self-play game.
#[derive(Debug, Clone)]
pub struct TrainingGame {
    pub white: String,
    pub black: String,
    pub result: GameResult,
    pub termination: Termination,
    pub moves: Vec<Move>,
}

impl TrainingGame {
    pub fn plies(&self) -> u32 {
        self.moves.len() as u32
    }
}

/// Executes self-play games under a training configuration.
pub struct GameRunner<'a> {
    config: &'a TrainingConfig,
}

impl<'a> GameRunner<'a> {
    pub fn new(config: &'a TrainingConfig) -> Self {
        GameRunner { config }
    }

    /// Plays one game from the initial position.
    pub fn play_game(
        &self,
        white_name: &str,
        white: &mut dyn MoveSource,
        black_name: &str,
        black: &mut dyn MoveSource,
    ) -> Result<TrainingGame, TrainingError> {
        self.play_from(GameState::playing(Board::initial(), Color::White), white_name, white, black_name, black)
    }

    /// Plays one game from the given state.
    pub fn play_from(
        &self,
        mut state: GameState,
        white_name: &str,
        white: &mut dyn MoveSource,
        black_name: &str,
        black: &mut dyn MoveSource,
    ) -> Result<TrainingGame, TrainingError> {
        let mut seen: HashSet<u64> = HashSet::new();
        seen.insert(state.hash());
        let mut repeated_plies = 0u32;

        let (result, termination) = loop {
            if let Some(result) = state.result() {
                let termination = if state.is_checkmate() {
                    Termination::Checkmate
                } else {
                    Termination::Stalemate
                };
                break (result, termination);
            }

            let ply = state.ply_count();
            if ply as u32 >= self.config.max_plies {
                break (GameResult::Draw(DrawReason::MoveCap), Termination::MoveCap);
            }
            if self.config.stuck_plies > 0 && repeated_plies >= self.config.stuck_plies {
                break (GameResult::Draw(DrawReason::Stuck), Termination::Stuck);
            }
            if ply as u32 > self.config.material_floor_plies {
                if let Some(leader) = self.material_leader(state.board()) {
                    break (GameResult::win_for(leader), Termination::MaterialAdjudication);
                }
            }

            let side = state.current_player();
            let player: &mut dyn MoveSource = match side {
                Color::White => &mut *white,
                Color::Black => &mut *black,
            };
            let m = player
                .choose_move(&state, side)
                .ok_or(TrainingError::NoMove { side, ply })?;
            state
                .apply_move(m)
                .map_err(|source| TrainingError::IllegalMove {
                    side,
                    notation: m.to_notation(),
                    ply,
                    source,
                })?;
            trace!(ply, side = %side, mv = %m, "self-play move");

            if seen.insert(state.hash()) {
                repeated_plies = 0;
            } else {
                repeated_plies += 1;
            }

            let interval = self.config.yield_interval;
            if interval > 0 && state.ply_count() as u32 % interval == 0 {
                std::thread::yield_now();
            }
        };

        Ok(TrainingGame {
            white: white_name.to_string(),
            black: black_name.to_string(),
            result,
            termination,
            moves: state.move_history().to_vec(),
        })
    }

    /// The side ahead by at least the adjudication threshold, if any.
    fn material_leader(&self, board: &Board) -> Option<Color> {
        let diff = material(board, Color::White) - material(board, Color::Black);
        if diff >= self.config.material_threshold {
            Some(Color::White)
        } else if -diff >= self.config.material_threshold {
            Some(Color::Black)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wizard_core::{Difficulty, Position};

    /// Plays the first legal move in generation order.
    struct FirstMove;

    impl MoveSource for FirstMove {
        fn choose_move(&mut self, state: &GameState, _: Color) -> Option<Move> {
            state.legal_moves().as_slice().first().copied()
        }
    }

    /// Shuffles a knight out and back.
    struct Shuffler {
        out: (Position, Position),
    }

    impl MoveSource for Shuffler {
        fn choose_move(&mut self, state: &GameState, _: Color) -> Option<Move> {
            let (a, b) = self.out;
            let from = if state.board().is_empty(a) { b } else { a };
            let to = if from == a { b } else { a };
            state
                .legal_moves()
                .as_slice()
                .iter()
                .copied()
                .find(|m| m.from() == from && m.to() == to)
        }
    }

    struct Silent;

    impl MoveSource for Silent {
        fn choose_move(&mut self, _: &GameState, _: Color) -> Option<Move> {
            None
        }
    }

    fn config(max_plies: u32) -> TrainingConfig {
        TrainingConfig {
            max_plies,
            yield_interval: 4,
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn move_cap_draws() {
        let config = TrainingConfig {
            stuck_plies: 0,
            ..config(10)
        };
        let runner = GameRunner::new(&config);
        let game = runner
            .play_game("a", &mut FirstMove, "b", &mut FirstMove)
            .unwrap();
        assert!(game.plies() <= 10);
        if game.termination == Termination::MoveCap {
            assert_eq!(game.plies(), 10);
            assert_eq!(game.result, GameResult::Draw(DrawReason::MoveCap));
        }
    }

    #[test]
    fn shuffling_is_stuck() {
        let config = config(80);
        let runner = GameRunner::new(&config);
        // Knights hop b1-c3 and b10-c8 back and forth.
        let mut white = Shuffler {
            out: (Position::at(9, 1), Position::at(7, 2)),
        };
        let mut black = Shuffler {
            out: (Position::at(0, 1), Position::at(2, 2)),
        };
        let game = runner.play_game("w", &mut white, "b", &mut black).unwrap();
        assert_eq!(game.termination, Termination::Stuck);
        assert_eq!(game.result, GameResult::Draw(DrawReason::Stuck));
        // Three fresh plies, then the start position returns and repeats.
        assert_eq!(game.plies(), 3 + config.stuck_plies);
    }

    #[test]
    fn material_lead_adjudicates() {
        let config = TrainingConfig {
            material_floor_plies: 0,
            ..config(80)
        };
        let board = Board::from_fen("10/10/10/10/4k5/10/10/10/10/QQ3K4 w").unwrap();
        let runner = GameRunner::new(&config);
        let state = GameState::playing(board, Color::White);
        let game = runner
            .play_from(state, "w", &mut FirstMove, "b", &mut FirstMove)
            .unwrap();
        assert_eq!(game.termination, Termination::MaterialAdjudication);
        assert_eq!(game.result, GameResult::WhiteWins);
        assert_eq!(game.plies(), 1);
    }

    #[test]
    fn checkmate_is_reported() {
        let config = config(80);
        let board = Board::from_fen("k9/10/10/10/10/10/10/10/4PPP3/r4K4 w").unwrap();
        let runner = GameRunner::new(&config);
        let state = GameState::playing(board, Color::White);
        let game = runner
            .play_from(state, "w", &mut FirstMove, "b", &mut FirstMove)
            .unwrap();
        assert_eq!(game.termination, Termination::Checkmate);
        assert_eq!(game.result, GameResult::BlackWins);
        assert_eq!(game.plies(), 0);
    }

    #[test]
    fn silent_player_is_an_error() {
        let config = config(80);
        let runner = GameRunner::new(&config);
        let err = runner
            .play_game("w", &mut Silent, "b", &mut FirstMove)
            .unwrap_err();
        assert!(matches!(err, TrainingError::NoMove { side: Color::White, ply: 0 }));
    }

    #[test]
    fn ai_players_finish_a_short_game() {
        let config = config(6);
        let runner = GameRunner::new(&config);
        let mut white = AiPlayer::seeded(Difficulty::Easy, 1);
        let mut black = AiPlayer::seeded(Difficulty::Easy, 2);
        let game = runner.play_game("w", &mut white, "b", &mut black).unwrap();
        assert!(game.plies() <= 6);
    }
}
