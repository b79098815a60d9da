//! Rules engine for 10x10 wizard chess.
//!
//! This crate provides:
//! - [`Board`] - 10x10 grid of owned pieces with text notation support
//! - Move generation with the wizard and castling special cases, filtered so
//!   the mover's king is never left attacked
//! - [`RuleSet`] and [`WizardChess`] - terminal detection
//! - [`Game`] and [`GameState`] - the `Menu -> Playing -> Ended` state machine
//! - Zobrist board hashing and perft
//!
//! # Example
//!
//! ```
//! use wizard_engine::{Game, GameMode, GamePhase};
//! use wizard_core::{Difficulty, Position};
//!
//! let mut game = Game::new();
//! game.start_game(GameMode::HumanVsHuman, Difficulty::Medium);
//! let d1 = Position::from_algebraic("d1").unwrap();
//! let d3 = Position::from_algebraic("d3").unwrap();
//! let m = game.make_player_move(d1, d3).unwrap();
//! assert!(m.is_wizard_teleport());
//! assert_eq!(game.phase(), GamePhase::Playing);
//! ```

mod board;
mod game;
pub mod movegen;
pub mod rules;
mod zobrist;

pub use board::{Board, BACK_RANK, KING_HOME_COL};
pub use game::{Game, GameError, GameMode, GamePhase, GameState, Selection};
pub use movegen::{
    apply_move_in_place, generate_moves, has_legal_move, is_king_attacked, is_square_attacked,
    legal_destinations, legal_moves_from, make_move, GenMode, MoveList,
};
pub use rules::{DrawReason, GameResult, RuleSet, WizardChess};
pub use zobrist::{ZobristKeys, ZOBRIST};
