//! Core types for wizard chess.
//!
//! This crate provides the fundamental types used across the workspace:
//! - [`Piece`], [`PieceKind`] and [`Color`] for piece representation
//! - [`Position`] for coordinates on the 10x10 board
//! - [`Move`] for recorded moves, including wizard and castling metadata
//! - [`Difficulty`] labels shared by the game and the AI
//! - Board text notation parsing

mod color;
mod difficulty;
mod fen;
mod mov;
mod piece;
mod position;

pub use color::Color;
pub use difficulty::{Difficulty, ParseDifficultyError};
pub use fen::{FenError, FenParser, FenRank};
pub use mov::{Move, MoveFlag, NotationError, RookMove};
pub use piece::{Piece, PieceId, PieceKind};
pub use position::{Position, BOARD_SIZE};
