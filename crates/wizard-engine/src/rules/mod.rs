//! Rule set abstraction.
//!
//! The [`Game`](crate::Game) state machine and the AI delegate everything
//! variant-specific to a [`RuleSet`]. [`WizardChess`] is the only rule set
//! shipped; the trait keeps search and self-play independent of it.

mod wizard;

pub use wizard::WizardChess;

use wizard_core::{Color, Move};

use crate::{Board, MoveList};

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameResult {
    /// White wins (checkmate or adjudication).
    WhiteWins,
    /// Black wins (checkmate or adjudication).
    BlackWins,
    /// Draw with a specific reason.
    Draw(DrawReason),
}

/// Reason for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawReason {
    /// No legal moves but not in check.
    Stalemate,
    /// Self-play hit its ply cap.
    MoveCap,
    /// The same board repeated for too many consecutive plies.
    Stuck,
}

impl GameResult {
    /// Result for a win by the given side.
    pub const fn win_for(color: Color) -> Self {
        match color {
            Color::White => GameResult::WhiteWins,
            Color::Black => GameResult::BlackWins,
        }
    }

    /// The winning side, if any.
    pub const fn winner(self) -> Option<Color> {
        match self {
            GameResult::WhiteWins => Some(Color::White),
            GameResult::BlackWins => Some(Color::Black),
            GameResult::Draw(_) => None,
        }
    }

    pub const fn is_draw(self) -> bool {
        matches!(self, GameResult::Draw(_))
    }

    /// Outcome score from one side's perspective: win 1, draw 0.5, loss 0.
    pub fn score_for(self, color: Color) -> f64 {
        match self.winner() {
            Some(winner) if winner == color => 1.0,
            Some(_) => 0.0,
            None => 0.5,
        }
    }
}

impl std::fmt::Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameResult::WhiteWins => write!(f, "1-0"),
            GameResult::BlackWins => write!(f, "0-1"),
            GameResult::Draw(_) => write!(f, "1/2-1/2"),
        }
    }
}

/// Trait for the rules a game is played under.
pub trait RuleSet {
    /// Returns the starting board.
    fn initial_board(&self) -> Board;

    /// Generates all legal moves for `side` on the board.
    fn generate_moves(&self, board: &Board, side: Color) -> MoveList;

    /// Returns true if the given move is legal for `side`.
    fn is_legal(&self, board: &Board, side: Color, m: &Move) -> bool {
        self.generate_moves(board, side).as_slice().contains(m)
    }

    /// Makes a move on the board, returning the new board.
    fn make_move(&self, board: &Board, m: &Move) -> Board;

    /// Attempts to make a move, returning `None` if illegal.
    fn try_make_move(&self, board: &Board, side: Color, m: &Move) -> Option<Board> {
        if self.is_legal(board, side, m) {
            Some(self.make_move(board, m))
        } else {
            None
        }
    }

    /// Returns true if `side`'s king is attacked.
    fn is_check(&self, board: &Board, side: Color) -> bool;

    /// Returns the result if `side`, about to move, has no legal moves.
    fn game_result(&self, board: &Board, side: Color) -> Option<GameResult>;

    /// Returns true if the game is over with `side` to move.
    fn is_game_over(&self, board: &Board, side: Color) -> bool {
        self.game_result(board, side).is_some()
    }
}
