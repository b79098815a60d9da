//! Wizard chess rules.

use wizard_core::{Color, Move};

use super::{DrawReason, GameResult, RuleSet};
use crate::movegen::{generate_moves, has_legal_move, is_king_attacked, make_move};
use crate::{Board, MoveList};

/// 10x10 chess with wizards.
///
/// - Wizards teleport to any empty square up to two steps away in a compass
///   direction, or strike the first enemy in range without moving
/// - Castling moves the king three columns, rook lands beside it
/// - Pawns promote to queens; there is no en passant
/// - Checkmate wins, stalemate draws
#[derive(Debug, Clone, Copy, Default)]
pub struct WizardChess;

impl RuleSet for WizardChess {
    fn initial_board(&self) -> Board {
        Board::initial()
    }

    fn generate_moves(&self, board: &Board, side: Color) -> MoveList {
        generate_moves(board, side)
    }

    fn make_move(&self, board: &Board, m: &Move) -> Board {
        make_move(board, m)
    }

    fn is_check(&self, board: &Board, side: Color) -> bool {
        is_king_attacked(board, side)
    }

    fn game_result(&self, board: &Board, side: Color) -> Option<GameResult> {
        if has_legal_move(board, side) {
            return None;
        }
        if self.is_check(board, side) {
            Some(GameResult::win_for(side.opposite()))
        } else {
            Some(GameResult::Draw(DrawReason::Stalemate))
        }
    }
}
