//! Move generation.
//!
//! Generation and check detection recurse into each other: legality needs
//! attack detection, and attack detection asks the enemy's pieces where they
//! can move. The recursion is cut by [`GenMode::Attacks`], which skips
//! castling and the legality filter.

mod pieces;
pub mod perft;

use wizard_core::{Color, Move, MoveFlag, PieceKind, Position};

use crate::board::Board;

pub use pieces::{CASTLE_KING_COLS, WIZARD_RANGE};

/// How far a generation pass goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenMode {
    /// Full rules: castling included, moves exposing the own king removed.
    Legal,
    /// Raw reach of each piece, used for attack detection.
    Attacks,
}

/// A list of generated moves.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct MoveList {
    moves: Vec<Move>,
}

impl MoveList {
    /// Creates an empty move list.
    #[inline]
    pub const fn new() -> Self {
        MoveList { moves: Vec::new() }
    }

    /// Adds a move to the list.
    #[inline]
    pub fn push(&mut self, m: Move) {
        self.moves.push(m);
    }

    /// Returns the number of moves.
    #[inline]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Returns true if the list is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Returns a slice of the moves.
    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }

    /// Clears the move list.
    #[inline]
    pub fn clear(&mut self) {
        self.moves.clear();
    }

    /// Retains only moves for which the predicate returns true.
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        self.moves.retain(f);
    }

    /// Appends all moves from another list.
    pub fn extend_from(&mut self, other: &MoveList) {
        self.moves.extend_from_slice(&other.moves);
    }

    /// Consumes the list, returning the underlying vector.
    pub fn into_vec(self) -> Vec<Move> {
        self.moves
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.moves[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Generates moves for the piece on `from`. Empty if the square is empty.
pub fn moves_from(board: &Board, from: Position, mode: GenMode) -> MoveList {
    let mut moves = MoveList::new();
    let Some(piece) = board.piece_at(from) else {
        return moves;
    };

    pieces::piece_moves(board, from, piece, mode, &mut moves);

    if mode == GenMode::Legal {
        let us = piece.color;
        moves.retain(|m| {
            let after = make_move(board, m);
            !is_king_attacked(&after, us)
        });
    }
    moves
}

/// Generates all legal moves for the piece on `from`.
#[inline]
pub fn legal_moves_from(board: &Board, from: Position) -> MoveList {
    moves_from(board, from, GenMode::Legal)
}

/// Returns the squares the piece on `from` can legally move to.
pub fn legal_destinations(board: &Board, from: Position) -> Vec<Position> {
    legal_moves_from(board, from)
        .as_slice()
        .iter()
        .map(Move::to)
        .collect()
}

/// Generates all legal moves for the given side.
pub fn generate_moves(board: &Board, color: Color) -> MoveList {
    let mut moves = MoveList::new();
    for (pos, _) in board.pieces(color) {
        moves.extend_from(&legal_moves_from(board, pos));
    }
    moves
}

/// Returns true if the given side has at least one legal move.
pub fn has_legal_move(board: &Board, color: Color) -> bool {
    board
        .pieces(color)
        .any(|(pos, _)| !legal_moves_from(board, pos).is_empty())
}

/// Returns true if any piece of color `by` can move onto `target`.
///
/// Enemy moves are generated in [`GenMode::Attacks`], so castling and the
/// legality filter are never consulted here.
pub fn is_square_attacked(board: &Board, target: Position, by: Color) -> bool {
    board.pieces(by).any(|(from, piece)| {
        if !pieces::may_reach(piece.kind, piece.color, from, target) {
            return false;
        }
        moves_from(board, from, GenMode::Attacks)
            .as_slice()
            .iter()
            .any(|m| m.to() == target)
    })
}

/// Returns true if the king of `color` is attacked. A board without that
/// king is never in check.
pub fn is_king_attacked(board: &Board, color: Color) -> bool {
    match board.king_position(color) {
        Some(king) => is_square_attacked(board, king, color.opposite()),
        None => false,
    }
}

/// Makes a move on a board, returning the resulting board.
///
/// The input board is not modified.
pub fn make_move(board: &Board, m: &Move) -> Board {
    let mut after = board.clone();
    apply_move_in_place(&mut after, m);
    after
}

/// Applies a move to a board in place.
///
/// The move is trusted to come from the generator for this board.
pub fn apply_move_in_place(board: &mut Board, m: &Move) {
    match m.flag() {
        MoveFlag::WizardAttack => {
            board.take(m.to());
            if let Some(wizard) = board.take(m.from()) {
                board.set(m.from(), Some(wizard.moved()));
            }
        }
        MoveFlag::Castling => {
            relocate(board, m.from(), m.to(), None);
            if let Some(rook) = m.rook_move() {
                relocate(board, rook.from, rook.to, None);
            }
        }
        MoveFlag::Normal | MoveFlag::WizardTeleport => {
            relocate(board, m.from(), m.to(), m.promotion());
        }
    }
}

fn relocate(board: &mut Board, from: Position, to: Position, promotion: Option<PieceKind>) {
    if let Some(mut piece) = board.take(from) {
        if let Some(kind) = promotion {
            piece.kind = kind;
        }
        board.set(to, Some(piece.moved()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wizard_core::FenParser;

    fn parse(fen: &str) -> Board {
        Board::from_fen(fen).unwrap()
    }

    fn destinations(board: &Board, row: u8, col: u8) -> Vec<Position> {
        let mut d = legal_destinations(board, Position::at(row, col));
        d.sort();
        d
    }

    #[test]
    fn startpos_move_count() {
        let board = Board::from_fen(FenParser::STARTPOS).unwrap();
        assert_eq!(generate_moves(&board, Color::White).len(), 30);
        assert_eq!(generate_moves(&board, Color::Black).len(), 30);
    }

    #[test]
    fn empty_square_has_no_moves() {
        let board = Board::initial();
        assert!(legal_moves_from(&board, Position::at(5, 5)).is_empty());
    }

    #[test]
    fn enclosed_wizard_has_no_moves() {
        // Every square within two steps of d1 is off the board or friendly.
        let mut enclosed = Board::empty();
        enclosed.place(Position::at(9, 3), PieceKind::Wizard, Color::White);
        for &(r, c) in &[
            (9, 2), (9, 1), (9, 4), (9, 5), (8, 2), (8, 3), (8, 4), (7, 1), (7, 3), (7, 5),
        ] {
            enclosed.place(Position::at(r, c), PieceKind::Pawn, Color::White);
        }
        assert!(legal_moves_from(&enclosed, Position::at(9, 3)).is_empty());

        enclosed.take(Position::at(8, 3));
        let d = destinations(&enclosed, 9, 3);
        assert_eq!(d, vec![Position::at(8, 3)]);
    }

    #[test]
    fn wizard_is_unblockable() {
        let mut board = Board::empty();
        board.place(Position::at(9, 0), PieceKind::King, Color::White);
        board.place(Position::at(0, 0), PieceKind::King, Color::Black);
        board.place(Position::at(5, 5), PieceKind::Wizard, Color::White);
        board.place(Position::at(4, 5), PieceKind::Pawn, Color::White);
        let d = destinations(&board, 5, 5);
        assert!(d.contains(&Position::at(3, 5)));
        assert!(!d.contains(&Position::at(4, 5)));
        assert_eq!(d.len(), 15);
    }

    #[test]
    fn wizard_attacks_first_enemy_only() {
        let mut board = Board::empty();
        board.place(Position::at(9, 0), PieceKind::King, Color::White);
        board.place(Position::at(0, 0), PieceKind::King, Color::Black);
        board.place(Position::at(5, 5), PieceKind::Wizard, Color::White);
        board.place(Position::at(4, 5), PieceKind::Pawn, Color::Black);
        board.place(Position::at(3, 5), PieceKind::Rook, Color::Black);
        board.place(Position::at(5, 6), PieceKind::Pawn, Color::White);
        board.place(Position::at(5, 7), PieceKind::Knight, Color::Black);

        let moves = legal_moves_from(&board, Position::at(5, 5));
        let attacks: Vec<Position> = moves
            .as_slice()
            .iter()
            .filter(|m| m.is_wizard_attack())
            .map(Move::to)
            .collect();
        assert!(attacks.contains(&Position::at(4, 5)));
        assert!(!attacks.contains(&Position::at(3, 5)));
        // Own piece at distance one does not block the enemy behind it.
        assert!(attacks.contains(&Position::at(5, 7)));
    }

    #[test]
    fn wizard_attack_keeps_wizard_in_place() {
        let mut board = Board::empty();
        let wizard = board.place(Position::at(5, 5), PieceKind::Wizard, Color::White);
        let victim = board.place(Position::at(3, 3), PieceKind::Bishop, Color::Black);
        let m = Move::wizard_attack(Position::at(5, 5), Position::at(3, 3), wizard, victim);
        let after = make_move(&board, &m);
        assert!(after.is_empty(Position::at(3, 3)));
        let stayed = after.piece_at(Position::at(5, 5)).unwrap();
        assert_eq!(stayed.kind, PieceKind::Wizard);
        assert!(stayed.has_moved);
    }

    #[test]
    fn wizard_teleport_never_captures() {
        let board = Board::initial();
        for m in &generate_moves(&board, Color::White) {
            if m.is_wizard_teleport() {
                assert!(m.captured().is_none());
                assert!(board.is_empty(m.to()));
            }
        }
    }

    #[test]
    fn pawn_double_step_only_from_start() {
        let board = Board::initial();
        assert_eq!(
            destinations(&board, 8, 4),
            vec![Position::at(6, 4), Position::at(7, 4)]
        );
        let moved = parse("4k5/10/10/10/10/10/4P5/10/10/5K4 w");
        assert_eq!(destinations(&moved, 6, 4), vec![Position::at(5, 4)]);
    }

    #[test]
    fn pawn_promotes_to_queen() {
        let board = parse("k9/2P7/10/10/10/10/10/10/10/5K4 w");
        let moves = legal_moves_from(&board, Position::at(1, 2));
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].promotion(), Some(PieceKind::Queen));
        let after = make_move(&board, &moves[0]);
        let queen = after.piece_at(Position::at(0, 2)).unwrap();
        assert_eq!(queen.kind, PieceKind::Queen);
        assert_eq!(queen.color, Color::White);
        assert_eq!(queen.id, board.piece_at(Position::at(1, 2)).unwrap().id);
    }

    #[test]
    fn castling_queenside() {
        let board = parse("r4k3r/10/10/10/10/10/10/10/10/R4K3R w");
        let king_moves = legal_moves_from(&board, Position::at(9, 5));
        let castles: Vec<&Move> = king_moves.as_slice().iter().filter(|m| m.is_castling()).collect();
        assert_eq!(castles.len(), 2);

        let long = castles
            .iter()
            .find(|m| m.to() == Position::at(9, 2))
            .unwrap();
        let rook = long.rook_move().unwrap();
        assert_eq!(rook.from, Position::at(9, 0));
        assert_eq!(rook.to, Position::at(9, 3));

        let after = make_move(&board, long);
        assert_eq!(after.piece_at(Position::at(9, 2)).unwrap().kind, PieceKind::King);
        assert_eq!(after.piece_at(Position::at(9, 3)).unwrap().kind, PieceKind::Rook);
        assert!(after.is_empty(Position::at(9, 0)));
        assert!(after.is_empty(Position::at(9, 5)));

        let short = castles
            .iter()
            .find(|m| m.to() == Position::at(9, 8))
            .unwrap();
        assert_eq!(short.rook_move().unwrap().to, Position::at(9, 7));
    }

    #[test]
    fn castling_requires_every_precondition() {
        // Blocked path.
        let blocked = parse("5k4/10/10/10/10/10/10/10/10/RN3K4 w");
        assert!(!legal_moves_from(&blocked, Position::at(9, 5))
            .as_slice()
            .iter()
            .any(Move::is_castling));

        // Moved rook.
        let mut moved_rook = parse("5k4/10/10/10/10/10/10/10/10/R4K4 w");
        let rook = moved_rook.take(Position::at(9, 0)).unwrap();
        moved_rook.set(Position::at(9, 0), Some(rook.moved()));
        assert!(!legal_moves_from(&moved_rook, Position::at(9, 5))
            .as_slice()
            .iter()
            .any(Move::is_castling));

        // Moved king back on its home square.
        let mut moved_king = parse("5k4/10/10/10/10/10/10/10/10/R4K4 w");
        let king = moved_king.take(Position::at(9, 5)).unwrap();
        moved_king.set(Position::at(9, 5), Some(king.moved()));
        assert!(!legal_moves_from(&moved_king, Position::at(9, 5))
            .as_slice()
            .iter()
            .any(Move::is_castling));
        assert!(!generate_moves(&moved_king, Color::White)
            .as_slice()
            .iter()
            .any(Move::is_castling));

        // King in check.
        let checked = parse("5r4/10/10/10/10/10/10/10/10/R4K4 w");
        assert!(!legal_moves_from(&checked, Position::at(9, 5))
            .as_slice()
            .iter()
            .any(Move::is_castling));
    }

    #[test]
    fn pinned_piece_cannot_expose_king() {
        let board = parse("5r4/10/10/10/10/10/10/10/5B4/5K4 w");
        let d = destinations(&board, 8, 5);
        assert!(d.is_empty());
    }

    #[test]
    fn wizard_gives_check_from_range() {
        let mut board = Board::empty();
        board.place(Position::at(9, 5), PieceKind::King, Color::White);
        board.place(Position::at(7, 7), PieceKind::Wizard, Color::Black);
        assert!(is_king_attacked(&board, Color::White));

        // The wizard's own pieces in between do not block it.
        board.place(Position::at(8, 6), PieceKind::Knight, Color::Black);
        assert!(is_king_attacked(&board, Color::White));

        // A nearer enemy of the wizard absorbs the attack in that direction.
        board.take(Position::at(8, 6));
        board.place(Position::at(8, 6), PieceKind::Pawn, Color::White);
        assert!(!is_king_attacked(&board, Color::White));
    }

    #[test]
    fn missing_king_is_not_in_check() {
        let mut board = Board::empty();
        board.place(Position::at(4, 4), PieceKind::Queen, Color::Black);
        assert!(!is_king_attacked(&board, Color::White));
    }

    #[test]
    fn make_move_leaves_input_untouched() {
        let board = Board::initial();
        let before = board.clone();
        let moves = generate_moves(&board, Color::White);
        let _ = make_move(&board, &moves[0]);
        assert_eq!(board, before);
    }
}
