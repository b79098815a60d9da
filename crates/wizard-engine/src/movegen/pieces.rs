//! Per-piece move rules.
//!
//! Each generator pushes pseudo-legal moves for a single piece. Legality
//! (own king safety) is filtered by the caller.

use wizard_core::{Color, Move, Piece, PieceKind, Position, RookMove, BOARD_SIZE};

use super::{GenMode, MoveList};
use crate::board::{Board, KING_HOME_COL};
use crate::movegen::is_square_attacked;

pub(crate) const ORTHOGONAL: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
pub(crate) const DIAGONAL: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
pub(crate) const COMPASS: [(i8, i8); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];
const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// Maximum wizard reach in any direction.
pub const WIZARD_RANGE: i8 = 2;

/// Columns a king lands on when castling, queenside then kingside.
pub const CASTLE_KING_COLS: [u8; 2] = [KING_HOME_COL - 3, KING_HOME_COL + 3];

pub(super) fn piece_moves(board: &Board, from: Position, piece: Piece, mode: GenMode, moves: &mut MoveList) {
    match piece.kind {
        PieceKind::Pawn => pawn_moves(board, from, piece, moves),
        PieceKind::Knight => step_moves(board, from, piece, &KNIGHT_JUMPS, moves),
        PieceKind::Bishop => slider_moves(board, from, piece, &DIAGONAL, moves),
        PieceKind::Rook => slider_moves(board, from, piece, &ORTHOGONAL, moves),
        PieceKind::Queen => slider_moves(board, from, piece, &COMPASS, moves),
        PieceKind::King => {
            step_moves(board, from, piece, &COMPASS, moves);
            if mode == GenMode::Legal {
                castling_moves(board, from, piece, moves);
            }
        }
        PieceKind::Wizard => wizard_moves(board, from, piece, moves),
    }
}

fn pawn_moves(board: &Board, from: Position, pawn: Piece, moves: &mut MoveList) {
    let dir = pawn.color.pawn_direction();
    let promotion_row = pawn.color.promotion_row();
    let mut push = |to: Position, captured: Option<Piece>| {
        let m = Move::normal(from, to, pawn, captured);
        if to.row() == promotion_row {
            moves.push(m.with_promotion(PieceKind::Queen));
        } else {
            moves.push(m);
        }
    };

    if let Some(one) = from.offset(dir, 0) {
        if board.is_empty(one) {
            push(one, None);
            if from.row() == pawn.color.pawn_start_row() {
                if let Some(two) = one.offset(dir, 0) {
                    if board.is_empty(two) {
                        push(two, None);
                    }
                }
            }
        }
    }

    for d_col in [-1, 1] {
        if let Some(to) = from.offset(dir, d_col) {
            if let Some(target) = board.piece_at(to) {
                if target.color != pawn.color {
                    push(to, Some(target));
                }
            }
        }
    }
}

fn step_moves(board: &Board, from: Position, piece: Piece, offsets: &[(i8, i8)], moves: &mut MoveList) {
    for &(dr, dc) in offsets {
        let Some(to) = from.offset(dr, dc) else {
            continue;
        };
        match board.piece_at(to) {
            None => moves.push(Move::normal(from, to, piece, None)),
            Some(target) if target.color != piece.color => {
                moves.push(Move::normal(from, to, piece, Some(target)))
            }
            Some(_) => {}
        }
    }
}

fn slider_moves(board: &Board, from: Position, piece: Piece, dirs: &[(i8, i8)], moves: &mut MoveList) {
    for &(dr, dc) in dirs {
        let mut cur = from;
        while let Some(to) = cur.offset(dr, dc) {
            match board.piece_at(to) {
                None => moves.push(Move::normal(from, to, piece, None)),
                Some(target) => {
                    if target.color != piece.color {
                        moves.push(Move::normal(from, to, piece, Some(target)));
                    }
                    break;
                }
            }
            cur = to;
        }
    }
}

/// Wizards look at distances 1 and 2 in each compass direction. Every empty
/// square in range is a teleport target. The first enemy in a direction can
/// be attacked from range. Nothing blocks a wizard, including its own side.
fn wizard_moves(board: &Board, from: Position, wizard: Piece, moves: &mut MoveList) {
    for &(dr, dc) in &COMPASS {
        let mut enemy_seen = false;
        for dist in 1..=WIZARD_RANGE {
            let Some(to) = from.offset(dr * dist, dc * dist) else {
                break;
            };
            match board.piece_at(to) {
                None => moves.push(Move::wizard_teleport(from, to, wizard)),
                Some(target) if target.color != wizard.color => {
                    if !enemy_seen {
                        moves.push(Move::wizard_attack(from, to, wizard, target));
                        enemy_seen = true;
                    }
                }
                Some(_) => {}
            }
        }
    }
}

/// Castling moves the king three columns toward an unmoved corner rook, and
/// the rook lands on the square next to the king on the inner side.
fn castling_moves(board: &Board, from: Position, king: Piece, moves: &mut MoveList) {
    let home = king.color.back_rank();
    if king.has_moved || from.row() != home || from.col() != KING_HOME_COL {
        return;
    }
    if is_square_attacked(board, from, king.color.opposite()) {
        return;
    }

    for (rook_col, king_col) in [(0, CASTLE_KING_COLS[0]), (BOARD_SIZE - 1, CASTLE_KING_COLS[1])] {
        let rook_from = Position::at(home, rook_col);
        let rook_ready = matches!(
            board.piece_at(rook_from),
            Some(p) if p.kind == PieceKind::Rook && p.color == king.color && !p.has_moved
        );
        if !rook_ready || !path_clear(board, home, KING_HOME_COL, rook_col) {
            continue;
        }

        let king_to = Position::at(home, king_col);
        let rook_to_col = if rook_col < KING_HOME_COL {
            king_col + 1
        } else {
            king_col - 1
        };
        let rook_move = RookMove {
            from: rook_from,
            to: Position::at(home, rook_to_col),
        };
        moves.push(Move::castling(from, king_to, king, rook_move));
    }
}

fn path_clear(board: &Board, row: u8, a: u8, b: u8) -> bool {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    (lo + 1..hi).all(|col| board.is_empty(Position::at(row, col)))
}

/// Cheap geometric test: can a piece of this kind on `from` possibly reach
/// `target` in one move? Used to skip move generation during attack checks.
pub(super) fn may_reach(kind: PieceKind, color: Color, from: Position, target: Position) -> bool {
    let dr = target.row() as i8 - from.row() as i8;
    let dc = target.col() as i8 - from.col() as i8;
    let orthogonal = dr == 0 || dc == 0;
    let diagonal = dr.abs() == dc.abs();
    match kind {
        PieceKind::Pawn => dr == color.pawn_direction() && dc.abs() == 1,
        PieceKind::Knight => from.distance(target) == 2 && !orthogonal && !diagonal,
        PieceKind::Bishop => diagonal,
        PieceKind::Rook => orthogonal,
        PieceKind::Queen => orthogonal || diagonal,
        PieceKind::King => from.distance(target) == 1,
        PieceKind::Wizard => (orthogonal || diagonal) && from.distance(target) as i8 <= WIZARD_RANGE,
    }
}
