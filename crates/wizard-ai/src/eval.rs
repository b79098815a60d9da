//! Static evaluation.
//!
//! Scores are in centipawns, positive when White is better. The total is the
//! sum of four terms: material, piece-square bonuses, king safety and
//! mobility.

use wizard_core::{Color, PieceKind, Position};
use wizard_engine::movegen::moves_from;
use wizard_engine::{Board, GenMode};

/// Piece values in centipawns
pub const PAWN_VALUE: i32 = 100;
pub const KNIGHT_VALUE: i32 = 320;
pub const BISHOP_VALUE: i32 = 330;
pub const WIZARD_VALUE: i32 = 450;
pub const ROOK_VALUE: i32 = 500;
pub const QUEEN_VALUE: i32 = 900;

/// Bonus per pseudo-legal move.
const MOBILITY_WEIGHT: i32 = 2;
/// Bonus per friendly piece next to the king.
const KING_SHELTER: i32 = 12;
/// Penalty per enemy piece within two squares of the king.
const KING_DANGER: i32 = 18;
/// Non-pawn material per side at or below which kings are scored as
/// endgame pieces.
const ENDGAME_MATERIAL: i32 = ROOK_VALUE + BISHOP_VALUE + WIZARD_VALUE;

/// Material value of a piece kind. Kings are priceless and score zero.
pub const fn piece_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => PAWN_VALUE,
        PieceKind::Knight => KNIGHT_VALUE,
        PieceKind::Bishop => BISHOP_VALUE,
        PieceKind::Rook => ROOK_VALUE,
        PieceKind::Queen => QUEEN_VALUE,
        PieceKind::King => 0,
        PieceKind::Wizard => WIZARD_VALUE,
    }
}

/// 0 on the rim corners up to 8 on the four central squares.
const fn centrality(row: usize, col: usize) -> i32 {
    let dr = (2 * row as i32 - 9).abs();
    let dc = (2 * col as i32 - 9).abs();
    (18 - dr - dc) / 2
}

const PST_PAWN: usize = 0;
const PST_KNIGHT: usize = 1;
const PST_BISHOP: usize = 2;
const PST_ROOK: usize = 3;
const PST_QUEEN: usize = 4;
const PST_KING: usize = 5;
const PST_WIZARD: usize = 6;
const PST_KING_END: usize = 7;

/// Builds a piece-square table from White's point of view: row 0 is the
/// enemy back rank, row 9 White's own.
const fn build_pst(table: usize) -> [i32; 100] {
    let mut pst = [0i32; 100];
    let mut row = 0;
    while row < 10 {
        let mut col = 0;
        while col < 10 {
            let c = centrality(row, col);
            pst[row * 10 + col] = match table {
                PST_PAWN => {
                    let advance = 8 - row as i32;
                    if advance <= 0 {
                        0
                    } else {
                        advance * 6 + c
                    }
                }
                PST_KNIGHT => c * 5 - 20,
                PST_BISHOP => c * 3 - 10,
                PST_ROOK => {
                    if row == 1 {
                        15
                    } else {
                        0
                    }
                }
                PST_QUEEN => c * 2 - 5,
                PST_KING => {
                    if row == 9 {
                        if col <= 2 || col >= 8 {
                            15
                        } else {
                            0
                        }
                    } else {
                        -15 * (9 - row as i32)
                    }
                }
                PST_WIZARD => c * 4 - 12,
                PST_KING_END => c * 4 - 16,
                _ => 0,
            };
            col += 1;
        }
        row += 1;
    }
    pst
}

const PAWN_PST: [i32; 100] = build_pst(PST_PAWN);
const KNIGHT_PST: [i32; 100] = build_pst(PST_KNIGHT);
const BISHOP_PST: [i32; 100] = build_pst(PST_BISHOP);
const ROOK_PST: [i32; 100] = build_pst(PST_ROOK);
const QUEEN_PST: [i32; 100] = build_pst(PST_QUEEN);
const WIZARD_PST: [i32; 100] = build_pst(PST_WIZARD);
const KING_MIDDLEGAME_PST: [i32; 100] = build_pst(PST_KING);
const KING_ENDGAME_PST: [i32; 100] = build_pst(PST_KING_END);

/// The evaluation split into its terms, each White-positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvalTerms {
    pub material: i32,
    pub positional: i32,
    pub king_safety: i32,
    pub mobility: i32,
}

impl EvalTerms {
    pub fn total(&self) -> i32 {
        self.material + self.positional + self.king_safety + self.mobility
    }
}

/// Evaluates the board, positive when White is better.
pub fn evaluate(board: &Board) -> i32 {
    evaluate_terms(board).total()
}

/// Evaluates the board and returns each term separately.
pub fn evaluate_terms(board: &Board) -> EvalTerms {
    let mut terms = EvalTerms::default();
    let endgame = non_pawn_material(board, Color::White) <= ENDGAME_MATERIAL
        && non_pawn_material(board, Color::Black) <= ENDGAME_MATERIAL;

    for (pos, piece) in board.occupied() {
        let sign = piece.color.sign();
        terms.material += sign * piece_value(piece.kind);
        terms.positional += sign * pst_bonus(piece.kind, piece.color, pos, endgame);
        terms.mobility += sign * MOBILITY_WEIGHT * moves_from(board, pos, GenMode::Attacks).len() as i32;
    }

    for color in Color::ALL {
        terms.king_safety += color.sign() * king_safety(board, color);
    }
    terms
}

/// Material of one side, kings excluded.
pub fn material(board: &Board, color: Color) -> i32 {
    board.pieces(color).map(|(_, p)| piece_value(p.kind)).sum()
}

fn non_pawn_material(board: &Board, color: Color) -> i32 {
    board
        .pieces(color)
        .filter(|(_, p)| p.kind != PieceKind::Pawn)
        .map(|(_, p)| piece_value(p.kind))
        .sum()
}

fn pst_bonus(kind: PieceKind, color: Color, pos: Position, endgame: bool) -> i32 {
    let idx = match color {
        Color::White => pos.index(),
        Color::Black => (9 - pos.row() as usize) * 10 + pos.col() as usize,
    };
    let table = match kind {
        PieceKind::Pawn => &PAWN_PST,
        PieceKind::Knight => &KNIGHT_PST,
        PieceKind::Bishop => &BISHOP_PST,
        PieceKind::Rook => &ROOK_PST,
        PieceKind::Queen => &QUEEN_PST,
        PieceKind::Wizard => &WIZARD_PST,
        PieceKind::King if endgame => &KING_ENDGAME_PST,
        PieceKind::King => &KING_MIDDLEGAME_PST,
    };
    table[idx]
}

/// Shelter from adjacent friends minus pressure from nearby enemies.
///
/// This is a proximity heuristic, not an attack computation.
fn king_safety(board: &Board, color: Color) -> i32 {
    let Some(king) = board.king_position(color) else {
        return 0;
    };
    board
        .occupied()
        .filter(|&(pos, _)| pos != king)
        .map(|(pos, piece)| match (piece.color == color, king.distance(pos)) {
            (true, 1) => KING_SHELTER,
            (false, d) if d <= 2 => -KING_DANGER,
            _ => 0,
        })
        .sum()
}
