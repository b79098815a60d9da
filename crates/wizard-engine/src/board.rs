//! Board representation.

use std::fmt;

use wizard_core::{Color, FenError, FenParser, FenRank, Piece, PieceId, PieceKind, Position, BOARD_SIZE};

use crate::zobrist::ZOBRIST;

const CELLS: usize = BOARD_SIZE as usize * BOARD_SIZE as usize;

/// Column of each king on its home row.
pub const KING_HOME_COL: u8 = 5;

/// Back-rank layout shared by both colors, column 0 first.
pub const BACK_RANK: [PieceKind; BOARD_SIZE as usize] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Wizard,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Wizard,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// A 10x10 grid of optional pieces.
///
/// Cells own their pieces; moving a piece takes it out of one cell and puts
/// it into another.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Option<Piece>; CELLS],
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    /// Creates a board with no pieces.
    pub const fn empty() -> Self {
        Board {
            cells: [None; CELLS],
        }
    }

    /// Creates the starting position.
    ///
    /// Black's back rank is row 0 and White's is row 9, with the same
    /// column order. Piece identities are assigned in row-major order.
    pub fn initial() -> Self {
        let mut board = Board::empty();
        let mut next_id = 1u16;
        let mut place = |board: &mut Board, row: u8, col: u8, kind: PieceKind, color: Color| {
            board.cells[Position::at(row, col).index()] =
                Some(Piece::new(kind, color, PieceId(next_id)));
            next_id += 1;
        };

        for color in [Color::Black, Color::White] {
            let back = color.back_rank();
            let pawns = color.pawn_start_row();
            let rows = if color == Color::Black {
                [back, pawns]
            } else {
                [pawns, back]
            };
            for row in rows {
                for col in 0..BOARD_SIZE {
                    let kind = if row == back {
                        BACK_RANK[col as usize]
                    } else {
                        PieceKind::Pawn
                    };
                    place(&mut board, row, col, kind, color);
                }
            }
        }
        board
    }

    /// Parses a board and side to move from notation.
    ///
    /// Pieces are unmoved unless they stand off a square they could only
    /// occupy before moving: pawns off their start row, kings off their home
    /// square and rooks off their corners are marked as moved.
    pub fn from_fen_with_side(fen: &str) -> Result<(Self, Color), FenError> {
        let parsed = FenParser::parse(fen)?;
        let mut board = Board::empty();
        let mut next_id = 1u16;

        for (row, rank) in parsed.ranks.iter().enumerate() {
            for (col, cell) in rank.iter().enumerate() {
                if let Some((kind, color)) = *cell {
                    let pos = Position::at(row as u8, col as u8);
                    let mut piece = Piece::new(kind, color, PieceId(next_id));
                    next_id += 1;
                    if !Self::is_unmoved_square(kind, color, pos) {
                        piece = piece.moved();
                    }
                    board.cells[pos.index()] = Some(piece);
                }
            }
        }
        Ok((board, parsed.active_color))
    }

    /// Parses a board from notation, ignoring the side to move.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Self::from_fen_with_side(fen).map(|(board, _)| board)
    }

    fn is_unmoved_square(kind: PieceKind, color: Color, pos: Position) -> bool {
        let home = color.back_rank();
        match kind {
            PieceKind::Pawn => pos.row() == color.pawn_start_row(),
            PieceKind::King => pos.row() == home && pos.col() == KING_HOME_COL,
            PieceKind::Rook => pos.row() == home && (pos.col() == 0 || pos.col() == BOARD_SIZE - 1),
            _ => true,
        }
    }

    /// Serializes the board with the given side to move.
    pub fn to_fen(&self, side: Color) -> String {
        let ranks: Vec<FenRank> = (0..BOARD_SIZE)
            .map(|row| {
                let mut rank: FenRank = [None; BOARD_SIZE as usize];
                for col in 0..BOARD_SIZE {
                    rank[col as usize] = self
                        .piece_at(Position::at(row, col))
                        .map(|p| (p.kind, p.color));
                }
                rank
            })
            .collect();
        FenParser::format(&ranks, side)
    }

    /// Returns the piece on the given square, if any.
    #[inline]
    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        self.cells[pos.index()]
    }

    /// Returns true if the square is empty.
    #[inline]
    pub fn is_empty(&self, pos: Position) -> bool {
        self.cells[pos.index()].is_none()
    }

    /// Returns the color of the piece on the square, if any.
    #[inline]
    pub fn color_at(&self, pos: Position) -> Option<Color> {
        self.cells[pos.index()].map(|p| p.color)
    }

    /// Puts a piece on a square, returning whatever was there.
    #[inline]
    pub fn set(&mut self, pos: Position, piece: Option<Piece>) -> Option<Piece> {
        std::mem::replace(&mut self.cells[pos.index()], piece)
    }

    /// Removes and returns the piece on a square.
    #[inline]
    pub fn take(&mut self, pos: Position) -> Option<Piece> {
        self.cells[pos.index()].take()
    }

    /// Places a new unmoved piece, assigning the next free identity.
    ///
    /// Intended for building test and puzzle positions.
    pub fn place(&mut self, pos: Position, kind: PieceKind, color: Color) -> Piece {
        let next = self
            .occupied()
            .map(|(_, p)| p.id.0)
            .max()
            .unwrap_or(0)
            + 1;
        let piece = Piece::new(kind, color, PieceId(next));
        self.cells[pos.index()] = Some(piece);
        piece
    }

    /// Iterates all occupied squares.
    pub fn occupied(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all().filter_map(move |pos| self.cells[pos.index()].map(|p| (pos, p)))
    }

    /// Iterates the squares holding pieces of the given color.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.occupied().filter(move |(_, p)| p.color == color)
    }

    /// Finds the king of the given color.
    pub fn king_position(&self, color: Color) -> Option<Position> {
        self.pieces(color)
            .find(|(_, p)| p.kind == PieceKind::King)
            .map(|(pos, _)| pos)
    }

    /// Counts pieces of a kind and color.
    pub fn count(&self, kind: PieceKind, color: Color) -> usize {
        self.pieces(color).filter(|(_, p)| p.kind == kind).count()
    }

    /// Zobrist hash of the board with the given side to move.
    pub fn zobrist_hash(&self, side: Color) -> u64 {
        let mut hash = 0u64;
        for (pos, piece) in self.occupied() {
            hash ^= ZOBRIST.piece_key(piece.kind, piece.color, pos);
        }
        if side == Color::Black {
            hash ^= ZOBRIST.black_to_move;
        }
        hash
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({})", self.to_fen(Color::White))
    }
}

/// Renders the board as a text diagram, row 0 on top.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..BOARD_SIZE {
            write!(f, "{:>2} ", BOARD_SIZE - row)?;
            for col in 0..BOARD_SIZE {
                let c = self
                    .piece_at(Position::at(row, col))
                    .map_or('.', |p| p.to_fen_char());
                write!(f, " {}", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "   ")?;
        for col in 0..BOARD_SIZE {
            write!(f, " {}", (b'a' + col) as char)?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_back_ranks() {
        let board = Board::initial();
        let white: Vec<PieceKind> = (0..10)
            .map(|c| board.piece_at(Position::at(9, c)).unwrap().kind)
            .collect();
        assert_eq!(white, BACK_RANK.to_vec());
        let black: Vec<PieceKind> = (0..10)
            .map(|c| board.piece_at(Position::at(0, c)).unwrap().kind)
            .collect();
        assert_eq!(black, BACK_RANK.to_vec());
        assert!(board.pieces(Color::White).all(|(p, _)| p.row() >= 8));
        assert!(board.pieces(Color::Black).all(|(p, _)| p.row() <= 1));
        assert_eq!(board.occupied().count(), 40);
    }

    #[test]
    fn initial_matches_startpos_notation() {
        let board = Board::initial();
        assert_eq!(board.to_fen(Color::White), FenParser::STARTPOS);
        let (parsed, side) = Board::from_fen_with_side(FenParser::STARTPOS).unwrap();
        assert_eq!(side, Color::White);
        // Identities are assigned in the same row-major order.
        assert_eq!(parsed, board);
    }

    #[test]
    fn identities_are_unique() {
        let board = Board::initial();
        let mut ids: Vec<u16> = board.occupied().map(|(_, p)| p.id.0).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 40);
    }

    #[test]
    fn one_king_per_color() {
        let board = Board::initial();
        assert_eq!(board.count(PieceKind::King, Color::White), 1);
        assert_eq!(board.count(PieceKind::King, Color::Black), 1);
        assert_eq!(board.king_position(Color::White), Some(Position::at(9, 5)));
        assert_eq!(board.king_position(Color::Black), Some(Position::at(0, 5)));
    }

    #[test]
    fn from_fen_marks_displaced_pieces_moved() {
        let board = Board::from_fen("4k5/10/10/10/10/10/4P5/10/P9/R4K2R1 w").unwrap();
        assert!(board.piece_at(Position::at(6, 4)).unwrap().has_moved);
        assert!(!board.piece_at(Position::at(8, 0)).unwrap().has_moved);
        assert!(!board.piece_at(Position::at(9, 0)).unwrap().has_moved);
        assert!(board.piece_at(Position::at(9, 8)).unwrap().has_moved);
        assert!(!board.piece_at(Position::at(9, 5)).unwrap().has_moved);
        assert!(board.piece_at(Position::at(0, 4)).unwrap().has_moved);
    }

    #[test]
    fn set_and_take() {
        let mut board = Board::empty();
        let pos = Position::at(4, 4);
        let piece = board.place(pos, PieceKind::Wizard, Color::White);
        assert_eq!(board.piece_at(pos), Some(piece));
        assert_eq!(board.take(pos), Some(piece));
        assert!(board.is_empty(pos));
    }

    #[test]
    fn hash_depends_on_side_and_pieces() {
        let board = Board::initial();
        assert_ne!(board.zobrist_hash(Color::White), board.zobrist_hash(Color::Black));
        let mut moved = board.clone();
        let pawn = moved.take(Position::at(8, 4));
        moved.set(Position::at(6, 4), pawn);
        assert_ne!(board.zobrist_hash(Color::White), moved.zobrist_hash(Color::White));
    }
}
