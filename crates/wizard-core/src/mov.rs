//! Move representation.

use crate::{Piece, PieceKind, Position};
use std::fmt;
use thiserror::Error;

/// Special move categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveFlag {
    /// Ordinary move or capture, including pawn promotion.
    Normal = 0,
    /// Wizard relocates onto an empty square. Never captures.
    WizardTeleport = 1,
    /// Wizard removes an enemy piece and stays where it is.
    WizardAttack = 2,
    /// King moves three columns with a paired rook relocation.
    Castling = 3,
}

/// The rook relocation that accompanies a castling move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RookMove {
    pub from: Position,
    pub to: Position,
}

/// Errors that can occur when parsing move notation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotationError {
    #[error("invalid move notation: {0}")]
    Malformed(String),

    #[error("invalid square '{0}'")]
    InvalidSquare(String),

    #[error("invalid promotion piece '{0}'")]
    InvalidPromotion(char),
}

/// A recorded move.
///
/// Carries a snapshot of the moving piece (as it was before the move) and of
/// any captured piece, so a move can be replayed or classified without the
/// board it was played on. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    from: Position,
    to: Position,
    piece: Piece,
    captured: Option<Piece>,
    flag: MoveFlag,
    rook_move: Option<RookMove>,
    promotion: Option<PieceKind>,
}

impl Move {
    /// Creates a normal move, capturing whatever sits on `to`.
    pub const fn normal(from: Position, to: Position, piece: Piece, captured: Option<Piece>) -> Self {
        Move {
            from,
            to,
            piece,
            captured,
            flag: MoveFlag::Normal,
            rook_move: None,
            promotion: None,
        }
    }

    /// Creates a wizard teleport onto an empty square.
    pub const fn wizard_teleport(from: Position, to: Position, wizard: Piece) -> Self {
        Move {
            from,
            to,
            piece: wizard,
            captured: None,
            flag: MoveFlag::WizardTeleport,
            rook_move: None,
            promotion: None,
        }
    }

    /// Creates a wizard ranged attack on `target`.
    pub const fn wizard_attack(from: Position, target: Position, wizard: Piece, victim: Piece) -> Self {
        Move {
            from,
            to: target,
            piece: wizard,
            captured: Some(victim),
            flag: MoveFlag::WizardAttack,
            rook_move: None,
            promotion: None,
        }
    }

    /// Creates a castling move for the king with its paired rook relocation.
    pub const fn castling(from: Position, to: Position, king: Piece, rook_move: RookMove) -> Self {
        Move {
            from,
            to,
            piece: king,
            captured: None,
            flag: MoveFlag::Castling,
            rook_move: Some(rook_move),
            promotion: None,
        }
    }

    /// Returns this move with a promotion target attached.
    pub const fn with_promotion(self, kind: PieceKind) -> Self {
        Move {
            promotion: Some(kind),
            ..self
        }
    }

    #[inline]
    pub const fn from(&self) -> Position {
        self.from
    }

    #[inline]
    pub const fn to(&self) -> Position {
        self.to
    }

    /// The moving piece as it was before the move.
    #[inline]
    pub const fn piece(&self) -> Piece {
        self.piece
    }

    #[inline]
    pub const fn captured(&self) -> Option<Piece> {
        self.captured
    }

    #[inline]
    pub const fn flag(&self) -> MoveFlag {
        self.flag
    }

    #[inline]
    pub const fn rook_move(&self) -> Option<RookMove> {
        self.rook_move
    }

    #[inline]
    pub const fn promotion(&self) -> Option<PieceKind> {
        self.promotion
    }

    #[inline]
    pub const fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    #[inline]
    pub const fn is_wizard_teleport(&self) -> bool {
        matches!(self.flag, MoveFlag::WizardTeleport)
    }

    #[inline]
    pub const fn is_wizard_attack(&self) -> bool {
        matches!(self.flag, MoveFlag::WizardAttack)
    }

    #[inline]
    pub const fn is_castling(&self) -> bool {
        matches!(self.flag, MoveFlag::Castling)
    }

    /// Returns true if this move selects the same action as the given
    /// coordinates and optional promotion piece.
    pub fn matches(&self, from: Position, to: Position, promotion: Option<PieceKind>) -> bool {
        self.from == from && self.to == to && (promotion.is_none() || promotion == self.promotion)
    }

    /// Returns the notation for this move (e.g. `e2e4`, `d1xd3`, `c9c10q`).
    ///
    /// Wizard attacks are written with an `x` because the wizard stays put.
    pub fn to_notation(&self) -> String {
        let sep = if self.is_wizard_attack() { "x" } else { "" };
        let promo = match self.promotion {
            Some(kind) => kind.to_fen_char(crate::Color::Black).to_string(),
            None => String::new(),
        };
        format!("{}{}{}{}", self.from, sep, self.to, promo)
    }

    /// Parses move notation into its source, destination and promotion piece.
    ///
    /// Only the coordinates are recovered; the engine resolves the full move
    /// against the legal move list.
    pub fn parse_notation(s: &str) -> Result<(Position, Position, Option<PieceKind>), NotationError> {
        let s = s.trim();
        let split = s
            .char_indices()
            .skip(1)
            .find(|(_, c)| c.is_ascii_lowercase())
            .map(|(i, _)| i)
            .ok_or_else(|| NotationError::Malformed(s.to_string()))?;
        let (from_str, rest) = s.split_at(split);
        let rest = rest.strip_prefix('x').unwrap_or(rest);

        let mut to_str = rest;
        let mut promotion = None;
        if let Some(last) = rest.chars().last() {
            if last.is_ascii_alphabetic() && rest.len() > 1 {
                let kind = match PieceKind::from_fen_char(last) {
                    Some((kind, _)) if !matches!(kind, PieceKind::Pawn | PieceKind::King) => kind,
                    _ => return Err(NotationError::InvalidPromotion(last)),
                };
                promotion = Some(kind);
                to_str = &rest[..rest.len() - 1];
            }
        }

        let from = Position::from_algebraic(from_str)
            .ok_or_else(|| NotationError::InvalidSquare(from_str.to_string()))?;
        let to = Position::from_algebraic(to_str)
            .ok_or_else(|| NotationError::InvalidSquare(to_str.to_string()))?;
        Ok((from, to, promotion))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_notation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, PieceId};

    fn piece(kind: PieceKind, color: Color) -> Piece {
        Piece::new(kind, color, PieceId(1))
    }

    #[test]
    fn normal_move_notation() {
        let m = Move::normal(
            Position::at(8, 4),
            Position::at(6, 4),
            piece(PieceKind::Pawn, Color::White),
            None,
        );
        assert_eq!(m.to_notation(), "e2e4");
        assert!(!m.is_capture());
        assert_eq!(m.flag(), MoveFlag::Normal);
    }

    #[test]
    fn wizard_attack_notation() {
        let m = Move::wizard_attack(
            Position::at(9, 3),
            Position::at(7, 3),
            piece(PieceKind::Wizard, Color::White),
            piece(PieceKind::Pawn, Color::Black),
        );
        assert_eq!(m.to_notation(), "d1xd3");
        assert!(m.is_wizard_attack());
        assert!(m.is_capture());
    }

    #[test]
    fn promotion_notation() {
        let m = Move::normal(
            Position::at(1, 2),
            Position::at(0, 2),
            piece(PieceKind::Pawn, Color::White),
            None,
        )
        .with_promotion(PieceKind::Queen);
        assert_eq!(m.to_notation(), "c9c10q");
        assert_eq!(m.promotion(), Some(PieceKind::Queen));
    }

    #[test]
    fn castling_carries_rook_move() {
        let rook_move = RookMove {
            from: Position::at(9, 0),
            to: Position::at(9, 3),
        };
        let m = Move::castling(
            Position::at(9, 5),
            Position::at(9, 2),
            piece(PieceKind::King, Color::White),
            rook_move,
        );
        assert!(m.is_castling());
        assert_eq!(m.rook_move(), Some(rook_move));
        assert!(!m.is_capture());
    }

    #[test]
    fn parse_notation() {
        assert_eq!(
            Move::parse_notation("e2e4"),
            Ok((Position::at(8, 4), Position::at(6, 4), None))
        );
        assert_eq!(
            Move::parse_notation("d1xd3"),
            Ok((Position::at(9, 3), Position::at(7, 3), None))
        );
        assert_eq!(
            Move::parse_notation("c9c10q"),
            Ok((Position::at(1, 2), Position::at(0, 2), Some(PieceKind::Queen)))
        );
        assert_eq!(
            Move::parse_notation("j10j9"),
            Ok((Position::at(0, 9), Position::at(1, 9), None))
        );
    }

    #[test]
    fn parse_notation_errors() {
        assert!(matches!(
            Move::parse_notation("zz"),
            Err(NotationError::Malformed(_)) | Err(NotationError::InvalidSquare(_))
        ));
        assert_eq!(
            Move::parse_notation("c9c10k"),
            Err(NotationError::InvalidPromotion('k'))
        );
        assert!(matches!(
            Move::parse_notation("e2e11"),
            Err(NotationError::InvalidSquare(_))
        ));
    }

    #[test]
    fn matches_ignores_unspecified_promotion() {
        let m = Move::normal(
            Position::at(1, 2),
            Position::at(0, 2),
            piece(PieceKind::Pawn, Color::White),
            None,
        )
        .with_promotion(PieceKind::Queen);
        assert!(m.matches(Position::at(1, 2), Position::at(0, 2), None));
        assert!(m.matches(Position::at(1, 2), Position::at(0, 2), Some(PieceKind::Queen)));
        assert!(!m.matches(Position::at(1, 2), Position::at(0, 2), Some(PieceKind::Rook)));
    }
}
