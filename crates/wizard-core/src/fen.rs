//! Board text notation, a ten-rank dialect of FEN.
//!
//! A record has two fields: piece placement from row 0 (Black's back rank)
//! down to row 9, ranks separated by `/`, and the side to move (`w`/`b`).
//! Empty runs are written as decimal numbers up to `10`; `w`/`W` is a wizard.

use crate::{Color, PieceKind, BOARD_SIZE};
use thiserror::Error;

/// Errors that can occur when parsing board notation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid notation: expected 2 parts, got {0}")]
    InvalidPartCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),
}

/// One parsed rank: the occupant of each column.
pub type FenRank = [Option<(PieceKind, Color)>; BOARD_SIZE as usize];

/// Parsed board notation.
///
/// Holds the decoded ranks; the engine turns them into a board with
/// piece identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenParser {
    /// Occupants per row, row 0 first.
    pub ranks: Vec<FenRank>,
    /// Side to move.
    pub active_color: Color,
}

impl FenParser {
    /// The starting position.
    pub const STARTPOS: &'static str =
        "rnbwqkwbnr/pppppppppp/10/10/10/10/10/10/PPPPPPPPPP/RNBWQKWBNR w";

    /// Parses a notation string.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() != 2 {
            return Err(FenError::InvalidPartCount(parts.len()));
        }

        let active_color = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidActiveColor(other.to_string())),
        };

        let rank_strs: Vec<&str> = parts[0].split('/').collect();
        if rank_strs.len() != BOARD_SIZE as usize {
            return Err(FenError::InvalidPiecePlacement(format!(
                "expected {} ranks, got {}",
                BOARD_SIZE,
                rank_strs.len()
            )));
        }

        let ranks = rank_strs
            .iter()
            .enumerate()
            .map(|(row, s)| Self::parse_rank(row, s))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FenParser {
            ranks,
            active_color,
        })
    }

    fn parse_rank(row: usize, rank: &str) -> Result<FenRank, FenError> {
        let mut cells: FenRank = [None; BOARD_SIZE as usize];
        let mut col = 0usize;
        let mut run = 0usize;

        let overflow = || {
            FenError::InvalidPiecePlacement(format!("row {} has more than {} squares", row, BOARD_SIZE))
        };

        for c in rank.chars() {
            if let Some(d) = c.to_digit(10) {
                run = run * 10 + d as usize;
                if col + run > BOARD_SIZE as usize {
                    return Err(overflow());
                }
                continue;
            }
            col += run;
            run = 0;
            let (kind, color) = PieceKind::from_fen_char(c).ok_or_else(|| {
                FenError::InvalidPiecePlacement(format!("invalid character '{}' in row {}", c, row))
            })?;
            let cell = cells.get_mut(col).ok_or_else(overflow)?;
            *cell = Some((kind, color));
            col += 1;
        }
        col += run;

        if col > BOARD_SIZE as usize {
            return Err(overflow());
        }
        if col != BOARD_SIZE as usize {
            return Err(FenError::InvalidPiecePlacement(format!(
                "row {} has {} squares, expected {}",
                row, col, BOARD_SIZE
            )));
        }
        Ok(cells)
    }

    /// Serializes ranks and side to move back to notation.
    pub fn format(ranks: &[FenRank], active_color: Color) -> String {
        let placement: Vec<String> = ranks
            .iter()
            .map(|rank| {
                let mut out = String::new();
                let mut empty = 0;
                for cell in rank {
                    match cell {
                        Some((kind, color)) => {
                            if empty > 0 {
                                out.push_str(&empty.to_string());
                                empty = 0;
                            }
                            out.push(kind.to_fen_char(*color));
                        }
                        None => empty += 1,
                    }
                }
                if empty > 0 {
                    out.push_str(&empty.to_string());
                }
                out
            })
            .collect();
        let side = match active_color {
            Color::White => "w",
            Color::Black => "b",
        };
        format!("{} {}", placement.join("/"), side)
    }
}
