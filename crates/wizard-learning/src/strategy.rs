//! Heuristic labels describing how a game was played.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use wizard_core::{Color, Move, PieceKind};

use crate::data::Outcome;

/// A finished game's character, for display and analytics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StrategyLabel {
    Aggressive,
    WizardFocused,
    Defensive,
    Positional,
    Balanced,
}

impl StrategyLabel {
    pub const ALL: [StrategyLabel; 5] = [
        StrategyLabel::Aggressive,
        StrategyLabel::WizardFocused,
        StrategyLabel::Defensive,
        StrategyLabel::Positional,
        StrategyLabel::Balanced,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            StrategyLabel::Aggressive => "Aggressive",
            StrategyLabel::WizardFocused => "Wizard-focused",
            StrategyLabel::Defensive => "Defensive",
            StrategyLabel::Positional => "Positional",
            StrategyLabel::Balanced => "Balanced",
        }
    }
}

impl fmt::Display for StrategyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Labels a game from the moves `color` played.
///
/// Checked in order: heavy wizard use, high capture rate, frequent retreats,
/// pawn-heavy play. Anything else is balanced.
pub fn classify_moves(moves: &[Move], color: Color) -> StrategyLabel {
    let own: Vec<&Move> = moves.iter().filter(|m| m.piece().color == color).collect();
    if own.is_empty() {
        return StrategyLabel::Balanced;
    }
    let total = own.len() as f64;
    let ratio = |pred: &dyn Fn(&Move) -> bool| own.iter().filter(|&&m| pred(m)).count() as f64 / total;

    let wizard = ratio(&|m| m.piece().kind == PieceKind::Wizard);
    let captures = ratio(&|m| m.is_capture());
    let retreats = ratio(&|m| {
        let toward_home = m.to().row() as i32 - m.from().row() as i32;
        toward_home * color.sign() > 0
    });
    let pawns = ratio(&|m| m.piece().kind == PieceKind::Pawn);

    if wizard >= 0.3 {
        StrategyLabel::WizardFocused
    } else if captures >= 0.25 {
        StrategyLabel::Aggressive
    } else if retreats >= 0.3 {
        StrategyLabel::Defensive
    } else if pawns >= 0.4 {
        StrategyLabel::Positional
    } else {
        StrategyLabel::Balanced
    }
}

/// Labels a game from its length and result alone, for games recorded
/// without a move list.
pub fn classify_summary(plies: u32, outcome: Outcome) -> StrategyLabel {
    match outcome {
        Outcome::Win if plies < 40 => StrategyLabel::Aggressive,
        Outcome::Draw => StrategyLabel::Positional,
        _ if plies >= 70 => StrategyLabel::Defensive,
        _ => StrategyLabel::Balanced,
    }
}
