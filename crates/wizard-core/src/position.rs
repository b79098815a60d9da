//! Board coordinates.

use std::fmt;

/// Width and height of the board.
pub const BOARD_SIZE: u8 = 10;

/// A square on the 10x10 board, addressed by row and column (0-9).
///
/// Row 0 is Black's back rank, row 9 is White's. In algebraic form the
/// columns are files `a`-`j` and rows map to ranks `10`-`1`, so (9,0) is `a1`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    row: u8,
    col: u8,
}

impl Position {
    /// Creates a position, or `None` when out of bounds.
    #[inline]
    pub const fn new(row: u8, col: u8) -> Option<Self> {
        if row < BOARD_SIZE && col < BOARD_SIZE {
            Some(Position { row, col })
        } else {
            None
        }
    }

    /// Creates a position from a compile-time known in-range pair.
    ///
    /// # Panics
    ///
    /// Panics if either coordinate is out of range.
    #[inline]
    pub const fn at(row: u8, col: u8) -> Self {
        assert!(row < BOARD_SIZE && col < BOARD_SIZE);
        Position { row, col }
    }

    /// Creates a position from a linear index (0-99).
    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < BOARD_SIZE * BOARD_SIZE {
            Some(Position {
                row: index / BOARD_SIZE,
                col: index % BOARD_SIZE,
            })
        } else {
            None
        }
    }

    #[inline]
    pub const fn row(self) -> u8 {
        self.row
    }

    #[inline]
    pub const fn col(self) -> u8 {
        self.col
    }

    /// Returns the linear index (0-99), row-major.
    #[inline]
    pub const fn index(self) -> usize {
        self.row as usize * BOARD_SIZE as usize + self.col as usize
    }

    /// Returns the position displaced by the given deltas, if still on the board.
    #[inline]
    pub fn offset(self, d_row: i8, d_col: i8) -> Option<Self> {
        let row = self.row as i16 + d_row as i16;
        let col = self.col as i16 + d_col as i16;
        if (0..BOARD_SIZE as i16).contains(&row) && (0..BOARD_SIZE as i16).contains(&col) {
            Some(Position {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// Chebyshev (king-step) distance between two squares.
    #[inline]
    pub fn distance(self, other: Position) -> u8 {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }

    /// Iterates all 100 squares in row-major order.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..BOARD_SIZE * BOARD_SIZE).filter_map(Position::from_index)
    }

    /// Parses a square from algebraic notation (e.g. `d1`, `j10`).
    pub fn from_algebraic(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let file = chars.next()?;
        if !('a'..='j').contains(&file) {
            return None;
        }
        let rank: u8 = chars.as_str().parse().ok()?;
        if !(1..=BOARD_SIZE).contains(&rank) {
            return None;
        }
        Position::new(BOARD_SIZE - rank, file as u8 - b'a')
    }

    /// Returns the algebraic notation for this square.
    pub fn to_algebraic(self) -> String {
        format!("{}{}", (b'a' + self.col) as char, BOARD_SIZE - self.row)
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({},{})", self.row, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bounds() {
        assert!(Position::new(9, 9).is_some());
        assert!(Position::new(10, 0).is_none());
        assert!(Position::new(0, 10).is_none());
    }

    #[test]
    fn offset_stays_on_board() {
        let corner = Position::at(0, 0);
        assert_eq!(corner.offset(-1, 0), None);
        assert_eq!(corner.offset(1, 1), Some(Position::at(1, 1)));
        assert_eq!(Position::at(9, 9).offset(0, 1), None);
    }

    #[test]
    fn algebraic() {
        assert_eq!(Position::at(9, 0).to_algebraic(), "a1");
        assert_eq!(Position::at(0, 9).to_algebraic(), "j10");
        assert_eq!(Position::at(9, 3).to_algebraic(), "d1");
        assert_eq!(Position::from_algebraic("d1"), Some(Position::at(9, 3)));
        assert_eq!(Position::from_algebraic("j10"), Some(Position::at(0, 9)));
        assert_eq!(Position::from_algebraic("k1"), None);
        assert_eq!(Position::from_algebraic("a11"), None);
        assert_eq!(Position::from_algebraic("a0"), None);
        assert_eq!(Position::from_algebraic(""), None);
    }

    #[test]
    fn distance() {
        assert_eq!(Position::at(0, 0).distance(Position::at(2, 1)), 2);
        assert_eq!(Position::at(5, 5).distance(Position::at(5, 5)), 0);
    }

    #[test]
    fn all_squares() {
        assert_eq!(Position::all().count(), 100);
    }

    proptest! {
        #[test]
        fn index_roundtrip(idx in 0u8..100) {
            let pos = Position::from_index(idx).unwrap();
            prop_assert_eq!(pos.index(), idx as usize);
            prop_assert_eq!(Position::from_algebraic(&pos.to_algebraic()), Some(pos));
        }
    }
}
