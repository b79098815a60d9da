//! Zobrist hashing for board identification.
//!
//! Each (piece kind, color, square) triple gets a fixed random key, plus one
//! key for Black to move. A board's hash is the XOR of the keys of its
//! occupied squares. Learned position patterns and the self-play stuck
//! detector both key on this value.

use wizard_core::{Color, PieceKind, Position, BOARD_SIZE};

const SQUARES: usize = BOARD_SIZE as usize * BOARD_SIZE as usize;
const KINDS: usize = PieceKind::ALL.len();

/// Zobrist hash keys, generated from a fixed seed so hashes are stable
/// across runs and persisted learning data stays valid.
pub struct ZobristKeys {
    /// Keys for pieces: [kind][color][square]
    pub pieces: [[[u64; SQUARES]; 2]; KINDS],
    /// Key for black to move (XOR when black to move).
    pub black_to_move: u64,
}

impl ZobristKeys {
    pub const fn new() -> Self {
        // xorshift64
        const fn next_random(state: u64) -> u64 {
            let mut x = state;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            x
        }

        let mut state = 0x9E3779B97F4A7C15u64;
        let mut pieces = [[[0u64; SQUARES]; 2]; KINDS];

        let mut kind = 0;
        while kind < KINDS {
            let mut color = 0;
            while color < 2 {
                let mut square = 0;
                while square < SQUARES {
                    state = next_random(state);
                    pieces[kind][color][square] = state;
                    square += 1;
                }
                color += 1;
            }
            kind += 1;
        }

        let black_to_move = next_random(state);

        ZobristKeys {
            pieces,
            black_to_move,
        }
    }

    /// Returns the key for a piece on a square.
    #[inline]
    pub const fn piece_key(&self, kind: PieceKind, color: Color, pos: Position) -> u64 {
        self.pieces[kind.index()][color.index()][pos.index()]
    }
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new()
    }
}

/// Global Zobrist keys (initialized at compile time).
pub static ZOBRIST: ZobristKeys = ZobristKeys::new();
