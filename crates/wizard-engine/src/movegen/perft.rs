//! Perft (performance test) for move generator validation.
//!
//! Perft counts the leaf nodes of the legal move tree to a fixed depth.

use wizard_core::Color;

use super::{generate_moves, make_move};
use crate::board::Board;

/// Counts the number of leaf nodes at the given depth.
pub fn perft(board: &Board, side: Color, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = generate_moves(board, side);

    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for m in &moves {
        let next = make_move(board, m);
        nodes += perft(&next, side.opposite(), depth - 1);
    }
    nodes
}

/// Perft with divide: node count below each root move, sorted by notation.
pub fn perft_divide(board: &Board, side: Color, depth: u32) -> Vec<(String, u64)> {
    let moves = generate_moves(board, side);
    let mut results = Vec::with_capacity(moves.len());

    for m in &moves {
        let next = make_move(board, m);
        let nodes = if depth > 1 {
            perft(&next, side.opposite(), depth - 1)
        } else {
            1
        };
        results.push((m.to_notation(), nodes));
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}
