//! Alpha-beta search.
//!
//! Negamax formulation: every node scores from the side to move, which is
//! the White-positive evaluation times the mover's sign.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;
use wizard_core::{Color, Move};
use wizard_engine::rules::RuleSet;
use wizard_engine::Board;

use crate::eval::{evaluate, piece_value};
use crate::profile::SearchProfile;

/// Score of being checkmated at the root. Mates found sooner score higher.
pub const MATE_SCORE: i32 = 100_000;
const INFINITY: i32 = MATE_SCORE + 1_000;

/// Outcome of a root search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Move,
    /// Unperturbed score of the chosen move for the side that moved.
    pub score: i32,
    /// Deepest fully completed iteration.
    pub depth: u8,
    pub nodes: u64,
}

/// Search state
pub struct Searcher<'a, R: RuleSet> {
    rules: &'a R,
    nodes: u64,
    node_budget: u64,
    stopped: bool,
}

impl<'a, R: RuleSet> Searcher<'a, R> {
    pub fn new(rules: &'a R, node_budget: u64) -> Self {
        Searcher {
            rules,
            nodes: 0,
            node_budget,
            stopped: false,
        }
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    fn check_budget(&mut self) {
        if self.nodes >= self.node_budget {
            self.stopped = true;
        }
    }

    /// Searches `side`'s moves with iterative deepening up to the profile's
    /// depth, then picks among the best root moves using `rng`.
    ///
    /// Returns `None` only when `side` has no legal moves.
    pub fn search<G: Rng>(
        &mut self,
        board: &Board,
        side: Color,
        profile: &SearchProfile,
        rng: &mut G,
    ) -> Option<SearchResult> {
        let mut moves: Vec<Move> = self.rules.generate_moves(board, side).into_vec();
        if moves.is_empty() {
            return None;
        }
        order_moves(&mut moves);

        let mut completed: Option<(u8, Vec<(Move, i32)>)> = None;
        for depth in 1..=profile.depth.max(1) {
            let scored = self.score_root(board, side, &moves, depth, profile.noise);
            if self.stopped {
                // A partial first iteration is still better than nothing.
                if completed.is_none() && !scored.is_empty() {
                    completed = Some((depth, scored));
                }
                break;
            }

            // Search the previous iteration's best moves first next time.
            let mut by_score = scored.clone();
            by_score.sort_by(|a, b| b.1.cmp(&a.1));
            let mut reordered: Vec<Move> = by_score.iter().map(|(m, _)| *m).collect();
            let rest: Vec<Move> = moves.iter().filter(|m| !reordered.contains(m)).copied().collect();
            reordered.extend(rest);
            moves = reordered;

            completed = Some((depth, scored));
        }

        let (depth, scored) = match completed {
            Some(done) => done,
            None => (0, vec![(moves[0], 0)]),
        };
        let (best_move, score) = pick(&scored, profile.noise, rng)?;

        debug!(
            side = %side,
            depth,
            nodes = self.nodes,
            score,
            best = %best_move,
            "search finished"
        );
        Some(SearchResult {
            best_move,
            score,
            depth,
            nodes: self.nodes,
        })
    }

    /// Scores root moves at a fixed depth. Moves that provably cannot win
    /// even after noise are dropped.
    fn score_root(
        &mut self,
        board: &Board,
        side: Color,
        moves: &[Move],
        depth: u8,
        noise: i32,
    ) -> Vec<(Move, i32)> {
        let mut scored = Vec::with_capacity(moves.len());
        let mut best = -INFINITY;

        for m in moves {
            let alpha = if best == -INFINITY {
                -INFINITY
            } else {
                best - 2 * noise - 1
            };
            let child = self.rules.make_move(board, m);
            let score = -self.alpha_beta(&child, side.opposite(), depth - 1, -INFINITY, -alpha, 1);
            if self.stopped {
                break;
            }
            if score > alpha {
                scored.push((*m, score));
                best = best.max(score);
            }
        }
        scored
    }

    /// Alpha-beta search
    fn alpha_beta(
        &mut self,
        board: &Board,
        side: Color,
        depth: u8,
        mut alpha: i32,
        beta: i32,
        ply: i32,
    ) -> i32 {
        self.nodes += 1;
        self.check_budget();
        if self.stopped {
            return 0;
        }

        let mut moves = self.rules.generate_moves(board, side).into_vec();

        if moves.is_empty() {
            return if self.rules.is_check(board, side) {
                -MATE_SCORE + ply
            } else {
                0
            };
        }

        if depth == 0 {
            return side.sign() * evaluate(board);
        }

        order_moves(&mut moves);
        for m in &moves {
            let child = self.rules.make_move(board, m);
            let score = -self.alpha_beta(&child, side.opposite(), depth - 1, -beta, -alpha, ply + 1);
            if self.stopped {
                return 0;
            }
            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }
        alpha
    }
}

/// Captures first, most valuable victim and least valuable attacker first.
/// Quiet moves keep generation order.
pub fn order_moves(moves: &mut [Move]) {
    moves.sort_by_key(|m| {
        let promotion = m.promotion().map_or(0, piece_value);
        match m.captured() {
            Some(victim) => -(10 * piece_value(victim.kind) - piece_value(m.piece().kind)) - promotion - 1,
            None => -promotion,
        }
    });
}

/// Applies root noise and picks uniformly among the top noisy scores.
fn pick<G: Rng>(scored: &[(Move, i32)], noise: i32, rng: &mut G) -> Option<(Move, i32)> {
    let noisy: Vec<(Move, i32, i32)> = scored
        .iter()
        .map(|&(m, score)| {
            let jitter = if noise > 0 {
                rng.gen_range(-noise..=noise)
            } else {
                0
            };
            (m, score, score + jitter)
        })
        .collect();
    let top = noisy.iter().map(|&(_, _, n)| n).max()?;
    let ties: Vec<&(Move, i32, i32)> = noisy.iter().filter(|&&(_, _, n)| n == top).collect();
    ties.choose(rng).map(|&&(m, score, _)| (m, score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use wizard_core::{PieceKind, Position};
    use wizard_engine::{make_move, WizardChess};

    fn profile(depth: u8) -> SearchProfile {
        SearchProfile {
            depth,
            noise: 0,
            node_budget: 1_000_000,
        }
    }

    #[test]
    fn no_moves_returns_none() {
        let board = Board::from_fen("k9/10/1Q8/10/10/10/10/10/10/9K b").unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let mut searcher = Searcher::new(&WizardChess, 10_000);
        assert!(searcher.search(&board, Color::Black, &profile(2), &mut rng).is_none());
    }

    #[test]
    fn finds_mate_in_one() {
        let board = Board::from_fen("k9/10/10/10/10/r9/10/10/4PPP3/5K4 b").unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let mut searcher = Searcher::new(&WizardChess, 1_000_000);
        let result = searcher.search(&board, Color::Black, &profile(2), &mut rng).unwrap();
        assert_eq!(result.best_move.to(), Position::at(9, 0));
        assert!(result.score > MATE_SCORE - 10);

        let after = make_move(&board, &result.best_move);
        assert_eq!(
            WizardChess.game_result(&after, Color::White),
            Some(wizard_engine::GameResult::BlackWins)
        );
    }

    #[test]
    fn takes_hanging_queen() {
        let mut board = Board::empty();
        board.place(Position::at(9, 0), PieceKind::King, Color::White);
        board.place(Position::at(0, 9), PieceKind::King, Color::Black);
        board.place(Position::at(5, 5), PieceKind::Wizard, Color::White);
        board.place(Position::at(3, 3), PieceKind::Queen, Color::Black);
        let mut rng = StdRng::seed_from_u64(3);
        let mut searcher = Searcher::new(&WizardChess, 1_000_000);
        let result = searcher.search(&board, Color::White, &profile(1), &mut rng).unwrap();
        assert!(result.best_move.is_wizard_attack());
        assert_eq!(result.best_move.to(), Position::at(3, 3));
    }

    #[test]
    fn tiny_budget_still_returns_a_legal_move() {
        let board = Board::initial();
        let mut rng = StdRng::seed_from_u64(11);
        let mut searcher = Searcher::new(&WizardChess, 5);
        let profile = SearchProfile {
            depth: 4,
            noise: 0,
            node_budget: 5,
        };
        let result = searcher.search(&board, Color::White, &profile, &mut rng).unwrap();
        let legal = WizardChess.generate_moves(&board, Color::White);
        assert!(legal.as_slice().contains(&result.best_move));
    }

    #[test]
    fn captures_are_ordered_first() {
        let board = Board::from_fen("k9/10/10/10/4q5/10/4W5/10/10/8K1 w").unwrap();
        let mut moves = WizardChess.generate_moves(&board, Color::White).into_vec();
        order_moves(&mut moves);
        assert!(moves[0].is_capture());
    }
}
