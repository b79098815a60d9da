//! AI opponent for wizard chess.
//!
//! Depth-bounded alpha-beta minimax over a White-positive evaluation of
//! material, piece-square bonuses, king safety and mobility. A
//! [`Difficulty`](wizard_core::Difficulty) selects the [`SearchProfile`]:
//! search depth, root score noise and a node budget.
//!
//! The search is synchronous and can be slow at high levels; interactive
//! callers should run it off their input thread.

pub mod eval;
mod player;
mod profile;
pub mod search;

pub use eval::{evaluate, evaluate_terms, material, piece_value, EvalTerms};
pub use player::AiPlayer;
pub use profile::SearchProfile;
pub use search::{SearchResult, Searcher, MATE_SCORE};
