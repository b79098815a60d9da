//! Game state machine.
//!
//! A [`Game`] moves through `Menu -> Playing -> Ended`. While playing it
//! accepts validated moves, keeps an append-only history and recomputes
//! check, checkmate and stalemate after every move. Nothing leaves `Ended`
//! except starting a new game or returning to the menu.

use std::fmt;

use thiserror::Error;
use wizard_core::{Color, Difficulty, FenError, Move, NotationError, PieceKind, Position};

use crate::movegen::{legal_moves_from, make_move};
use crate::rules::{DrawReason, GameResult, RuleSet, WizardChess};
use crate::{Board, MoveList};

/// Error type for game operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The move is not legal in the current position.
    #[error("illegal move: {0}")]
    IllegalMove(String),
    /// The move text could not be parsed.
    #[error("invalid move notation: {0}")]
    InvalidNotation(#[from] NotationError),
    /// The game has already ended.
    #[error("game has already ended")]
    GameAlreadyOver,
    /// No game is in progress.
    #[error("no game in progress")]
    NotPlaying,
    /// There is no move to take back.
    #[error("no moves to undo")]
    NothingToUndo,
}

/// Lifecycle phase of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GamePhase {
    #[default]
    Menu,
    Playing,
    Ended,
}

/// Who controls each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameMode {
    #[default]
    HumanVsHuman,
    HumanVsAi {
        ai_color: Color,
    },
    AiVsAi,
}

impl GameMode {
    /// Returns true if the AI plays `color` in this mode.
    pub fn is_ai(self, color: Color) -> bool {
        match self {
            GameMode::HumanVsHuman => false,
            GameMode::HumanVsAi { ai_color } => ai_color == color,
            GameMode::AiVsAi => true,
        }
    }
}

/// Snapshot of a game: board, side to move, history and status flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    current_player: Color,
    move_history: Vec<Move>,
    phase: GamePhase,
    is_in_check: bool,
    is_checkmate: bool,
    is_stalemate: bool,
    winner: Option<Color>,
    start_board: Board,
    start_player: Color,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Board::initial(), Color::White)
    }
}

impl GameState {
    /// Creates a state in the menu phase for the given board.
    pub fn new(board: Board, side: Color) -> Self {
        GameState {
            start_board: board.clone(),
            start_player: side,
            board,
            current_player: side,
            move_history: Vec::new(),
            phase: GamePhase::Menu,
            is_in_check: false,
            is_checkmate: false,
            is_stalemate: false,
            winner: None,
        }
    }

    /// Creates a playing state, already classified (it may start ended).
    pub fn playing(board: Board, side: Color) -> Self {
        let mut state = Self::new(board, side);
        state.phase = GamePhase::Playing;
        state.refresh_status();
        state
    }

    /// Rebuilds a state by replaying moves from a starting board.
    ///
    /// The moves are trusted to be the history of a real game.
    pub fn replay(start_board: &Board, start_player: Color, moves: &[Move]) -> Self {
        let mut state = Self::playing(start_board.clone(), start_player);
        for m in moves {
            state.push_move(*m);
        }
        state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Color {
        self.current_player
    }

    pub fn move_history(&self) -> &[Move] {
        &self.move_history
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_in_check(&self) -> bool {
        self.is_in_check
    }

    pub fn is_checkmate(&self) -> bool {
        self.is_checkmate
    }

    pub fn is_stalemate(&self) -> bool {
        self.is_stalemate
    }

    /// The side that delivered checkmate, if any.
    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    pub fn start_board(&self) -> &Board {
        &self.start_board
    }

    pub fn start_player(&self) -> Color {
        self.start_player
    }

    /// Returns the number of plies played.
    pub fn ply_count(&self) -> usize {
        self.move_history.len()
    }

    /// Returns the result once the game is decided on the board.
    pub fn result(&self) -> Option<GameResult> {
        if self.is_checkmate {
            self.winner.map(GameResult::win_for)
        } else if self.is_stalemate {
            Some(GameResult::Draw(DrawReason::Stalemate))
        } else {
            None
        }
    }

    /// All legal moves for the side to move.
    pub fn legal_moves(&self) -> MoveList {
        WizardChess.generate_moves(&self.board, self.current_player)
    }

    /// Board hash before each move in the history, in order.
    pub fn hashes_before_moves(&self) -> Vec<u64> {
        let mut board = self.start_board.clone();
        let mut side = self.start_player;
        let mut hashes = Vec::with_capacity(self.move_history.len());
        for m in &self.move_history {
            hashes.push(board.zobrist_hash(side));
            board = make_move(&board, m);
            side = side.opposite();
        }
        hashes
    }

    /// Hash of the current board with the side to move.
    pub fn hash(&self) -> u64 {
        self.board.zobrist_hash(self.current_player)
    }

    /// Checks and applies a move for the side to move.
    pub fn apply_move(&mut self, m: Move) -> Result<(), GameError> {
        match self.phase {
            GamePhase::Menu => return Err(GameError::NotPlaying),
            GamePhase::Ended => return Err(GameError::GameAlreadyOver),
            GamePhase::Playing => {}
        }
        if !self.legal_moves().as_slice().contains(&m) {
            return Err(GameError::IllegalMove(m.to_notation()));
        }
        self.push_move(m);
        Ok(())
    }

    fn push_move(&mut self, m: Move) {
        self.board = make_move(&self.board, &m);
        self.move_history.push(m);
        self.current_player = self.current_player.opposite();
        self.refresh_status();
    }

    fn refresh_status(&mut self) {
        let side = self.current_player;
        self.is_in_check = WizardChess.is_check(&self.board, side);
        self.is_checkmate = false;
        self.is_stalemate = false;
        self.winner = None;

        match WizardChess.game_result(&self.board, side) {
            Some(GameResult::Draw(_)) => {
                self.is_stalemate = true;
                self.phase = GamePhase::Ended;
            }
            Some(result) => {
                self.is_checkmate = true;
                self.winner = result.winner();
                self.phase = GamePhase::Ended;
            }
            None => {}
        }
    }
}

/// Outcome of a [`Game::select_square`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The call had no effect.
    Ignored,
    /// A piece of the side to move is now selected.
    Selected(Position),
    /// The selection was cleared.
    Cleared,
    /// The selected piece moved.
    Moved(Move),
}

/// An interactive game: state plus mode, difficulty and square selection.
#[derive(Debug, Clone, Default)]
pub struct Game {
    state: GameState,
    mode: GameMode,
    difficulty: Difficulty,
    selected: Option<Position>,
    valid_moves: Vec<Move>,
}

impl Game {
    /// Creates a game sitting in the menu.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the board, history and flags and starts playing.
    pub fn start_game(&mut self, mode: GameMode, difficulty: Difficulty) {
        self.state = GameState::playing(WizardChess.initial_board(), Color::White);
        self.mode = mode;
        self.difficulty = difficulty;
        self.clear_selection();
    }

    /// Starts a game from a board in text notation.
    pub fn from_fen(fen: &str, mode: GameMode, difficulty: Difficulty) -> Result<Self, FenError> {
        let (board, side) = Board::from_fen_with_side(fen)?;
        Ok(Game {
            state: GameState::playing(board, side),
            mode,
            difficulty,
            selected: None,
            valid_moves: Vec::new(),
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn board(&self) -> &Board {
        self.state.board()
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase()
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn selected(&self) -> Option<Position> {
        self.selected
    }

    /// Legal moves of the selected piece.
    pub fn valid_moves(&self) -> &[Move] {
        &self.valid_moves
    }

    /// Returns true if the AI is to move in a live game.
    pub fn is_ai_turn(&self) -> bool {
        self.state.phase() == GamePhase::Playing && self.mode.is_ai(self.state.current_player())
    }

    /// Checks and applies a move for the side to move.
    pub fn apply_move(&mut self, m: Move) -> Result<(), GameError> {
        self.state.apply_move(m)?;
        self.clear_selection();
        Ok(())
    }

    /// Moves the piece on `from` to `to`. Promotions default to a queen.
    pub fn make_player_move(&mut self, from: Position, to: Position) -> Result<Move, GameError> {
        self.make_move_with_promotion(from, to, None)
    }

    /// Applies a move given in notation, e.g. `d1d3` or `d1xd3`.
    pub fn make_move_notation(&mut self, notation: &str) -> Result<Move, GameError> {
        let (from, to, promotion) = Move::parse_notation(notation)?;
        self.make_move_with_promotion(from, to, promotion)
    }

    fn make_move_with_promotion(
        &mut self,
        from: Position,
        to: Position,
        promotion: Option<PieceKind>,
    ) -> Result<Move, GameError> {
        if self.state.phase() == GamePhase::Ended {
            return Err(GameError::GameAlreadyOver);
        }
        let m = legal_moves_from(self.state.board(), from)
            .as_slice()
            .iter()
            .copied()
            .find(|m| m.piece().color == self.state.current_player() && m.matches(from, to, promotion))
            .ok_or_else(|| GameError::IllegalMove(format!("{}{}", from, to)))?;
        self.apply_move(m)?;
        Ok(m)
    }

    /// Selection entry point for interactive play.
    ///
    /// Picking a piece of the side to move selects it; picking one of its
    /// destinations afterwards plays the move. Anything else clears the
    /// selection. Ignored outside play and while the AI is to move.
    pub fn select_square(&mut self, pos: Option<Position>) -> Selection {
        if self.state.phase() != GamePhase::Playing || self.is_ai_turn() {
            return Selection::Ignored;
        }
        let Some(pos) = pos else {
            self.clear_selection();
            return Selection::Cleared;
        };

        if self.selected.is_some() {
            if let Some(m) = self.valid_moves.iter().copied().find(|m| m.to() == pos) {
                return match self.apply_move(m) {
                    Ok(()) => Selection::Moved(m),
                    Err(_) => {
                        self.clear_selection();
                        Selection::Cleared
                    }
                };
            }
        }

        match self.state.board().piece_at(pos) {
            Some(piece) if piece.color == self.state.current_player() => {
                self.selected = Some(pos);
                self.valid_moves = legal_moves_from(self.state.board(), pos).into_vec();
                Selection::Selected(pos)
            }
            _ => {
                self.clear_selection();
                Selection::Cleared
            }
        }
    }

    /// Takes back the last ply by replaying the rest of the history.
    pub fn undo(&mut self) -> Result<Move, GameError> {
        match self.state.phase() {
            GamePhase::Menu => return Err(GameError::NotPlaying),
            GamePhase::Ended => return Err(GameError::GameAlreadyOver),
            GamePhase::Playing => {}
        }
        let history = self.state.move_history();
        let Some((last, rest)) = history.split_last() else {
            return Err(GameError::NothingToUndo);
        };
        let last = *last;
        self.state = GameState::replay(self.state.start_board(), self.state.start_player(), rest);
        self.clear_selection();
        Ok(last)
    }

    /// Abandons the current game and returns to the menu.
    pub fn return_to_menu(&mut self) {
        self.state.phase = GamePhase::Menu;
        self.clear_selection();
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.valid_moves.clear();
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.state.board())?;
        write!(f, "{} to move", self.state.current_player())?;
        if self.state.is_checkmate() {
            write!(f, " (checkmate)")?;
        } else if self.state.is_stalemate() {
            write!(f, " (stalemate)")?;
        } else if self.state.is_in_check() {
            write!(f, " (check)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Position {
        Position::from_algebraic(s).unwrap()
    }

    fn playing() -> Game {
        let mut game = Game::new();
        game.start_game(GameMode::HumanVsHuman, Difficulty::Medium);
        game
    }

    #[test]
    fn starts_in_menu() {
        let game = Game::new();
        assert_eq!(game.phase(), GamePhase::Menu);
        assert!(game.state().move_history().is_empty());
    }

    #[test]
    fn moves_rejected_outside_play() {
        let mut game = Game::new();
        let m = game.state().legal_moves()[0];
        assert_eq!(game.apply_move(m), Err(GameError::NotPlaying));
    }

    #[test]
    fn start_game_resets() {
        let mut game = playing();
        game.make_player_move(sq("e2"), sq("e4")).unwrap();
        game.start_game(GameMode::AiVsAi, Difficulty::Hard);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert!(game.state().move_history().is_empty());
        assert_eq!(game.state().current_player(), Color::White);
        assert_eq!(game.mode(), GameMode::AiVsAi);
        assert_eq!(game.difficulty(), Difficulty::Hard);
    }

    #[test]
    fn apply_move_flips_turn_and_records() {
        let mut game = playing();
        let m = game.make_player_move(sq("d1"), sq("d3")).unwrap();
        assert!(m.is_wizard_teleport());
        assert_eq!(game.state().current_player(), Color::Black);
        assert_eq!(game.state().move_history(), &[m]);
    }

    #[test]
    fn illegal_move_rejected() {
        let mut game = playing();
        let err = game.make_player_move(sq("e2"), sq("e5")).unwrap_err();
        assert!(matches!(err, GameError::IllegalMove(_)));
        // Black piece on White's turn.
        assert!(game.make_player_move(sq("e9"), sq("e8")).is_err());
        assert!(game.state().move_history().is_empty());
    }

    #[test]
    fn notation_moves() {
        let mut game = playing();
        game.make_move_notation("e2e4").unwrap();
        game.make_move_notation("e9e7").unwrap();
        assert_eq!(game.state().ply_count(), 2);
        assert!(matches!(
            game.make_move_notation("zz"),
            Err(GameError::InvalidNotation(_))
        ));
    }

    #[test]
    fn checkmate_sets_winner_to_mover() {
        let mut game = Game::from_fen(
            "k9/10/10/10/10/r9/10/10/4PPP3/5K4 b",
            GameMode::HumanVsHuman,
            Difficulty::Medium,
        )
        .unwrap();
        assert_eq!(game.phase(), GamePhase::Playing);

        game.make_player_move(sq("a5"), sq("a1")).unwrap();
        let state = game.state();
        assert_eq!(state.phase(), GamePhase::Ended);
        assert!(state.is_in_check());
        assert!(state.is_checkmate());
        assert!(!state.is_stalemate());
        assert_eq!(state.winner(), Some(Color::Black));
        assert_eq!(state.result(), Some(GameResult::BlackWins));
    }

    #[test]
    fn stalemate_has_no_winner() {
        let game = Game::from_fen(
            "k9/10/1Q8/10/10/10/10/10/10/9K b",
            GameMode::HumanVsHuman,
            Difficulty::Medium,
        )
        .unwrap();
        assert_eq!(game.phase(), GamePhase::Ended);
        assert!(game.state().is_stalemate());
        assert!(!game.state().is_checkmate());
        assert_eq!(game.state().winner(), None);
    }

    #[test]
    fn no_transition_leaves_ended() {
        let mut game = Game::from_fen(
            "k9/10/1Q8/10/10/10/10/10/10/9K b",
            GameMode::HumanVsHuman,
            Difficulty::Medium,
        )
        .unwrap();
        assert_eq!(game.undo(), Err(GameError::GameAlreadyOver));
        assert_eq!(game.select_square(Some(sq("a10"))), Selection::Ignored);
        assert_eq!(
            game.make_player_move(sq("a10"), sq("b10")),
            Err(GameError::GameAlreadyOver)
        );
        game.return_to_menu();
        assert_eq!(game.phase(), GamePhase::Menu);
    }

    #[test]
    fn undo_replays_history() {
        let mut game = playing();
        game.make_player_move(sq("e2"), sq("e4")).unwrap();
        let after_one = game.state().clone();
        game.make_player_move(sq("d10"), sq("d8")).unwrap();
        let undone = game.undo().unwrap();
        assert!(undone.is_wizard_teleport());
        assert_eq!(game.state(), &after_one);
        game.undo().unwrap();
        assert_eq!(game.state().board(), &Board::initial());
        assert_eq!(game.undo(), Err(GameError::NothingToUndo));
    }

    #[test]
    fn selection_flow() {
        let mut game = playing();
        assert_eq!(game.select_square(Some(sq("e2"))), Selection::Selected(sq("e2")));
        assert_eq!(game.valid_moves().len(), 2);

        // Clicking an unreachable square clears the selection.
        assert_eq!(game.select_square(Some(sq("e6"))), Selection::Cleared);
        assert_eq!(game.selected(), None);

        // Black piece on White's turn cannot be selected.
        assert_eq!(game.select_square(Some(sq("e9"))), Selection::Cleared);

        game.select_square(Some(sq("e2")));
        match game.select_square(Some(sq("e4"))) {
            Selection::Moved(m) => assert_eq!(m.to(), sq("e4")),
            other => panic!("expected a move, got {:?}", other),
        }
        assert_eq!(game.state().current_player(), Color::Black);
        assert!(game.valid_moves().is_empty());
    }

    #[test]
    fn reselecting_switches_piece() {
        let mut game = playing();
        game.select_square(Some(sq("e2")));
        assert_eq!(game.select_square(Some(sq("d1"))), Selection::Selected(sq("d1")));
        assert_eq!(game.valid_moves().len(), 3);
        assert_eq!(game.select_square(None), Selection::Cleared);
    }

    #[test]
    fn human_cannot_select_on_ai_turn() {
        let mut game = Game::new();
        game.start_game(GameMode::HumanVsAi { ai_color: Color::White }, Difficulty::Easy);
        assert!(game.is_ai_turn());
        assert_eq!(game.select_square(Some(sq("e2"))), Selection::Ignored);
    }
}
