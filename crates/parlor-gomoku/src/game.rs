//! A running Gomoku game: board, turn and result in one place.

use parlor_protocol::Color;
use tracing::debug;

use crate::{GameStatus, GomokuError, Grid, Move, apply_move};

/// One game of Gomoku.
///
/// Wraps the pure rule engine with the bookkeeping it leaves to callers:
/// whose turn it is, whether the game already ended, and the most recent
/// threat highlight. Black always moves first.
///
/// ```rust
/// use parlor_gomoku::GomokuGame;
/// use parlor_protocol::Color;
///
/// let mut game = GomokuGame::new();
/// game.play(7, 7, Color::Black).unwrap();
/// assert_eq!(game.to_move(), Color::White);
/// assert!(game.play(7, 8, Color::Black).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct GomokuGame {
    grid: Grid,
    to_move: Color,
    status: GameStatus,
    threats: Vec<Move>,
    last_move: Option<Move>,
}

impl GomokuGame {
    /// An empty board with Black to move.
    pub fn new() -> Self {
        Self {
            grid: Grid::new(),
            to_move: Color::Black,
            status: GameStatus::in_progress(),
            threats: Vec::new(),
            last_move: None,
        }
    }

    /// Places a stone of `color` at `(x, y)`.
    ///
    /// On success the board, status and threats are updated, and the turn
    /// passes to the other colour unless the move ended the game.
    ///
    /// # Errors
    /// - [`GomokuError::GameOver`] if the game already has a result
    /// - [`GomokuError::NotYourTurn`] if `color` is not the side to move
    /// - anything [`apply_move`] rejects
    pub fn play(&mut self, x: usize, y: usize, color: Color) -> Result<&GameStatus, GomokuError> {
        if self.status.is_over {
            return Err(GomokuError::GameOver);
        }
        if color != self.to_move {
            return Err(GomokuError::NotYourTurn {
                expected: self.to_move,
                got: color,
            });
        }

        let mv = Move::new(x, y, color);
        let placement = apply_move(&self.grid, mv)?;

        self.grid = placement.grid;
        self.status = placement.status;
        self.threats = placement.threats;
        self.last_move = Some(mv);
        if !self.status.is_over {
            self.to_move = color.opponent();
        }

        debug!(x, y, %color, over = self.status.is_over, "stone placed");
        Ok(&self.status)
    }

    /// Clears the board and hands the first move back to Black.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The colour whose stone is expected next. After the game ends this
    /// is the colour that made the final move.
    pub fn to_move(&self) -> Color {
        self.to_move
    }

    pub fn status(&self) -> &GameStatus {
        &self.status
    }

    /// Highlight cells from the most recent move.
    pub fn threats(&self) -> &[Move] {
        &self.threats
    }

    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    pub fn is_over(&self) -> bool {
        self.status.is_over
    }
}

impl Default for GomokuGame {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_alternates_turns() {
        let mut game = GomokuGame::new();
        assert_eq!(game.to_move(), Color::Black);
        game.play(0, 0, Color::Black).unwrap();
        assert_eq!(game.to_move(), Color::White);
        game.play(1, 1, Color::White).unwrap();
        assert_eq!(game.to_move(), Color::Black);
        assert_eq!(game.last_move(), Some(Move::new(1, 1, Color::White)));
    }

    #[test]
    fn test_play_wrong_colour_rejected() {
        let mut game = GomokuGame::new();
        let err = game.play(0, 0, Color::White).unwrap_err();
        assert_eq!(
            err,
            GomokuError::NotYourTurn {
                expected: Color::Black,
                got: Color::White
            }
        );
        assert_eq!(game.grid().stone_count(), 0);
    }

    #[test]
    fn test_play_occupied_keeps_turn() {
        let mut game = GomokuGame::new();
        game.play(3, 3, Color::Black).unwrap();
        assert!(game.play(3, 3, Color::White).is_err());
        assert_eq!(game.to_move(), Color::White);
    }

    #[test]
    fn test_play_after_win_rejected() {
        let mut game = GomokuGame::new();
        for y in 0..4 {
            game.play(0, y, Color::Black).unwrap();
            game.play(5, y, Color::White).unwrap();
        }
        let status = game.play(0, 4, Color::Black).unwrap();
        assert_eq!(status.winner, Some(Color::Black));

        assert!(matches!(
            game.play(9, 9, Color::White),
            Err(GomokuError::GameOver)
        ));
        assert!(game.threats().is_empty());
    }

    #[test]
    fn test_play_records_threats() {
        let mut game = GomokuGame::new();
        game.play(0, 0, Color::Black).unwrap();
        game.play(9, 9, Color::White).unwrap();
        game.play(1, 0, Color::Black).unwrap();
        game.play(9, 10, Color::White).unwrap();
        game.play(2, 0, Color::Black).unwrap();
        assert_eq!(game.threats().len(), 3);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut game = GomokuGame::new();
        game.play(7, 7, Color::Black).unwrap();
        game.reset();
        assert_eq!(game.grid().stone_count(), 0);
        assert_eq!(game.to_move(), Color::Black);
        assert!(!game.is_over());
        assert_eq!(game.last_move(), None);
    }
}
