//! Error types for the Gomoku engine.

use parlor_protocol::Color;

/// Reasons a placement is refused. A refused placement never changes the
/// board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GomokuError {
    /// The coordinates are off the board.
    #[error("({x}, {y}) is off the board")]
    OutOfBounds { x: usize, y: usize },

    /// The cell already holds a stone.
    #[error("({x}, {y}) is already taken by {by}")]
    Occupied { x: usize, y: usize, by: Color },

    /// A stone of the wrong colour for this turn.
    #[error("it is {expected}'s turn, not {got}'s")]
    NotYourTurn { expected: Color, got: Color },

    /// The game already has a result; restart before playing again.
    #[error("the game is over")]
    GameOver,
}
