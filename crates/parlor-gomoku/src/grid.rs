//! The board: a fixed 15×15 grid of tri-state cells.
//!
//! Pure data. A cell is `None` (empty) or `Some(color)`; the only way to
//! fill one is through the rule engine, which refuses occupied cells.

use std::fmt;

use parlor_protocol::Color;
use serde::{Deserialize, Serialize};

/// Width and height of the board.
pub const BOARD_SIZE: usize = 15;

/// A stone placement: column `x`, row `y`, and its colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub x: usize,
    pub y: usize,
    pub color: Color,
}

impl Move {
    pub fn new(x: usize, y: usize, color: Color) -> Self {
        Self { x, y, color }
    }
}

/// The N×N board, indexed `[y][x]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    cells: [[Option<Color>; BOARD_SIZE]; BOARD_SIZE],
}

impl Grid {
    /// An empty board.
    pub fn new() -> Self {
        Self {
            cells: [[None; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Returns `true` if `(x, y)` lies on the board.
    pub fn in_bounds(x: usize, y: usize) -> bool {
        x < BOARD_SIZE && y < BOARD_SIZE
    }

    /// The stone at `(x, y)`, or `None` for an empty or off-board cell.
    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        if Self::in_bounds(x, y) {
            self.cells[y][x]
        } else {
            None
        }
    }

    /// Returns `true` if `(x, y)` is on the board and empty.
    pub fn is_empty_at(&self, x: usize, y: usize) -> bool {
        Self::in_bounds(x, y) && self.cells[y][x].is_none()
    }

    /// Returns `true` once every cell holds a stone.
    pub fn is_full(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_some)
    }

    /// Number of stones on the board.
    pub fn stone_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }

    /// Every stone on the board, row by row.
    pub fn occupied(&self) -> Vec<Move> {
        let mut stones = Vec::new();
        for (y, row) in self.cells.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                if let Some(color) = cell {
                    stones.push(Move::new(x, y, *color));
                }
            }
        }
        stones
    }

    /// Writes a stone. Callers have already checked bounds and emptiness.
    pub(crate) fn set(&mut self, mv: Move) {
        self.cells[mv.y][mv.x] = Some(mv.color);
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

/// Plain-text rendering: `x` for black, `o` for white, `.` for empty,
/// with column letters along the top.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for x in 0..BOARD_SIZE {
            write!(f, "{x:>3}")?;
        }
        writeln!(f)?;
        for (y, row) in self.cells.iter().enumerate() {
            write!(f, "{y:>3}")?;
            for cell in row {
                let glyph = match cell {
                    Some(Color::Black) => 'x',
                    Some(Color::White) => 'o',
                    None => '.',
                };
                write!(f, "{glyph:>3}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
