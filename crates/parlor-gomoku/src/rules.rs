//! The Gomoku rule engine.
//!
//! Everything here is a pure function of a board and the stone that was
//! just placed. Both peers run the exact same functions on the exact same
//! inputs, which is what keeps two independent boards identical.
//!
//! Only lines through the new stone are inspected. A five (or longer)
//! anywhere else on the board must already have ended the game.

use parlor_protocol::Color;
use serde::{Deserialize, Serialize};

use crate::{GomokuError, Grid, Move};

/// Run length that wins the game.
pub const WIN_LENGTH: usize = 5;

/// The four axes through a cell: horizontal, vertical, `\` and `/`.
const AXES: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// Where the game stands after a placement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameStatus {
    /// `true` once somebody won or the board filled up.
    pub is_over: bool,
    /// The winning colour. `None` while playing and on a draw.
    pub winner: Option<Color>,
    /// The run that won, including the placed stone. May be longer than
    /// five; the order is whatever the scan produced.
    pub winning_line: Option<Vec<Move>>,
}

impl GameStatus {
    /// A game still in progress.
    pub fn in_progress() -> Self {
        Self::default()
    }

    fn won(color: Color, line: Vec<Move>) -> Self {
        Self {
            is_over: true,
            winner: Some(color),
            winning_line: Some(line),
        }
    }

    fn drawn() -> Self {
        Self {
            is_over: true,
            winner: None,
            winning_line: None,
        }
    }
}

/// The result of [`apply_move`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// The board with the new stone on it.
    pub grid: Grid,
    /// Win / draw / in progress.
    pub status: GameStatus,
    /// Advisory highlight: cells in runs of exactly 3 or 4 through the new
    /// stone. Empty on a winning move.
    pub threats: Vec<Move>,
}

/// Places `mv` on a copy of `grid` and evaluates the result.
///
/// Turn order and game-over are the caller's business (see
/// [`GomokuGame::play`](crate::GomokuGame::play)); this only enforces that
/// the target cell exists and is empty.
///
/// # Errors
/// - [`GomokuError::OutOfBounds`]: `x` or `y` is off the board
/// - [`GomokuError::Occupied`]: the cell already holds a stone
pub fn apply_move(grid: &Grid, mv: Move) -> Result<Placement, GomokuError> {
    if !Grid::in_bounds(mv.x, mv.y) {
        return Err(GomokuError::OutOfBounds { x: mv.x, y: mv.y });
    }
    if let Some(existing) = grid.get(mv.x, mv.y) {
        return Err(GomokuError::Occupied {
            x: mv.x,
            y: mv.y,
            by: existing,
        });
    }

    let mut next = grid.clone();
    next.set(mv);

    let status = check_win(&next, mv);
    let threats = if status.is_over {
        Vec::new()
    } else {
        find_threats(&next, mv)
    };

    Ok(Placement {
        grid: next,
        status,
        threats,
    })
}

/// Evaluates the board right after `last` was placed on it.
pub fn check_win(grid: &Grid, last: Move) -> GameStatus {
    for (dx, dy) in AXES {
        let run = run_through(grid, last, dx, dy);
        if run.len() >= WIN_LENGTH {
            return GameStatus::won(last.color, run);
        }
    }

    if grid.is_full() {
        return GameStatus::drawn();
    }
    GameStatus::in_progress()
}

/// Cells in runs of exactly three or four through `last`, merged across
/// axes without duplicates. A winning run on any axis means no threats.
pub fn find_threats(grid: &Grid, last: Move) -> Vec<Move> {
    let mut threats: Vec<Move> = Vec::new();

    for (dx, dy) in AXES {
        let run = run_through(grid, last, dx, dy);
        match run.len() {
            n if n >= WIN_LENGTH => return Vec::new(),
            3 | 4 => {
                for cell in run {
                    if !threats.contains(&cell) {
                        threats.push(cell);
                    }
                }
            }
            _ => {}
        }
    }

    threats
}

/// The contiguous same-colour run through `origin` along `(dx, dy)`,
/// walking both ways until the colour changes or the board ends.
fn run_through(grid: &Grid, origin: Move, dx: isize, dy: isize) -> Vec<Move> {
    let mut run = vec![origin];
    for sign in [1, -1] {
        let mut step = 1;
        while let Some((x, y)) = offset(origin, dx * sign * step, dy * sign * step) {
            if grid.get(x, y) != Some(origin.color) {
                break;
            }
            run.push(Move::new(x, y, origin.color));
            step += 1;
        }
    }
    run
}

fn offset(origin: Move, dx: isize, dy: isize) -> Option<(usize, usize)> {
    let x = origin.x.checked_add_signed(dx)?;
    let y = origin.y.checked_add_signed(dy)?;
    Grid::in_bounds(x, y).then_some((x, y))
}

// =========================================================================
// Tests
// =========================================================================
