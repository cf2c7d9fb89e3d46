//! Gomoku (five-in-a-row) for Parlor.
//!
//! Two layers:
//!
//! - **Rules** ([`apply_move`], [`check_win`], [`find_threats`]): pure
//!   functions from a [`Grid`] and the stone just placed to a result.
//!   Both peers run these on identical inputs and so always agree.
//! - **Game** ([`GomokuGame`]): the caller-side bookkeeping the rules
//!   leave out: whose turn it is and whether the game already ended.
//!
//! [`fallback_move`] picks a cell locally when no move suggestion is
//! available or a suggestion turns out to be unplayable.

mod error;
mod fallback;
mod game;
mod grid;
mod rules;

pub use error::GomokuError;
pub use fallback::{fallback_move, is_playable};
pub use game::GomokuGame;
pub use grid::{BOARD_SIZE, Grid, Move};
pub use rules::{GameStatus, Placement, WIN_LENGTH, apply_move, check_win, find_threats};
