//! Error types for the dice table.

use crate::{Bid, Phase, SeatId};

/// Reasons the table refuses an action. A refused action never changes
/// the table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiceError {
    /// A table needs at least two seats.
    #[error("a table needs at least 2 players, got {count}")]
    NotEnoughPlayers { count: usize },

    /// Two seats share an id.
    #[error("seat {0} appears twice")]
    DuplicateSeat(SeatId),

    /// No seat with this id.
    #[error("no seat {0} at this table")]
    UnknownSeat(SeatId),

    /// The action does not apply in the current phase.
    #[error("cannot {action} while {phase}")]
    WrongPhase { action: &'static str, phase: Phase },

    /// Someone other than the active player tried to act.
    #[error("it is {expected}'s turn, not {got}'s")]
    NotYourTurn { expected: SeatId, got: SeatId },

    /// Zero dice or a face outside 1-6.
    #[error("bid {0} is not a valid claim")]
    InvalidBid(Bid),

    /// The bid does not strictly beat the table.
    #[error("bid {bid} does not beat {current}")]
    BidTooLow { bid: Bid, current: Bid },

    /// A call needs a bid on the table.
    #[error("there is no bid to call")]
    NoBidToCall,

    /// The seat's hand is already known this round.
    #[error("{0} has already revealed")]
    AlreadyRevealed(SeatId),

    /// A rolled or revealed hand has the wrong size or an impossible face.
    #[error("bad hand for {seat}: {reason}")]
    InvalidHand { seat: SeatId, reason: String },
}
