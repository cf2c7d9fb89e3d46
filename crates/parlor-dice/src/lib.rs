//! Liar's Dice for Parlor.
//!
//! - [`Bid`]: claims and their total order, plus [`coerce_bid`] for
//!   keeping automated opponents from stalling the table.
//! - [`DicePlayer`] / [`Hand`]: seats, including remote seats whose dice
//!   stay [`Hand::Hidden`] until revealed.
//! - [`DiceTable`]: the round state machine: bid, call, reveal, settle.
//! - [`fallback_decision`]: what an automated seat does without advice.
//!
//! Randomness is confined to rolling hands in
//! [`DiceTable::start_round`]. Settling a call is a pure function of the
//! hands and the table bid, so two peers holding the same hands always
//! settle the same way.

mod ai;
mod bid;
mod error;
mod player;
mod table;

pub use ai::{BidDecision, fallback_decision};
pub use bid::{Bid, MAX_FACE, TableBid, WILD_FACE, coerce_bid, count_matching};
pub use error::DiceError;
pub use player::{DicePlayer, Hand, MAX_AI_OPPONENTS, Persona, STARTING_DICE, SeatId};
pub use table::{CallProgress, DiceTable, Phase, RoundResult};
