//! Bids and their ordering.

use std::fmt;

pub use parlor_protocol::MAX_FACE;
use serde::{Deserialize, Serialize};

use crate::SeatId;

/// The wild face. It counts toward every claim when a call is settled.
pub const WILD_FACE: u8 = 1;

/// A claim that at least `quantity` dice on the table show `face`.
///
/// Bids are totally ordered: more dice always beats fewer, and at equal
/// quantity the higher face wins. A bid never beats itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bid {
    pub quantity: u32,
    pub face: u8,
}

impl Bid {
    pub fn new(quantity: u32, face: u8) -> Self {
        Self { quantity, face }
    }

    /// At least one die, showing a real face.
    pub fn is_well_formed(&self) -> bool {
        self.quantity >= 1 && (WILD_FACE..=MAX_FACE).contains(&self.face)
    }

    /// Returns `true` if `self` strictly outranks `other`.
    pub fn beats(&self, other: &Bid) -> bool {
        self.quantity > other.quantity
            || (self.quantity == other.quantity && self.face > other.face)
    }

    /// Whether this bid may be placed over `current`. Any well-formed bid
    /// opens an empty table.
    pub fn is_legal_over(&self, current: Option<&Bid>) -> bool {
        self.is_well_formed() && current.is_none_or(|c| self.beats(c))
    }

    /// The smallest bid that beats this one: the next face up, or one more
    /// die on the wild face once the faces run out.
    pub fn minimal_raise(&self) -> Bid {
        if self.face >= MAX_FACE {
            Bid::new(self.quantity + 1, WILD_FACE)
        } else {
            Bid::new(self.quantity, self.face + 1)
        }
    }

    /// Whether a die counts toward this bid (its face or a wild).
    pub fn counts(&self, die: u8) -> bool {
        die == self.face || die == WILD_FACE
    }
}

impl fmt::Display for Bid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.quantity, self.face)
    }
}

/// A bid as it sits on the table, with the seat that made it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableBid {
    pub bid: Bid,
    pub owner: SeatId,
}

/// Turns whatever an automated opponent proposed into a bid the table will
/// accept.
///
/// A legal proposal passes through untouched. An illegal raise becomes the
/// minimal raise over `current`. On an empty table the proposal is clamped
/// into range instead.
pub fn coerce_bid(proposed: Bid, current: Option<&Bid>) -> Bid {
    match current {
        _ if proposed.is_legal_over(current) => proposed,
        Some(current) => current.minimal_raise(),
        None => Bid::new(
            proposed.quantity.max(1),
            proposed.face.clamp(WILD_FACE, MAX_FACE),
        ),
    }
}

/// Number of dice across `hands` that count toward `bid`.
pub fn count_matching<'a>(hands: impl IntoIterator<Item = &'a [u8]>, bid: &Bid) -> usize {
    hands
        .into_iter()
        .flatten()
        .filter(|die| bid.counts(**die))
        .count()
}
