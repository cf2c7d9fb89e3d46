//! Decisions for automated opponents.
//!
//! An automated seat normally asks a bid advisor what to do. When the
//! advisor is missing or fails, [`fallback_decision`] answers instead.
//! It only sees what the seat itself could see: its own hand and the
//! number of dice in play.

use serde::{Deserialize, Serialize};

use crate::{Bid, MAX_FACE, WILD_FACE};

/// What an automated seat wants to do on its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BidDecision {
    Bid(Bid),
    Call,
}

/// A deterministic fallback move.
///
/// The seat estimates how many dice on the table count toward a face:
/// its own matching dice, plus a third of the dice it cannot see (a
/// hidden die shows the face or a wild one time in three). It calls when
/// the table bid claims more than that. Otherwise it raises, on its best
/// face if that beats the table at the same quantity, else by the
/// minimal raise. On an empty table it opens with its best face.
pub fn fallback_decision(hand: &[u8], total_dice: usize, current: Option<&Bid>) -> BidDecision {
    let unseen = total_dice.saturating_sub(hand.len());
    let best = best_face(hand);

    let Some(current) = current else {
        let quantity = own_matches(hand, best).max(1);
        return BidDecision::Bid(Bid::new(quantity as u32, best));
    };

    // Compare in thirds to stay in integers.
    let expected_thirds = own_matches(hand, current.face) * 3 + unseen;
    if current.quantity as usize * 3 > expected_thirds {
        return BidDecision::Call;
    }

    let on_best = Bid::new(current.quantity, best);
    let raise = if on_best.beats(current) {
        on_best
    } else {
        current.minimal_raise()
    };
    BidDecision::Bid(raise)
}

/// Dice in `hand` counting toward `face`.
fn own_matches(hand: &[u8], face: u8) -> usize {
    hand.iter()
        .filter(|&&d| d == face || d == WILD_FACE)
        .count()
}

/// The non-wild face with the most support in `hand`; higher faces win
/// ties. Any face is as good as another for an empty hand, so that opens
/// on 2.
fn best_face(hand: &[u8]) -> u8 {
    (WILD_FACE + 1..=MAX_FACE)
        .max_by_key(|&face| (own_matches(hand, face), face))
        .filter(|&face| own_matches(hand, face) > 0)
        .unwrap_or(WILD_FACE + 1)
}
