//! The Liar's Dice round state machine.
//!
//! A [`DiceTable`] moves through four phases:
//!
//! ```text
//!             start_round                place_bid (loops)
//! RoundOver ─────────────→ AwaitingBid ─────────────┐
//!     ↑                        │   ↑─────────────────┘
//!     │                   call │
//!     │                        ↓
//!     │   (all hands known) resolve ←── reveal ── AwaitingReveal
//!     │                        │                   (hidden hands)
//!     └──── more than one ─────┤
//!           player left        └──── one left ───→ GameOver
//! ```
//!
//! A fresh table starts in `RoundOver` with no result, so the first
//! `start_round` deals the opening round like every later one.
//!
//! Every transition is a method taking the acting seat and returning
//! `Result`. A refused action leaves the table exactly as it was, so a
//! peer replaying the other side's messages can treat any `Err` as the
//! two tables having drifted apart.
//!
//! Offline every hand is known from the start and a call settles at once.
//! Online the other peer's hand is [`Hand::Hidden`] until its `REVEAL`
//! arrives, which is what the `AwaitingReveal` phase waits for.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Bid, DiceError, DicePlayer, Hand, MAX_FACE, SeatId, TableBid, WILD_FACE, count_matching,
};

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where the table is in the round cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// The active player must bid or call.
    AwaitingBid,
    /// `caller` called; waiting for hidden hands to be revealed.
    AwaitingReveal { caller: SeatId },
    /// The last call is settled; the next round can be dealt.
    RoundOver,
    /// Only `winner` has dice left.
    GameOver { winner: SeatId },
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingBid => f.write_str("awaiting a bid"),
            Self::AwaitingReveal { caller } => write!(f, "awaiting reveals after {caller}'s call"),
            Self::RoundOver => f.write_str("between rounds"),
            Self::GameOver { winner } => write!(f, "game over ({winner} won)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// How a settled call came out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    /// The bid that was called.
    pub bid: TableBid,
    pub caller: SeatId,
    /// Dice on the table showing the bid's face or a wild.
    pub count: usize,
    /// Lost one die. The bidder if `count < quantity`, else the caller.
    pub loser: SeatId,
    /// The other party to the call. Opens the next round.
    pub winner: SeatId,
    /// Every hand that was in play, as counted.
    pub hands: Vec<(SeatId, Vec<u8>)>,
}

impl RoundResult {
    /// `true` if the caller was right and the bid was a bluff.
    pub fn call_succeeded(&self) -> bool {
        self.loser == self.bid.owner
    }
}

/// What a call or reveal led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallProgress {
    /// Every hand was known and the round is settled.
    Resolved(RoundResult),
    /// Still waiting on hidden hands.
    AwaitingReveal,
}

// ---------------------------------------------------------------------------
// DiceTable
// ---------------------------------------------------------------------------

/// One game of Liar's Dice.
///
/// Seat order is fixed at construction and is the turn order. Both peers
/// of an online game build their tables with the same order, which is
/// what lets them agree on whose turn it is without asking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiceTable {
    players: Vec<DicePlayer>,
    phase: Phase,
    current: Option<TableBid>,
    active: usize,
    round: u32,
    last_result: Option<RoundResult>,
    history: Vec<String>,
}

impl DiceTable {
    /// Seats `players` in order.
    ///
    /// # Errors
    /// - [`DiceError::NotEnoughPlayers`] for fewer than two seats
    /// - [`DiceError::DuplicateSeat`] if two seats share an id
    pub fn new(players: Vec<DicePlayer>) -> Result<Self, DiceError> {
        if players.len() < 2 {
            return Err(DiceError::NotEnoughPlayers {
                count: players.len(),
            });
        }
        for (i, player) in players.iter().enumerate() {
            if players[..i].iter().any(|p| p.id == player.id) {
                return Err(DiceError::DuplicateSeat(player.id.clone()));
            }
        }

        Ok(Self {
            players,
            phase: Phase::RoundOver,
            current: None,
            active: 0,
            round: 0,
            last_result: None,
            history: vec!["Game start!".to_string()],
        })
    }

    // -- Queries ------------------------------------------------------------

    pub fn players(&self) -> &[DicePlayer] {
        &self.players
    }

    pub fn player(&self, seat: &SeatId) -> Option<&DicePlayer> {
        self.players.iter().find(|p| &p.id == seat)
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn current_bid(&self) -> Option<&TableBid> {
        self.current.as_ref()
    }

    /// The seat expected to bid or call. `None` outside `AwaitingBid`.
    pub fn active_player(&self) -> Option<&DicePlayer> {
        match self.phase {
            Phase::AwaitingBid => self.players.get(self.active),
            _ => None,
        }
    }

    /// Dice still in play across every seat.
    pub fn total_dice(&self) -> usize {
        self.players.iter().map(DicePlayer::dice_count).sum()
    }

    /// Rounds dealt so far.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// The most recently settled call.
    pub fn last_result(&self) -> Option<&RoundResult> {
        self.last_result.as_ref()
    }

    /// Human-readable log of the game. Append-only; nothing reads it back.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// The winner once the game is over.
    pub fn winner(&self) -> Option<&SeatId> {
        match &self.phase {
            Phase::GameOver { winner } => Some(winner),
            _ => None,
        }
    }

    // -- Transitions --------------------------------------------------------

    /// Deals the next round with `rng`: uniform 1-6 for every surviving
    /// local or AI seat, hidden hands for remote seats.
    ///
    /// # Errors
    /// [`DiceError::WrongPhase`] unless the table is in `RoundOver`.
    pub fn start_round<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), DiceError> {
        self.start_round_with(|n| (0..n).map(|_| rng.random_range(WILD_FACE..=MAX_FACE)).collect())
    }

    /// Like [`start_round`](Self::start_round), but hands come from `roll`,
    /// which is asked for `n` dice per seat. Rolled hands are validated.
    ///
    /// The round opens with the previous round's winner, or the next seat
    /// after it that still has dice. The very first round opens with the
    /// first seat that has dice.
    ///
    /// # Errors
    /// - [`DiceError::WrongPhase`] unless the table is in `RoundOver`
    /// - [`DiceError::InvalidHand`] if `roll` returns a bad hand
    pub fn start_round_with<F>(&mut self, mut roll: F) -> Result<(), DiceError>
    where
        F: FnMut(usize) -> Vec<u8>,
    {
        if self.phase != Phase::RoundOver {
            return Err(self.wrong_phase("start a round"));
        }

        // Roll every hand before touching the table.
        let mut hands = Vec::with_capacity(self.players.len());
        for player in &self.players {
            let hand = if player.is_out() {
                Hand::Known(Vec::new())
            } else if player.is_remote {
                Hand::Hidden
            } else {
                let dice = roll(player.dice_count());
                check_hand(player, &dice)?;
                Hand::Known(dice)
            };
            hands.push(hand);
        }

        for (player, hand) in self.players.iter_mut().zip(hands) {
            player.set_hand(hand);
        }

        let opener = self
            .last_result
            .as_ref()
            .and_then(|r| self.seat_index(&r.winner))
            .unwrap_or(0);
        self.active = self.next_alive_from(opener);
        self.current = None;
        self.round += 1;
        self.phase = Phase::AwaitingBid;
        self.history.push(format!("--- Round {} ---", self.round));

        debug!(round = self.round, opener = %self.players[self.active].id, "round dealt");
        Ok(())
    }

    /// The active player raises the table bid.
    ///
    /// # Errors
    /// - [`DiceError::WrongPhase`] outside `AwaitingBid`
    /// - [`DiceError::NotYourTurn`] if `seat` is not the active player
    /// - [`DiceError::InvalidBid`] for zero dice or a face outside 1-6
    /// - [`DiceError::BidTooLow`] if `bid` does not beat the table
    pub fn place_bid(&mut self, seat: &SeatId, bid: Bid) -> Result<(), DiceError> {
        self.check_turn(seat, "bid")?;
        if !bid.is_well_formed() {
            return Err(DiceError::InvalidBid(bid));
        }
        if let Some(current) = &self.current {
            if !bid.beats(&current.bid) {
                return Err(DiceError::BidTooLow {
                    bid,
                    current: current.bid,
                });
            }
        }

        let name = self.players[self.active].name.clone();
        self.current = Some(TableBid {
            bid,
            owner: seat.clone(),
        });
        self.active = self.next_alive_from(self.active + 1);
        self.history.push(format!("{name} bids {bid}"));

        debug!(%seat, %bid, next = %self.players[self.active].id, "bid placed");
        Ok(())
    }

    /// The active player challenges the table bid.
    ///
    /// Settles at once when every surviving hand is known; otherwise the
    /// table waits in `AwaitingReveal`.
    ///
    /// # Errors
    /// - [`DiceError::WrongPhase`] outside `AwaitingBid`
    /// - [`DiceError::NotYourTurn`] if `seat` is not the active player
    /// - [`DiceError::NoBidToCall`] on an empty table
    pub fn call(&mut self, seat: &SeatId) -> Result<CallProgress, DiceError> {
        self.check_turn(seat, "call")?;
        let Some(current) = &self.current else {
            return Err(DiceError::NoBidToCall);
        };

        let line = format!("{} calls {}!", self.players[self.active].name, current.bid);
        self.history.push(line);

        if self.all_hands_known() {
            return Ok(CallProgress::Resolved(self.resolve(seat.clone())));
        }
        self.phase = Phase::AwaitingReveal {
            caller: seat.clone(),
        };
        debug!(%seat, "call waiting for reveals");
        Ok(CallProgress::AwaitingReveal)
    }

    /// Installs a hidden hand disclosed after a call.
    ///
    /// # Errors
    /// - [`DiceError::WrongPhase`] outside `AwaitingReveal`
    /// - [`DiceError::UnknownSeat`] for a seat not at the table
    /// - [`DiceError::AlreadyRevealed`] if the hand is already known
    /// - [`DiceError::InvalidHand`] for a wrong dice count or bad face
    pub fn reveal(&mut self, seat: &SeatId, dice: Vec<u8>) -> Result<CallProgress, DiceError> {
        let Phase::AwaitingReveal { caller } = &self.phase else {
            return Err(self.wrong_phase("reveal"));
        };
        let caller = caller.clone();
        let index = self
            .seat_index(seat)
            .ok_or_else(|| DiceError::UnknownSeat(seat.clone()))?;

        let player = &self.players[index];
        if player.hand().is_known() {
            return Err(DiceError::AlreadyRevealed(seat.clone()));
        }
        check_hand(player, &dice)?;

        self.players[index].set_hand(Hand::Known(dice));

        if self.all_hands_known() {
            return Ok(CallProgress::Resolved(self.resolve(caller)));
        }
        Ok(CallProgress::AwaitingReveal)
    }

    // -- Internals ----------------------------------------------------------

    /// Settles the table bid against every hand. Only called once all
    /// surviving hands are known and a bid is on the table.
    fn resolve(&mut self, caller: SeatId) -> RoundResult {
        let hands: Vec<(SeatId, Vec<u8>)> = self
            .players
            .iter()
            .filter(|p| !p.is_out())
            .map(|p| (p.id.clone(), p.hand().dice().unwrap_or_default().to_vec()))
            .collect();

        // `call` checked the table bid; an empty table would be a bug here.
        let bid = self.current.take().unwrap_or_else(|| TableBid {
            bid: Bid::new(0, WILD_FACE),
            owner: caller.clone(),
        });
        let count = count_matching(hands.iter().map(|(_, d)| d.as_slice()), &bid.bid);
        // Seat order, so every copy of the table logs the showdown alike.
        for (seat, dice) in &hands {
            let name = self.name_of(seat);
            self.history.push(format!("{name} reveals {dice:?}"));
        }

        let (loser, winner) = if count < bid.bid.quantity as usize {
            (bid.owner.clone(), caller.clone())
        } else {
            (caller.clone(), bid.owner.clone())
        };

        if let Some(index) = self.seat_index(&loser) {
            self.players[index].lose_die();
        }
        let loser_name = self.name_of(&loser);
        self.history
            .push(format!("Showdown! {count} counted. {loser_name} loses a die."));

        let survivors: Vec<&DicePlayer> = self.players.iter().filter(|p| !p.is_out()).collect();
        self.phase = match survivors.as_slice() {
            [last] => {
                let winner = last.id.clone();
                self.history.push(format!("{} wins the game!", last.name));
                Phase::GameOver { winner }
            }
            _ => Phase::RoundOver,
        };

        let result = RoundResult {
            bid,
            caller,
            count,
            loser,
            winner,
            hands,
        };
        info!(
            round = self.round,
            count = result.count,
            loser = %result.loser,
            phase = %self.phase,
            "call settled"
        );
        self.last_result = Some(result.clone());
        result
    }

    fn check_turn(&self, seat: &SeatId, action: &'static str) -> Result<(), DiceError> {
        if self.phase != Phase::AwaitingBid {
            return Err(self.wrong_phase(action));
        }
        let expected = &self.players[self.active].id;
        if expected != seat {
            if self.seat_index(seat).is_none() {
                return Err(DiceError::UnknownSeat(seat.clone()));
            }
            return Err(DiceError::NotYourTurn {
                expected: expected.clone(),
                got: seat.clone(),
            });
        }
        Ok(())
    }

    fn wrong_phase(&self, action: &'static str) -> DiceError {
        DiceError::WrongPhase {
            action,
            phase: self.phase.clone(),
        }
    }

    fn all_hands_known(&self) -> bool {
        self.players
            .iter()
            .filter(|p| !p.is_out())
            .all(|p| p.hand().is_known())
    }

    fn seat_index(&self, seat: &SeatId) -> Option<usize> {
        self.players.iter().position(|p| &p.id == seat)
    }

    fn name_of(&self, seat: &SeatId) -> String {
        self.player(seat)
            .map_or_else(|| seat.to_string(), |p| p.name.clone())
    }

    /// First seat at or after `start` (wrapping) that still has dice.
    /// The table always holds at least one such seat while play goes on.
    fn next_alive_from(&self, start: usize) -> usize {
        let n = self.players.len();
        (0..n)
            .map(|offset| (start + offset) % n)
            .find(|&i| !self.players[i].is_out())
            .unwrap_or(start % n)
    }
}

fn check_hand(player: &DicePlayer, dice: &[u8]) -> Result<(), DiceError> {
    if dice.len() != player.dice_count() {
        return Err(DiceError::InvalidHand {
            seat: player.id.clone(),
            reason: format!("expected {} dice, got {}", player.dice_count(), dice.len()),
        });
    }
    if let Some(bad) = dice.iter().find(|d| !(WILD_FACE..=MAX_FACE).contains(*d)) {
        return Err(DiceError::InvalidHand {
            seat: player.id.clone(),
            reason: format!("die shows {bad}"),
        });
    }
    Ok(())
}

// =========================================================================
// Tests
// =========================================================================
