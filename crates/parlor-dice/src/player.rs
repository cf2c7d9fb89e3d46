//! Seats at the dice table.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Dice each player starts the game with.
pub const STARTING_DICE: usize = 5;

/// Most automated opponents an offline table seats.
pub const MAX_AI_OPPONENTS: usize = 3;

/// Identifies a seat. Unique within a table.
///
/// Online, each side's seat id is its peer id, so both tables agree on
/// who is who without any extra exchange.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatId(pub String);

impl SeatId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SeatId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SeatId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Temperament of an automated opponent. Passed to the bid advisor so it
/// can play (and talk) in character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Persona {
    #[serde(rename = "Xiao Lin")]
    XiaoLin,
    Aggressive,
    Cautious,
}

impl Persona {
    /// Seating order for offline opponents.
    pub const ROSTER: [Persona; MAX_AI_OPPONENTS] =
        [Persona::XiaoLin, Persona::Aggressive, Persona::Cautious];

    /// Name shown at the table.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::XiaoLin => "Xiao Lin",
            Self::Aggressive => "Ah Hao",
            Self::Cautious => "Xiao Mei",
        }
    }

    /// One-line character sketch.
    pub fn temperament(self) -> &'static str {
        match self {
            Self::XiaoLin => "clever and playful",
            Self::Aggressive => "impulsive, loves a big bluff",
            Self::Cautious => "careful and conservative",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::XiaoLin => "Xiao Lin",
            Self::Aggressive => "Aggressive",
            Self::Cautious => "Cautious",
        };
        f.write_str(tag)
    }
}

/// A player's dice as this side of the table knows them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hand {
    /// Rolled on the other peer and not revealed yet this round.
    Hidden,
    /// Faces are known: our own roll, an AI's roll, or a revealed hand.
    Known(Vec<u8>),
}

impl Hand {
    /// The faces, if known.
    pub fn dice(&self) -> Option<&[u8]> {
        match self {
            Self::Hidden => None,
            Self::Known(dice) => Some(dice.as_slice()),
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

/// One seat at the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DicePlayer {
    pub id: SeatId,
    pub name: String,
    /// Dice for this seat are rolled on the other peer.
    pub is_remote: bool,
    /// Set for automated opponents only.
    pub persona: Option<Persona>,
    hand: Hand,
    dice_count: usize,
}

impl DicePlayer {
    /// A seat played on this device.
    pub fn local(id: impl Into<SeatId>, name: impl Into<String>) -> Self {
        Self::seat(id.into(), name.into(), false, None)
    }

    /// The online opponent's seat.
    pub fn remote(id: impl Into<SeatId>, name: impl Into<String>) -> Self {
        Self::seat(id.into(), name.into(), true, None)
    }

    /// An automated opponent, named after its persona.
    pub fn ai(id: impl Into<SeatId>, persona: Persona) -> Self {
        Self::seat(
            id.into(),
            persona.display_name().to_string(),
            false,
            Some(persona),
        )
    }

    fn seat(id: SeatId, name: String, is_remote: bool, persona: Option<Persona>) -> Self {
        Self {
            id,
            name,
            is_remote,
            persona,
            hand: Hand::Known(Vec::new()),
            dice_count: STARTING_DICE,
        }
    }

    pub fn is_ai(&self) -> bool {
        self.persona.is_some()
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    /// Dice still held. Zero once eliminated.
    pub fn dice_count(&self) -> usize {
        self.dice_count
    }

    pub fn is_out(&self) -> bool {
        self.dice_count == 0
    }

    pub(crate) fn set_hand(&mut self, hand: Hand) {
        self.hand = hand;
    }

    pub(crate) fn lose_die(&mut self) {
        self.dice_count = self.dice_count.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_player_takes_persona_name() {
        let player = DicePlayer::ai("ai-1", Persona::Aggressive);
        assert!(player.is_ai());
        assert_eq!(player.name, "Ah Hao");
        assert_eq!(player.dice_count(), STARTING_DICE);
    }

    #[test]
    fn test_lose_die_saturates_at_zero() {
        let mut player = DicePlayer::local("me", "Me");
        for _ in 0..STARTING_DICE + 2 {
            player.lose_die();
        }
        assert_eq!(player.dice_count(), 0);
        assert!(player.is_out());
    }

    #[test]
    fn test_persona_serializes_with_spaces() {
        let json = serde_json::to_string(&Persona::XiaoLin).unwrap();
        assert_eq!(json, r#""Xiao Lin""#);
    }

    #[test]
    fn test_hidden_hand_has_no_dice() {
        assert_eq!(Hand::Hidden.dice(), None);
        assert_eq!(Hand::Known(vec![3, 1]).dice(), Some(&[3, 1][..]));
    }
}
