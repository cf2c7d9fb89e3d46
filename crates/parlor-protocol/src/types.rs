//! Wire types exchanged between the two peers.
//!
//! Every cross-peer action is one [`PeerMessage`]: a JSON object whose
//! `type` field says what it is and whose remaining fields carry the
//! payload. There is no envelope and no version number: both peers are
//! assumed to run the same build.
//!
//! ```text
//! {"type":"move","x":7,"y":7,"color":"black"}
//! {"type":"liar_action","action":{"type":"BID","payload":{"quantity":3,"face":4}}}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Highest face on a die. Faces run `1..=MAX_FACE`; `1` is wild.
pub const MAX_FACE: u8 = 6;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The id a peer is reachable under.
///
/// For WebSocket links this is the `host:port` the host listens on; for
/// in-memory links it is whatever name the listener registered. It is
/// also used as the seat id of the online player at the dice table.
///
/// `#[serde(transparent)]` keeps it a bare JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(pub String);

impl PeerId {
    /// Borrows the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Stone colour on the Gomoku board, and the online seat colour.
///
/// Black always moves first. The hosting peer plays Black, the peer that
/// dialed in plays White.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// The other colour.
    pub fn opponent(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Black => f.write_str("black"),
            Self::White => f.write_str("white"),
        }
    }
}

/// Display metadata a peer shares in its handshake.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Name shown next to the board.
    pub name: String,
    /// Avatar as a URL or data URI. Opaque to the core.
    #[serde(default)]
    pub avatar_url: String,
}

impl Profile {
    /// A profile with a name and no avatar.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avatar_url: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// One message on the peer link.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON, so a chat
/// line looks like `{"type":"chat","content":"hi","isSticker":false}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PeerMessage {
    /// Sent by both sides right after the link opens, and again whenever
    /// the local profile changes. The receiver overwrites what it stored.
    Handshake {
        profile: Profile,
        #[serde(
            rename = "peerId",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        peer_id: Option<PeerId>,
    },

    /// A stone placed on the Gomoku board.
    Move { x: usize, y: usize, color: Color },

    /// The sender reset its games. The receiver resets too, silently.
    Restart,

    /// A chat line or sticker. Not game state.
    Chat {
        content: String,
        #[serde(rename = "isSticker", default)]
        is_sticker: bool,
    },

    /// A Liar's Dice action.
    LiarAction { action: DiceAction },
}

impl PeerMessage {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Handshake { .. } => "handshake",
            Self::Move { .. } => "move",
            Self::Restart => "restart",
            Self::Chat { .. } => "chat",
            Self::LiarAction { action } => action.kind(),
        }
    }

    /// Rejects payloads no honest peer could produce.
    ///
    /// This only checks shape (face ranges, zero quantities). Whether a
    /// well-formed action is legal *right now* is the game engine's call.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            Self::LiarAction { action } => action.validate(),
            _ => Ok(()),
        }
    }
}

/// Liar's Dice actions, tagged `type` with the fields under `payload`.
///
/// After a `CALL` both sides send a `REVEAL` of their own hand, and each
/// side settles the round once it holds both hands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiceAction {
    /// Raise the table bid to "at least `quantity` dice show `face`".
    Bid { quantity: u32, face: u8 },
    /// Challenge the table bid.
    Call,
    /// Disclose the sender's hand for the current round.
    Reveal { dice: Vec<u8> },
    /// Roll fresh hands and start the next round.
    NewRound,
}

impl DiceAction {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bid { .. } => "BID",
            Self::Call => "CALL",
            Self::Reveal { .. } => "REVEAL",
            Self::NewRound => "NEW_ROUND",
        }
    }

    fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            Self::Bid { quantity, face } => {
                if *quantity == 0 {
                    return Err(ProtocolError::InvalidMessage(
                        "bid quantity must be at least 1".into(),
                    ));
                }
                if !is_face(*face) {
                    return Err(ProtocolError::InvalidMessage(format!(
                        "bid face {face} outside 1-{MAX_FACE}"
                    )));
                }
                Ok(())
            }
            Self::Reveal { dice } => match dice.iter().find(|d| !is_face(**d)) {
                Some(bad) => Err(ProtocolError::InvalidMessage(format!(
                    "revealed die {bad} outside 1-{MAX_FACE}"
                ))),
                None => Ok(()),
            },
            Self::Call | Self::NewRound => Ok(()),
        }
    }
}

fn is_face(face: u8) -> bool {
    (1..=MAX_FACE).contains(&face)
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The JSON shapes below are what the other peer parses, so they are
    //! pinned field by field rather than only round-tripped.

    use super::*;

    #[test]
    fn test_peer_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&PeerId::from("peer-1")).unwrap();
        assert_eq!(json, "\"peer-1\"");
    }

    #[test]
    fn test_color_opponent_flips() {
        assert_eq!(Color::Black.opponent(), Color::White);
        assert_eq!(Color::White.opponent(), Color::Black);
    }

    #[test]
    fn test_color_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Color::Black).unwrap(), "\"black\"");
    }

    #[test]
    fn test_handshake_json_format() {
        let msg = PeerMessage::Handshake {
            profile: Profile {
                name: "Lin".into(),
                avatar_url: "data:image/png;base64,AA".into(),
            },
            peer_id: None,
        };
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "handshake");
        assert_eq!(json["profile"]["name"], "Lin");
        assert_eq!(json["profile"]["avatarUrl"], "data:image/png;base64,AA");
        // Absent peer id is omitted, not null.
        assert!(json.get("peerId").is_none());
    }

    #[test]
    fn test_handshake_without_avatar_or_peer_id_decodes() {
        let msg: PeerMessage =
            serde_json::from_str(r#"{"type":"handshake","profile":{"name":"Hao"}}"#)
                .unwrap();
        assert_eq!(
            msg,
            PeerMessage::Handshake {
                profile: Profile::named("Hao"),
                peer_id: None,
            }
        );
    }

    #[test]
    fn test_move_json_format() {
        let msg = PeerMessage::Move {
            x: 7,
            y: 8,
            color: Color::White,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "move");
        assert_eq!(json["x"], 7);
        assert_eq!(json["y"], 8);
        assert_eq!(json["color"], "white");
    }

    #[test]
    fn test_restart_is_bare_type_tag() {
        let json = serde_json::to_string(&PeerMessage::Restart).unwrap();
        assert_eq!(json, r#"{"type":"restart"}"#);
    }

    #[test]
    fn test_chat_uses_is_sticker_field() {
        let msg = PeerMessage::Chat {
            content: "(heart)".into(),
            is_sticker: true,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "chat");
        assert_eq!(json["isSticker"], true);
    }

    #[test]
    fn test_bid_json_format() {
        let msg = PeerMessage::LiarAction {
            action: DiceAction::Bid {
                quantity: 3,
                face: 4,
            },
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "liar_action");
        assert_eq!(json["action"]["type"], "BID");
        assert_eq!(json["action"]["payload"]["quantity"], 3);
        assert_eq!(json["action"]["payload"]["face"], 4);
    }

    #[test]
    fn test_call_and_new_round_decode_without_payload() {
        let call: DiceAction = serde_json::from_str(r#"{"type":"CALL"}"#).unwrap();
        assert_eq!(call, DiceAction::Call);
        let next: DiceAction =
            serde_json::from_str(r#"{"type":"NEW_ROUND"}"#).unwrap();
        assert_eq!(next, DiceAction::NewRound);
    }

    #[test]
    fn test_reveal_json_format() {
        let action = DiceAction::Reveal {
            dice: vec![1, 6, 6],
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "REVEAL");
        assert_eq!(json["payload"]["dice"], serde_json::json!([1, 6, 6]));
    }

    #[test]
    fn test_unknown_type_fails_to_decode() {
        let result: Result<PeerMessage, _> =
            serde_json::from_str(r#"{"type":"teleport"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_zero_quantity_bid() {
        let msg = PeerMessage::LiarAction {
            action: DiceAction::Bid {
                quantity: 0,
                face: 3,
            },
        };
        assert!(matches!(
            msg.validate(),
            Err(ProtocolError::InvalidMessage(_))
        ));
    }

    #[test]
    fn test_validate_rejects_face_seven() {
        let msg = PeerMessage::LiarAction {
            action: DiceAction::Bid {
                quantity: 2,
                face: 7,
            },
        };
        assert!(msg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_reveal_with_zero_die() {
        let msg = PeerMessage::LiarAction {
            action: DiceAction::Reveal {
                dice: vec![3, 0, 5],
            },
        };
        assert!(msg.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_ordinary_messages() {
        assert!(PeerMessage::Restart.validate().is_ok());
        assert!(
            PeerMessage::LiarAction {
                action: DiceAction::Reveal { dice: vec![] }
            }
            .validate()
            .is_ok()
        );
    }

    #[test]
    fn test_kind_names_dice_actions() {
        let msg = PeerMessage::LiarAction {
            action: DiceAction::NewRound,
        };
        assert_eq!(msg.kind(), "NEW_ROUND");
        assert_eq!(PeerMessage::Restart.kind(), "restart");
    }
}
