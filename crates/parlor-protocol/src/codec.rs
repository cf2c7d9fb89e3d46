//! Turning [`PeerMessage`](crate::PeerMessage)s into frames and back.
//!
//! The session only needs "bytes in, message out", so the format sits
//! behind the [`Codec`] trait. [`JsonCodec`] is the one both peers use
//! today; JSON keeps frames readable in logs and browser devtools.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to frames and decodes frames to values.
///
/// `Send + Sync + 'static` because a codec lives inside the session and
/// is used from its reader task as well as from the sending side.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into one frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value cannot be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Parses one frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` for malformed or unexpected input.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
///
/// ```rust
/// use parlor_protocol::{Codec, Color, JsonCodec, PeerMessage};
///
/// let codec = JsonCodec;
/// let msg = PeerMessage::Move { x: 7, y: 7, color: Color::Black };
///
/// let frame = codec.encode(&msg).unwrap();
/// let back: PeerMessage = codec.decode(&frame).unwrap();
/// assert_eq!(back, msg);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{DiceAction, PeerMessage};

    #[test]
    fn test_json_codec_decodes_frame_written_by_hand() {
        // A frame as another client would type it, whitespace and all.
        let frame = br#"{ "type": "liar_action",
                          "action": { "type": "REVEAL", "payload": { "dice": [2, 2, 1] } } }"#;
        let msg: PeerMessage = JsonCodec.decode(frame).unwrap();
        assert_eq!(
            msg,
            PeerMessage::LiarAction {
                action: DiceAction::Reveal {
                    dice: vec![2, 2, 1]
                }
            }
        );
    }

    #[test]
    fn test_json_codec_decode_truncated_frame_fails() {
        let result: Result<PeerMessage, _> = JsonCodec.decode(br#"{"type":"mo"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_decode_wrong_field_type_fails() {
        let result: Result<PeerMessage, _> =
            JsonCodec.decode(br#"{"type":"move","x":"seven","y":7,"color":"black"}"#);
        assert!(result.is_err());
    }
}
