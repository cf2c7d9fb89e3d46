//! Error types for the protocol layer.

/// Errors raised while encoding, decoding or validating peer messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A value could not be serialized.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// A frame could not be parsed: malformed JSON, an unknown `type`,
    /// or fields of the wrong shape.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame parsed but carries an impossible payload, such as a die
    /// showing 7.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
