//! Error types for the session layer.

use std::time::Duration;

use parlor_protocol::ProtocolError;
use parlor_transport::TransportError;

/// Errors that can occur while setting up or using a peer session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A link is already being set up or is up. Close it first.
    #[error("a peer session is already active")]
    AlreadyActive,

    /// `send` was called with no peer on the other end.
    #[error("not connected to a peer")]
    NotConnected,

    /// The peer's opening message was not a usable handshake, or the
    /// link closed before one arrived.
    #[error("handshake failed: {0}")]
    HandshakeFailed(String),

    /// The peer did not send its handshake in time.
    #[error("no handshake from peer within {0:?}")]
    HandshakeTimeout(Duration),

    /// The link itself failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A message could not be encoded or decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}
