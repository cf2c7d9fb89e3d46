//! Unified error type for Parlor.

use parlor_dice::DiceError;
use parlor_gomoku::GomokuError;
use parlor_protocol::ProtocolError;
use parlor_session::SessionError;
use parlor_transport::TransportError;

use crate::AdvisorError;

/// Top-level error that wraps all crate-specific errors.
///
/// Local actions the rules refuse come back as [`ParlorError::Gomoku`] or
/// [`ParlorError::Dice`] and change nothing. A peer action the rules
/// refuse is different: it means the two sides no longer agree, and it
/// comes back as [`ParlorError::Desync`].
#[derive(Debug, thiserror::Error)]
pub enum ParlorError {
    /// A transport-level error (dial, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (handshake, not connected).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The Gomoku rules refused a local move.
    #[error(transparent)]
    Gomoku(#[from] GomokuError),

    /// The dice table refused a local action.
    #[error(transparent)]
    Dice(#[from] DiceError),

    /// A suggestion service failed.
    #[error(transparent)]
    Advisor(#[from] AdvisorError),

    /// The peer sent something our copy of the game cannot accept. Only a
    /// restart brings the two sides back together.
    #[error("out of sync with peer: {reason}")]
    Desync { reason: String },

    /// The action does not apply in the current mode or game.
    #[error("{0}")]
    InvalidAction(String),

    /// Reading or writing local settings failed.
    #[error("profile store: {0}")]
    Store(#[from] std::io::Error),

    /// Local settings could not be parsed or written as JSON.
    #[error("profile store format: {0}")]
    StoreFormat(#[from] serde_json::Error),

    /// The driver task is gone.
    #[error("parlor driver has stopped")]
    DriverStopped,
}
