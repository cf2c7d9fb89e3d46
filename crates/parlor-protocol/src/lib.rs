//! Peer wire protocol for Parlor.
//!
//! This crate defines what two clients say to each other:
//!
//! - **Types** ([`PeerMessage`], [`DiceAction`], [`Profile`], [`Color`],
//!   [`PeerId`]): the JSON-shaped discriminated union on the link.
//! - **Codec** ([`Codec`], [`JsonCodec`]): frames to messages and back.
//! - **Errors** ([`ProtocolError`]).
//!
//! It knows nothing about sockets or game rules:
//!
//! ```text
//! Transport (frames) → Protocol (PeerMessage) → Session → Game hub
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{Color, DiceAction, MAX_FACE, PeerId, PeerMessage, Profile};
