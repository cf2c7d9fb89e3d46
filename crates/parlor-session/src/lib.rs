//! Peer session management for Parlor.
//!
//! This crate owns the single link between two players:
//!
//! 1. **Setup**: host waits ([`PeerSession::initiate_as_host`]) or guest
//!    dials ([`PeerSession::connect_to`]).
//! 2. **Handshake**: both sides swap profiles before anything else, and
//!    the host/guest split fixes who plays first ([`Role`]).
//! 3. **Events**: inbound messages arrive in order on [`SessionEvents`];
//!    a dropped link shows up once as [`SessionEvent::RemoteDisconnected`].
//!
//! # How it fits in the stack
//!
//! ```text
//! Game hub (above)  ← replays peer messages through the game rules
//!     ↕
//! Session Layer (this crate)  ← handshake, roles, event stream
//!     ↕
//! Protocol + Transport (below)  ← PeerMessage codec, byte frames
//! ```

mod error;
mod session;

pub use error::SessionError;
pub use session::{
    PeerSession, Role, SessionConfig, SessionEvent, SessionEvents, SessionStatus,
    generate_peer_id,
};
