//! Peer link abstraction for Parlor.
//!
//! The game core never talks to sockets directly. It needs exactly one
//! thing from the network: an ordered, bidirectional channel of byte
//! frames between two peers. This crate defines that contract as three
//! small traits:
//!
//! - [`Connection`]: one established link (send / recv / close).
//! - [`Transport`]: the hosting side: waits for a peer to dial in.
//! - [`Dialer`]: the joining side: dials a peer by its id.
//!
//! Two implementations ship here:
//!
//! - [`memory`]: an in-process link built on Tokio channels. Used by
//!   tests and by hot-seat tooling that wants the full online code path
//!   without a network.
//! - `websocket` (feature, default): a WebSocket link via
//!   `tokio-tungstenite`, where a peer id is a `host:port` address.

mod error;
pub mod memory;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
pub use memory::{MemoryConnection, MemoryDialer, MemoryNetwork, MemoryTransport};
#[cfg(feature = "websocket")]
pub use websocket::{
    ClientConnection, ServerConnection, WebSocketConnection, WebSocketDialer,
    WebSocketTransport,
};

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter shared by every link implementation so ids never collide.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier for one established link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Allocates the next process-unique id.
    pub(crate) fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link-{}", self.0)
    }
}

// The methods below return `impl Future + Send` rather than being
// declared `async fn` so that generic callers can move the futures into
// `tokio::spawn`. Implementations still write plain `async fn`.

/// The hosting side of a link: hands out peers that dialed in.
pub trait Transport: Send + Sync + 'static {
    /// The link type produced by this transport.
    type Connection: Connection;

    /// Waits for and accepts the next incoming peer.
    fn accept(
        &mut self,
    ) -> impl Future<Output = Result<Self::Connection, TransportError>> + Send;

    /// Stops accepting new peers. Established links are unaffected.
    fn shutdown(
        &self,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// The joining side of a link: dials a peer by its id.
pub trait Dialer: Send + Sync + 'static {
    /// The link type produced by this dialer.
    type Connection: Connection;

    /// Connects to the peer listening as `remote`.
    fn dial(
        &self,
        remote: &str,
    ) -> impl Future<Output = Result<Self::Connection, TransportError>> + Send;
}

/// One established link that can send and receive byte frames.
///
/// Frames are delivered in order. Delivery itself is best effort: a
/// frame sent right before the link drops may never arrive, and nothing
/// above this layer retries.
pub trait Connection: Send + Sync + 'static {
    /// Sends one frame to the remote peer.
    fn send(
        &self,
        data: &[u8],
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Receives the next frame from the remote peer.
    ///
    /// Returns `Ok(None)` once the link is cleanly closed.
    fn recv(
        &self,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, TransportError>> + Send;

    /// Closes the link. The remote side observes `Ok(None)` from `recv`.
    fn close(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Returns the unique identifier for this link.
    fn id(&self) -> ConnectionId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_display_uses_link_prefix() {
        assert_eq!(ConnectionId::new(7).to_string(), "link-7");
    }

    #[test]
    fn test_connection_id_next_is_monotonic() {
        let a = ConnectionId::next();
        let b = ConnectionId::next();
        assert!(b.into_inner() > a.into_inner());
    }
}
