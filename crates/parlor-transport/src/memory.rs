//! In-process peer links built on Tokio channels.
//!
//! [`pair`] hands out two connected ends directly. [`MemoryNetwork`] adds
//! a tiny registry on top so code written against [`Transport`] and
//! [`Dialer`] (host waits, guest dials by id) runs unchanged in tests.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

use crate::{Connection, ConnectionId, Dialer, Transport, TransportError};

/// One end of an in-memory link.
///
/// Frames are cloned into an unbounded channel, so `send` never waits on
/// the remote reader. Closing drops our sender; the remote `recv` then
/// drains what is already queued and returns `Ok(None)`.
pub struct MemoryConnection {
    id: ConnectionId,
    outbound: Mutex<Option<mpsc::UnboundedSender<Vec<u8>>>>,
    inbound: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
}

/// Creates two connected ends.
pub fn pair() -> (MemoryConnection, MemoryConnection) {
    let (a_tx, a_rx) = mpsc::unbounded_channel();
    let (b_tx, b_rx) = mpsc::unbounded_channel();

    let a = MemoryConnection {
        id: ConnectionId::next(),
        outbound: Mutex::new(Some(a_tx)),
        inbound: Mutex::new(b_rx),
    };
    let b = MemoryConnection {
        id: ConnectionId::next(),
        outbound: Mutex::new(Some(b_tx)),
        inbound: Mutex::new(a_rx),
    };
    (a, b)
}

impl Connection for MemoryConnection {
    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let outbound = self.outbound.lock().await;
        match outbound.as_ref() {
            Some(tx) => tx.send(data.to_vec()).map_err(|_| {
                TransportError::ConnectionClosed("remote end dropped".into())
            }),
            None => Err(TransportError::ConnectionClosed(
                "closed locally".into(),
            )),
        }
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        Ok(self.inbound.lock().await.recv().await)
    }

    async fn close(&self) -> Result<(), TransportError> {
        if self.outbound.lock().await.take().is_some() {
            tracing::debug!(id = %self.id, "memory link closed");
        }
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

// ---------------------------------------------------------------------------
// MemoryNetwork
// ---------------------------------------------------------------------------

type Listeners = HashMap<String, mpsc::UnboundedSender<MemoryConnection>>;

/// A registry of in-memory listeners, keyed by peer id.
///
/// Cheap to clone; every clone sees the same listeners.
#[derive(Clone, Default)]
pub struct MemoryNetwork {
    listeners: Arc<Mutex<Listeners>>,
}

impl MemoryNetwork {
    /// Creates an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts listening as `peer_id`.
    ///
    /// # Errors
    /// Returns [`TransportError::AcceptFailed`] if another listener
    /// already uses this id.
    pub async fn listen(
        &self,
        peer_id: &str,
    ) -> Result<MemoryTransport, TransportError> {
        let mut listeners = self.listeners.lock().await;
        if listeners.contains_key(peer_id) {
            return Err(TransportError::AcceptFailed(std::io::Error::new(
                std::io::ErrorKind::AddrInUse,
                format!("{peer_id} is already listening"),
            )));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        listeners.insert(peer_id.to_string(), tx);
        tracing::debug!(peer_id, "memory listener registered");

        Ok(MemoryTransport {
            peer_id: peer_id.to_string(),
            network: self.clone(),
            incoming: rx,
        })
    }

    /// Returns a dialer that connects to listeners on this network.
    pub fn dialer(&self) -> MemoryDialer {
        MemoryDialer {
            network: self.clone(),
        }
    }
}

/// The hosting side on a [`MemoryNetwork`].
pub struct MemoryTransport {
    peer_id: String,
    network: MemoryNetwork,
    incoming: mpsc::UnboundedReceiver<MemoryConnection>,
}

impl MemoryTransport {
    /// The id this transport listens as.
    pub fn peer_id(&self) -> &str {
        &self.peer_id
    }
}

impl Transport for MemoryTransport {
    type Connection = MemoryConnection;

    async fn accept(&mut self) -> Result<MemoryConnection, TransportError> {
        self.incoming.recv().await.ok_or(TransportError::Shutdown)
    }

    async fn shutdown(&self) -> Result<(), TransportError> {
        self.network.listeners.lock().await.remove(&self.peer_id);
        Ok(())
    }
}

/// The joining side on a [`MemoryNetwork`].
#[derive(Clone)]
pub struct MemoryDialer {
    network: MemoryNetwork,
}

impl Dialer for MemoryDialer {
    type Connection = MemoryConnection;

    async fn dial(
        &self,
        remote: &str,
    ) -> Result<MemoryConnection, TransportError> {
        let listeners = self.network.listeners.lock().await;
        let listener = listeners
            .get(remote)
            .ok_or_else(|| TransportError::UnknownPeer(remote.to_string()))?;

        let (ours, theirs) = pair();
        listener
            .send(theirs)
            .map_err(|_| TransportError::UnknownPeer(remote.to_string()))?;
        tracing::debug!(remote, id = %ours.id, "memory link dialed");
        Ok(ours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pair_delivers_frames_in_order() {
        let (a, b) = pair();
        a.send(b"one").await.unwrap();
        a.send(b"two").await.unwrap();

        assert_eq!(b.recv().await.unwrap().as_deref(), Some(&b"one"[..]));
        assert_eq!(b.recv().await.unwrap().as_deref(), Some(&b"two"[..]));
    }

    #[tokio::test]
    async fn test_close_makes_remote_recv_return_none() {
        let (a, b) = pair();
        a.send(b"last words").await.unwrap();
        a.close().await.unwrap();

        // Already-queued frames still arrive before the close is seen.
        assert!(b.recv().await.unwrap().is_some());
        assert!(b.recv().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_send_after_close_fails() {
        let (a, _b) = pair();
        a.close().await.unwrap();
        let result = a.send(b"late").await;
        assert!(matches!(result, Err(TransportError::ConnectionClosed(_))));
    }

    #[tokio::test]
    async fn test_dropping_remote_end_closes_link() {
        let (a, b) = pair();
        drop(b);
        assert!(a.recv().await.unwrap().is_none());
        assert!(a.send(b"anyone?").await.is_err());
    }

    #[tokio::test]
    async fn test_network_dial_reaches_listener() {
        let net = MemoryNetwork::new();
        let mut host = net.listen("host-1").await.unwrap();
        let guest = net.dialer().dial("host-1").await.unwrap();
        let accepted = host.accept().await.unwrap();

        guest.send(b"hi").await.unwrap();
        assert_eq!(accepted.recv().await.unwrap().as_deref(), Some(&b"hi"[..]));
        assert_ne!(guest.id(), accepted.id());
    }

    #[tokio::test]
    async fn test_network_dial_unknown_peer_fails() {
        let net = MemoryNetwork::new();
        let result = net.dialer().dial("nobody").await;
        assert!(matches!(result, Err(TransportError::UnknownPeer(id)) if id == "nobody"));
    }

    #[tokio::test]
    async fn test_network_listen_twice_on_same_id_fails() {
        let net = MemoryNetwork::new();
        let _first = net.listen("dup").await.unwrap();
        assert!(net.listen("dup").await.is_err());
    }

    #[tokio::test]
    async fn test_shutdown_unregisters_listener() {
        let net = MemoryNetwork::new();
        let host = net.listen("gone").await.unwrap();
        host.shutdown().await.unwrap();
        assert!(net.dialer().dial("gone").await.is_err());
    }
}
