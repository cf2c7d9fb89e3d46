//! The peer session: one owned link to one remote player.
//!
//! A session is created when a client goes online and torn down when the
//! link drops or the player leaves online mode. It owns:
//! - WHO we are (`local_id`, our `Profile`)
//! - WHO is on the other end (`remote_id`, their `Profile`), once known
//! - WHICH side of the table we sit on (`Role`, and so our stone colour)
//! - the link itself, plus the task reading from it
//!
//! ```text
//!         initiate_as_host / connect_to          handshake done
//!   Idle ─────────────────────────────→ Connecting ─────────────→ Connected
//!    ↑                                      │                        │
//!    └──────── handshake failed ────────────┘                        │
//!    └──────── handle_remote_disconnect / close ─────────────────────┘
//! ```
//!
//! Nothing survives a disconnect. Reconnecting is a brand new session
//! with a brand new handshake, and the games above start over.

use std::sync::Arc;
use std::time::Duration;

use parlor_protocol::{Codec, Color, JsonCodec, PeerId, PeerMessage, Profile};
use parlor_transport::{Connection, Dialer, Transport};
use rand::Rng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::SessionError;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long to wait for the peer's handshake after the link opens.
    ///
    /// This is the only timeout in the session. Once connected, a silent
    /// peer simply leaves the game waiting.
    ///
    /// Default: 10 seconds.
    pub handshake_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            handshake_timeout: Duration::from_secs(10),
        }
    }
}

// ---------------------------------------------------------------------------
// Status / Role
// ---------------------------------------------------------------------------

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No link.
    #[default]
    Idle,
    /// A link is opening or the handshake is in flight.
    Connecting,
    /// Handshake done; game messages flow.
    Connected,
}

/// Which side of the link we are on.
///
/// The split is fixed by who dialed whom, so the two sides never have
/// to negotiate: the host plays first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Accepted the link. Plays Black and sits first at the dice table.
    Host,
    /// Dialed the host. Plays White and sits second.
    Guest,
}

impl Role {
    /// The stone colour this side plays.
    pub fn color(self) -> Color {
        match self {
            Self::Host => Color::Black,
            Self::Guest => Color::White,
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Something that arrived from the peer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A well-formed message, in arrival order. Later handshakes (profile
    /// edits) arrive here too.
    Message(PeerMessage),
    /// The link is gone. Always the last event.
    RemoteDisconnected,
    /// A frame that could not be decoded or failed validation. The link
    /// stays up.
    Invalid { reason: String },
}

/// The stream of [`SessionEvent`]s for one connection.
///
/// Returned by [`PeerSession::initiate_as_host`] and
/// [`PeerSession::connect_to`]. Ends after `RemoteDisconnected`, or when
/// the session is closed locally.
#[derive(Debug)]
pub struct SessionEvents {
    rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl SessionEvents {
    /// Waits for the next event. `None` once the link is gone.
    pub async fn next(&mut self) -> Option<SessionEvent> {
        self.rx.recv().await
    }
}

// ---------------------------------------------------------------------------
// PeerSession
// ---------------------------------------------------------------------------

/// A two-party session over one [`Connection`].
///
/// Only one link may exist at a time; starting a second while one is
/// connecting or connected fails with [`SessionError::AlreadyActive`].
pub struct PeerSession<C: Connection> {
    local_id: PeerId,
    profile: Profile,
    config: SessionConfig,
    codec: JsonCodec,

    status: SessionStatus,
    role: Option<Role>,
    remote_id: Option<PeerId>,
    remote_profile: Option<Profile>,

    link: Option<Arc<C>>,
    reader: Option<JoinHandle<()>>,
}

impl<C: Connection> PeerSession<C> {
    /// Creates an idle session under a freshly generated peer id.
    pub fn new(profile: Profile, config: SessionConfig) -> Self {
        Self::with_id(generate_peer_id(), profile, config)
    }

    /// Creates an idle session under a known id, such as the address a
    /// WebSocket host listens on.
    pub fn with_id(local_id: PeerId, profile: Profile, config: SessionConfig) -> Self {
        Self {
            local_id,
            profile,
            config,
            codec: JsonCodec,
            status: SessionStatus::Idle,
            role: None,
            remote_id: None,
            remote_profile: None,
            link: None,
            reader: None,
        }
    }

    // -- Queries ------------------------------------------------------------

    /// The id peers use to reach us. Known before any link exists, so a
    /// host can share it while waiting.
    pub fn local_id(&self) -> &PeerId {
        &self.local_id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Our stone colour, once connected.
    pub fn local_color(&self) -> Option<Color> {
        self.role.map(Role::color)
    }

    pub fn remote_id(&self) -> Option<&PeerId> {
        self.remote_id.as_ref()
    }

    /// The peer's profile from its opening handshake. Later edits come
    /// through [`SessionEvent::Message`].
    pub fn remote_profile(&self) -> Option<&Profile> {
        self.remote_profile.as_ref()
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn is_connected(&self) -> bool {
        self.status == SessionStatus::Connected
    }

    // -- Lifecycle ----------------------------------------------------------

    /// Waits for one peer to dial in on `transport`, then handshakes.
    ///
    /// # Errors
    /// - [`SessionError::AlreadyActive`] if a link already exists
    /// - [`SessionError::Transport`] if accepting fails
    /// - [`SessionError::HandshakeFailed`] / [`SessionError::HandshakeTimeout`]
    pub async fn initiate_as_host<T>(
        &mut self,
        transport: &mut T,
    ) -> Result<SessionEvents, SessionError>
    where
        T: Transport<Connection = C>,
    {
        self.begin()?;
        tracing::info!(local_id = %self.local_id, "waiting for a peer");

        let conn = match transport.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                self.status = SessionStatus::Idle;
                return Err(e.into());
            }
        };
        self.establish(conn, Role::Host, None).await
    }

    /// Dials the peer listening as `remote`, then handshakes.
    ///
    /// # Errors
    /// - [`SessionError::AlreadyActive`] if a link already exists
    /// - [`SessionError::Transport`] if dialing fails
    /// - [`SessionError::HandshakeFailed`] / [`SessionError::HandshakeTimeout`]
    pub async fn connect_to<D>(
        &mut self,
        dialer: &D,
        remote: &PeerId,
    ) -> Result<SessionEvents, SessionError>
    where
        D: Dialer<Connection = C>,
    {
        self.begin()?;
        tracing::info!(local_id = %self.local_id, %remote, "dialing peer");

        let conn = match dialer.dial(remote.as_str()).await {
            Ok(conn) => conn,
            Err(e) => {
                self.status = SessionStatus::Idle;
                return Err(e.into());
            }
        };
        self.establish(conn, Role::Guest, Some(remote.clone())).await
    }

    /// Sends one message to the peer.
    ///
    /// # Errors
    /// - [`SessionError::NotConnected`] without a connected peer
    /// - [`SessionError::Protocol`] / [`SessionError::Transport`] on failure
    pub async fn send(&self, msg: &PeerMessage) -> Result<(), SessionError> {
        let link = match (&self.link, self.status) {
            (Some(link), SessionStatus::Connected) => link,
            _ => return Err(SessionError::NotConnected),
        };
        let frame = self.codec.encode(msg)?;
        link.send(&frame).await?;
        tracing::debug!(kind = msg.kind(), "sent to peer");
        Ok(())
    }

    /// Replaces our profile and, when connected, re-sends the handshake
    /// so the peer picks up the change.
    pub async fn update_profile(&mut self, profile: Profile) -> Result<(), SessionError> {
        self.profile = profile;
        if self.is_connected() {
            self.send(&self.handshake()).await?;
        }
        Ok(())
    }

    /// Call on [`SessionEvent::RemoteDisconnected`]. Tears the link down
    /// and returns `true` the first time; later calls return `false`, so
    /// the disconnect is reported once.
    pub fn handle_remote_disconnect(&mut self) -> bool {
        if self.status != SessionStatus::Connected {
            return false;
        }
        tracing::info!(remote_id = ?self.remote_id, "peer disconnected");
        self.teardown();
        true
    }

    /// Closes the link from our side, for instance when leaving online
    /// mode. Safe to call at any time.
    pub async fn close(&mut self) -> Result<(), SessionError> {
        let link = self.link.clone();
        self.teardown();
        if let Some(link) = link {
            link.close().await?;
            tracing::info!(local_id = %self.local_id, "session closed");
        }
        Ok(())
    }

    // -- Internals ----------------------------------------------------------

    fn begin(&mut self) -> Result<(), SessionError> {
        if self.status != SessionStatus::Idle {
            return Err(SessionError::AlreadyActive);
        }
        self.status = SessionStatus::Connecting;
        Ok(())
    }

    fn handshake(&self) -> PeerMessage {
        PeerMessage::Handshake {
            profile: self.profile.clone(),
            peer_id: Some(self.local_id.clone()),
        }
    }

    async fn establish(
        &mut self,
        conn: C,
        role: Role,
        dialed: Option<PeerId>,
    ) -> Result<SessionEvents, SessionError> {
        let conn = Arc::new(conn);
        let conn_id = conn.id();

        let (profile, announced) = match self.exchange_handshakes(&conn).await {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "handshake failed");
                self.status = SessionStatus::Idle;
                let _ = conn.close().await;
                return Err(e);
            }
        };

        let remote_id = announced
            .or(dialed)
            .unwrap_or_else(|| PeerId(format!("peer-{conn_id}")));
        if remote_id == self.local_id {
            self.status = SessionStatus::Idle;
            let _ = conn.close().await;
            return Err(SessionError::HandshakeFailed(format!(
                "peer claims our own id {remote_id}"
            )));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let reader = tokio::spawn(read_loop(Arc::clone(&conn), self.codec, tx));

        tracing::info!(
            %conn_id,
            %remote_id,
            ?role,
            remote_name = %profile.name,
            "peer connected"
        );

        self.role = Some(role);
        self.remote_id = Some(remote_id);
        self.remote_profile = Some(profile);
        self.link = Some(conn);
        self.reader = Some(reader);
        self.status = SessionStatus::Connected;

        Ok(SessionEvents { rx })
    }

    /// Sends our handshake, then waits for theirs.
    async fn exchange_handshakes(
        &self,
        conn: &C,
    ) -> Result<(Profile, Option<PeerId>), SessionError> {
        let frame = self.codec.encode(&self.handshake())?;
        conn.send(&frame).await?;

        let timeout = self.config.handshake_timeout;
        let data = match tokio::time::timeout(timeout, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                return Err(SessionError::HandshakeFailed(
                    "link closed before handshake".into(),
                ));
            }
            Ok(Err(e)) => return Err(SessionError::Transport(e)),
            Err(_) => return Err(SessionError::HandshakeTimeout(timeout)),
        };

        match self.codec.decode::<PeerMessage>(&data)? {
            PeerMessage::Handshake { profile, peer_id } => Ok((profile, peer_id)),
            other => Err(SessionError::HandshakeFailed(format!(
                "expected handshake, got {}",
                other.kind()
            ))),
        }
    }

    fn teardown(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        self.link = None;
        self.role = None;
        self.remote_id = None;
        self.remote_profile = None;
        self.status = SessionStatus::Idle;
    }
}

impl<C: Connection> Drop for PeerSession<C> {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

/// Reads frames until the link goes away, forwarding each as an event.
async fn read_loop<C: Connection>(
    conn: Arc<C>,
    codec: JsonCodec,
    tx: mpsc::UnboundedSender<SessionEvent>,
) {
    let conn_id = conn.id();
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%conn_id, "link closed by peer");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let event = match codec
            .decode::<PeerMessage>(&data)
            .and_then(|msg| msg.validate().map(|()| msg))
        {
            Ok(msg) => SessionEvent::Message(msg),
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "dropping bad frame");
                SessionEvent::Invalid {
                    reason: e.to_string(),
                }
            }
        };
        if tx.send(event).is_err() {
            // Nobody is listening any more.
            return;
        }
    }
    let _ = tx.send(SessionEvent::RemoteDisconnected);
}

/// Generates a random peer id: `peer-` followed by 16 hex characters.
pub fn generate_peer_id() -> PeerId {
    let bytes: [u8; 8] = rand::rng().random();
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    PeerId(format!("peer-{hex}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_peer_id_format() {
        let id = generate_peer_id();
        let hex = id.as_str().strip_prefix("peer-").unwrap();
        assert_eq!(hex.len(), 16);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_peer_id_unique() {
        assert_ne!(generate_peer_id(), generate_peer_id());
    }

    #[test]
    fn test_role_colors() {
        assert_eq!(Role::Host.color(), Color::Black);
        assert_eq!(Role::Guest.color(), Color::White);
    }

    #[test]
    fn test_session_config_default_timeout() {
        assert_eq!(
            SessionConfig::default().handshake_timeout,
            Duration::from_secs(10)
        );
    }
}
