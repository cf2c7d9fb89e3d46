//! Integration tests for peer sessions over the in-memory network.

use std::time::Duration;

use parlor_protocol::{Codec, Color, JsonCodec, PeerId, PeerMessage, Profile};
use parlor_session::{
    PeerSession, Role, SessionConfig, SessionError, SessionEvent, SessionEvents, SessionStatus,
};
use parlor_transport::{Connection, Dialer, MemoryConnection, MemoryNetwork, Transport};

type Session = PeerSession<MemoryConnection>;

fn session(id: &str, name: &str) -> Session {
    PeerSession::with_id(PeerId::from(id), Profile::named(name), SessionConfig::default())
}

/// Connects a host and a guest, returning both sessions and event streams.
async fn connected_pair() -> (Session, SessionEvents, Session, SessionEvents) {
    let network = MemoryNetwork::new();
    let mut transport = network.listen("host").await.unwrap();
    let dialer = network.dialer();

    let mut host = session("host", "Alice");
    let mut guest = session("guest", "Bob");

    let host_id = PeerId::from("host");
    let (host_events, guest_events) = tokio::join!(
        host.initiate_as_host(&mut transport),
        guest.connect_to(&dialer, &host_id),
    );
    (host, host_events.unwrap(), guest, guest_events.unwrap())
}

async fn next_event(events: &mut SessionEvents) -> SessionEvent {
    tokio::time::timeout(Duration::from_secs(2), events.next())
        .await
        .expect("event within timeout")
        .expect("stream still open")
}

// =========================================================================
// Handshake
// =========================================================================

#[tokio::test]
async fn test_handshake_assigns_roles_and_profiles() {
    let (host, _, guest, _) = connected_pair().await;

    assert_eq!(host.status(), SessionStatus::Connected);
    assert_eq!(host.role(), Some(Role::Host));
    assert_eq!(host.local_color(), Some(Color::Black));
    assert_eq!(host.remote_id(), Some(&PeerId::from("guest")));
    assert_eq!(host.remote_profile().unwrap().name, "Bob");

    assert_eq!(guest.status(), SessionStatus::Connected);
    assert_eq!(guest.role(), Some(Role::Guest));
    assert_eq!(guest.local_color(), Some(Color::White));
    assert_eq!(guest.remote_id(), Some(&PeerId::from("host")));
    assert_eq!(guest.remote_profile().unwrap().name, "Alice");
}

#[tokio::test]
async fn test_handshake_timeout_returns_to_idle() {
    let network = MemoryNetwork::new();
    let mut transport = network.listen("mute").await.unwrap();
    let dialer = network.dialer();

    let mut guest = PeerSession::with_id(
        PeerId::from("guest"),
        Profile::named("Bob"),
        SessionConfig {
            handshake_timeout: Duration::from_millis(50),
        },
    );

    // The host accepts the link but never says anything.
    let mute_id = PeerId::from("mute");
    let (result, accepted) = tokio::join!(
        guest.connect_to(&dialer, &mute_id),
        transport.accept(),
    );
    let _held_open = accepted.unwrap();

    assert!(matches!(result, Err(SessionError::HandshakeTimeout(_))));
    assert_eq!(guest.status(), SessionStatus::Idle);
}

#[tokio::test]
async fn test_handshake_rejects_game_message_first() {
    let network = MemoryNetwork::new();
    let mut transport = network.listen("rude").await.unwrap();
    let dialer = network.dialer();
    let mut guest = session("guest", "Bob");

    let rude_host = async {
        let conn = transport.accept().await.unwrap();
        let frame = JsonCodec
            .encode(&PeerMessage::Move {
                x: 7,
                y: 7,
                color: Color::Black,
            })
            .unwrap();
        conn.send(&frame).await.unwrap();
        conn
    };
    let rude_id = PeerId::from("rude");
    let (result, _conn) = tokio::join!(guest.connect_to(&dialer, &rude_id), rude_host);

    match result {
        Err(SessionError::HandshakeFailed(reason)) => assert!(reason.contains("move")),
        other => panic!("expected HandshakeFailed, got {other:?}"),
    }
    assert_eq!(guest.status(), SessionStatus::Idle);
}

#[tokio::test]
async fn test_connect_to_unknown_peer_fails_and_stays_idle() {
    let network = MemoryNetwork::new();
    let mut guest = session("guest", "Bob");

    let result = guest
        .connect_to(&network.dialer(), &PeerId::from("nobody"))
        .await;
    assert!(matches!(result, Err(SessionError::Transport(_))));
    assert_eq!(guest.status(), SessionStatus::Idle);
}

// =========================================================================
// Messaging
// =========================================================================

#[tokio::test]
async fn test_messages_flow_in_order_both_ways() {
    let (host, mut host_events, guest, mut guest_events) = connected_pair().await;

    for (x, y) in [(7, 7), (8, 8), (9, 9)] {
        host.send(&PeerMessage::Move {
            x,
            y,
            color: Color::Black,
        })
        .await
        .unwrap();
    }
    for (x, y) in [(7, 7), (8, 8), (9, 9)] {
        assert_eq!(
            next_event(&mut guest_events).await,
            SessionEvent::Message(PeerMessage::Move {
                x,
                y,
                color: Color::Black
            })
        );
    }

    guest.send(&PeerMessage::Restart).await.unwrap();
    assert_eq!(
        next_event(&mut host_events).await,
        SessionEvent::Message(PeerMessage::Restart)
    );
}

#[tokio::test]
async fn test_send_before_connect_fails() {
    let idle = session("solo", "Solo");
    let result = idle.send(&PeerMessage::Restart).await;
    assert!(matches!(result, Err(SessionError::NotConnected)));
}

#[tokio::test]
async fn test_second_connection_rejected_while_connected() {
    let (_host, _, mut guest, _) = connected_pair().await;
    let other = MemoryNetwork::new();
    let result = guest
        .connect_to(&other.dialer(), &PeerId::from("host"))
        .await;
    assert!(matches!(result, Err(SessionError::AlreadyActive)));
    assert_eq!(guest.status(), SessionStatus::Connected);
}

#[tokio::test]
async fn test_update_profile_resends_handshake() {
    let (mut host, _, _guest, mut guest_events) = connected_pair().await;

    host.update_profile(Profile::named("Alice II")).await.unwrap();

    match next_event(&mut guest_events).await {
        SessionEvent::Message(PeerMessage::Handshake { profile, peer_id }) => {
            assert_eq!(profile.name, "Alice II");
            assert_eq!(peer_id, Some(PeerId::from("host")));
        }
        other => panic!("expected handshake, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_frame_reported_link_survives() {
    let network = MemoryNetwork::new();
    let mut transport = network.listen("host").await.unwrap();
    let mut host = session("host", "Alice");

    let raw_guest = async {
        let conn = network.dialer().dial("host").await.unwrap();
        let hello = JsonCodec
            .encode(&PeerMessage::Handshake {
                profile: Profile::named("Raw"),
                peer_id: None,
            })
            .unwrap();
        conn.send(&hello).await.unwrap();
        conn
    };
    let (events, conn) = tokio::join!(host.initiate_as_host(&mut transport), raw_guest);
    let mut events = events.unwrap();

    // Without an announced id the host names the peer after the link.
    assert!(host.remote_id().unwrap().as_str().starts_with("peer-"));

    // Skip the host's own handshake on the raw side; it is not read here.
    conn.send(b"not json").await.unwrap();
    let bad_die = br#"{"type":"liar_action","action":{"type":"REVEAL","payload":{"dice":[9]}}}"#;
    conn.send(bad_die).await.unwrap();
    conn.send(&JsonCodec.encode(&PeerMessage::Restart).unwrap())
        .await
        .unwrap();

    assert!(matches!(next_event(&mut events).await, SessionEvent::Invalid { .. }));
    assert!(matches!(next_event(&mut events).await, SessionEvent::Invalid { .. }));
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::Message(PeerMessage::Restart)
    );
}

// =========================================================================
// Disconnect
// =========================================================================

#[tokio::test]
async fn test_remote_close_reported_once() {
    let (mut host, mut host_events, mut guest, _) = connected_pair().await;

    guest.close().await.unwrap();
    assert_eq!(guest.status(), SessionStatus::Idle);

    assert_eq!(
        next_event(&mut host_events).await,
        SessionEvent::RemoteDisconnected
    );
    assert!(host.handle_remote_disconnect());
    assert!(!host.handle_remote_disconnect());
    assert_eq!(host.status(), SessionStatus::Idle);
    assert_eq!(host.role(), None);
    assert!(host_events.next().await.is_none());
}

#[tokio::test]
async fn test_reconnect_is_a_fresh_session() {
    let network = MemoryNetwork::new();
    let dialer = network.dialer();
    let mut guest = session("guest", "Bob");

    for round in 0..2 {
        let mut transport = network.listen("host").await.unwrap();
        let mut host = session("host", "Alice");
        let host_id = PeerId::from("host");
        let (h, g) = tokio::join!(
            host.initiate_as_host(&mut transport),
            guest.connect_to(&dialer, &host_id),
        );
        let _host_events = h.unwrap();
        let _guest_events = g.unwrap();
        assert_eq!(guest.status(), SessionStatus::Connected, "round {round}");

        host.close().await.unwrap();
        transport.shutdown().await.unwrap();
        guest.close().await.unwrap();
        assert_eq!(guest.status(), SessionStatus::Idle);
    }
}
