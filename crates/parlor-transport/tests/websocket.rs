//! Integration tests for the WebSocket peer link.
//!
//! These bind a real listener on an OS-assigned port and dial it with
//! [`WebSocketDialer`], so both halves of the link are our own types.

#[cfg(feature = "websocket")]
mod websocket {
    use parlor_transport::{
        Connection, Dialer, Transport, WebSocketDialer, WebSocketTransport,
    };

    async fn host_and_guest() -> (
        parlor_transport::ServerConnection,
        parlor_transport::ClientConnection,
    ) {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound address").to_string();

        let host = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });
        let guest = WebSocketDialer.dial(&addr).await.expect("should dial");
        let host = host.await.expect("accept task should complete");
        (host, guest)
    }

    #[tokio::test]
    async fn test_websocket_frames_flow_both_ways() {
        let (host, guest) = host_and_guest().await;

        host.send(b"from host").await.expect("host send");
        let got = guest.recv().await.expect("guest recv").expect("frame");
        assert_eq!(got, b"from host");

        guest.send(b"from guest").await.expect("guest send");
        let got = host.recv().await.expect("host recv").expect("frame");
        assert_eq!(got, b"from guest");
    }

    #[tokio::test]
    async fn test_websocket_send_not_blocked_by_pending_recv() {
        let (host, guest) = host_and_guest().await;
        let host = std::sync::Arc::new(host);

        // Park a reader on the host side first.
        let reader = {
            let host = std::sync::Arc::clone(&host);
            tokio::spawn(async move { host.recv().await })
        };
        tokio::task::yield_now().await;

        // Sending from the same link must still go through.
        host.send(b"while reading").await.expect("send while reading");
        let got = guest.recv().await.expect("guest recv").expect("frame");
        assert_eq!(got, b"while reading");

        guest.send(b"wake up").await.expect("guest send");
        let woke = reader.await.expect("reader task").expect("recv");
        assert_eq!(woke.as_deref(), Some(&b"wake up"[..]));
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_after_remote_close() {
        let (host, guest) = host_and_guest().await;
        guest.close().await.expect("close should succeed");

        let result = host.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on remote close");
    }

    #[tokio::test]
    async fn test_websocket_dial_without_listener_fails() {
        // Grab a free port, then release it so nothing listens there.
        let addr = {
            let probe = WebSocketTransport::bind("127.0.0.1:0").await.unwrap();
            probe.local_addr().unwrap().to_string()
        };
        let result = WebSocketDialer.dial(&addr).await;
        assert!(result.is_err());
    }
}
