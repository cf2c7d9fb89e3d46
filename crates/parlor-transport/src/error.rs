/// Errors that can occur on a peer link.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The link was closed by either side.
    #[error("link closed: {0}")]
    ConnectionClosed(String),

    /// Sending a frame failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving a frame failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Listening for or accepting an incoming peer failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// Dialing a remote peer failed.
    #[error("connect to {remote} failed: {source}")]
    ConnectFailed {
        remote: String,
        #[source]
        source: std::io::Error,
    },

    /// No peer is listening under the requested id.
    #[error("no peer listening as {0}")]
    UnknownPeer(String),

    /// The listener was shut down.
    #[error("transport shut down")]
    Shutdown,
}
