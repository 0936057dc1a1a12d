use std::net::SocketAddr;

use thiserror::Error;

/// Errors a transport can report to the role driving it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transport has been closed, nothing more can be sent or received
    #[error("Transport is closed")]
    Closed,

    /// Tried to reach a peer the transport has no connection to
    #[error("No connection to peer at {address}")]
    UnknownPeer { address: SocketAddr },

    #[error("Failed to send packet: {reason}")]
    SendFailed { reason: String },

    #[error("Failed to receive packet: {reason}")]
    ReceiveFailed { reason: String },
}
