use thiserror::Error;

use shoal_shared::{ObjectId, PacketType, RouterError, SerdeErr, TransportError};

/// Errors reported by the Client. Packets that cause them are dropped and
/// processing continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The client has not been connected, nothing was sent
    #[error("Client is not active. Call Client::connect() first")]
    NotActive,

    /// The transport has not reported the connection yet
    #[error("Client transport is not connected yet")]
    NotConnected,

    #[error("Malformed packet from server, dropped")]
    MalformedPacket(#[source] SerdeErr),

    /// The server told us to forget an object we never observed
    #[error("Server despawned {object}, which this client does not observe")]
    UnknownObject { object: ObjectId },

    #[error("Client cannot handle {packet_type:?} packets")]
    UnexpectedPacket { packet_type: PacketType },

    #[error(transparent)]
    Router(#[from] RouterError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
