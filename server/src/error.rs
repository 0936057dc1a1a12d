use std::net::SocketAddr;

use thiserror::Error;

use shoal_shared::{ClientId, ObjectId, PacketType, RouterError, SerdeErr, TransportError};

use crate::observer::ObserverError;

/// Errors reported by the Server. None of them stop the server: the
/// offending operation or packet is skipped and processing continues.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServerError {
    /// The server has not been started, nothing was sent
    #[error("Server is not active. Call Server::start() first")]
    NotActive,

    #[error("No connection exists for {client}")]
    UnknownClient { client: ClientId },

    #[error("No network object exists for {object}")]
    UnknownObject { object: ObjectId },

    /// A packet arrived from an address with no connection
    #[error("Received packet from unknown address {address}, dropped")]
    UnknownAddress { address: SocketAddr },

    #[error("All client ids for this session have been issued, rejecting {address}")]
    ClientIdsExhausted { address: SocketAddr },

    #[error("All object ids for this session have been issued")]
    ObjectIdsExhausted,

    /// The packet did not start with a valid packet type
    #[error("Malformed packet from {client}, dropped")]
    MalformedPacket {
        client: ClientId,
        #[source]
        source: SerdeErr,
    },

    /// Clients may only send broadcasts
    #[error("Unexpected {packet_type:?} packet from {client}, dropped")]
    UnexpectedPacket {
        client: ClientId,
        packet_type: PacketType,
    },

    #[error(transparent)]
    Router(#[from] RouterError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Observer(#[from] ObserverError),
}
