//! Seam between the replication core and whatever moves bytes. Transports
//! are polled from the logical thread and must never block.

use std::net::SocketAddr;

use crate::messages::channel::Channel;

mod error;
pub use error::TransportError;

/// Something that happened on a server transport since the last poll
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerTransportEvent {
    Connected(SocketAddr),
    Disconnected(SocketAddr),
    Packet(SocketAddr, Channel, Box<[u8]>),
}

pub trait ServerTransport {
    /// Returns the next pending event, or None once the inbound queue is empty
    fn receive(&mut self) -> Result<Option<ServerTransportEvent>, TransportError>;

    fn send(
        &mut self,
        address: &SocketAddr,
        channel: Channel,
        payload: &[u8],
    ) -> Result<(), TransportError>;

    /// Drops the connection to a peer. No Disconnected event is raised for it.
    fn disconnect(&mut self, address: &SocketAddr);

    /// Disconnects every peer and stops listening
    fn close(&mut self);
}

/// Something that happened on a client transport since the last poll
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientTransportEvent {
    Connected,
    Disconnected,
    Packet(Channel, Box<[u8]>),
}

pub trait ClientTransport {
    fn receive(&mut self) -> Result<Option<ClientTransportEvent>, TransportError>;

    fn send(&mut self, channel: Channel, payload: &[u8]) -> Result<(), TransportError>;

    /// Closes the connection to the server
    fn close(&mut self);
}
