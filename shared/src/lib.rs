//! # Shoal Shared
//! Common functionality shared between shoal-server & shoal-client crates.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use shoal_serde::{
    ByteCounter, ByteReader, ByteWrite, ByteWriter, Serde, SerdeErr, VariableInteger,
};

mod connection;
mod iteration_loop;
mod key_generator;
mod messages;
mod protocol;
mod tick;
mod transport;
mod types;

pub use connection::{packet_type::PacketType, system_packet::SystemPacket};
pub use iteration_loop::{IterationLoop, NetworkRole};
pub use key_generator::KeyGenerator;
pub use messages::{
    broadcast_router::{BroadcastRouter, HandlerKey},
    channel::Channel,
    error::{MessageKindsError, RouterError},
    message::{Message, MessageKey},
    message_kinds::MessageKinds,
};
pub use protocol::{Protocol, ProtocolError};
pub use tick::{
    error::TickConfigError,
    tick_config::{PhysicsMode, TickConfig},
    tick_scheduler::{TickPhase, TickRounding, TickScheduler},
};
pub use transport::{
    ClientTransport, ClientTransportEvent, ServerTransport, ServerTransportEvent, TransportError,
};
pub use types::{ClientId, ObjectId, SceneId, Tick};
