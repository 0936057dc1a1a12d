//! # Shoal Client
//! A client that connects to a shoal server, learns which network objects
//! it observes, and sends/receives typed broadcasts.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use shoal_shared::{
        ByteReader, ByteWrite, ByteWriter, Channel, ClientId, Message, ObjectId, Protocol, Serde,
        SerdeErr,
    };
}

mod client;
mod client_config;
mod connection_state;
mod error;
mod events;

pub use client::Client;
pub use client_config::ClientConfig;
pub use connection_state::ConnectionState;
pub use error::ClientError;
pub use events::{
    AuthEvent, ClientEvent, ClientEvents, ConnectEvent, DespawnEvent, DisconnectEvent,
    ErrorEvent, OwnershipEvent, SpawnEvent,
};
