//! # Shoal Server
//! An authoritative server that tracks connected clients, decides which
//! clients observe which network objects, and routes typed broadcasts to
//! and from them.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use shoal_shared::{
        ByteReader, ByteWrite, ByteWriter, Channel, ClientId, Message, ObjectId, Protocol,
        SceneId, Serde, SerdeErr, Tick,
    };
}

mod connection;
mod error;
mod events;
mod object;
mod observer;
mod server;

pub use connection::{Connection, ConnectionRegistry};
pub use error::ServerError;
pub use events::{
    AuthEvent, ConnectEvent, DisconnectEvent, ErrorEvent, ObserverEvent, ServerEvent,
    ServerEvents,
};
pub use object::{NetworkObject, NetworkObjects, ObjectSpawn, Position};
pub use observer::{
    conditions::{AlwaysCondition, DistanceCondition, OwnerOnlyCondition, SceneCondition},
    ConditionContext, ObserverChange, ObserverCondition, ObserverEngine, ObserverError,
    ObserverSettings, ObserverStateChange,
};
pub use server::{Server, ServerConfig};
