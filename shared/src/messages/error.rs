use thiserror::Error;

use shoal_serde::SerdeErr;

/// Errors that can occur while registering message kinds
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageKindsError {
    /// Two distinct message types hash to the same wire key
    #[error("Message key {key:#06x} of {incoming} collides with already registered {existing}. Rename one of the types or assign an explicit KEY")]
    KeyCollision {
        key: u16,
        existing: &'static str,
        incoming: &'static str,
    },
}

/// Errors that can occur while routing broadcasts. None of these are fatal:
/// the offending packet is dropped and processing continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// No handler is registered for the incoming key
    #[error("No handler registered for message key {key:#06x}, packet dropped")]
    UnknownMessage { key: u16 },

    /// The message type was never added to the Protocol
    #[error("Message type {name} is not registered with the Protocol. Add it via add_message()")]
    UnregisteredMessage { name: &'static str },

    /// Every handler for this key requires an authenticated sender
    #[error("Message key {key:#06x} requires an authenticated sender, packet dropped")]
    Unauthenticated { key: u16 },

    /// The packet ended before a message key could be read
    #[error("Packet too short to contain a message key")]
    MissingKey(#[source] SerdeErr),

    /// A handler could not decode the payload
    #[error("Failed to decode payload of {name}")]
    Decode {
        name: &'static str,
        #[source]
        source: SerdeErr,
    },
}
