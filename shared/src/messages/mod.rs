pub mod broadcast_router;
pub mod channel;
pub mod error;
pub mod message;
pub mod message_kinds;
