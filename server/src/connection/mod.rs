mod connection;
mod connection_registry;

pub use connection::Connection;
pub use connection_registry::ConnectionRegistry;
