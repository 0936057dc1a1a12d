//! # Shoal Manager
//! Owns the tick scheduler and the server and/or client roles of a session,
//! and drives them once per frame.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

mod network_manager;
mod roles;
mod tick_listener;

pub use network_manager::NetworkManager;
pub use roles::NetworkRoles;
pub use tick_listener::{ListenerKey, TickListener};
