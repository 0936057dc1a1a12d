mod network_object;
mod network_objects;

pub use network_object::{NetworkObject, ObjectSpawn, Position};
pub use network_objects::NetworkObjects;
