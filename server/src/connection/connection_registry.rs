use std::{
    collections::{BTreeMap, HashMap},
    net::SocketAddr,
};

use log::info;

use shoal_shared::{ClientId, KeyGenerator, ObjectId, SceneId};

use crate::connection::Connection;

/// Owns every live Connection. ClientIds are handed out in order and never
/// reused for the lifetime of the registry.
pub struct ConnectionRegistry {
    client_ids: KeyGenerator<ClientId>,
    connections: BTreeMap<ClientId, Connection>,
    addresses: HashMap<SocketAddr, ClientId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            client_ids: KeyGenerator::with_limit(i32::MAX as u32),
            connections: BTreeMap::new(),
            addresses: HashMap::new(),
        }
    }

    /// Creates a Connection for a newly connected peer. Returns None once the
    /// id space is exhausted.
    pub fn add(&mut self, address: SocketAddr) -> Option<ClientId> {
        let client_id = self.client_ids.generate()?;
        self.insert(Connection::new(client_id, address));
        Some(client_id)
    }

    /// Panics if the id is already live
    pub(crate) fn insert(&mut self, connection: Connection) {
        let client_id = connection.client_id();
        assert!(
            client_id.is_valid(),
            "cannot register a connection with an invalid id"
        );
        assert!(
            !self.connections.contains_key(&client_id),
            "{} is already registered",
            client_id
        );

        info!("registered {} from {}", client_id, connection.address());
        self.addresses.insert(connection.address(), client_id);
        self.connections.insert(client_id, connection);
    }

    /// Removes a Connection and returns it, invalidated
    pub fn remove(&mut self, client_id: &ClientId) -> Option<Connection> {
        let mut connection = self.connections.remove(client_id)?;
        self.addresses.remove(&connection.address());
        info!("removed {} at {}", client_id, connection.address());
        connection.invalidate();
        Some(connection)
    }

    pub fn lookup(&self, client_id: &ClientId) -> Option<&Connection> {
        self.connections.get(client_id)
    }

    pub fn lookup_by_address(&self, address: &SocketAddr) -> Option<ClientId> {
        self.addresses.get(address).copied()
    }

    pub fn contains(&self, client_id: &ClientId) -> bool {
        self.connections.contains_key(client_id)
    }

    /// Iterates live connections in ClientId order
    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    pub fn authenticated(&self) -> impl Iterator<Item = &Connection> {
        self.connections
            .values()
            .filter(|connection| connection.is_authenticated())
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    // Mutation, all return false if the client is unknown or nothing changed

    pub fn set_authenticated(&mut self, client_id: &ClientId, authenticated: bool) -> bool {
        let Some(connection) = self.connections.get_mut(client_id) else {
            return false;
        };
        let changed = connection.is_authenticated() != authenticated;
        connection.set_authenticated(authenticated);
        changed
    }

    pub fn add_owned_object(&mut self, client_id: &ClientId, object: ObjectId) -> bool {
        self.connections
            .get_mut(client_id)
            .is_some_and(|connection| connection.add_owned_object(object))
    }

    pub fn remove_owned_object(&mut self, client_id: &ClientId, object: &ObjectId) -> bool {
        self.connections
            .get_mut(client_id)
            .is_some_and(|connection| connection.remove_owned_object(object))
    }

    pub fn add_scene(&mut self, client_id: &ClientId, scene: SceneId) -> bool {
        self.connections
            .get_mut(client_id)
            .is_some_and(|connection| connection.add_scene(scene))
    }

    pub fn remove_scene(&mut self, client_id: &ClientId, scene: &SceneId) -> bool {
        self.connections
            .get_mut(client_id)
            .is_some_and(|connection| connection.remove_scene(scene))
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
