use std::{
    collections::{BTreeSet, HashSet},
    net::SocketAddr,
};

use shoal_shared::{ClientId, ObjectId, SceneId};

/// A connected peer as seen by the server. Two connections are equal when
/// their ClientIds are.
#[derive(Clone, Debug)]
pub struct Connection {
    client_id: ClientId,
    address: SocketAddr,
    authenticated: bool,
    owned_objects: BTreeSet<ObjectId>,
    loaded_scenes: HashSet<SceneId>,
}

impl Connection {
    pub(crate) fn new(client_id: ClientId, address: SocketAddr) -> Self {
        Self {
            client_id,
            address,
            authenticated: false,
            owned_objects: BTreeSet::new(),
            loaded_scenes: HashSet::new(),
        }
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// False once the connection has been removed from the registry
    pub fn is_valid(&self) -> bool {
        self.client_id.is_valid()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn owned_objects(&self) -> &BTreeSet<ObjectId> {
        &self.owned_objects
    }

    pub fn owns(&self, object: &ObjectId) -> bool {
        self.owned_objects.contains(object)
    }

    /// Lowest-id object this connection owns, used as its point of view
    pub fn first_owned_object(&self) -> Option<ObjectId> {
        self.owned_objects.first().copied()
    }

    pub fn loaded_scenes(&self) -> impl Iterator<Item = &SceneId> {
        self.loaded_scenes.iter()
    }

    pub fn has_loaded_scene(&self, scene: &SceneId) -> bool {
        self.loaded_scenes.contains(scene)
    }

    // Crate-public

    pub(crate) fn set_authenticated(&mut self, authenticated: bool) {
        self.authenticated = authenticated;
    }

    pub(crate) fn add_owned_object(&mut self, object: ObjectId) -> bool {
        self.owned_objects.insert(object)
    }

    pub(crate) fn remove_owned_object(&mut self, object: &ObjectId) -> bool {
        self.owned_objects.remove(object)
    }

    pub(crate) fn add_scene(&mut self, scene: SceneId) -> bool {
        self.loaded_scenes.insert(scene)
    }

    pub(crate) fn remove_scene(&mut self, scene: &SceneId) -> bool {
        self.loaded_scenes.remove(scene)
    }

    /// Drops everything tied to the session and invalidates the id
    pub(crate) fn invalidate(&mut self) {
        self.client_id = ClientId::INVALID;
        self.authenticated = false;
        self.owned_objects.clear();
        self.loaded_scenes.clear();
    }
}

impl PartialEq for Connection {
    fn eq(&self, other: &Self) -> bool {
        self.client_id == other.client_id
    }
}

impl Eq for Connection {}
