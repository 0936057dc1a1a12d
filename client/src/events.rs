use std::vec::IntoIter;

use shoal_shared::{ClientId, ObjectId};

use crate::ClientError;

/// Everything that happened on the client since events were last taken
pub struct ClientEvents {
    connections: Vec<()>,
    disconnections: Vec<()>,
    authentications: Vec<ClientId>,
    spawns: Vec<(ObjectId, bool)>,
    despawns: Vec<ObjectId>,
    ownership_changes: Vec<(ObjectId, bool)>,
    errors: Vec<ClientError>,

    empty: bool,
}

impl Default for ClientEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientEvents {
    pub(crate) fn new() -> Self {
        Self {
            connections: Vec::new(),
            disconnections: Vec::new(),
            authentications: Vec::new(),
            spawns: Vec::new(),
            despawns: Vec::new(),
            ownership_changes: Vec::new(),
            errors: Vec::new(),

            empty: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: ClientEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: ClientEvent>(&self) -> bool {
        V::has(self)
    }

    pub(crate) fn push_connection(&mut self) {
        self.connections.push(());
        self.empty = false;
    }

    pub(crate) fn push_disconnection(&mut self) {
        self.disconnections.push(());
        self.empty = false;
    }

    pub(crate) fn push_authentication(&mut self, client_id: ClientId) {
        self.authentications.push(client_id);
        self.empty = false;
    }

    pub(crate) fn push_spawn(&mut self, object: ObjectId, owned: bool) {
        self.spawns.push((object, owned));
        self.empty = false;
    }

    pub(crate) fn push_despawn(&mut self, object: ObjectId) {
        self.despawns.push(object);
        self.empty = false;
    }

    pub(crate) fn push_ownership_change(&mut self, object: ObjectId, owned: bool) {
        self.ownership_changes.push((object, owned));
        self.empty = false;
    }

    pub(crate) fn push_error(&mut self, error: ClientError) {
        self.errors.push(error);
        self.empty = false;
    }
}

// Event Trait
pub trait ClientEvent {
    type Iter;

    fn iter(events: &mut ClientEvents) -> Self::Iter;

    fn has(events: &ClientEvents) -> bool;
}

macro_rules! client_event {
    ($(#[$meta:meta])* $event:ident, $field:ident, $item:ty) => {
        $(#[$meta])*
        pub struct $event;
        impl ClientEvent for $event {
            type Iter = IntoIter<$item>;

            fn iter(events: &mut ClientEvents) -> Self::Iter {
                let list = std::mem::take(&mut events.$field);
                IntoIterator::into_iter(list)
            }

            fn has(events: &ClientEvents) -> bool {
                !events.$field.is_empty()
            }
        }
    };
}

client_event!(
    /// The transport reported the connection to the server
    ConnectEvent, connections, ()
);
client_event!(
    /// The connection to the server is gone
    DisconnectEvent, disconnections, ()
);
client_event!(
    /// The server authenticated this client under the carried id
    AuthEvent, authentications, ClientId
);
client_event!(
    /// This client now observes an object; the flag tells whether it owns it
    SpawnEvent, spawns, (ObjectId, bool)
);
client_event!(
    /// This client no longer observes an object
    DespawnEvent, despawns, ObjectId
);
client_event!(
    /// Ownership of an observed object moved to or away from this client
    OwnershipEvent, ownership_changes, (ObjectId, bool)
);
client_event!(ErrorEvent, errors, ClientError);
