use std::{net::SocketAddr, vec::IntoIter};

use shoal_shared::ClientId;

use crate::{observer::ObserverChange, ServerError};

/// Everything that happened on the server since events were last taken
pub struct ServerEvents {
    connections: Vec<ClientId>,
    authentications: Vec<ClientId>,
    disconnections: Vec<(ClientId, SocketAddr)>,
    observer_changes: Vec<ObserverChange>,
    errors: Vec<ServerError>,

    empty: bool,
}

impl ServerEvents {
    pub(crate) fn new() -> Self {
        Self {
            connections: Vec::new(),
            authentications: Vec::new(),
            disconnections: Vec::new(),
            observer_changes: Vec::new(),
            errors: Vec::new(),

            empty: true,
        }
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: ServerEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: ServerEvent>(&self) -> bool {
        V::has(self)
    }

    // Crate-public

    pub(crate) fn push_connection(&mut self, client_id: ClientId) {
        self.connections.push(client_id);
        self.empty = false;
    }

    pub(crate) fn push_authentication(&mut self, client_id: ClientId) {
        self.authentications.push(client_id);
        self.empty = false;
    }

    pub(crate) fn push_disconnection(&mut self, client_id: ClientId, address: SocketAddr) {
        self.disconnections.push((client_id, address));
        self.empty = false;
    }

    pub(crate) fn push_observer_change(&mut self, change: ObserverChange) {
        self.observer_changes.push(change);
        self.empty = false;
    }

    pub(crate) fn push_error(&mut self, error: ServerError) {
        self.errors.push(error);
        self.empty = false;
    }
}

// Event Trait
pub trait ServerEvent {
    type Iter;

    fn iter(events: &mut ServerEvents) -> Self::Iter;

    fn has(events: &ServerEvents) -> bool;
}

// ConnectEvent
pub struct ConnectEvent;
impl ServerEvent for ConnectEvent {
    type Iter = IntoIter<ClientId>;

    fn iter(events: &mut ServerEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.connections);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ServerEvents) -> bool {
        !events.connections.is_empty()
    }
}

// AuthEvent
pub struct AuthEvent;
impl ServerEvent for AuthEvent {
    type Iter = IntoIter<ClientId>;

    fn iter(events: &mut ServerEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.authentications);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ServerEvents) -> bool {
        !events.authentications.is_empty()
    }
}

// DisconnectEvent
pub struct DisconnectEvent;
impl ServerEvent for DisconnectEvent {
    type Iter = IntoIter<(ClientId, SocketAddr)>;

    fn iter(events: &mut ServerEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.disconnections);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ServerEvents) -> bool {
        !events.disconnections.is_empty()
    }
}

// ObserverEvent
pub struct ObserverEvent;
impl ServerEvent for ObserverEvent {
    type Iter = IntoIter<ObserverChange>;

    fn iter(events: &mut ServerEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.observer_changes);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ServerEvents) -> bool {
        !events.observer_changes.is_empty()
    }
}

// ErrorEvent
pub struct ErrorEvent;
impl ServerEvent for ErrorEvent {
    type Iter = IntoIter<ServerError>;

    fn iter(events: &mut ServerEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.errors);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ServerEvents) -> bool {
        !events.errors.is_empty()
    }
}
