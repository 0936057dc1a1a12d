use std::{collections::BTreeMap, net::SocketAddr};

use log::{info, trace, warn};

use shoal_shared::{
    BroadcastRouter, ByteReader, Channel, ClientId, HandlerKey, Message, NetworkRole, ObjectId,
    PacketType, Protocol, SceneId, Serde, ServerTransport, ServerTransportEvent, SystemPacket,
    Tick,
};

use crate::{
    connection::{Connection, ConnectionRegistry},
    events::ServerEvents,
    object::{NetworkObject, NetworkObjects, ObjectSpawn, Position},
    observer::{ObserverChange, ObserverEngine, ObserverStateChange},
    ServerConfig, ServerError,
};

type OutgoingQueue = Vec<(Channel, Box<[u8]>)>;

/// Authoritative side of a session. Tracks connections, decides which
/// clients observe which network objects, and routes broadcasts to and from
/// clients.
pub struct Server {
    config: ServerConfig,
    router: BroadcastRouter<ClientId>,
    transport: Option<Box<dyn ServerTransport>>,
    connections: ConnectionRegistry,
    objects: NetworkObjects,
    observers: ObserverEngine,
    outgoing: BTreeMap<ClientId, OutgoingQueue>,
    ticks_since_timed_check: u32,
    incoming_events: ServerEvents,
}

impl Server {
    /// Create a new Server
    pub fn new<P: Into<Protocol>>(config: ServerConfig, protocol: P) -> Self {
        let protocol: Protocol = protocol.into();

        Self {
            config,
            router: BroadcastRouter::new(protocol.message_kinds),
            transport: None,
            connections: ConnectionRegistry::new(),
            objects: NetworkObjects::new(),
            observers: ObserverEngine::new(),
            outgoing: BTreeMap::new(),
            ticks_since_timed_check: 0,
            incoming_events: ServerEvents::new(),
        }
    }

    /// Starts accepting connections on the given transport
    pub fn start<T: ServerTransport + 'static>(&mut self, transport: T) {
        if self.is_active() {
            warn!("Server already started, ignoring start()");
            return;
        }
        info!("server started");
        self.transport = Some(Box::new(transport));
    }

    /// Closes the transport and drops every connection and object
    pub fn stop(&mut self) {
        let Some(mut transport) = self.transport.take() else {
            return;
        };
        transport.close();

        self.connections = ConnectionRegistry::new();
        self.objects = NetworkObjects::new();
        self.observers = ObserverEngine::new();
        self.outgoing.clear();
        self.ticks_since_timed_check = 0;
        info!("server stopped");
    }

    pub fn is_active(&self) -> bool {
        self.transport.is_some()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns everything that happened since the last call
    pub fn take_events(&mut self) -> ServerEvents {
        std::mem::replace(&mut self.incoming_events, ServerEvents::new())
    }

    // Broadcast handlers

    /// Registers a handler for broadcasts of type `M` from authenticated
    /// clients. Broadcasts from clients that haven't authenticated are
    /// dropped and reported.
    pub fn register_broadcast<M: Message, F: FnMut(ClientId, M) + 'static>(
        &mut self,
        handler: F,
    ) -> Result<HandlerKey, ServerError> {
        Ok(self.router.register::<M, F>(handler)?)
    }

    /// Registers a handler for broadcasts of type `M` from any client,
    /// typically used for login messages
    pub fn register_unauthenticated_broadcast<M: Message, F: FnMut(ClientId, M) + 'static>(
        &mut self,
        handler: F,
    ) -> Result<HandlerKey, ServerError> {
        Ok(self.router.register_unauthenticated::<M, F>(handler)?)
    }

    /// Removes exactly the handler registered under `handler_key`
    pub fn unregister_broadcast<M: Message>(&mut self, handler_key: HandlerKey) -> bool {
        self.router.unregister::<M>(handler_key)
    }

    // Sending

    /// Queues a broadcast for one client
    pub fn send_to<M: Message>(
        &mut self,
        client_id: &ClientId,
        message: &M,
        channel: Channel,
    ) -> Result<(), ServerError> {
        self.check_active()?;
        if !self.connections.contains(client_id) {
            return Err(ServerError::UnknownClient { client: *client_id });
        }

        let payload = self.router.write_broadcast(message)?;
        self.queue_packet(*client_id, channel, payload);
        Ok(())
    }

    /// Queues a broadcast for every authenticated client
    pub fn broadcast<M: Message>(&mut self, message: &M, channel: Channel) -> Result<(), ServerError> {
        self.check_active()?;

        let payload = self.router.write_broadcast(message)?;
        let recipients: Vec<ClientId> = self
            .connections
            .authenticated()
            .map(Connection::client_id)
            .collect();
        for client_id in recipients {
            self.queue_packet(client_id, channel, payload.clone());
        }
        Ok(())
    }

    /// Queues a broadcast for every client observing `object_id`
    pub fn broadcast_to_observers<M: Message>(
        &mut self,
        object_id: &ObjectId,
        message: &M,
        channel: Channel,
    ) -> Result<(), ServerError> {
        self.check_active()?;
        let Some(object) = self.objects.get(object_id) else {
            return Err(ServerError::UnknownObject { object: *object_id });
        };
        let recipients: Vec<ClientId> = object.observers().iter().copied().collect();

        let payload = self.router.write_broadcast(message)?;
        for client_id in recipients {
            self.queue_packet(client_id, channel, payload.clone());
        }
        Ok(())
    }

    // Authentication

    /// Authenticates a connection. It is told its ClientId and starts
    /// observing objects.
    pub fn accept_auth(&mut self, client_id: &ClientId) -> Result<(), ServerError> {
        self.check_active()?;
        if !self.connections.contains(client_id) {
            return Err(ServerError::UnknownClient { client: *client_id });
        }
        self.authenticate(*client_id);
        Ok(())
    }

    /// Refuses a connection and disconnects it
    pub fn reject_auth(&mut self, client_id: &ClientId) -> Result<(), ServerError> {
        info!("rejecting {}", client_id);
        self.disconnect(client_id)
    }

    // Connections

    pub fn connections(&self) -> &ConnectionRegistry {
        &self.connections
    }

    pub fn connection(&self, client_id: &ClientId) -> Option<&Connection> {
        self.connections.lookup(client_id)
    }

    pub fn client_ids(&self) -> Vec<ClientId> {
        self.connections.iter().map(Connection::client_id).collect()
    }

    /// Drops a connection. Its owned objects are despawned.
    pub fn disconnect(&mut self, client_id: &ClientId) -> Result<(), ServerError> {
        self.check_active()?;
        let Some(address) = self.connections.lookup(client_id).map(Connection::address) else {
            return Err(ServerError::UnknownClient { client: *client_id });
        };

        if let Some(transport) = self.transport.as_mut() {
            transport.disconnect(&address);
        }
        self.remove_client(client_id);
        Ok(())
    }

    /// Called once the client has finished loading `scene`
    pub fn client_loaded_scene(
        &mut self,
        client_id: &ClientId,
        scene: SceneId,
    ) -> Result<(), ServerError> {
        self.check_active()?;
        if !self.connections.contains(client_id) {
            return Err(ServerError::UnknownClient { client: *client_id });
        }
        if self.connections.add_scene(client_id, scene) {
            self.rebuild_connection(client_id);
        }
        Ok(())
    }

    pub fn client_unloaded_scene(
        &mut self,
        client_id: &ClientId,
        scene: &SceneId,
    ) -> Result<(), ServerError> {
        self.check_active()?;
        if !self.connections.contains(client_id) {
            return Err(ServerError::UnknownClient { client: *client_id });
        }
        if self.connections.remove_scene(client_id, scene) {
            self.rebuild_connection(client_id);
        }
        Ok(())
    }

    // Objects

    pub fn objects(&self) -> &NetworkObjects {
        &self.objects
    }

    pub fn object(&self, object_id: &ObjectId) -> Option<&NetworkObject> {
        self.objects.get(object_id)
    }

    pub fn observers(&self) -> &ObserverEngine {
        &self.observers
    }

    /// Spawns a network object, optionally owned by a client, and works out
    /// who observes it. An empty condition list is reported as an error
    /// event; the object is still spawned and only its owner observes it.
    pub fn spawn_object(
        &mut self,
        owner: Option<ClientId>,
        spawn: ObjectSpawn,
    ) -> Result<ObjectId, ServerError> {
        self.check_active()?;
        if let Some(owner) = &owner {
            if !self.connections.contains(owner) {
                return Err(ServerError::UnknownClient { client: *owner });
            }
        }

        let ObjectSpawn {
            scene,
            position,
            observers,
        } = spawn;
        let object_id = self
            .objects
            .insert(owner, scene, position)
            .ok_or(ServerError::ObjectIdsExhausted)?;
        trace!("spawned {}", object_id);

        if let Err(err) = self.observers.register_object(object_id, observers) {
            self.incoming_events.push_error(err.into());
        }

        self.rebuild_object(&object_id);
        if let Some(owner) = &owner {
            self.connections.add_owned_object(owner, object_id);
            self.rebuild_if_viewpoint(owner, &object_id);
        }

        Ok(object_id)
    }

    /// Despawns an object, telling every observer
    pub fn despawn_object(&mut self, object_id: &ObjectId) -> Result<(), ServerError> {
        self.check_active()?;
        self.despawn(object_id)
    }

    /// Makes `client_id` the owner of an object
    pub fn give_ownership(
        &mut self,
        object_id: &ObjectId,
        client_id: &ClientId,
    ) -> Result<(), ServerError> {
        self.check_active()?;
        if !self.connections.contains(client_id) {
            return Err(ServerError::UnknownClient { client: *client_id });
        }
        self.set_owner(object_id, Some(*client_id))
    }

    /// Makes an object server-owned
    pub fn remove_ownership(&mut self, object_id: &ObjectId) -> Result<(), ServerError> {
        self.check_active()?;
        self.set_owner(object_id, None)
    }

    /// Moves an object. Distance conditions pick this up on the next timed check.
    pub fn set_object_position(
        &mut self,
        object_id: &ObjectId,
        position: Position,
    ) -> Result<(), ServerError> {
        self.check_active()?;
        let Some(object) = self.objects.get_mut(object_id) else {
            return Err(ServerError::UnknownObject { object: *object_id });
        };
        object.set_position(position);
        Ok(())
    }

    pub fn set_object_scene(
        &mut self,
        object_id: &ObjectId,
        scene: Option<SceneId>,
    ) -> Result<(), ServerError> {
        self.check_active()?;
        let Some(object) = self.objects.get_mut(object_id) else {
            return Err(ServerError::UnknownObject { object: *object_id });
        };
        if object.scene() != scene {
            object.set_scene(scene);
            self.rebuild_object(object_id);
        }
        Ok(())
    }

    /// Re-evaluates whether `client_id` observes `object_id`, telling the
    /// client if that changed
    pub fn rebuild_observers(
        &mut self,
        object_id: &ObjectId,
        client_id: &ClientId,
    ) -> Result<ObserverStateChange, ServerError> {
        self.check_active()?;
        let Some(connection) = self.connections.lookup(client_id) else {
            return Err(ServerError::UnknownClient { client: *client_id });
        };
        if !self.objects.contains(object_id) {
            return Err(ServerError::UnknownObject { object: *object_id });
        }

        let change = self
            .observers
            .rebuild_observers(&mut self.objects, object_id, connection);
        self.apply_observer_changes(&[ObserverChange {
            object: *object_id,
            client: *client_id,
            change,
        }]);
        Ok(change)
    }

    // Ticks

    /// Runs the periodic observer checks. Called by the tick loop once per
    /// simulation tick.
    pub fn on_tick(&mut self, tick: Tick) {
        if !self.is_active() {
            return;
        }

        self.ticks_since_timed_check += 1;
        if self.ticks_since_timed_check < self.config.timed_check_interval.max(1) {
            return;
        }
        self.ticks_since_timed_check = 0;

        trace!("timed observer checks on tick {}", tick);
        let changes = self
            .observers
            .rebuild_timed(&mut self.objects, &self.connections);
        self.apply_observer_changes(&changes);
    }

    // Transport

    /// Drains the transport, handling connects, disconnects and broadcasts
    /// until nothing is left. Errors are reported as events; the drain goes
    /// on with the next packet.
    pub fn receive_all(&mut self) {
        loop {
            let Some(transport) = self.transport.as_mut() else {
                return;
            };
            match transport.receive() {
                Ok(Some(event)) => self.handle_transport_event(event),
                Ok(None) => break,
                Err(err) => {
                    self.report(err.into());
                    break;
                }
            }
        }
    }

    /// Writes every queued packet to the transport. Clients are visited in
    /// a random order each time.
    pub fn send_all_packets(&mut self) {
        let Some(transport) = self.transport.as_mut() else {
            return;
        };

        let mut queued: Vec<(ClientId, OutgoingQueue)> =
            std::mem::take(&mut self.outgoing).into_iter().collect();
        fastrand::shuffle(&mut queued);

        let mut errors = Vec::new();
        for (client_id, packets) in queued {
            let Some(address) = self.connections.lookup(&client_id).map(Connection::address) else {
                continue;
            };
            for (channel, payload) in packets {
                if let Err(err) = transport.send(&address, channel, &payload) {
                    errors.push(err);
                }
            }
        }

        for err in errors {
            self.report(err.into());
        }
    }

    /// Number of packets waiting for the next flush
    pub fn queued_packets(&self) -> usize {
        self.outgoing.values().map(Vec::len).sum()
    }

    // Private methods

    fn check_active(&self) -> Result<(), ServerError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(ServerError::NotActive)
        }
    }

    fn report(&mut self, error: ServerError) {
        warn!("Server Error: {}", error);
        self.incoming_events.push_error(error);
    }

    fn handle_transport_event(&mut self, event: ServerTransportEvent) {
        match event {
            ServerTransportEvent::Connected(address) => self.handle_connect(address),
            ServerTransportEvent::Disconnected(address) => {
                if let Some(client_id) = self.connections.lookup_by_address(&address) {
                    self.remove_client(&client_id);
                }
            }
            ServerTransportEvent::Packet(address, _channel, payload) => {
                self.handle_packet(address, &payload)
            }
        }
    }

    fn handle_connect(&mut self, address: SocketAddr) {
        if self.connections.lookup_by_address(&address).is_some() {
            warn!("{} is already connected, ignoring", address);
            return;
        }

        let Some(client_id) = self.connections.add(address) else {
            if let Some(transport) = self.transport.as_mut() {
                transport.disconnect(&address);
            }
            self.report(ServerError::ClientIdsExhausted { address });
            return;
        };
        self.incoming_events.push_connection(client_id);

        if !self.config.require_auth {
            self.authenticate(client_id);
        }
    }

    fn handle_packet(&mut self, address: SocketAddr, payload: &[u8]) {
        let Some(client_id) = self.connections.lookup_by_address(&address) else {
            self.report(ServerError::UnknownAddress { address });
            return;
        };
        let authenticated = self
            .connections
            .lookup(&client_id)
            .is_some_and(Connection::is_authenticated);

        let mut reader = ByteReader::new(payload);
        let packet_type = match PacketType::de(&mut reader) {
            Ok(packet_type) => packet_type,
            Err(source) => {
                self.report(ServerError::MalformedPacket {
                    client: client_id,
                    source,
                });
                return;
            }
        };
        if packet_type != PacketType::Broadcast {
            self.report(ServerError::UnexpectedPacket {
                client: client_id,
                packet_type,
            });
            return;
        }

        if let Err(err) = self.router.dispatch(client_id, authenticated, &mut reader) {
            self.report(err.into());
        }
    }

    fn authenticate(&mut self, client_id: ClientId) {
        if !self.connections.set_authenticated(&client_id, true) {
            return;
        }
        info!("{} authenticated", client_id);

        self.queue_system_packet(client_id, SystemPacket::Authenticated(client_id));
        self.incoming_events.push_authentication(client_id);
        self.rebuild_connection(&client_id);
    }

    fn remove_client(&mut self, client_id: &ClientId) {
        // the connection leaves the registry first so despawning its objects
        // can't put it back into any observer set
        let Some(connection) = self.connections.remove(client_id) else {
            return;
        };
        let address = connection.address();
        let owned: Vec<ObjectId> = self
            .objects
            .iter()
            .filter(|object| object.is_owned_by(client_id))
            .map(NetworkObject::id)
            .collect();

        for change in self.observers.remove_connection(&mut self.objects, client_id) {
            self.incoming_events.push_observer_change(change);
        }
        self.outgoing.remove(client_id);

        for object_id in owned {
            if let Err(err) = self.despawn(&object_id) {
                self.report(err);
            }
        }

        self.incoming_events.push_disconnection(*client_id, address);
    }

    fn despawn(&mut self, object_id: &ObjectId) -> Result<(), ServerError> {
        let Some(object) = self.objects.remove(object_id) else {
            return Err(ServerError::UnknownObject { object: *object_id });
        };
        self.observers.unregister_object(object_id);
        trace!("despawned {}", object_id);

        for client_id in object.observers() {
            self.queue_system_packet(*client_id, SystemPacket::ObjectDespawn(*object_id));
            self.incoming_events.push_observer_change(ObserverChange {
                object: *object_id,
                client: *client_id,
                change: ObserverStateChange::Removed,
            });
        }

        if let Some(owner) = object.owner() {
            let was_viewpoint = self
                .connections
                .lookup(&owner)
                .and_then(Connection::first_owned_object)
                == Some(*object_id);
            self.connections.remove_owned_object(&owner, object_id);
            if was_viewpoint {
                self.rebuild_connection(&owner);
            }
        }
        Ok(())
    }

    fn set_owner(
        &mut self,
        object_id: &ObjectId,
        new_owner: Option<ClientId>,
    ) -> Result<(), ServerError> {
        let Some(object) = self.objects.get_mut(object_id) else {
            return Err(ServerError::UnknownObject { object: *object_id });
        };
        let previous_owner = object.owner();
        if previous_owner == new_owner {
            return Ok(());
        }
        object.set_owner(new_owner);

        if let Some(previous) = &previous_owner {
            self.connections.remove_owned_object(previous, object_id);
        }
        if let Some(new) = &new_owner {
            self.connections.add_owned_object(new, *object_id);
        }

        let changes = self.rebuild_object(object_id);

        // owners that kept observing through the change are told their new
        // ownership flag with a repeated spawn
        for client_id in previous_owner.iter().chain(new_owner.iter()) {
            let just_added = changes.iter().any(|change| {
                change.client == *client_id && change.change == ObserverStateChange::Added
            });
            let observing = self
                .objects
                .get(object_id)
                .is_some_and(|object| object.is_observed_by(client_id));
            if observing && !just_added {
                let owned = new_owner == Some(*client_id);
                self.queue_system_packet(
                    *client_id,
                    SystemPacket::ObjectSpawn {
                        object: *object_id,
                        owned,
                    },
                );
            }
        }

        for client_id in previous_owner.iter().chain(new_owner.iter()) {
            self.rebuild_connection(client_id);
        }
        Ok(())
    }

    /// Rebuilds a connection if `object_id` became its first owned object
    fn rebuild_if_viewpoint(&mut self, client_id: &ClientId, object_id: &ObjectId) {
        let is_viewpoint = self
            .connections
            .lookup(client_id)
            .and_then(Connection::first_owned_object)
            == Some(*object_id);
        if is_viewpoint {
            self.rebuild_connection(client_id);
        }
    }

    fn rebuild_object(&mut self, object_id: &ObjectId) -> Vec<ObserverChange> {
        let changes = self
            .observers
            .rebuild_object(&mut self.objects, object_id, &self.connections);
        self.apply_observer_changes(&changes);
        changes
    }

    fn rebuild_connection(&mut self, client_id: &ClientId) {
        let Some(connection) = self.connections.lookup(client_id) else {
            return;
        };
        let changes = self
            .observers
            .rebuild_connection(&mut self.objects, connection);
        self.apply_observer_changes(&changes);
    }

    fn apply_observer_changes(&mut self, changes: &[ObserverChange]) {
        for change in changes {
            let packet = match change.change {
                ObserverStateChange::Added => SystemPacket::ObjectSpawn {
                    object: change.object,
                    owned: self
                        .objects
                        .get(&change.object)
                        .is_some_and(|object| object.is_owned_by(&change.client)),
                },
                ObserverStateChange::Removed => SystemPacket::ObjectDespawn(change.object),
                ObserverStateChange::Unchanged => continue,
            };
            self.queue_system_packet(change.client, packet);
            self.incoming_events.push_observer_change(*change);
        }
    }

    fn queue_system_packet(&mut self, client_id: ClientId, packet: SystemPacket) {
        self.queue_packet(client_id, Channel::Reliable, packet.to_bytes());
    }

    fn queue_packet(&mut self, client_id: ClientId, channel: Channel, payload: Box<[u8]>) {
        self.outgoing
            .entry(client_id)
            .or_default()
            .push((channel, payload));
    }
}

impl NetworkRole for Server {
    fn is_active(&self) -> bool {
        Server::is_active(self)
    }

    fn iterate_incoming(&mut self) {
        self.receive_all();
    }

    fn iterate_outgoing(&mut self) {
        self.send_all_packets();
    }
}
