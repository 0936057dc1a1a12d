use std::collections::BTreeMap;

use log::{info, warn};

use shoal_shared::{
    BroadcastRouter, ByteReader, Channel, ClientId, ClientTransport, ClientTransportEvent,
    HandlerKey, Message, NetworkRole, ObjectId, PacketType, Protocol, Serde, SystemPacket,
};

use crate::{events::ClientEvents, ClientConfig, ClientError, ConnectionState};

/// Client side of a session. Learns its id and the objects it observes from
/// the server and exchanges broadcasts with it.
pub struct Client {
    config: ClientConfig,
    router: BroadcastRouter<()>,
    transport: Option<Box<dyn ClientTransport>>,
    connected: bool,
    client_id: Option<ClientId>,
    /// Observed objects, mapped to whether this client owns them
    observed: BTreeMap<ObjectId, bool>,
    outgoing: Vec<(Channel, Box<[u8]>)>,
    incoming_events: ClientEvents,
}

impl Client {
    /// Create a new Client
    pub fn new<P: Into<Protocol>>(config: ClientConfig, protocol: P) -> Self {
        let protocol: Protocol = protocol.into();

        Self {
            config,
            router: BroadcastRouter::new(protocol.message_kinds),
            transport: None,
            connected: false,
            client_id: None,
            observed: BTreeMap::new(),
            outgoing: Vec::new(),
            incoming_events: ClientEvents::new(),
        }
    }

    /// Starts connecting to the server behind `transport`
    pub fn connect<T: ClientTransport + 'static>(&mut self, transport: T) {
        if self.is_active() {
            warn!("Client already started, ignoring connect()");
            return;
        }
        info!("client started");
        self.transport = Some(Box::new(transport));
    }

    /// Closes the transport and forgets everything learned from the server
    pub fn disconnect(&mut self) {
        let Some(mut transport) = self.transport.take() else {
            return;
        };
        transport.close();
        self.reset();
        info!("client stopped");
    }

    pub fn is_active(&self) -> bool {
        self.transport.is_some()
    }

    pub fn connection_state(&self) -> ConnectionState {
        if self.is_active() {
            ConnectionState::Started
        } else {
            ConnectionState::Stopped
        }
    }

    /// Whether the transport has reported the connection
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_authenticated(&self) -> bool {
        self.client_id.is_some()
    }

    /// Id assigned by the server, known once authenticated
    pub fn client_id(&self) -> Option<ClientId> {
        self.client_id
    }

    pub fn observes(&self, object: &ObjectId) -> bool {
        self.observed.contains_key(object)
    }

    pub fn owns(&self, object: &ObjectId) -> bool {
        self.observed.get(object).copied().unwrap_or(false)
    }

    /// Objects the server has told this client it observes, in id order
    pub fn observed_objects(&self) -> impl Iterator<Item = &ObjectId> {
        self.observed.keys()
    }

    /// Returns everything that happened since the last call
    pub fn take_events(&mut self) -> ClientEvents {
        std::mem::replace(&mut self.incoming_events, ClientEvents::new())
    }

    // Broadcasts

    pub fn register_broadcast<M: Message, F: FnMut(M) + 'static>(
        &mut self,
        mut handler: F,
    ) -> Result<HandlerKey, ClientError> {
        Ok(self
            .router
            .register::<M, _>(move |(), message| handler(message))?)
    }

    /// Removes exactly the handler registered under `handler_key`
    pub fn unregister_broadcast<M: Message>(&mut self, handler_key: HandlerKey) -> bool {
        self.router.unregister::<M>(handler_key)
    }

    /// Queues a broadcast to the server, written on the next flush
    pub fn send<M: Message>(&mut self, message: &M, channel: Channel) -> Result<(), ClientError> {
        if !self.is_active() {
            return Err(ClientError::NotActive);
        }
        if !self.connected && !self.config.queue_before_connected {
            return Err(ClientError::NotConnected);
        }

        let payload = self.router.write_broadcast(message)?;
        self.outgoing.push((channel, payload));
        Ok(())
    }

    // Transport

    /// Drains the transport until nothing is left
    pub fn receive_all(&mut self) {
        loop {
            let Some(transport) = self.transport.as_mut() else {
                return;
            };
            match transport.receive() {
                Ok(Some(ClientTransportEvent::Connected)) => {
                    info!("client connected");
                    self.connected = true;
                    self.incoming_events.push_connection();
                }
                Ok(Some(ClientTransportEvent::Disconnected)) => {
                    info!("client lost connection to server");
                    self.transport = None;
                    self.reset();
                    return;
                }
                Ok(Some(ClientTransportEvent::Packet(_channel, payload))) => {
                    self.handle_packet(&payload);
                }
                Ok(None) => break,
                Err(err) => {
                    self.report(err.into());
                    break;
                }
            }
        }
    }

    /// Writes every queued broadcast to the transport
    pub fn send_all_packets(&mut self) {
        let Some(transport) = self.transport.as_mut() else {
            return;
        };

        let mut errors = Vec::new();
        for (channel, payload) in self.outgoing.drain(..) {
            if let Err(err) = transport.send(channel, &payload) {
                errors.push(err);
            }
        }

        for err in errors {
            self.report(err.into());
        }
    }

    /// Number of broadcasts waiting for the next flush
    pub fn queued_packets(&self) -> usize {
        self.outgoing.len()
    }

    // Private methods

    fn report(&mut self, error: ClientError) {
        warn!("Client Error: {}", error);
        self.incoming_events.push_error(error);
    }

    fn reset(&mut self) {
        if self.connected {
            self.incoming_events.push_disconnection();
        }
        self.connected = false;
        self.client_id = None;
        self.observed.clear();
        self.outgoing.clear();
    }

    fn handle_packet(&mut self, payload: &[u8]) {
        let mut reader = ByteReader::new(payload);
        let packet_type = match PacketType::de(&mut reader) {
            Ok(packet_type) => packet_type,
            Err(err) => {
                self.report(ClientError::MalformedPacket(err));
                return;
            }
        };

        let packet = match SystemPacket::read_body(packet_type, &mut reader) {
            Ok(Some(packet)) => packet,
            Ok(None) => {
                if let Err(err) = self.router.dispatch((), true, &mut reader) {
                    self.report(err.into());
                }
                return;
            }
            Err(err) => {
                self.report(ClientError::MalformedPacket(err));
                return;
            }
        };

        match packet {
            SystemPacket::Authenticated(client_id) => {
                info!("authenticated as {}", client_id);
                self.client_id = Some(client_id);
                self.incoming_events.push_authentication(client_id);
            }
            SystemPacket::ObjectSpawn { object, owned } => {
                match self.observed.insert(object, owned) {
                    None => self.incoming_events.push_spawn(object, owned),
                    Some(was_owned) if was_owned != owned => {
                        self.incoming_events.push_ownership_change(object, owned)
                    }
                    Some(_) => {}
                }
            }
            SystemPacket::ObjectDespawn(object) => {
                if self.observed.remove(&object).is_some() {
                    self.incoming_events.push_despawn(object);
                } else {
                    self.report(ClientError::UnknownObject { object });
                }
            }
        }
    }
}

impl NetworkRole for Client {
    fn is_active(&self) -> bool {
        Client::is_active(self)
    }

    fn iterate_incoming(&mut self) {
        self.receive_all();
    }

    fn iterate_outgoing(&mut self) {
        self.send_all_packets();
    }
}
