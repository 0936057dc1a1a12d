//! In-memory transport for end-to-end tests. Routes packets between one
//! server and any number of clients through shared mailboxes, without
//! network I/O.

use std::{
    collections::{HashMap, VecDeque},
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use log::trace;

use shoal_shared::{
    Channel, ClientTransport, ClientTransportEvent, ServerTransport, ServerTransportEvent,
    TransportError,
};

const FIRST_CLIENT_PORT: u16 = 12345;

/// Drops unreliable packets at random, in both directions. Reliable packets
/// are never touched.
#[derive(Clone, Copy, Debug)]
pub struct LinkConditionerConfig {
    /// Probability in 0..=1 that an unreliable packet is lost
    pub loss: f32,
    /// Seed, so a lossy run can be replayed
    pub seed: u64,
}

impl LinkConditionerConfig {
    pub fn new(loss: f32, seed: u64) -> Self {
        Self { loss, seed }
    }
}

struct ClientMailbox {
    queue: VecDeque<ClientTransportEvent>,
    open: bool,
}

struct HubState {
    to_server: VecDeque<ServerTransportEvent>,
    clients: HashMap<SocketAddr, ClientMailbox>,
    server_open: bool,
    next_port: u16,
    conditioner: Option<(f32, fastrand::Rng)>,
}

impl HubState {
    /// Returns true if an unreliable packet should be dropped
    fn should_drop(&mut self, channel: Channel) -> bool {
        if channel.is_reliable() {
            return false;
        }
        match self.conditioner.as_mut() {
            Some((loss, rng)) => rng.f32() < *loss,
            None => false,
        }
    }
}

/// Shared switchboard. Clone it to hand it around; all clones are the same hub.
#[derive(Clone)]
pub struct LocalHub {
    state: Arc<Mutex<HubState>>,
}

impl Default for LocalHub {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalHub {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(HubState {
                to_server: VecDeque::new(),
                clients: HashMap::new(),
                server_open: true,
                next_port: FIRST_CLIENT_PORT,
                conditioner: None,
            })),
        }
    }

    pub fn with_link_conditioner(config: LinkConditionerConfig) -> Self {
        let hub = Self::new();
        hub.state().conditioner = Some((config.loss, fastrand::Rng::with_seed(config.seed)));
        hub
    }

    pub fn server_transport(&self) -> LocalServerTransport {
        self.state().server_open = true;
        LocalServerTransport { hub: self.clone() }
    }

    /// Connects a new client. Both sides see the connection on their next
    /// receive.
    pub fn client_transport(&self) -> LocalClientTransport {
        let mut state = self.state();
        let address = SocketAddr::from(([127, 0, 0, 1], state.next_port));
        state.next_port += 1;

        let mut queue = VecDeque::new();
        queue.push_back(ClientTransportEvent::Connected);
        state.clients.insert(address, ClientMailbox { queue, open: true });
        state.to_server.push_back(ServerTransportEvent::Connected(address));
        trace!("local client {} connected", address);

        LocalClientTransport {
            hub: self.clone(),
            address,
        }
    }

    /// Number of events waiting for the server
    pub fn pending_for_server(&self) -> usize {
        self.state().to_server.len()
    }

    /// Number of events waiting for the client at `address`
    pub fn pending_for_client(&self, address: &SocketAddr) -> usize {
        self.state()
            .clients
            .get(address)
            .map_or(0, |mailbox| mailbox.queue.len())
    }

    /// True once every queued event has been received
    pub fn is_drained(&self) -> bool {
        let state = self.state();
        state.to_server.is_empty() && state.clients.values().all(|mailbox| mailbox.queue.is_empty())
    }

    fn state(&self) -> MutexGuard<'_, HubState> {
        // a panicking test thread must not take the other side down with it
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct LocalServerTransport {
    hub: LocalHub,
}

impl ServerTransport for LocalServerTransport {
    fn receive(&mut self) -> Result<Option<ServerTransportEvent>, TransportError> {
        let mut state = self.hub.state();
        if !state.server_open {
            return Err(TransportError::Closed);
        }
        Ok(state.to_server.pop_front())
    }

    fn send(
        &mut self,
        address: &SocketAddr,
        channel: Channel,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        let mut state = self.hub.state();
        if !state.server_open {
            return Err(TransportError::Closed);
        }
        if !state.clients.get(address).is_some_and(|mailbox| mailbox.open) {
            return Err(TransportError::UnknownPeer { address: *address });
        }
        if state.should_drop(channel) {
            trace!("link conditioner dropped packet to {}", address);
            return Ok(());
        }

        if let Some(mailbox) = state.clients.get_mut(address) {
            mailbox
                .queue
                .push_back(ClientTransportEvent::Packet(channel, payload.into()));
        }
        Ok(())
    }

    fn disconnect(&mut self, address: &SocketAddr) {
        let mut state = self.hub.state();
        if let Some(mailbox) = state.clients.get_mut(address) {
            if mailbox.open {
                mailbox.open = false;
                mailbox.queue.push_back(ClientTransportEvent::Disconnected);
            }
        }
    }

    fn close(&mut self) {
        let mut state = self.hub.state();
        state.server_open = false;
        state.to_server.clear();
        for mailbox in state.clients.values_mut() {
            if mailbox.open {
                mailbox.open = false;
                mailbox.queue.push_back(ClientTransportEvent::Disconnected);
            }
        }
    }
}

pub struct LocalClientTransport {
    hub: LocalHub,
    address: SocketAddr,
}

impl LocalClientTransport {
    /// Address the server knows this client by
    pub fn address(&self) -> SocketAddr {
        self.address
    }
}

impl ClientTransport for LocalClientTransport {
    fn receive(&mut self) -> Result<Option<ClientTransportEvent>, TransportError> {
        let mut state = self.hub.state();
        match state.clients.get_mut(&self.address) {
            Some(mailbox) => Ok(mailbox.queue.pop_front()),
            None => Err(TransportError::Closed),
        }
    }

    fn send(&mut self, channel: Channel, payload: &[u8]) -> Result<(), TransportError> {
        let mut state = self.hub.state();
        let open = state
            .clients
            .get(&self.address)
            .is_some_and(|mailbox| mailbox.open);
        if !open || !state.server_open {
            return Err(TransportError::Closed);
        }
        if state.should_drop(channel) {
            trace!("link conditioner dropped packet from {}", self.address);
            return Ok(());
        }

        state.to_server.push_back(ServerTransportEvent::Packet(
            self.address,
            channel,
            payload.into(),
        ));
        Ok(())
    }

    fn close(&mut self) {
        let mut state = self.hub.state();
        let was_open = state
            .clients
            .remove(&self.address)
            .is_some_and(|mailbox| mailbox.open);
        if was_open && state.server_open {
            state
                .to_server
                .push_back(ServerTransportEvent::Disconnected(self.address));
        }
    }
}

#[cfg(test)]
mod tests {
    use shoal_shared::{
        Channel, ClientTransport, ClientTransportEvent, ServerTransport, ServerTransportEvent,
    };

    use super::{LinkConditionerConfig, LocalHub};

    #[test]
    fn connect_is_seen_by_both_sides() {
        let hub = LocalHub::new();
        let mut server = hub.server_transport();
        let mut client = hub.client_transport();

        assert_eq!(
            server.receive(),
            Ok(Some(ServerTransportEvent::Connected(client.address())))
        );
        assert_eq!(client.receive(), Ok(Some(ClientTransportEvent::Connected)));
    }

    #[test]
    fn packets_flow_both_ways() {
        let hub = LocalHub::new();
        let mut server = hub.server_transport();
        let mut client = hub.client_transport();
        server.receive().unwrap();
        client.receive().unwrap();

        client.send(Channel::Reliable, &[1, 2]).unwrap();
        server
            .send(&client.address(), Channel::Unreliable, &[3])
            .unwrap();

        assert_eq!(
            server.receive(),
            Ok(Some(ServerTransportEvent::Packet(
                client.address(),
                Channel::Reliable,
                vec![1, 2].into_boxed_slice()
            )))
        );
        assert_eq!(
            client.receive(),
            Ok(Some(ClientTransportEvent::Packet(
                Channel::Unreliable,
                vec![3].into_boxed_slice()
            )))
        );
    }

    #[test]
    fn total_loss_only_hits_unreliable() {
        let hub = LocalHub::with_link_conditioner(LinkConditionerConfig::new(1.0, 7));
        let mut server = hub.server_transport();
        let client = hub.client_transport();
        server.receive().unwrap();

        server.send(&client.address(), Channel::Unreliable, &[1]).unwrap();
        server.send(&client.address(), Channel::Reliable, &[2]).unwrap();

        // Connected + the reliable packet
        assert_eq!(hub.pending_for_client(&client.address()), 2);
    }

    #[test]
    fn server_disconnect_reaches_client() {
        let hub = LocalHub::new();
        let mut server = hub.server_transport();
        let mut client = hub.client_transport();
        client.receive().unwrap();

        server.disconnect(&client.address());

        assert_eq!(client.receive(), Ok(Some(ClientTransportEvent::Disconnected)));
        assert!(client.send(Channel::Reliable, &[0]).is_err());
    }
}
