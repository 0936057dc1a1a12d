use std::time::Duration;

use log::{info, trace, warn};

use shoal_client::{Client, ClientConfig};
use shoal_server::{Server, ServerConfig};
use shoal_shared::{
    ClientTransport, IterationLoop, NetworkRole, Protocol, ServerTransport, Tick,
    TickPhase, TickScheduler,
};

use crate::{ListenerKey, NetworkRoles, TickListener};

/// Context object for a session. Owns the tick scheduler, the server and
/// client roles and the tick listeners, and runs one frame per `update`:
/// inbound drain, due ticks, outbound flush.
pub struct NetworkManager {
    protocol: Protocol,
    scheduler: TickScheduler,
    roles: NetworkRoles,
    iteration_loop: IterationLoop,
    next_listener_key: u64,
    listeners: Vec<(ListenerKey, Box<dyn TickListener>)>,
    frame: u64,
    last_advanced_frame: Option<u64>,
}

impl NetworkManager {
    pub fn new<P: Into<Protocol>>(protocol: P) -> Self {
        let mut protocol: Protocol = protocol.into();
        if !protocol.is_locked() {
            protocol.lock();
        }
        let scheduler = TickScheduler::new(&protocol.tick);

        Self {
            protocol,
            scheduler,
            roles: NetworkRoles::default(),
            iteration_loop: IterationLoop::new(),
            next_listener_key: 0,
            listeners: Vec::new(),
            frame: 0,
            last_advanced_frame: None,
        }
    }

    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    // Roles

    /// Starts the server role on `transport` with a fresh Server
    pub fn start_server<T: ServerTransport + 'static>(&mut self, config: ServerConfig, transport: T) {
        if self.roles.is_server_active() {
            warn!("server role already active, ignoring start_server()");
            return;
        }
        let mut server = Server::new(config, self.protocol.clone());
        server.start(transport);
        self.roles.server = Some(server);
        info!("server role started");
    }

    pub fn stop_server(&mut self) {
        if let Some(server) = self.roles.server.as_mut() {
            server.stop();
            info!("server role stopped");
        }
    }

    /// Starts the client role on `transport` with a fresh Client
    pub fn start_client<T: ClientTransport + 'static>(&mut self, config: ClientConfig, transport: T) {
        if self.roles.is_client_active() {
            warn!("client role already active, ignoring start_client()");
            return;
        }
        let mut client = Client::new(config, self.protocol.clone());
        client.connect(transport);
        self.roles.client = Some(client);
        info!("client role started");
    }

    pub fn stop_client(&mut self) {
        if let Some(client) = self.roles.client.as_mut() {
            client.disconnect();
            info!("client role stopped");
        }
    }

    pub fn roles(&self) -> &NetworkRoles {
        &self.roles
    }

    pub fn roles_mut(&mut self) -> &mut NetworkRoles {
        &mut self.roles
    }

    pub fn server(&self) -> Option<&Server> {
        self.roles.server.as_ref()
    }

    pub fn server_mut(&mut self) -> Option<&mut Server> {
        self.roles.server.as_mut()
    }

    pub fn client(&self) -> Option<&Client> {
        self.roles.client.as_ref()
    }

    pub fn client_mut(&mut self) -> Option<&mut Client> {
        self.roles.client.as_mut()
    }

    // Ticks

    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    pub fn tick(&self) -> Tick {
        self.scheduler.tick()
    }

    /// Adds a listener, called after the ones already subscribed
    pub fn subscribe<L: TickListener + 'static>(&mut self, listener: L) -> ListenerKey {
        let key = ListenerKey::new(self.next_listener_key);
        self.next_listener_key += 1;
        self.listeners.push((key, Box::new(listener)));
        key
    }

    /// Removes the listener subscribed under `key`. Returns whether it existed.
    pub fn unsubscribe(&mut self, key: &ListenerKey) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_key, _)| listener_key != key);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    // Frames

    /// Runs the next frame: drains inbound traffic of every active role
    /// (server first), fires every tick that is due, then flushes outbound
    /// traffic. If a frame was opened with `iterate_incoming` and not yet
    /// flushed, that frame is finished instead of starting a new one.
    /// Returns the number of ticks fired.
    pub fn update(&mut self, elapsed: Duration) -> u32 {
        let frame = self.next_frame();
        self.update_frame(frame, elapsed)
    }

    /// Runs frame `frame` for a driver that numbers its own frames. Each
    /// stage runs at most once per frame index, so several drivers sharing
    /// one frame drain, tick and flush once between them. Returns the number
    /// of ticks fired, 0 if the frame was already advanced.
    pub fn update_frame(&mut self, frame: u64, elapsed: Duration) -> u32 {
        self.iterate_incoming(frame);
        let ticks = self.advance_frame(frame, elapsed);
        self.iterate_outgoing(frame);
        ticks
    }

    fn advance_frame(&mut self, frame: u64, elapsed: Duration) -> u32 {
        if self.last_advanced_frame.is_some_and(|last| frame <= last) {
            trace!("ticks already advanced for frame {}", frame);
            return 0;
        }
        self.last_advanced_frame = Some(frame);

        self.scheduler.set_active(self.roles.any_active());
        let Self {
            scheduler,
            roles,
            listeners,
            ..
        } = self;
        scheduler.advance(elapsed, |phase| {
            for (_, listener) in listeners.iter_mut() {
                match phase {
                    TickPhase::PreTick(tick) => listener.on_pre_tick(roles, tick),
                    TickPhase::Tick(tick) => listener.on_tick(roles, tick),
                    TickPhase::PhysicsStep(delta) => listener.on_physics_step(roles, delta),
                    TickPhase::PostTick(tick) => listener.on_post_tick(roles, tick),
                }
            }
            if let TickPhase::Tick(tick) = phase {
                if let Some(server) = roles.server.as_mut() {
                    server.on_tick(tick);
                }
            }
        })
    }

    /// Drains inbound traffic for `frame`, once. Returns false if the frame
    /// was already drained.
    pub fn iterate_incoming(&mut self, frame: u64) -> bool {
        self.frame = self.frame.max(frame);
        let mut roles = Self::active_roles(&mut self.roles);
        self.iteration_loop.iterate_incoming(frame, &mut roles)
    }

    /// Flushes outbound traffic for `frame`, once. Returns false if the frame
    /// was already flushed.
    pub fn iterate_outgoing(&mut self, frame: u64) -> bool {
        self.frame = self.frame.max(frame);
        let mut roles = Self::active_roles(&mut self.roles);
        self.iteration_loop.iterate_outgoing(frame, &mut roles)
    }

    /// The open frame if it was drained but not flushed, else a new one
    fn next_frame(&mut self) -> u64 {
        let open = self.iteration_loop.last_incoming_frame() == Some(self.frame)
            && self.iteration_loop.last_outgoing_frame() != Some(self.frame);
        if !open {
            self.frame += 1;
        }
        self.frame
    }

    fn active_roles(roles: &mut NetworkRoles) -> Vec<&mut dyn NetworkRole> {
        let mut output: Vec<&mut dyn NetworkRole> = Vec::new();
        if let Some(server) = roles.server.as_mut() {
            output.push(server);
        }
        if let Some(client) = roles.client.as_mut() {
            output.push(client);
        }
        output
    }
}
