use crate::{
    messages::{message::Message, message_kinds::MessageKinds},
    tick::tick_config::{PhysicsMode, TickConfig},
};

pub mod error;
pub use error::ProtocolError;

/// Everything server & client must agree on before they can talk: the set of
/// Message types and the simulation rate
#[derive(Clone, Default)]
pub struct Protocol {
    pub message_kinds: MessageKinds,
    pub tick: TickConfig,
    locked: bool,
}

impl Protocol {
    pub fn builder() -> Self {
        Self::default()
    }

    /// Registers a Message type, panicking on a key collision
    pub fn add_message<M: Message>(&mut self) -> &mut Self {
        self.check_lock();
        if let Err(err) = self.message_kinds.try_add_message::<M>() {
            panic!("{}", err);
        }
        self
    }

    pub fn simulation_rate(&mut self, ticks_per_second: u16) -> &mut Self {
        self.check_lock();
        self.tick.simulation_rate = ticks_per_second;
        self
    }

    pub fn physics_mode(&mut self, mode: PhysicsMode) -> &mut Self {
        self.check_lock();
        self.tick.physics_mode = mode;
        self
    }

    // Non-panicking builder methods

    pub fn try_add_message<M: Message>(&mut self) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.message_kinds.try_add_message::<M>()?;
        Ok(self)
    }

    pub fn try_simulation_rate(&mut self, ticks_per_second: u16) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.tick.simulation_rate = ticks_per_second;
        Ok(self)
    }

    pub fn try_physics_mode(&mut self, mode: PhysicsMode) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.tick.physics_mode = mode;
        Ok(self)
    }

    pub fn try_lock(&mut self) -> Result<(), ProtocolError> {
        self.try_check_lock()?;
        self.locked = true;
        Ok(())
    }

    pub fn lock(&mut self) {
        self.check_lock();
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Returns Err if protocol is locked
    pub fn try_check_lock(&self) -> Result<(), ProtocolError> {
        if self.locked {
            Err(ProtocolError::AlreadyLocked)
        } else {
            Ok(())
        }
    }

    /// Panics if protocol is locked
    pub fn check_lock(&self) {
        if self.locked {
            panic!("Protocol already locked!");
        }
    }

    pub fn build(&mut self) -> Self {
        std::mem::take(self)
    }
}
