use std::time::Duration;

use shoal_shared::Tick;

use crate::NetworkRoles;

/// Returned by `NetworkManager::subscribe`, identifies one listener
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerKey(u64);

impl ListenerKey {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }
}

/// Receives the phases of every simulation tick, in order. All methods do
/// nothing by default.
pub trait TickListener {
    fn on_pre_tick(&mut self, _roles: &mut NetworkRoles, _tick: Tick) {}

    fn on_tick(&mut self, _roles: &mut NetworkRoles, _tick: Tick) {}

    /// Only called when the protocol steps physics
    fn on_physics_step(&mut self, _roles: &mut NetworkRoles, _delta: Duration) {}

    fn on_post_tick(&mut self, _roles: &mut NetworkRoles, _tick: Tick) {}
}
