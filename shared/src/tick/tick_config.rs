use std::time::Duration;

use crate::tick::error::TickConfigError;

/// How physics is advanced relative to the simulation tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PhysicsMode {
    /// The application runs physics on its own
    #[default]
    Disabled,
    /// A physics step with the fixed tick delta is fired on every tick
    Stepped,
}

/// Contains config properties which will be used by the TickScheduler
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickConfig {
    /// Simulation ticks per second
    pub simulation_rate: u16,
    pub physics_mode: PhysicsMode,
}

impl TickConfig {
    pub fn validate(&self) -> Result<(), TickConfigError> {
        if self.simulation_rate == 0 {
            return Err(TickConfigError::InvalidSimulationRate {
                rate: self.simulation_rate,
            });
        }
        Ok(())
    }

    /// Duration of one tick, or None if the rate is invalid
    pub fn tick_delta(&self) -> Option<Duration> {
        if self.simulation_rate == 0 {
            return None;
        }
        Some(Duration::from_nanos(
            1_000_000_000 / u64::from(self.simulation_rate),
        ))
    }
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            simulation_rate: 30,
            physics_mode: PhysicsMode::Disabled,
        }
    }
}
