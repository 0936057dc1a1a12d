use thiserror::Error;

/// Errors that can occur while validating a TickConfig
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TickConfigError {
    /// A simulation rate of zero would mean an infinite tick period
    #[error("Simulation rate must be at least 1 tick per second, got {rate}. The tick scheduler will stay disabled")]
    InvalidSimulationRate { rate: u16 },
}
