pub mod error;
pub mod tick_config;
pub mod tick_scheduler;
