mod condition;
pub mod conditions;
mod error;
mod observer_engine;

pub use condition::{ConditionContext, ObserverCondition, ObserverSettings};
pub use error::ObserverError;
pub use observer_engine::{ObserverChange, ObserverEngine, ObserverStateChange};
