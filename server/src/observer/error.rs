use thiserror::Error;

use shoal_shared::ObjectId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObserverError {
    /// Object was registered with an empty condition list
    #[error("{object} has no observer conditions. Observer processing is disabled for it, only its owner will observe it")]
    NoConditions { object: ObjectId },

    #[error("Observer settings for {object} are already registered")]
    AlreadyRegistered { object: ObjectId },
}
