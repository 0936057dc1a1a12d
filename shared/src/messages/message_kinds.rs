use std::{any::TypeId, collections::HashMap};

use crate::messages::{
    error::MessageKindsError,
    message::{Message, MessageKey},
};

#[derive(Clone)]
struct MessageKindEntry {
    name: &'static str,
    type_id: TypeId,
}

/// Registry of every Message type known to the Protocol, indexed by wire key
#[derive(Clone, Default)]
pub struct MessageKinds {
    kinds: HashMap<MessageKey, MessageKindEntry>,
}

impl MessageKinds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a Message type. Registering the same type twice is a no-op;
    /// a different type resolving to an already-used key is rejected.
    pub fn try_add_message<M: Message>(&mut self) -> Result<(), MessageKindsError> {
        let key = M::KEY;
        let type_id = TypeId::of::<M>();

        if let Some(existing) = self.kinds.get(&key) {
            if existing.type_id == type_id {
                return Ok(());
            }
            return Err(MessageKindsError::KeyCollision {
                key: key.get(),
                existing: existing.name,
                incoming: M::NAME,
            });
        }

        self.kinds.insert(
            key,
            MessageKindEntry {
                name: M::NAME,
                type_id,
            },
        );
        Ok(())
    }

    /// Returns true if `M` itself (not just its key) is registered
    pub fn is_registered<M: Message>(&self) -> bool {
        self.kinds
            .get(&M::KEY)
            .is_some_and(|entry| entry.type_id == TypeId::of::<M>())
    }

    pub fn contains(&self, key: &MessageKey) -> bool {
        self.kinds.contains_key(key)
    }

    pub fn name(&self, key: &MessageKey) -> Option<&'static str> {
        self.kinds.get(key).map(|entry| entry.name)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
