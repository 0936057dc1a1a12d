use std::collections::HashMap;

use log::trace;

use shoal_serde::{ByteReader, ByteWriter, Serde, SerdeErr};

use crate::{
    connection::packet_type::PacketType,
    messages::{
        error::RouterError,
        message::{Message, MessageKey},
        message_kinds::MessageKinds,
    },
};

/// Returned from registration, identifies exactly one handler
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerKey(u64);

type BoxedHandler<S> = Box<dyn FnMut(S, &mut ByteReader) -> Result<(), SerdeErr>>;

struct HandlerEntry<S> {
    key: HandlerKey,
    require_auth: bool,
    handler: BoxedHandler<S>,
}

/// Routes incoming broadcasts to the handlers registered for their type,
/// and writes outgoing broadcasts.
///
/// `S` identifies the sender handed to each handler: the server uses the
/// sending ClientId, the client uses `()`.
pub struct BroadcastRouter<S: Copy> {
    message_kinds: MessageKinds,
    handlers: HashMap<MessageKey, Vec<HandlerEntry<S>>>,
    next_handler_key: u64,
}

impl<S: Copy> BroadcastRouter<S> {
    pub fn new(message_kinds: MessageKinds) -> Self {
        Self {
            message_kinds,
            handlers: HashMap::new(),
            next_handler_key: 0,
        }
    }

    pub fn message_kinds(&self) -> &MessageKinds {
        &self.message_kinds
    }

    /// Registers a handler for `M` that only runs for authenticated senders
    pub fn register<M: Message, F: FnMut(S, M) + 'static>(
        &mut self,
        handler: F,
    ) -> Result<HandlerKey, RouterError> {
        self.register_inner::<M, F>(true, handler)
    }

    /// Registers a handler for `M` that also runs for senders that have not
    /// authenticated yet
    pub fn register_unauthenticated<M: Message, F: FnMut(S, M) + 'static>(
        &mut self,
        handler: F,
    ) -> Result<HandlerKey, RouterError> {
        self.register_inner::<M, F>(false, handler)
    }

    fn register_inner<M: Message, F: FnMut(S, M) + 'static>(
        &mut self,
        require_auth: bool,
        mut handler: F,
    ) -> Result<HandlerKey, RouterError> {
        if !self.message_kinds.is_registered::<M>() {
            return Err(RouterError::UnregisteredMessage { name: M::NAME });
        }

        let key = HandlerKey(self.next_handler_key);
        self.next_handler_key += 1;

        let boxed: BoxedHandler<S> = Box::new(move |sender: S, reader: &mut ByteReader| {
            let message = M::de(reader)?;
            handler(sender, message);
            Ok(())
        });

        self.handlers.entry(M::KEY).or_default().push(HandlerEntry {
            key,
            require_auth,
            handler: boxed,
        });

        Ok(key)
    }

    /// Removes the handler registered under `handler_key`, leaving any other
    /// handler for `M` in place. Returns whether a handler was removed.
    pub fn unregister<M: Message>(&mut self, handler_key: HandlerKey) -> bool {
        let Some(entries) = self.handlers.get_mut(&M::KEY) else {
            return false;
        };

        let before = entries.len();
        entries.retain(|entry| entry.key != handler_key);
        let removed = entries.len() != before;

        if entries.is_empty() {
            self.handlers.remove(&M::KEY);
        }

        removed
    }

    pub fn handler_count<M: Message>(&self) -> usize {
        self.handlers
            .get(&M::KEY)
            .map_or(0, |entries| entries.len())
    }

    /// Writes `[packet type][key][payload]` for a message
    pub fn write_broadcast<M: Message>(&self, message: &M) -> Result<Box<[u8]>, RouterError> {
        if !self.message_kinds.is_registered::<M>() {
            return Err(RouterError::UnregisteredMessage { name: M::NAME });
        }

        let mut writer = ByteWriter::new();
        PacketType::Broadcast.ser(&mut writer);
        M::KEY.ser(&mut writer);
        message.ser(&mut writer);

        Ok(writer.to_bytes())
    }

    /// Reads a message key from `reader` (positioned just past the packet
    /// type) and runs every matching handler in registration order. Each
    /// handler reads the payload from its start. Returns how many handlers
    /// ran.
    pub fn dispatch(
        &mut self,
        sender: S,
        sender_authenticated: bool,
        reader: &mut ByteReader,
    ) -> Result<usize, RouterError> {
        let key = MessageKey::de(reader).map_err(RouterError::MissingKey)?;

        let Some(entries) = self.handlers.get_mut(&key) else {
            return Err(RouterError::UnknownMessage { key: key.get() });
        };

        let payload_start = reader.position();
        let mut invoked = 0;

        for entry in entries.iter_mut() {
            if entry.require_auth && !sender_authenticated {
                trace!("skipping handler {:?}, sender not authenticated", entry.key);
                continue;
            }

            reader.set_position(payload_start);
            if let Err(source) = (entry.handler)(sender, reader) {
                return Err(RouterError::Decode {
                    name: self.message_kinds.name(&key).unwrap_or("unknown"),
                    source,
                });
            }
            invoked += 1;
        }

        if invoked == 0 {
            return Err(RouterError::Unauthenticated { key: key.get() });
        }

        Ok(invoked)
    }
}
