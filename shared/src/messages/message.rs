use std::fmt;

use shoal_serde::{ByteReader, ByteWrite, Serde, SerdeErr};

/// 16-bit wire key identifying a Message type
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageKey(u16);

impl MessageKey {
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// FNV-1a over the name's bytes, folded from 32 down to 16 bits. Sender
    /// and receiver must agree on this exactly or broadcasts won't route.
    pub const fn from_name(name: &str) -> Self {
        const OFFSET_BASIS: u32 = 2_166_136_261;
        const PRIME: u32 = 16_777_619;

        let bytes = name.as_bytes();
        let mut hash = OFFSET_BASIS;
        let mut index = 0;
        while index < bytes.len() {
            hash ^= bytes[index] as u32;
            hash = hash.wrapping_mul(PRIME);
            index += 1;
        }

        Self(((hash >> 16) ^ (hash & 0xFFFF)) as u16)
    }

    pub const fn get(&self) -> u16 {
        self.0
    }
}

impl fmt::Debug for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageKey({:#06x})", self.0)
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

impl Serde for MessageKey {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        self.0.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self(u16::de(reader)?))
    }

    fn byte_length(&self) -> usize {
        2
    }
}

/// A typed payload that can be broadcast between server & client.
///
/// `KEY` is derived from `NAME` at compile time. A type may assign its key
/// explicitly instead; either way the Protocol rejects two registered types
/// sharing a key.
pub trait Message: Serde + Clone + Send + Sync + 'static {
    /// Fully qualified name, see [`qualified_name!`](crate::qualified_name)
    const NAME: &'static str;
    const KEY: MessageKey = MessageKey::from_name(Self::NAME);
}

/// Expands to `"<module path>::<Type>"`, the conventional value for
/// [`Message::NAME`]
#[macro_export]
macro_rules! qualified_name {
    ($name:ident) => {
        concat!(module_path!(), "::", stringify!($name))
    };
}
