use std::fmt;

use shoal_serde::{ByteReader, ByteWrite, Serde, SerdeErr};

pub type Tick = u32;

/// Identifies a connected peer for the lifetime of a server session.
/// Negative values are never handed out and mark an invalid id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(i32);

impl ClientId {
    pub const INVALID: ClientId = ClientId(-1);

    pub fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn get(&self) -> i32 {
        self.0
    }

    pub fn is_valid(&self) -> bool {
        self.0 >= 0
    }
}

impl From<u32> for ClientId {
    fn from(value: u32) -> Self {
        // KeyGenerator for client ids is capped at i32::MAX
        Self(i32::try_from(value).unwrap_or(-1))
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client:{}", self.0)
    }
}

impl Serde for ClientId {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        self.0.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self(i32::de(reader)?))
    }

    fn byte_length(&self) -> usize {
        4
    }
}

/// Stable id of a replicated object
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl From<u32> for ObjectId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object:{}", self.0)
    }
}

impl Serde for ObjectId {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        self.0.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self(u32::de(reader)?))
    }

    fn byte_length(&self) -> usize {
        4
    }
}

/// Identifies a scene that objects can live in and clients can load
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneId(pub u32);
