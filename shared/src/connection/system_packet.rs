use shoal_serde::{ByteReader, ByteWriter, Serde, SerdeErr};

use crate::{
    connection::packet_type::PacketType,
    types::{ClientId, ObjectId},
};

/// Packets the server sends on its own behalf, as opposed to broadcasts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SystemPacket {
    /// The receiving client is authenticated under this id
    Authenticated(ClientId),
    /// The receiving client now observes `object`
    ObjectSpawn { object: ObjectId, owned: bool },
    /// The receiving client no longer observes `object`
    ObjectDespawn(ObjectId),
}

impl SystemPacket {
    pub fn packet_type(&self) -> PacketType {
        match self {
            SystemPacket::Authenticated(_) => PacketType::Authenticated,
            SystemPacket::ObjectSpawn { .. } => PacketType::ObjectSpawn,
            SystemPacket::ObjectDespawn(_) => PacketType::ObjectDespawn,
        }
    }

    /// Writes the packet type byte followed by the body
    pub fn to_bytes(&self) -> Box<[u8]> {
        let mut writer = ByteWriter::new();
        self.packet_type().ser(&mut writer);
        match self {
            SystemPacket::Authenticated(client_id) => client_id.ser(&mut writer),
            SystemPacket::ObjectSpawn { object, owned } => {
                object.ser(&mut writer);
                owned.ser(&mut writer);
            }
            SystemPacket::ObjectDespawn(object) => object.ser(&mut writer),
        }
        writer.to_bytes()
    }

    /// Reads the body of a packet whose type byte has already been consumed.
    /// Returns None for `PacketType::Broadcast`.
    pub fn read_body(
        packet_type: PacketType,
        reader: &mut ByteReader,
    ) -> Result<Option<Self>, SerdeErr> {
        let packet = match packet_type {
            PacketType::Broadcast => return Ok(None),
            PacketType::Authenticated => SystemPacket::Authenticated(ClientId::de(reader)?),
            PacketType::ObjectSpawn => SystemPacket::ObjectSpawn {
                object: ObjectId::de(reader)?,
                owned: bool::de(reader)?,
            },
            PacketType::ObjectDespawn => SystemPacket::ObjectDespawn(ObjectId::de(reader)?),
        };
        Ok(Some(packet))
    }
}
