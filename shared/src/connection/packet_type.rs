// An enum representing the different kinds of packets that can be
// sent/received, written as the first byte of every packet

use shoal_serde::{ByteReader, ByteWrite, Serde, SerdeErr};

#[derive(Copy, Debug, Clone, Eq, PartialEq)]
pub enum PacketType {
    // A typed broadcast: message key followed by the message payload
    Broadcast,
    // Sent by the server once a client is authenticated, carries its ClientId
    Authenticated,
    // Tells a client it now observes an object
    ObjectSpawn,
    // Tells a client it no longer observes an object
    ObjectDespawn,
}

impl Serde for PacketType {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        let index: u8 = match self {
            PacketType::Broadcast => 0,
            PacketType::Authenticated => 1,
            PacketType::ObjectSpawn => 2,
            PacketType::ObjectDespawn => 3,
        };
        index.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        match u8::de(reader)? {
            0 => Ok(PacketType::Broadcast),
            1 => Ok(PacketType::Authenticated),
            2 => Ok(PacketType::ObjectSpawn),
            3 => Ok(PacketType::ObjectDespawn),
            // malformed or malicious packets can carry anything here
            _ => Err(SerdeErr::InvalidValue {
                type_name: "PacketType",
            }),
        }
    }

    fn byte_length(&self) -> usize {
        1
    }
}
