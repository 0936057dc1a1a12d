use shoal_serde::{ByteReader, ByteWrite, Serde, SerdeErr};

/// Delivery quality requested for a packet. The transport is responsible
/// for honouring it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Delivered once, in the order sent
    #[default]
    Reliable,
    /// May be dropped or arrive out of order
    Unreliable,
}

impl Channel {
    pub fn is_reliable(&self) -> bool {
        matches!(self, Channel::Reliable)
    }
}

impl Serde for Channel {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        let index: u8 = match self {
            Channel::Reliable => 0,
            Channel::Unreliable => 1,
        };
        index.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        match u8::de(reader)? {
            0 => Ok(Channel::Reliable),
            1 => Ok(Channel::Unreliable),
            _ => Err(SerdeErr::InvalidValue {
                type_name: "Channel",
            }),
        }
    }

    fn byte_length(&self) -> usize {
        1
    }
}
