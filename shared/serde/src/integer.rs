use crate::{byte_reader::ByteReader, byte_writer::ByteWrite, error::SerdeErr, serde::Serde};

/// Unsigned integer written 7 bits per byte, low group first, with the high
/// bit of each byte flagging that another group follows. Small values (the
/// common case for lengths) take a single byte.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct VariableInteger(u64);

impl VariableInteger {
    pub fn new<T: Into<u64>>(value: T) -> Self {
        Self(value.into())
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<usize> for VariableInteger {
    fn from(value: usize) -> Self {
        Self(value as u64)
    }
}

impl Serde for VariableInteger {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        let mut value = self.0;
        loop {
            let group = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                writer.write_byte(group);
                return;
            }
            writer.write_byte(group | 0x80);
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let mut output: u64 = 0;
        let mut shift: u32 = 0;
        loop {
            let byte = reader.read_byte()?;
            let group = u64::from(byte & 0x7F);
            if shift >= 64 || (shift == 63 && group > 1) {
                return Err(SerdeErr::VariableIntegerOverflow);
            }
            output |= group << shift;
            if byte & 0x80 == 0 {
                return Ok(Self(output));
            }
            shift += 7;
        }
    }

    fn byte_length(&self) -> usize {
        let mut value = self.0 >> 7;
        let mut output = 1;
        while value != 0 {
            value >>= 7;
            output += 1;
        }
        output
    }
}
