use crate::{byte_counter::ByteCounter, byte_reader::ByteReader, byte_writer::ByteWrite, error::SerdeErr};

/// A type that can be written to and read from a byte stream
pub trait Serde: Sized {
    /// Writes the value into the given writer
    fn ser(&self, writer: &mut dyn ByteWrite);

    /// Reads a value from the given reader
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr>;

    /// Number of bytes `ser` will produce for this value
    fn byte_length(&self) -> usize {
        let mut counter = ByteCounter::new();
        self.ser(&mut counter);
        counter.count()
    }
}
