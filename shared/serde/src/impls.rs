use crate::{
    byte_reader::ByteReader, byte_writer::ByteWrite, error::SerdeErr, integer::VariableInteger,
    serde::Serde,
};

// Numbers

macro_rules! impl_serde_le {
    ($($t:ty),*) => {
        $(
            impl Serde for $t {
                fn ser(&self, writer: &mut dyn ByteWrite) {
                    writer.write_bytes(&self.to_le_bytes());
                }

                fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
                    Ok(<$t>::from_le_bytes(reader.read_array()?))
                }

                fn byte_length(&self) -> usize {
                    std::mem::size_of::<$t>()
                }
            }
        )*
    };
}

impl_serde_le!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

impl Serde for bool {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        writer.write_byte(u8::from(*self));
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        match reader.read_byte()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(SerdeErr::InvalidValue { type_name: "bool" }),
        }
    }

    fn byte_length(&self) -> usize {
        1
    }
}

impl Serde for () {
    fn ser(&self, _writer: &mut dyn ByteWrite) {}

    fn de(_reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(())
    }

    fn byte_length(&self) -> usize {
        0
    }
}

// Containers

fn read_length(reader: &mut ByteReader) -> Result<usize, SerdeErr> {
    let length = VariableInteger::de(reader)?.get();
    let length = usize::try_from(length).map_err(|_| SerdeErr::InvalidValue {
        type_name: "length",
    })?;
    // a peer can't make us allocate more than it actually sent
    if length > reader.remaining() {
        return Err(SerdeErr::UnexpectedEnd {
            needed: length,
            remaining: reader.remaining(),
        });
    }
    Ok(length)
}

impl Serde for String {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        VariableInteger::from(self.len()).ser(writer);
        writer.write_bytes(self.as_bytes());
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let length = read_length(reader)?;
        let bytes = reader.read_bytes(length)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| SerdeErr::InvalidUtf8)
    }

    fn byte_length(&self) -> usize {
        VariableInteger::from(self.len()).byte_length() + self.len()
    }
}

impl<T: Serde> Serde for Vec<T> {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        VariableInteger::from(self.len()).ser(writer);
        for item in self {
            item.ser(writer);
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let length = read_length(reader)?;
        let mut output = Vec::with_capacity(length);
        for _ in 0..length {
            output.push(T::de(reader)?);
        }
        Ok(output)
    }
}

impl<T: Serde> Serde for Option<T> {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        match self {
            Some(value) => {
                true.ser(writer);
                value.ser(writer);
            }
            None => false.ser(writer),
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        if bool::de(reader)? {
            Ok(Some(T::de(reader)?))
        } else {
            Ok(None)
        }
    }
}

impl<T: Serde, const N: usize> Serde for [T; N] {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        for item in self {
            item.ser(writer);
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            items.push(T::de(reader)?);
        }
        items
            .try_into()
            .map_err(|_| SerdeErr::InvalidValue { type_name: "array" })
    }
}

macro_rules! impl_serde_tuple {
    ($($name:ident),+) => {
        impl<$($name: Serde),+> Serde for ($($name,)+) {
            #[allow(non_snake_case)]
            fn ser(&self, writer: &mut dyn ByteWrite) {
                let ($($name,)+) = self;
                $($name.ser(writer);)+
            }

            fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
                Ok(($($name::de(reader)?,)+))
            }
        }
    };
}

impl_serde_tuple!(A);
impl_serde_tuple!(A, B);
impl_serde_tuple!(A, B, C);
impl_serde_tuple!(A, B, C, D);
