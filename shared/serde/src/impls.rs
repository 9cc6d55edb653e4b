use crate::{
    bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr, integer::UnsignedVariableInteger,
    serde::Serde,
};

impl Serde for bool {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bit(*self);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        reader.read_bit()
    }

    fn bit_length(&self) -> u32 {
        1
    }
}

impl Serde for u8 {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_byte(*self);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        reader.read_byte()
    }

    fn bit_length(&self) -> u32 {
        8
    }
}

// Fixed-width numbers travel as little-endian bytes
macro_rules! impl_serde_le_bytes {
    ($($ty:ty),*) => {
        $(
            impl Serde for $ty {
                fn ser(&self, writer: &mut dyn BitWrite) {
                    for byte in self.to_le_bytes() {
                        writer.write_byte(byte);
                    }
                }

                fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
                    let mut bytes = [0_u8; std::mem::size_of::<$ty>()];
                    for byte in bytes.iter_mut() {
                        *byte = reader.read_byte()?;
                    }
                    Ok(<$ty>::from_le_bytes(bytes))
                }

                fn bit_length(&self) -> u32 {
                    (std::mem::size_of::<$ty>() * 8) as u32
                }
            }
        )*
    };
}

impl_serde_le_bytes!(i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl Serde for String {
    fn ser(&self, writer: &mut dyn BitWrite) {
        UnsignedVariableInteger::<7>::new(self.len() as u64).ser(writer);
        for byte in self.as_bytes() {
            writer.write_byte(*byte);
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let length: usize = UnsignedVariableInteger::<7>::de(reader)?.to()?;
        if length > reader.bits_remaining() / 8 {
            return Err(SerdeErr::UnexpectedEnd {
                requested: u32::try_from(length.saturating_mul(8)).unwrap_or(u32::MAX),
            });
        }
        let mut bytes = Vec::with_capacity(length);
        for _ in 0..length {
            bytes.push(reader.read_byte()?);
        }
        String::from_utf8(bytes).map_err(|_| SerdeErr::InvalidUtf8)
    }

    fn bit_length(&self) -> u32 {
        UnsignedVariableInteger::<7>::new(self.len() as u64).bit_length() + (self.len() * 8) as u32
    }
}
