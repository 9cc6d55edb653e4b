use crate::{bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr, serde::Serde};

/// An unsigned integer written in chunks of `BITS` bits, each chunk preceded
/// by a continuation bit. Small values cost `BITS + 1` bits on the wire.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct UnsignedVariableInteger<const BITS: u8> {
    value: u64,
}

impl<const BITS: u8> UnsignedVariableInteger<BITS> {
    pub fn new<T: Into<u64>>(value: T) -> Self {
        assert!(BITS > 0 && BITS < 64, "chunk width must be within 1..=63 bits");
        Self {
            value: value.into(),
        }
    }

    pub fn get(&self) -> u64 {
        self.value
    }

    /// Converts into a narrower integer, failing if the value does not fit
    pub fn to<T: TryFrom<u64>>(&self) -> Result<T, SerdeErr> {
        T::try_from(self.value).map_err(|_| SerdeErr::IntegerOverflow)
    }

    fn chunk_limit() -> u64 {
        1_u64 << BITS
    }
}

impl<const BITS: u8> Serde for UnsignedVariableInteger<BITS> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        let mut value = self.value;
        loop {
            let proceed = value >= Self::chunk_limit();
            writer.write_bit(proceed);
            for _ in 0..BITS {
                writer.write_bit(value & 1 != 0);
                value >>= 1;
            }
            if !proceed {
                return;
            }
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let mut output: u64 = 0;
        let mut shift: u32 = 0;

        loop {
            let proceed = reader.read_bit()?;

            for _ in 0..BITS {
                let bit = reader.read_bit()?;
                if bit {
                    if shift >= u64::BITS {
                        return Err(SerdeErr::IntegerOverflow);
                    }
                    output |= 1 << shift;
                }
                shift += 1;
            }

            if !proceed {
                return Ok(Self { value: output });
            }
        }
    }

    fn bit_length(&self) -> u32 {
        let mut output: u32 = 0;
        let mut value = self.value;
        loop {
            output += 1 + BITS as u32;
            if value < Self::chunk_limit() {
                return output;
            }
            value >>= BITS;
        }
    }
}
