use crate::error::SerdeErr;

/// Cursor over an incoming bit stream produced by a `BitWriter`
pub struct BitReader<'b> {
    buffer: &'b [u8],
    bit_index: usize,
}

impl<'b> BitReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self {
            buffer,
            bit_index: 0,
        }
    }

    pub fn read_bit(&mut self) -> Result<bool, SerdeErr> {
        let byte_index = self.bit_index / 8;
        let Some(byte) = self.buffer.get(byte_index) else {
            return Err(SerdeErr::UnexpectedEnd { requested: 1 });
        };
        let bit = (byte >> (self.bit_index % 8)) & 1 != 0;
        self.bit_index += 1;
        Ok(bit)
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        if self.bits_remaining() < 8 {
            return Err(SerdeErr::UnexpectedEnd { requested: 8 });
        }
        let mut output: u8 = 0;
        for offset in 0..8 {
            if self.read_bit()? {
                output |= 1 << offset;
            }
        }
        Ok(output)
    }

    pub fn bits_remaining(&self) -> usize {
        (self.buffer.len() * 8).saturating_sub(self.bit_index)
    }

    /// Whether anything other than trailing padding is left to read
    pub fn has_remaining_bytes(&self) -> bool {
        self.bits_remaining() >= 8
    }
}
