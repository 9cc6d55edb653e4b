use synchrony_serde::{BitReader, BitWrite, Serde, SerdeErr};

use crate::types::Tick;

/// Leading fields of every frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHeader {
    pub tick: Tick,
    /// A full frame carries every tracked reference and the whole type table
    pub full: bool,
}

impl FrameHeader {
    pub fn new(tick: Tick, full: bool) -> Self {
        Self { tick, full }
    }
}

impl Serde for FrameHeader {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.tick.ser(writer);
        self.full.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let tick = Tick::de(reader)?;
        let full = bool::de(reader)?;
        Ok(Self { tick, full })
    }

    fn bit_length(&self) -> u32 {
        self.tick.bit_length() + self.full.bit_length()
    }
}
