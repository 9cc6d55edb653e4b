use crate::{bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr};

/// A type that can be written to and read from a bit stream
pub trait Serde: Sized + Clone + PartialEq {
    /// Writes the value into the outgoing stream
    fn ser(&self, writer: &mut dyn BitWrite);

    /// Parses a value from the incoming stream
    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr>;

    /// Number of bits `ser` will write for this value
    fn bit_length(&self) -> u32;
}
