use std::fmt;

use synchrony_serde::{BitReader, BitWrite, Serde, SerdeErr, UnsignedVariableInteger};

/// Logical authority time, stamped on every frame
pub type Tick = u64;

/// Position of a member within its type's declared member list
pub type MemberIndex = u8;

/// Identifier of a tracked reference within a root's reference pool
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferenceId(u32);

impl ReferenceId {
    /// The graph root is always tracked under this identifier
    pub const ROOT: ReferenceId = ReferenceId(1);

    /// Returns `None` for zero, which is reserved as the wire encoding of
    /// an absent reference
    pub fn new(value: u32) -> Option<Self> {
        if value == 0 {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn is_root(&self) -> bool {
        *self == Self::ROOT
    }

    /// Writes an optional reference, using zero for `None`
    pub fn ser_optional(id: Option<ReferenceId>, writer: &mut dyn BitWrite) {
        let raw = id.map(|id| id.0).unwrap_or(0);
        UnsignedVariableInteger::<7>::new(raw).ser(writer);
    }

    pub fn de_optional(reader: &mut BitReader) -> Result<Option<ReferenceId>, SerdeErr> {
        let raw: u32 = UnsignedVariableInteger::<7>::de(reader)?.to()?;
        Ok(Self::new(raw))
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl Serde for ReferenceId {
    fn ser(&self, writer: &mut dyn BitWrite) {
        UnsignedVariableInteger::<7>::new(self.0).ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let raw: u32 = UnsignedVariableInteger::<7>::de(reader)?.to()?;
        // a present reference is never encoded as zero
        Self::new(raw).ok_or(SerdeErr::IntegerOverflow)
    }

    fn bit_length(&self) -> u32 {
        UnsignedVariableInteger::<7>::new(self.0).bit_length()
    }
}

/// Writes a collection length as a variable-length integer
pub fn write_count(count: usize, writer: &mut dyn BitWrite) {
    UnsignedVariableInteger::<7>::new(count as u64).ser(writer);
}

pub fn read_count(reader: &mut BitReader) -> Result<usize, SerdeErr> {
    UnsignedVariableInteger::<7>::de(reader)?.to()
}
