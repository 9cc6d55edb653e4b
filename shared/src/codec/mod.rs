mod error;
mod primitives;
mod registry;

pub use error::CodecError;
pub use primitives::{FloatCodec, IntegerCodec, SerdeCodec};
pub use registry::{CodecRegistry, ErasedCodec};

use synchrony_serde::{BitReader, BitWrite, SerdeErr};

use crate::value::SyncValue;

/// Wire encoding of a single value type, with optional blending between two
/// values for interpolated members. Codecs hold no state.
pub trait FieldCodec<T: SyncValue>: 'static {
    fn write(&self, value: &T, writer: &mut dyn BitWrite);

    fn read(&self, reader: &mut BitReader) -> Result<T, SerdeErr>;

    fn can_interpolate(&self) -> bool {
        false
    }

    /// Blends `from` toward `to`. `factor` is within `[0, 1]`.
    fn interpolate(&self, from: &T, to: &T, factor: f32) -> T {
        let _ = (from, factor);
        to.clone()
    }
}
