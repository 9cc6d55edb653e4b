use std::marker::PhantomData;

use synchrony_serde::{BitReader, BitWrite, Serde, SerdeErr};

use crate::value::SyncValue;

use super::FieldCodec;

/// Writes a value through its `Serde` implementation. Never interpolates.
pub struct SerdeCodec<T> {
    phantom: PhantomData<T>,
}

impl<T> SerdeCodec<T> {
    pub fn new() -> Self {
        Self {
            phantom: PhantomData,
        }
    }
}

impl<T> Default for SerdeCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SyncValue + Serde> FieldCodec<T> for SerdeCodec<T> {
    fn write(&self, value: &T, writer: &mut dyn BitWrite) {
        value.ser(writer);
    }

    fn read(&self, reader: &mut BitReader) -> Result<T, SerdeErr> {
        T::de(reader)
    }
}

/// Integer with linear interpolation. The blend is computed in `f64` and
/// truncated toward zero, so a `u8` moving from 0 to 3 reads 0, 0, 1, 2, 3
/// at factors 0, 0.25, 0.5, 0.75, 1.
pub struct IntegerCodec<T> {
    phantom: PhantomData<T>,
}

impl<T> IntegerCodec<T> {
    pub fn new() -> Self {
        Self {
            phantom: PhantomData,
        }
    }
}

impl<T> Default for IntegerCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Floating point with plain linear interpolation
pub struct FloatCodec<T> {
    phantom: PhantomData<T>,
}

impl<T> FloatCodec<T> {
    pub fn new() -> Self {
        Self {
            phantom: PhantomData,
        }
    }
}

impl<T> Default for FloatCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! impl_integer_codec {
    ($($ty:ty),*) => {
        $(
            impl FieldCodec<$ty> for IntegerCodec<$ty> {
                fn write(&self, value: &$ty, writer: &mut dyn BitWrite) {
                    value.ser(writer);
                }

                fn read(&self, reader: &mut BitReader) -> Result<$ty, SerdeErr> {
                    <$ty>::de(reader)
                }

                fn can_interpolate(&self) -> bool {
                    true
                }

                fn interpolate(&self, from: &$ty, to: &$ty, factor: f32) -> $ty {
                    if factor <= 0.0 {
                        return *from;
                    }
                    if factor >= 1.0 {
                        return *to;
                    }
                    let from_wide = i128::from(*from);
                    let delta = i128::from(*to) - from_wide;
                    // the step is truncated toward zero, so it never overshoots `to`
                    let step = (delta as f64 * f64::from(factor)) as i128;
                    <$ty>::try_from(from_wide + step).unwrap_or(*to)
                }
            }
        )*
    };
}

impl_integer_codec!(u8, i8, u16, i16, u32, i32, u64, i64);

macro_rules! impl_float_codec {
    ($($ty:ty),*) => {
        $(
            impl FieldCodec<$ty> for FloatCodec<$ty> {
                fn write(&self, value: &$ty, writer: &mut dyn BitWrite) {
                    value.ser(writer);
                }

                fn read(&self, reader: &mut BitReader) -> Result<$ty, SerdeErr> {
                    <$ty>::de(reader)
                }

                fn can_interpolate(&self) -> bool {
                    true
                }

                fn interpolate(&self, from: &$ty, to: &$ty, factor: f32) -> $ty {
                    if factor <= 0.0 {
                        return *from;
                    }
                    if factor >= 1.0 {
                        return *to;
                    }
                    from + (to - from) * <$ty>::from(factor)
                }
            }
        )*
    };
}

impl_float_codec!(f32, f64);
