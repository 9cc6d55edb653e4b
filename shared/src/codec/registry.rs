use std::{
    any::{type_name, TypeId},
    collections::HashMap,
    marker::PhantomData,
    rc::Rc,
};

use log::debug;

use synchrony_serde::{BitReader, BitWrite, SerdeErr};

use crate::value::{BoxedValue, DynValue, SyncValue};

use super::{CodecError, FieldCodec, FloatCodec, IntegerCodec, SerdeCodec};

/// A [`FieldCodec`] operating on erased values
pub trait ErasedCodec {
    fn value_type_name(&self) -> &'static str;
    fn write(&self, value: &dyn DynValue, writer: &mut dyn BitWrite) -> Result<(), CodecError>;
    fn read(&self, reader: &mut BitReader) -> Result<BoxedValue, SerdeErr>;
    fn can_interpolate(&self) -> bool;
    fn interpolate(
        &self,
        from: &dyn DynValue,
        to: &dyn DynValue,
        factor: f32,
    ) -> Result<BoxedValue, CodecError>;
}

struct CodecAdapter<T, C> {
    codec: C,
    phantom: PhantomData<T>,
}

impl<T: SyncValue, C: FieldCodec<T>> CodecAdapter<T, C> {
    fn downcast<'v>(&self, value: &'v dyn DynValue) -> Result<&'v T, CodecError> {
        value
            .as_any()
            .downcast_ref::<T>()
            .ok_or(CodecError::ValueTypeMismatch {
                expected: type_name::<T>(),
                found: value.value_type_name(),
            })
    }
}

impl<T: SyncValue, C: FieldCodec<T>> ErasedCodec for CodecAdapter<T, C> {
    fn value_type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn write(&self, value: &dyn DynValue, writer: &mut dyn BitWrite) -> Result<(), CodecError> {
        let value = self.downcast(value)?;
        self.codec.write(value, writer);
        Ok(())
    }

    fn read(&self, reader: &mut BitReader) -> Result<BoxedValue, SerdeErr> {
        let value = self.codec.read(reader)?;
        Ok(Box::new(value))
    }

    fn can_interpolate(&self) -> bool {
        self.codec.can_interpolate()
    }

    fn interpolate(
        &self,
        from: &dyn DynValue,
        to: &dyn DynValue,
        factor: f32,
    ) -> Result<BoxedValue, CodecError> {
        let from = self.downcast(from)?;
        let to = self.downcast(to)?;
        Ok(Box::new(self.codec.interpolate(from, to, factor)))
    }
}

/// Codecs looked up by the exact `TypeId` of the value they encode
#[derive(Clone, Default)]
pub struct CodecRegistry {
    codecs: HashMap<TypeId, Rc<dyn ErasedCodec>>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding codecs for every built-in [`SyncValue`]
    pub fn with_primitives() -> Self {
        let mut registry = Self::new();
        registry.register::<bool, SerdeCodec<bool>>(SerdeCodec::new());
        registry.register::<String, SerdeCodec<String>>(SerdeCodec::new());
        registry.register::<u8, IntegerCodec<u8>>(IntegerCodec::new());
        registry.register::<i8, IntegerCodec<i8>>(IntegerCodec::new());
        registry.register::<u16, IntegerCodec<u16>>(IntegerCodec::new());
        registry.register::<i16, IntegerCodec<i16>>(IntegerCodec::new());
        registry.register::<u32, IntegerCodec<u32>>(IntegerCodec::new());
        registry.register::<i32, IntegerCodec<i32>>(IntegerCodec::new());
        registry.register::<u64, IntegerCodec<u64>>(IntegerCodec::new());
        registry.register::<i64, IntegerCodec<i64>>(IntegerCodec::new());
        registry.register::<f32, FloatCodec<f32>>(FloatCodec::new());
        registry.register::<f64, FloatCodec<f64>>(FloatCodec::new());
        registry
    }

    /// Registers `codec` for `T`, replacing any codec already registered
    pub fn register<T: SyncValue, C: FieldCodec<T>>(&mut self, codec: C) {
        let adapter = CodecAdapter {
            codec,
            phantom: PhantomData::<T>,
        };
        if self
            .codecs
            .insert(TypeId::of::<T>(), Rc::new(adapter))
            .is_some()
        {
            debug!("Replaced codec for {}", type_name::<T>());
        }
    }

    pub fn get(&self, value_type: &TypeId) -> Option<Rc<dyn ErasedCodec>> {
        self.codecs.get(value_type).cloned()
    }

    pub fn contains<T: SyncValue>(&self) -> bool {
        self.codecs.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}
