use std::{
    any::{type_name, TypeId},
    collections::HashMap,
    rc::Rc,
};

use synchrony_serde::Serde;

use crate::{
    codec::{CodecRegistry, FieldCodec},
    map::{MapSchema, MapTypeSchema, SyncMap},
    schema::{ObjectSchema, SchemaBuilder},
    value::SyncValue,
};

pub mod error;
pub use error::ProtocolError;

// Protocol Plugin
pub trait ProtocolPlugin {
    fn build(&self, protocol: &mut SyncProtocol);
}

/// How a registered type is replicated
#[derive(Clone)]
pub enum TypeShape {
    Object(Rc<dyn ObjectSchema>),
    Map(Rc<dyn MapSchema>),
}

impl TypeShape {
    pub fn type_name(&self) -> &str {
        match self {
            TypeShape::Object(schema) => schema.type_name(),
            TypeShape::Map(schema) => schema.type_name(),
        }
    }
}

/// Registry of every replicated type and value codec. Authority and replicas
/// must build equivalent protocols.
#[derive(Clone)]
pub struct SyncProtocol {
    codecs: CodecRegistry,
    types: HashMap<TypeId, TypeShape>,
    names: HashMap<String, TypeId>,
    locked: bool,
}

impl Default for SyncProtocol {
    fn default() -> Self {
        Self {
            codecs: CodecRegistry::with_primitives(),
            types: HashMap::new(),
            names: HashMap::new(),
            locked: false,
        }
    }
}

impl SyncProtocol {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn add_plugin<P: ProtocolPlugin>(&mut self, plugin: P) -> &mut Self {
        self.check_lock();
        plugin.build(self);
        self
    }

    pub fn add_codec<V: SyncValue, C: FieldCodec<V>>(&mut self, codec: C) -> &mut Self {
        self.check_lock();
        self.codecs.register::<V, C>(codec);
        self
    }

    /// Registers a tracked object type
    ///
    /// # Panics
    ///
    /// Panics if the protocol is locked, or if the type or its name is
    /// already registered. Consider using `try_add_type` for non-panicking
    /// error handling.
    pub fn add_type<T: 'static>(&mut self, schema: SchemaBuilder<T>) -> &mut Self {
        self.check_lock();
        if let Err(error) = self.insert_shape::<T>(
            schema.name().to_string(),
            TypeShape::Object(Rc::new(schema.build())),
        ) {
            panic!("{}", error);
        }
        self
    }

    /// Registers `SyncMap<K, V>` under `name`. `V` must be registered too.
    pub fn add_map<K: SyncValue + Serde + Ord, V: 'static>(&mut self, name: &str) -> &mut Self {
        self.check_lock();
        if let Err(error) = self.insert_shape::<SyncMap<K, V>>(
            name.to_string(),
            TypeShape::Map(Rc::new(MapTypeSchema::<K, V>::new(name))),
        ) {
            panic!("{}", error);
        }
        self
    }

    // Non-panicking builder methods

    pub fn try_add_plugin<P: ProtocolPlugin>(&mut self, plugin: P) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        plugin.build(self);
        Ok(self)
    }

    pub fn try_add_codec<V: SyncValue, C: FieldCodec<V>>(
        &mut self,
        codec: C,
    ) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.codecs.register::<V, C>(codec);
        Ok(self)
    }

    pub fn try_add_type<T: 'static>(&mut self, schema: SchemaBuilder<T>) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.insert_shape::<T>(
            schema.name().to_string(),
            TypeShape::Object(Rc::new(schema.build())),
        )?;
        Ok(self)
    }

    pub fn try_add_map<K: SyncValue + Serde + Ord, V: 'static>(
        &mut self,
        name: &str,
    ) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.insert_shape::<SyncMap<K, V>>(
            name.to_string(),
            TypeShape::Map(Rc::new(MapTypeSchema::<K, V>::new(name))),
        )?;
        Ok(self)
    }

    fn insert_shape<T: 'static>(&mut self, name: String, shape: TypeShape) -> Result<(), ProtocolError> {
        let type_id = TypeId::of::<T>();
        if let Some(existing) = self.types.get(&type_id) {
            return Err(ProtocolError::DuplicateType {
                type_name: type_name::<T>(),
                existing: existing.type_name().to_string(),
            });
        }
        if self.names.contains_key(&name) {
            return Err(ProtocolError::DuplicateTypeName { name });
        }
        self.names.insert(name, type_id);
        self.types.insert(type_id, shape);
        Ok(())
    }

    pub fn try_lock(&mut self) -> Result<(), ProtocolError> {
        self.try_check_lock()?;
        self.locked = true;
        Ok(())
    }

    pub fn lock(&mut self) {
        self.check_lock();
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Checks if protocol is locked without panicking
    /// Returns Err if protocol is locked
    pub fn try_check_lock(&self) -> Result<(), ProtocolError> {
        if self.locked {
            Err(ProtocolError::AlreadyLocked)
        } else {
            Ok(())
        }
    }

    /// Checks if protocol is locked, panics if it is
    pub fn check_lock(&self) {
        if self.locked {
            panic!("Protocol already locked!");
        }
    }

    pub fn build(&mut self) -> Self {
        std::mem::take(self)
    }

    // Lookups

    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    pub fn shape(&self, type_id: &TypeId) -> Option<&TypeShape> {
        self.types.get(type_id)
    }

    pub fn type_name(&self, type_id: &TypeId) -> Option<&str> {
        self.types.get(type_id).map(TypeShape::type_name)
    }

    pub fn type_id_by_name(&self, name: &str) -> Option<TypeId> {
        self.names.get(name).copied()
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }
}
