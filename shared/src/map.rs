use std::{
    any::{type_name, TypeId},
    cmp::Ordering,
    collections::{btree_map, BTreeMap, BTreeSet},
    marker::PhantomData,
};

use synchrony_serde::{BitReader, BitWrite, Serde, SerdeErr};

use crate::{
    codec::CodecError,
    schema::SchemaError,
    sync_ref::{AnyRef, SyncRef},
    value::{downcast_value, BoxedValue, DynValue, SyncValue},
};

/// An ordered map from plain keys to tracked objects. Each entry's value is
/// a tracked reference of its own.
pub struct SyncMap<K, V> {
    entries: BTreeMap<K, SyncRef<V>>,
}

impl<K: Ord, V> SyncMap<K, V> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, key: K, value: SyncRef<V>) -> Option<SyncRef<V>> {
        self.entries.insert(key, value)
    }

    pub fn remove(&mut self, key: &K) -> Option<SyncRef<V>> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &K) -> Option<&SyncRef<V>> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, K, SyncRef<V>> {
        self.entries.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, K, SyncRef<V>> {
        self.entries.keys()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<K: Ord, V> Default for SyncMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased access to a registered [`SyncMap`] type
pub trait MapSchema {
    fn type_name(&self) -> &str;
    fn object_type(&self) -> TypeId;
    /// `TypeId` of the objects held as entry values
    fn value_type(&self) -> TypeId;
    fn value_type_name(&self) -> &'static str;
    fn entries(&self, map: &AnyRef) -> Result<Vec<(BoxedValue, AnyRef)>, SchemaError>;
    fn write_key(&self, key: &dyn DynValue, writer: &mut dyn BitWrite) -> Result<(), CodecError>;
    fn read_key(&self, reader: &mut BitReader) -> Result<BoxedValue, SerdeErr>;
    fn new_map(&self) -> AnyRef;
    fn insert(&self, map: &AnyRef, key: BoxedValue, value: AnyRef) -> Result<(), SchemaError>;
    fn remove(&self, map: &AnyRef, key: &dyn DynValue) -> Result<(), SchemaError>;
    /// Orders two keys the way the map iterates them
    fn compare_keys(&self, left: &dyn DynValue, right: &dyn DynValue) -> Result<Ordering, SchemaError>;
    /// Removes every entry whose key is not in `keep`, returning the removed keys
    fn retain_keys(&self, map: &AnyRef, keep: &[BoxedValue]) -> Result<Vec<BoxedValue>, SchemaError>;
}

pub(crate) struct MapTypeSchema<K, V> {
    name: String,
    phantom: PhantomData<(K, V)>,
}

impl<K, V> MapTypeSchema<K, V> {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            phantom: PhantomData,
        }
    }
}

impl<K: SyncValue + Serde + Ord, V: 'static> MapTypeSchema<K, V> {
    fn with_map<R>(
        &self,
        map: &AnyRef,
        f: impl FnOnce(&mut SyncMap<K, V>) -> Result<R, SchemaError>,
    ) -> Result<R, SchemaError> {
        let cell = map
            .downcast_cell::<SyncMap<K, V>>()
            .ok_or_else(|| SchemaError::ObjectTypeMismatch {
                type_name: self.name.clone(),
                found: map.type_name(),
            })?;
        let mut map = cell.try_borrow_mut().map_err(|_| SchemaError::ObjectBorrowed {
            type_name: self.name.clone(),
        })?;
        f(&mut *map)
    }

    fn key(&self, key: &dyn DynValue) -> Result<K, SchemaError> {
        downcast_value::<K>(key).ok_or_else(|| self.key_mismatch())
    }

    fn key_mismatch(&self) -> SchemaError {
        SchemaError::MemberTypeMismatch {
            type_name: self.name.clone(),
            member: "key".to_string(),
            expected: type_name::<K>(),
        }
    }
}

impl<K: SyncValue + Serde + Ord, V: 'static> MapSchema for MapTypeSchema<K, V> {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn object_type(&self) -> TypeId {
        TypeId::of::<SyncMap<K, V>>()
    }

    fn value_type(&self) -> TypeId {
        TypeId::of::<V>()
    }

    fn value_type_name(&self) -> &'static str {
        type_name::<V>()
    }

    fn entries(&self, map: &AnyRef) -> Result<Vec<(BoxedValue, AnyRef)>, SchemaError> {
        self.with_map(map, |map| {
            Ok(map
                .iter()
                .map(|(key, value)| {
                    let key: BoxedValue = Box::new(key.clone());
                    (key, AnyRef::from_ref(value))
                })
                .collect())
        })
    }

    fn write_key(&self, key: &dyn DynValue, writer: &mut dyn BitWrite) -> Result<(), CodecError> {
        let key = key
            .as_any()
            .downcast_ref::<K>()
            .ok_or(CodecError::ValueTypeMismatch {
                expected: type_name::<K>(),
                found: key.value_type_name(),
            })?;
        key.ser(writer);
        Ok(())
    }

    fn read_key(&self, reader: &mut BitReader) -> Result<BoxedValue, SerdeErr> {
        let key = K::de(reader)?;
        Ok(Box::new(key))
    }

    fn new_map(&self) -> AnyRef {
        AnyRef::new(SyncMap::<K, V>::new())
    }

    fn insert(&self, map: &AnyRef, key: BoxedValue, value: AnyRef) -> Result<(), SchemaError> {
        let key = self.key(key.as_ref())?;
        let value = value
            .downcast::<V>()
            .ok_or_else(|| SchemaError::MemberTypeMismatch {
                type_name: self.name.clone(),
                member: "value".to_string(),
                expected: type_name::<V>(),
            })?;
        self.with_map(map, |map| {
            map.insert(key, value);
            Ok(())
        })
    }

    fn remove(&self, map: &AnyRef, key: &dyn DynValue) -> Result<(), SchemaError> {
        let key = self.key(key)?;
        self.with_map(map, |map| {
            map.remove(&key);
            Ok(())
        })
    }

    fn compare_keys(&self, left: &dyn DynValue, right: &dyn DynValue) -> Result<Ordering, SchemaError> {
        match (
            left.as_any().downcast_ref::<K>(),
            right.as_any().downcast_ref::<K>(),
        ) {
            (Some(left), Some(right)) => Ok(left.cmp(right)),
            _ => Err(self.key_mismatch()),
        }
    }

    fn retain_keys(&self, map: &AnyRef, keep: &[BoxedValue]) -> Result<Vec<BoxedValue>, SchemaError> {
        let keep = keep
            .iter()
            .map(|key| self.key(key.as_ref()))
            .collect::<Result<BTreeSet<K>, SchemaError>>()?;
        self.with_map(map, |map| {
            let stale: Vec<K> = map.keys().filter(|key| !keep.contains(*key)).cloned().collect();
            for key in &stale {
                map.remove(key);
            }
            Ok(stale
                .into_iter()
                .map(|key| Box::new(key) as BoxedValue)
                .collect())
        })
    }
}
