use std::{
    any::{type_name, Any, TypeId},
    collections::HashMap,
    fmt,
};

/// Identifies a constructor dependency by its declared type
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DependencyKey {
    type_id: TypeId,
    type_name: &'static str,
}

impl DependencyKey {
    pub fn of<D: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<D>(),
            type_name: type_name::<D>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DependencyKey({})", self.type_name)
    }
}

/// Supplies values for constructor parameters that are not synchronized
/// members. The returned box must hold a value of the key's type.
pub trait DependencyProvider {
    fn resolve(&self, key: &DependencyKey) -> Option<Box<dyn Any>>;
}

/// A provider that resolves nothing
pub struct NoDependencies;

impl DependencyProvider for NoDependencies {
    fn resolve(&self, _key: &DependencyKey) -> Option<Box<dyn Any>> {
        None
    }
}

/// [`DependencyProvider`] backed by cloneable values keyed by their type
#[derive(Default)]
pub struct DependencyMap {
    factories: HashMap<DependencyKey, Box<dyn Fn() -> Box<dyn Any>>>,
}

impl DependencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<D: Clone + 'static>(&mut self, value: D) -> &mut Self {
        self.factories.insert(
            DependencyKey::of::<D>(),
            Box::new(move || Box::new(value.clone())),
        );
        self
    }

    pub fn contains(&self, key: &DependencyKey) -> bool {
        self.factories.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl DependencyProvider for DependencyMap {
    fn resolve(&self, key: &DependencyKey) -> Option<Box<dyn Any>> {
        self.factories.get(key).map(|factory| factory())
    }
}
