use std::{
    any::{type_name, Any},
    collections::HashMap,
};

use thiserror::Error;

use crate::{
    dependency::DependencyKey,
    sync_ref::SyncRef,
    value::{downcast_value, SyncValue},
};

use super::MemberValue;

/// Errors raised while invoking a registered constructor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructorError {
    /// The constructor asked for an argument that was not supplied
    #[error("Constructor argument `{name}` was not supplied")]
    MissingArgument { name: String },

    /// The supplied argument has a different type than requested
    #[error("Constructor argument `{name}` is not a {expected}")]
    ArgumentType { name: String, expected: &'static str },

    /// The type has no constructor registered
    #[error("No constructor registered")]
    NoConstructor,

    /// The constructor rejected its arguments
    #[error("{0}")]
    Custom(String),
}

impl ConstructorError {
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}

/// A parameter of a type's designated constructor
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConstructorParam {
    /// Populated from the synchronized member of the same name
    Member(String),
    /// Resolved through the replica's dependency provider
    Dependency(DependencyKey),
}

impl ConstructorParam {
    pub fn member(name: &str) -> Self {
        Self::Member(name.to_string())
    }

    pub fn dependency<D: 'static>() -> Self {
        Self::Dependency(DependencyKey::of::<D>())
    }
}

/// Arguments gathered for one constructor invocation
#[derive(Default)]
pub struct ConstructorArgs {
    members: HashMap<String, MemberValue>,
    dependencies: HashMap<DependencyKey, Box<dyn Any>>,
}

impl ConstructorArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_member(&mut self, name: &str, value: MemberValue) {
        self.members.insert(name.to_string(), value);
    }

    pub fn insert_dependency(&mut self, key: DependencyKey, value: Box<dyn Any>) {
        self.dependencies.insert(key, value);
    }

    /// Takes the value of member `name`
    pub fn value<V: SyncValue>(&mut self, name: &str) -> Result<V, ConstructorError> {
        let argument = self.take_member(name)?;
        let MemberValue::Value(value) = argument else {
            return Err(Self::argument_type::<V>(name));
        };
        downcast_value::<V>(value.as_ref()).ok_or_else(|| Self::argument_type::<V>(name))
    }

    /// Takes the reference held by member `name`
    pub fn reference<R: 'static>(&mut self, name: &str) -> Result<Option<SyncRef<R>>, ConstructorError> {
        let argument = self.take_member(name)?;
        let MemberValue::Reference(reference) = argument else {
            return Err(Self::argument_type::<SyncRef<R>>(name));
        };
        match reference {
            None => Ok(None),
            Some(reference) => reference
                .downcast::<R>()
                .map(Some)
                .ok_or_else(|| Self::argument_type::<SyncRef<R>>(name)),
        }
    }

    /// Takes the resolved dependency of type `D`
    pub fn dependency<D: 'static>(&mut self) -> Result<D, ConstructorError> {
        let key = DependencyKey::of::<D>();
        let Some(value) = self.dependencies.remove(&key) else {
            return Err(ConstructorError::MissingArgument {
                name: key.type_name().to_string(),
            });
        };
        value
            .downcast::<D>()
            .map(|value| *value)
            .map_err(|_| Self::argument_type::<D>(key.type_name()))
    }

    fn take_member(&mut self, name: &str) -> Result<MemberValue, ConstructorError> {
        self.members
            .remove(name)
            .ok_or_else(|| ConstructorError::MissingArgument {
                name: name.to_string(),
            })
    }

    fn argument_type<E>(name: &str) -> ConstructorError {
        ConstructorError::ArgumentType {
            name: name.to_string(),
            expected: type_name::<E>(),
        }
    }
}
