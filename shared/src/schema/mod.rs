mod builder;
mod callback;
mod constructor;
mod error;
mod object_schema;

pub use builder::SchemaBuilder;
pub use callback::{CallbackInfo, CallbackMode, SyncCallback};
pub use constructor::{ConstructorArgs, ConstructorError, ConstructorParam};
pub use error::SchemaError;
pub use object_schema::{MemberSlot, ObjectSchema, ResolvedSchema, SchemaRole};

use std::any::TypeId;

use crate::{policy::SyncPolicy, sync_ref::AnyRef, value::BoxedValue};

/// The live value of a member, as read from or written to an object
#[derive(Clone, Debug)]
pub enum MemberValue {
    Value(BoxedValue),
    Reference(Option<AnyRef>),
}

/// Whether a member carries a plain value or a reference to another
/// tracked object
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberKind {
    Value {
        value_type: TypeId,
        type_name: &'static str,
    },
    Reference {
        object_type: TypeId,
        type_name: &'static str,
    },
}

impl MemberKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            MemberKind::Value { type_name, .. } | MemberKind::Reference { type_name, .. } => {
                *type_name
            }
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, MemberKind::Reference { .. })
    }
}

#[derive(Clone, Debug)]
pub struct MemberDescriptor {
    name: String,
    policy: SyncPolicy,
    kind: MemberKind,
    has_setter: bool,
    constructor_arg: bool,
}

impl MemberDescriptor {
    pub(crate) fn new(name: &str, policy: SyncPolicy, kind: MemberKind, has_setter: bool) -> Self {
        Self {
            name: name.to_string(),
            policy,
            kind,
            has_setter,
            constructor_arg: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> SyncPolicy {
        self.policy
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn has_setter(&self) -> bool {
        self.has_setter
    }

    /// Populated through the constructor rather than a setter
    pub fn is_constructor_arg(&self) -> bool {
        self.constructor_arg
    }
}
