use std::{any::TypeId, collections::HashSet, ops::Deref, rc::Rc};

use synchrony_serde::{BitReader, BitWrite, SerdeErr};

use crate::{
    codec::{CodecError, CodecRegistry, ErasedCodec},
    mutator::PropertyMutator,
    sync_ref::AnyRef,
    types::{MemberIndex, ReferenceId},
    wire::WireValue,
};

use super::{
    CallbackInfo, ConstructorArgs, ConstructorError, ConstructorParam, MemberDescriptor,
    MemberKind, MemberValue, SchemaError,
};

/// Type-erased access to a registered type's members
pub trait ObjectSchema {
    /// Name the type is announced under on the wire
    fn type_name(&self) -> &str;
    fn object_type(&self) -> TypeId;
    fn members(&self) -> &[MemberDescriptor];
    fn constructor_params(&self) -> Option<&[ConstructorParam]>;
    fn callback(&self) -> Option<CallbackInfo>;
    fn has_change_notification(&self) -> bool;
    fn get(&self, object: &AnyRef, index: MemberIndex) -> Result<MemberValue, SchemaError>;
    fn set(&self, object: &AnyRef, index: MemberIndex, value: MemberValue) -> Result<(), SchemaError>;
    fn construct(&self, args: &mut ConstructorArgs) -> Result<AnyRef, ConstructorError>;
    fn install_mutator(&self, object: &AnyRef, mutator: PropertyMutator) -> Result<(), SchemaError>;
    fn invoke_callback(&self, object: &AnyRef) -> Result<(), SchemaError>;

    fn member_index(&self, name: &str) -> Option<MemberIndex> {
        self.members()
            .iter()
            .position(|member| member.name() == name)
            .and_then(|position| MemberIndex::try_from(position).ok())
    }
}

/// Which side of the replication a schema is validated for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SchemaRole {
    /// Reads members and writes them out
    Source,
    /// Constructs instances and applies members to them
    Target,
}

/// How a single member is written on the wire
#[derive(Clone)]
pub enum MemberSlot {
    Value(Rc<dyn ErasedCodec>),
    Reference,
}

impl MemberSlot {
    pub fn codec(&self) -> Option<&Rc<dyn ErasedCodec>> {
        match self {
            MemberSlot::Value(codec) => Some(codec),
            MemberSlot::Reference => None,
        }
    }

    pub fn write(&self, value: &WireValue, writer: &mut dyn BitWrite) -> Result<(), CodecError> {
        match (self, value) {
            (MemberSlot::Value(codec), WireValue::Value(value)) => codec.write(value.as_ref(), writer),
            (MemberSlot::Reference, WireValue::Reference(id)) => {
                ReferenceId::ser_optional(*id, writer);
                Ok(())
            }
            (MemberSlot::Value(_), WireValue::Reference(_)) => {
                Err(CodecError::KindMismatch { expected: "value" })
            }
            (MemberSlot::Reference, WireValue::Value(_)) => {
                Err(CodecError::KindMismatch { expected: "reference" })
            }
        }
    }

    pub fn read(&self, reader: &mut BitReader) -> Result<WireValue, SerdeErr> {
        match self {
            MemberSlot::Value(codec) => codec.read(reader).map(WireValue::Value),
            MemberSlot::Reference => ReferenceId::de_optional(reader).map(WireValue::Reference),
        }
    }
}

/// An [`ObjectSchema`] checked against a codec registry, with each member's
/// codec looked up once
pub struct ResolvedSchema {
    schema: Rc<dyn ObjectSchema>,
    slots: Vec<MemberSlot>,
}

impl ResolvedSchema {
    pub fn resolve(
        schema: Rc<dyn ObjectSchema>,
        codecs: &CodecRegistry,
        role: SchemaRole,
    ) -> Result<Self, SchemaError> {
        let type_name = schema.type_name().to_string();
        let members = schema.members();

        if members.len() > usize::from(MemberIndex::MAX) {
            return Err(SchemaError::TooManyMembers {
                type_name,
                count: members.len(),
            });
        }

        let mut names = HashSet::new();
        let mut slots = Vec::with_capacity(members.len());
        for member in members {
            if !names.insert(member.name()) {
                return Err(SchemaError::DuplicateMember {
                    type_name,
                    member: member.name().to_string(),
                });
            }
            let slot = match member.kind() {
                MemberKind::Value {
                    value_type,
                    type_name: value_type_name,
                } => {
                    let Some(codec) = codecs.get(&value_type) else {
                        return Err(SchemaError::CodecNotFound {
                            type_name,
                            member: member.name().to_string(),
                            value_type: value_type_name,
                        });
                    };
                    MemberSlot::Value(codec)
                }
                MemberKind::Reference { .. } => MemberSlot::Reference,
            };
            slots.push(slot);
        }

        if role == SchemaRole::Target {
            Self::validate_target(schema.as_ref())?;
        }

        Ok(Self { schema, slots })
    }

    fn validate_target(schema: &dyn ObjectSchema) -> Result<(), SchemaError> {
        let type_name = || schema.type_name().to_string();

        let Some(params) = schema.constructor_params() else {
            return Err(SchemaError::MissingConstructor {
                type_name: type_name(),
            });
        };
        for param in params {
            if let ConstructorParam::Member(name) = param {
                if schema.member_index(name).is_none() {
                    return Err(SchemaError::UnknownConstructorMember {
                        type_name: type_name(),
                        member: name.clone(),
                    });
                }
            }
        }

        for member in schema.members() {
            if !member.has_setter() && !member.is_constructor_arg() {
                return Err(SchemaError::SetterNotFound {
                    type_name: type_name(),
                    member: member.name().to_string(),
                });
            }
        }

        if let Some(callback) = schema.callback() {
            if callback.parameter_count > 0 {
                return Err(SchemaError::ParameterizedCallback {
                    type_name: type_name(),
                    callback: callback.name,
                    parameters: callback.parameter_count,
                });
            }
        }

        Ok(())
    }

    pub fn schema(&self) -> &Rc<dyn ObjectSchema> {
        &self.schema
    }

    pub fn slot(&self, index: MemberIndex) -> Option<&MemberSlot> {
        self.slots.get(usize::from(index))
    }

    pub fn member_count(&self) -> usize {
        self.slots.len()
    }

    /// Indices of every member, in declared order
    pub fn indices(&self) -> impl Iterator<Item = MemberIndex> {
        (0..self.slots.len()).filter_map(|index| MemberIndex::try_from(index).ok())
    }
}

impl Deref for ResolvedSchema {
    type Target = dyn ObjectSchema;

    fn deref(&self) -> &Self::Target {
        self.schema.as_ref()
    }
}
