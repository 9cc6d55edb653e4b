//! # Synchrony Shared
//! Common functionality shared between synchrony-authority & synchrony-replica crates.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

pub use synchrony_serde::{
    BitReader, BitWrite, BitWriter, Serde, SerdeErr, UnsignedVariableInteger,
};

mod backends;
mod clock;
mod codec;
mod dependency;
mod diff_mask;
mod frame;
mod map;
mod mutator;
mod policy;
mod protocol;
mod schema;
mod schema_cache;
mod sync_ref;
mod type_encoder;
mod types;
mod value;
mod wire;

pub use backends::Instant;
pub use clock::Clock;
pub use codec::{
    CodecError, CodecRegistry, ErasedCodec, FieldCodec, FloatCodec, IntegerCodec, SerdeCodec,
};
pub use dependency::{DependencyKey, DependencyMap, DependencyProvider, NoDependencies};
pub use diff_mask::DiffMask;
pub use frame::FrameHeader;
pub use map::{MapSchema, SyncMap};
pub use mutator::{MutReceiver, MutatorError, PropertyMutate, PropertyMutator};
pub use policy::SyncPolicy;
pub use protocol::{ProtocolError, ProtocolPlugin, SyncProtocol, TypeShape};
pub use schema::{
    CallbackInfo, CallbackMode, ConstructorArgs, ConstructorError, ConstructorParam,
    MemberDescriptor, MemberKind, MemberSlot, MemberValue, ObjectSchema, ResolvedSchema,
    SchemaBuilder, SchemaError, SchemaRole, SyncCallback,
};
pub use schema_cache::{ResolvedShape, SchemaCache};
pub use sync_ref::{AnyRef, RefKey, SyncRef};
pub use type_encoder::{TypeCode, TypeEncoder, TypeEncoderError};
pub use types::{read_count, write_count, MemberIndex, ReferenceId, Tick};
pub use value::{downcast_value, BoxedValue, DynValue, SyncValue};
pub use wire::WireValue;
