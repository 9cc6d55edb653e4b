use thiserror::Error;

use crate::codec::CodecError;

/// Errors detected while validating or using a registered type's schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A member has no setter and is not populated through the constructor
    #[error("Member `{member}` of {type_name} has no setter and is not a constructor argument")]
    SetterNotFound { type_name: String, member: String },

    /// The post-synchronization callback declares parameters
    #[error("Callback `{callback}` of {type_name} declares {parameters} parameter(s); synchronization callbacks take none")]
    ParameterizedCallback {
        type_name: String,
        callback: String,
        parameters: usize,
    },

    /// No codec is registered for the member's value type
    #[error("No codec registered for {value_type}, used by member `{member}` of {type_name}")]
    CodecNotFound {
        type_name: String,
        member: String,
        value_type: &'static str,
    },

    /// The type can be replicated but has no constructor to rebuild it with
    #[error("{type_name} has no constructor registered")]
    MissingConstructor { type_name: String },

    /// A constructor parameter names a member the type does not declare
    #[error("Constructor of {type_name} names unknown member `{member}`")]
    UnknownConstructorMember { type_name: String, member: String },

    /// Two members share a name
    #[error("{type_name} declares member `{member}` more than once")]
    DuplicateMember { type_name: String, member: String },

    /// Member indices are written as a single byte
    #[error("{type_name} declares {count} members; at most 255 are supported")]
    TooManyMembers { type_name: String, count: usize },

    /// No member exists at the index
    #[error("{type_name} has no member at index {index}")]
    MemberIndexOutOfRange { type_name: String, index: usize },

    /// A value of the wrong type was assigned to a member
    #[error("Member `{member}` of {type_name} expects {expected}")]
    MemberTypeMismatch {
        type_name: String,
        member: String,
        expected: &'static str,
    },

    /// The handed object is not an instance of the schema's type
    #[error("Schema for {type_name} was given an object of type {found}")]
    ObjectTypeMismatch {
        type_name: String,
        found: &'static str,
    },

    /// The object is mutably borrowed elsewhere
    #[error("An instance of {type_name} is already borrowed")]
    ObjectBorrowed { type_name: String },

    #[error(transparent)]
    Codec(#[from] CodecError),
}
