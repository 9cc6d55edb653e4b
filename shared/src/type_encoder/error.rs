use thiserror::Error;

use synchrony_serde::SerdeErr;

use super::TypeCode;

/// Errors that can occur while mapping types to wire codes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeEncoderError {
    /// An announcement named a type the local protocol does not register
    #[error("Type `{name}` was announced but is not registered in the protocol")]
    UnknownType { name: String },

    /// A frame referenced a code that was never announced
    #[error("Type code {code} was referenced before being announced")]
    UnknownTypeCode { code: TypeCode },

    /// A code was announced again for a different type
    #[error("Type code {code} is assigned to `{existing}` but was announced as `{announced}`")]
    TypeCodeConflict {
        code: TypeCode,
        existing: String,
        announced: String,
    },

    /// The authority tried to encode a type the protocol does not register
    #[error("Type {type_name} is not registered in the protocol")]
    TypeNotRegistered { type_name: &'static str },

    /// The announcement table could not be decoded
    #[error("Malformed type announcement: {0}")]
    Malformed(#[from] SerdeErr),
}
