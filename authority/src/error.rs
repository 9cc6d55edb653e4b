use thiserror::Error;

use synchrony_shared::{CodecError, SchemaError, TypeEncoderError};

/// Errors raised while writing frames on the authority
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// A tracked object references an object whose type is not registered
    #[error("{parent}, contains an untracked reference to {reference}")]
    UntrackedReference {
        parent: String,
        reference: &'static str,
    },

    /// The root was requested as a different type than it was tracked with
    #[error("Root is a {found}, not a {expected}")]
    RootTypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// The reference pool no longer holds the root object
    #[error("Root reference is not tracked")]
    MissingRoot,

    /// Every identifier is in use
    #[error("Reference pool has no identifiers left to allocate")]
    PoolExhausted,

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    TypeEncoder(#[from] TypeEncoderError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}
