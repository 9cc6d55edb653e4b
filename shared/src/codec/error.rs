use thiserror::Error;

/// Errors raised when an erased value is handed to the wrong codec
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The value's runtime type differs from the codec's value type
    #[error("Codec for {expected} was given a value of type {found}")]
    ValueTypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A reference was handed where a value belongs, or the reverse
    #[error("Expected a {expected} member value")]
    KindMismatch { expected: &'static str },
}
