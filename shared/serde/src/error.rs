use thiserror::Error;

/// Errors raised while decoding a bit stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The reader ran past the end of the incoming buffer
    #[error("Attempted to read {requested} bit(s) past the end of the buffer")]
    UnexpectedEnd { requested: u32 },

    /// A length-prefixed string did not contain valid UTF-8
    #[error("String payload is not valid UTF-8")]
    InvalidUtf8,

    /// A variable-length integer did not fit into 64 bits
    #[error("Variable-length integer exceeds 64 bits")]
    IntegerOverflow,
}
