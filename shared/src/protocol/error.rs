use thiserror::Error;

/// Errors that can occur during protocol operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Protocol is locked and cannot be modified
    #[error("Protocol is already locked and cannot be modified. Protocol.lock() has been called and no further changes are allowed")]
    AlreadyLocked,

    /// Another type is already registered under the same wire name
    #[error("A type named `{name}` is already registered")]
    DuplicateTypeName { name: String },

    /// The same Rust type was registered twice
    #[error("{type_name} is already registered as `{existing}`")]
    DuplicateType {
        type_name: &'static str,
        existing: String,
    },
}
