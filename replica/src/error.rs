use thiserror::Error;

use synchrony_shared::{
    CodecError, ConstructorError, MemberIndex, ReferenceId, SchemaError, SerdeErr,
    TypeEncoderError,
};

/// Errors raised while applying frames on a replica. Any of these aborts the
/// frame being read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    /// A constructor asks for a dependency the provider cannot supply
    #[error("No dependency of type {dependency} is available to construct {type_name}")]
    DependencyNotFound {
        type_name: String,
        dependency: &'static str,
    },

    /// Constructor arguments reference each other in a loop
    #[error("Constructor arguments form a cycle: {}", describe_chain(.chain))]
    ConstructorCycle { chain: Vec<(ReferenceId, String)> },

    /// A member references an identifier that is neither tracked nor added
    /// by the frame
    #[error("{referrer} references {id}, which is not tracked")]
    UnresolvedReference {
        id: ReferenceId,
        referrer: ReferenceId,
    },

    /// The frame updates an identifier it never added
    #[error("Frame updates {id}, which is not tracked")]
    UnknownReference { id: ReferenceId },

    /// No frame has delivered the root
    #[error("The root reference has not been received")]
    MissingRoot,

    /// The root was requested as a different type than it was built with
    #[error("Root is a {found}, not a {expected}")]
    RootTypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A payload addresses a member the type does not declare
    #[error("{type_name} has no member at index {index}")]
    MemberIndexOutOfRange {
        type_name: String,
        index: MemberIndex,
    },

    /// A member was addressed by a name the type does not declare
    #[error("{type_name} has no member named `{member}`")]
    UnknownMember { type_name: String, member: String },

    /// The frame announces more entries than the replica accepts
    #[error("Frame carries {count} entries, more than the configured maximum of {max}")]
    FrameTooLarge { count: usize, max: usize },

    #[error("Malformed frame: {0}")]
    MalformedFrame(#[from] SerdeErr),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    TypeEncoder(#[from] TypeEncoderError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A registered constructor returned an error
    #[error("Constructing {type_name} failed: {source}")]
    ConstructorFailed {
        type_name: String,
        source: ConstructorError,
    },
}

fn describe_chain(chain: &[(ReferenceId, String)]) -> String {
    chain
        .iter()
        .map(|(id, type_name)| format!("{} ({})", type_name, id))
        .collect::<Vec<_>>()
        .join(" -> ")
}
