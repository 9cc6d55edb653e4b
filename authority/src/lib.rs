//! # Synchrony Authority
//! The authoritative side of a replication session. Tracks every object
//! reachable from a root, assigns each a reference identifier, and writes
//! full snapshots or incremental diffs of the graph as frames.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use synchrony_shared::{
        BitReader, BitWrite, BitWriter, Serde, SerdeErr, UnsignedVariableInteger,
    };
}

mod error;
mod frame_writer;
mod reference_pool;
mod source_root;
mod synchronizer;

pub use error::SourceError;
pub use reference_pool::SourceReferencePool;
pub use source_root::SourceRoot;
