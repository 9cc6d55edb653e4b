//! # Synchrony Replica
//! The receiving side of a replication session. Reads frames written by a
//! synchrony authority, constructs the objects they add in dependency order,
//! applies member updates through each member's synchronization policy, and
//! interpolates smoothed members between reads.

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

mod construction;
mod error;
mod events;
mod frame_reader;
mod policy;
mod reference_pool;
mod synchronizer;
mod target_config;
mod target_root;

pub use error::TargetError;
pub use events::TargetEvent;
pub use reference_pool::TargetReferencePool;
pub use target_config::TargetConfig;
pub use target_root::TargetRoot;
