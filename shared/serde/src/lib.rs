//! # Synchrony Serde
//! Bit-packed reading & writing of the values that make up a replication frame.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod bit_reader;
mod bit_writer;
mod error;
mod impls;
mod integer;
mod serde;

pub use bit_reader::BitReader;
pub use bit_writer::{BitWrite, BitWriter};
pub use error::SerdeErr;
pub use integer::UnsignedVariableInteger;
pub use serde::Serde;
