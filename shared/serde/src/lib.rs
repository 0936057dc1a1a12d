//! # Shoal Serde
//! Byte-level serialization shared by the shoal server & client crates.
//! All multi-byte values are written little-endian.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod byte_counter;
mod byte_reader;
mod byte_writer;
mod error;
mod impls;
mod integer;
mod serde;

pub use byte_counter::ByteCounter;
pub use byte_reader::ByteReader;
pub use byte_writer::{ByteWrite, ByteWriter};
pub use error::SerdeErr;
pub use integer::VariableInteger;
pub use serde::Serde;
