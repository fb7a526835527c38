//! Common utilities for datlens.
//!
//! This crate provides foundational types and utilities used across all datlens crates:
//!
//! - [`BinaryReader`] - Zero-copy binary reading from byte slices
//! - [`BinaryWriter`] - Little-endian record body writer
//! - [`FamilyId`] - 32-bit record family identifiers and their id ranges
//! - [`crc`] - CRC32C hashing utilities

mod error;
mod family;
mod reader;
mod writer;

pub mod crc;

pub use error::{Error, Result};
pub use family::FamilyId;
pub use reader::BinaryReader;
pub use writer::BinaryWriter;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
