//! Core data model: wire types, signatures, the compatibility table and its
//! version.

pub mod signature;
pub mod table;
pub mod version;
pub mod wire;

pub use signature::{Identifier, InvalidIdentifier, Signature};
pub use table::CompatibilityTable;
pub use version::{ComponentOutOfRange, Version, COMPONENT_LIMIT};
pub use wire::{normalize, normalize_indirect, TypeOverride, UnknownWireType, WireType, OVERRIDES};
