//! In-memory compatibility table.

use super::signature::{Identifier, Signature};
use indexmap::IndexMap;

/// Overload set per native identifier, in first-seen order.
///
/// The table only grows: there is no removal operation, and a signature once
/// recorded for an identifier is kept for every later generation.
#[derive(Debug, Clone, Default)]
pub struct CompatibilityTable {
    entries: IndexMap<Identifier, Vec<Signature>>,
}

/// Equal when both hold the same entries in the same order.
impl PartialEq for CompatibilityTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries.iter().eq(other.entries.iter())
    }
}

impl Eq for CompatibilityTable {}

impl CompatibilityTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `signature` to the overload set of `id` unless an equal
    /// signature is already present. Returns whether it was inserted.
    pub fn insert_if_absent(&mut self, id: Identifier, signature: Signature) -> bool {
        let overloads = self.entries.entry(id).or_default();
        if overloads.contains(&signature) {
            return false;
        }
        overloads.push(signature);
        true
    }

    /// Make sure `id` has an entry, even if it ends up without signatures.
    pub fn ensure_entry(&mut self, id: Identifier) {
        self.entries.entry(id).or_default();
    }

    /// Overload set of `id`, empty when unknown.
    #[must_use]
    pub fn get(&self, id: Identifier) -> &[Signature] {
        self.entries.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    #[must_use]
    pub fn contains(&self, id: Identifier) -> bool {
        self.entries.contains_key(&id)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Identifier, &[Signature])> {
        self.entries.iter().map(|(id, sigs)| (*id, sigs.as_slice()))
    }

    /// Number of identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of signatures across all identifiers.
    #[must_use]
    pub fn signature_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}
