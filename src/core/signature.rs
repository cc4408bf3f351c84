//! Native function identifiers and wire signatures.

use super::wire::{normalize_indirect, WireType};
use std::fmt;
use std::str::FromStr;

/// Stable 64-bit hash identifying a native function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(pub u64);

impl Identifier {
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Parse the digits of a hexadecimal literal (without the `0x` prefix).
    ///
    /// Letter case is ignored, so `ABCD` and `abcd` yield the same identifier.
    /// Returns `None` for empty input, non-hex characters or values that do
    /// not fit in 64 bits.
    #[must_use]
    pub fn from_hex_digits(digits: &str) -> Option<Self> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u64::from_str_radix(digits, 16).ok().map(Identifier)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// Error returned when parsing an `0x`-prefixed identifier literal fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid native identifier `{0}`")]
pub struct InvalidIdentifier(pub String);

impl FromStr for Identifier {
    type Err = InvalidIdentifier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .and_then(Identifier::from_hex_digits)
            .ok_or_else(|| InvalidIdentifier(s.to_string()))
    }
}

/// Ordered wire types of one native overload: the return type first,
/// followed by the parameter slots in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature(Vec<WireType>);

impl Signature {
    /// Build a signature from raw wire types. Returns `None` when empty,
    /// since every signature carries at least a return type.
    #[must_use]
    pub fn new(types: Vec<WireType>) -> Option<Self> {
        if types.is_empty() {
            None
        } else {
            Some(Self(types))
        }
    }

    /// Normalize a source-level declaration into its wire signature.
    ///
    /// Types come with their pointer depth (`0` for by-value). A parameter
    /// spanning several slots, such as a by-value `Vector3`, becomes that many
    /// value words; the originating parameter is not tracked.
    pub fn from_source<'a>(
        return_type: &str,
        return_pointer_depth: usize,
        params: impl IntoIterator<Item = (&'a str, usize)>,
    ) -> Self {
        let mut types = vec![normalize_indirect(return_type, return_pointer_depth)];
        for (source_type, pointer_depth) in params {
            let wire = normalize_indirect(source_type, pointer_depth);
            match wire.parameter_slots() {
                1 => types.push(wire),
                slots => types.extend(std::iter::repeat_n(WireType::ValueWord, slots)),
            }
        }
        Self(types)
    }

    #[must_use]
    pub fn types(&self) -> &[WireType] {
        &self.0
    }
}

/// Renders as a table signature line body: `{ "ulong", "ulong*" }`.
impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{ ")?;
        for (i, wire) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "\"{}\"", wire)?;
        }
        f.write_str(" }")
    }
}
