//! Wire-type vocabulary and the source-type normalizer.
//!
//! Every value crossing the native ABI boundary is marshalled as one of a
//! small, closed set of fixed-width categories. [`normalize`] maps a C-level
//! type (plus whether it was declared as a pointer) onto that set using the
//! [`OVERRIDES`] table, falling back to a plain value or reference word.

use std::fmt;
use std::str::FromStr;

/// Fixed-width encoding category of a return value or parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    /// 64-bit value slot (`ulong`)
    ValueWord,
    /// Pointer to a 64-bit slot (`ulong*`)
    RefWord,
    Void,
    Object,
    /// NUL-terminated string (`char*` at the source level)
    String,
    /// Three-float vector passed by value; expanded into three value words
    /// when it appears as a parameter
    Vector3,
    /// Pointer to a three-float vector
    Vector3Ref,
}

impl WireType {
    /// Every variant, in declaration order.
    pub const ALL: [WireType; 7] = [
        WireType::ValueWord,
        WireType::RefWord,
        WireType::Void,
        WireType::Object,
        WireType::String,
        WireType::Vector3,
        WireType::Vector3Ref,
    ];

    /// Serialized spelling used by the compatibility table.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            WireType::ValueWord => "ulong",
            WireType::RefWord => "ulong*",
            WireType::Void => "void",
            WireType::Object => "object",
            WireType::String => "string",
            WireType::Vector3 => "Vector3",
            WireType::Vector3Ref => "Vector3*",
        }
    }

    /// Number of 64-bit slots this type occupies as a parameter.
    #[must_use]
    pub const fn parameter_slots(&self) -> usize {
        match self {
            WireType::Vector3 => 3,
            _ => 1,
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not part of the wire vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown wire type `{0}`")]
pub struct UnknownWireType(pub String);

impl FromStr for WireType {
    type Err = UnknownWireType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WireType::ALL
            .iter()
            .copied()
            .find(|wire| wire.as_str() == s)
            .ok_or_else(|| UnknownWireType(s.to_string()))
    }
}

/// A single override rule: `(source type, is pointer) -> wire type`.
#[derive(Debug, Clone, Copy)]
pub struct TypeOverride {
    pub source_type: &'static str,
    pub is_pointer: bool,
    pub wire: WireType,
}

/// Source types that do not marshal as a plain value/reference word.
pub const OVERRIDES: &[TypeOverride] = &[
    TypeOverride {
        source_type: "void",
        is_pointer: false,
        wire: WireType::Void,
    },
    TypeOverride {
        source_type: "object",
        is_pointer: false,
        wire: WireType::Object,
    },
    TypeOverride {
        source_type: "Vector3",
        is_pointer: false,
        wire: WireType::Vector3,
    },
    TypeOverride {
        source_type: "char",
        is_pointer: true,
        wire: WireType::String,
    },
    TypeOverride {
        source_type: "Vector3",
        is_pointer: true,
        wire: WireType::Vector3Ref,
    },
];

/// Map a source-level type onto its wire category.
///
/// Total over all inputs: types absent from [`OVERRIDES`] become
/// [`WireType::RefWord`] when declared as pointers and
/// [`WireType::ValueWord`] otherwise.
#[must_use]
pub fn normalize(source_type: &str, is_pointer: bool) -> WireType {
    OVERRIDES
        .iter()
        .find(|rule| rule.is_pointer == is_pointer && rule.source_type == source_type)
        .map(|rule| rule.wire)
        .unwrap_or(if is_pointer {
            WireType::RefWord
        } else {
            WireType::ValueWord
        })
}

/// [`normalize`] for a type declared with `pointer_depth` levels of
/// indirection. Pointers to pointers always travel as [`WireType::RefWord`].
#[must_use]
pub fn normalize_indirect(source_type: &str, pointer_depth: usize) -> WireType {
    if pointer_depth > 1 {
        WireType::RefWord
    } else {
        normalize(source_type, pointer_depth == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_types_fall_back_by_pointerness() {
        assert_eq!(normalize("int", false), WireType::ValueWord);
        assert_eq!(normalize("Vehicle", true), WireType::RefWord);
        assert_eq!(normalize("", false), WireType::ValueWord);
    }

    #[test]
    fn test_overrides_are_pointer_sensitive() {
        assert_eq!(normalize("char", true), WireType::String);
        assert_eq!(normalize("char", false), WireType::ValueWord);
        assert_eq!(normalize("void", false), WireType::Void);
        assert_eq!(normalize("void", true), WireType::RefWord);
        assert_eq!(normalize("object", false), WireType::Object);
        assert_eq!(normalize("Vector3", false), WireType::Vector3);
        assert_eq!(normalize("Vector3", true), WireType::Vector3Ref);
    }

    #[test]
    fn test_indirect_normalization() {
        assert_eq!(normalize_indirect("char", 0), WireType::ValueWord);
        assert_eq!(normalize_indirect("char", 1), WireType::String);
        assert_eq!(normalize_indirect("char", 2), WireType::RefWord);
        assert_eq!(normalize_indirect("Vector3", 3), WireType::RefWord);
    }

    #[test]
    fn test_parameter_slots() {
        assert_eq!(WireType::Vector3.parameter_slots(), 3);
        assert_eq!(WireType::Vector3Ref.parameter_slots(), 1);
        assert_eq!(WireType::ValueWord.parameter_slots(), 1);
    }

    #[test]
    fn test_override_lookup_is_case_sensitive() {
        assert_eq!(normalize("vector3", false), WireType::ValueWord);
    }

    #[test]
    fn test_wire_type_spelling_parses_back() {
        for wire in WireType::ALL {
            assert_eq!(wire.as_str().parse::<WireType>(), Ok(wire));
        }
        assert!("ulong**".parse::<WireType>().is_err());
    }
}
