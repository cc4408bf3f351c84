//! Four-component table version.

use std::fmt;

/// Exclusive upper bound for every version component.
pub const COMPONENT_LIMIT: u32 = 65535;

/// `(major, minor, build, revision)`; every component is below
/// [`COMPONENT_LIMIT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
    pub build: u16,
    pub revision: u16,
}

/// A component that is out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("version component {value} is not < {COMPONENT_LIMIT}")]
pub struct ComponentOutOfRange {
    pub value: u64,
}

/// Validate one component against [`COMPONENT_LIMIT`].
pub fn component(value: u64) -> Result<u16, ComponentOutOfRange> {
    if value < u64::from(COMPONENT_LIMIT) {
        // fits: COMPONENT_LIMIT <= u16::MAX
        Ok(value as u16)
    } else {
        Err(ComponentOutOfRange { value })
    }
}

impl Version {
    /// Build a version from four raw components, validating each.
    pub fn from_parts(parts: [u64; 4]) -> Result<Self, ComponentOutOfRange> {
        Ok(Self {
            major: component(parts[0])?,
            minor: component(parts[1])?,
            build: component(parts[2])?,
            revision: component(parts[3])?,
        })
    }

    #[must_use]
    pub const fn parts(&self) -> [u16; 4] {
        [self.major, self.minor, self.build, self.revision]
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}
