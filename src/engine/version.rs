//! Version computation for generated tables.
//!
//! `major.minor` are chosen by the caller; `build` counts whole days since
//! the epoch date and `revision` counts regenerations within the same day.

use crate::core::version::component;
use crate::core::Version;
use crate::errors::{CompatError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("digit regex is valid"));

/// Requested version: either a prefix with automatic build/revision or an
/// exact version used verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSpec {
    MajorMinor { major: u16, minor: u16 },
    Exact(Version),
}

impl Default for VersionSpec {
    fn default() -> Self {
        Self::MajorMinor { major: 2, minor: 0 }
    }
}

impl FromStr for VersionSpec {
    type Err = CompatError;

    /// Accepts any text containing two or four integers, e.g. `2.0`,
    /// `2.0.3.4` or `2, 0`.
    fn from_str(s: &str) -> Result<Self> {
        let numbers: Vec<&str> = DIGIT_RUN.find_iter(s).map(|m| m.as_str()).collect();
        if numbers.len() != 2 && numbers.len() != 4 {
            return Err(CompatError::config(format!(
                "Invalid value for set-version with value: '{s}', must be either 2 or 4 integers"
            )));
        }

        let parts = numbers
            .iter()
            .map(|digits| {
                digits
                    .parse::<u64>()
                    .ok()
                    .and_then(|value| component(value).ok())
                    .ok_or_else(|| {
                        CompatError::config(format!(
                            "set-version contains at least 1 number that isn't < 65535: '{s}'"
                        ))
                    })
            })
            .collect::<Result<Vec<u16>>>()?;

        Ok(match parts.as_slice() {
            [major, minor] => Self::MajorMinor {
                major: *major,
                minor: *minor,
            },
            [major, minor, build, revision] => Self::Exact(Version {
                major: *major,
                minor: *minor,
                build: *build,
                revision: *revision,
            }),
            _ => unreachable!("length checked above"),
        })
    }
}

impl VersionSpec {
    /// Version for a table generated at `now`, following `prior`.
    pub fn resolve(&self, epoch: NaiveDate, prior: Version, now: DateTime<Utc>) -> Result<Version> {
        match *self {
            Self::Exact(version) => Ok(version),
            Self::MajorMinor { major, minor } => {
                compute_version(major, minor, epoch, prior.build, prior.revision, now)
            }
        }
    }
}

/// Compute the next version.
///
/// `build` is the number of whole days between the epoch date and `now`
/// (UTC). `revision` restarts at 0 on a new build and otherwise increments
/// the prior revision.
pub fn compute_version(
    major: u16,
    minor: u16,
    epoch: NaiveDate,
    prior_build: u16,
    prior_revision: u16,
    now: DateTime<Utc>,
) -> Result<Version> {
    let days = (now.date_naive() - epoch).num_days();
    let days = u64::try_from(days).map_err(|_| {
        CompatError::config(format!("start date {epoch} lies after the current date"))
    })?;
    let build = component(days).map_err(|e| {
        CompatError::config(format!("build number (days since {epoch}): {e}"))
    })?;

    let revision = if build == prior_build {
        component(u64::from(prior_revision) + 1)
            .map_err(|e| CompatError::config(format!("revision for build {build}: {e}")))?
    } else {
        0
    };

    Ok(Version {
        major,
        minor,
        build,
        revision,
    })
}

/// Parse a `YYYY-MM-DD` epoch date.
pub fn parse_epoch_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| {
        CompatError::config(format!(
            "Invalid start date '{s}', expected YYYY-MM-DD: {e}"
        ))
    })
}
