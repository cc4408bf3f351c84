//! Merge of discovered signatures and version bookkeeping.

pub mod merge;
pub mod version;

pub use merge::merge;
pub use version::{compute_version, parse_epoch_date, VersionSpec};
