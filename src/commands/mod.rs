//! Command implementations behind the `compatgen` binary.
//!
//! - **generate**: load the prior table, scan history, merge and write

pub mod generate;

pub use generate::{history_source, run_generate, run_generate_at, GenerateOutcome};
