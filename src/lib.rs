// Export modules for library usage
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod engine;
pub mod errors;
pub mod extraction;
pub mod history;
pub mod io;
pub mod observability;

// Re-export commonly used types
pub use crate::core::{CompatibilityTable, Identifier, Signature, Version, WireType};

pub use crate::commands::{run_generate, run_generate_at, GenerateOutcome};
pub use crate::config::{load_config, ConfigOverrides, GenerateOptions, TablePath};
pub use crate::engine::{compute_version, merge, VersionSpec};
pub use crate::errors::{CompatError, FormatError, FormatErrorKind, Result};
pub use crate::extraction::{signature_stream, ExtractionStats, SignatureStream};
pub use crate::history::{HistoryBackend, HistoryMode, HistorySource};
pub use crate::io::{load, load_file, serialize, write_atomically, LoadedTable};
