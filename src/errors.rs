//! Error types for compatibility table generation.
//!
//! Fatal conditions abort the run before anything is merged or written.
//! Each category maps to its own process exit status so that calling
//! scripts can tell them apart:
//!
//! | Status | Condition |
//! |--------|-----------|
//! | 1 | unexpected I/O failure |
//! | 2 | invalid configuration (version spec, dates, config file) |
//! | 3 | prior table missing and not tolerated |
//! | 4 | prior table: malformed signature line |
//! | 5 | prior table: signature outside of an entry |
//! | 6 | prior table: malformed identifier |
//! | 7 | prior table: any other grammar violation |
//! | 8 | output could not be written |
//! | 9 | history source failed to start |
//!
//! Lines of history text that do not parse are not errors at all; the
//! extractor skips them.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for generation runs.
#[derive(Debug, Error)]
pub enum CompatError {
    /// Invalid option value, reported before any processing begins
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Prior table file is absent and absence was not tolerated
    #[error(
        "Input file '{}' not found, stopping execution. If required use the --ignore-missing-in option to continue on another attempt.",
        path.display()
    )]
    MissingInput { path: PathBuf },

    /// Prior table violates the line grammar
    #[error(transparent)]
    Format(#[from] FormatError),

    /// History source could not be started or read
    #[error("History source error: {message}")]
    History {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Output table could not be written
    #[error("Failed to write compatibility file '{}'", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// IO errors
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl CompatError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a history error with an underlying cause.
    pub fn history(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::History {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Process exit status for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Config { .. } => 2,
            Self::MissingInput { .. } => 3,
            Self::Format(err) => err.kind.exit_code(),
            Self::Write { .. } => 8,
            Self::History { .. } => 9,
        }
    }
}

/// Grammar violation category in a prior table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatErrorKind {
    /// Signature line is not a non-empty list of known quoted wire types
    MalformedSignature,
    /// Signature line with no open `[0x...] = {` entry
    SignatureOutsideEntry,
    /// Entry header without a valid 64-bit hex literal
    MalformedIdentifier,
    /// `version = { ... }` without exactly four in-range integers
    MalformedVersion,
    /// Structural line that is not valid where it appears
    UnexpectedLine,
    /// Input ended while an entry was still open
    UnclosedEntry,
}

impl FormatErrorKind {
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::MalformedSignature => 4,
            Self::SignatureOutsideEntry => 5,
            Self::MalformedIdentifier => 6,
            Self::MalformedVersion | Self::UnexpectedLine | Self::UnclosedEntry => 7,
        }
    }
}

impl fmt::Display for FormatErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::MalformedSignature => "expecting a Lua array with strings",
            Self::SignatureOutsideEntry => {
                "found a new signature but we aren't in any method group"
            }
            Self::MalformedIdentifier => "expecting a hex value",
            Self::MalformedVersion => "expecting a version with 4 numbers each < 65535",
            Self::UnexpectedLine => "unexpected line",
            Self::UnclosedEntry => "method group is never closed",
        };
        f.write_str(text)
    }
}

/// Prior table grammar violation at a 1-based line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unexpected Lua format, {kind}, on line {line}, got `{text}`")]
pub struct FormatError {
    pub kind: FormatErrorKind,
    pub line: usize,
    pub text: String,
}

impl FormatError {
    pub fn new(kind: FormatErrorKind, line: usize, text: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            text: text.into(),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, CompatError>;
