//! Loader for previously generated compatibility tables.
//!
//! The table file uses a small, line-oriented subset of Lua table syntax
//! (see [`super::writer`]). The loader accepts exactly the shapes the writer
//! produces, with whitespace and trailing commas tolerated, and rejects
//! anything else with the offending 1-based line number.

use crate::core::{CompatibilityTable, Identifier, Signature, Version, WireType};
use crate::errors::{CompatError, FormatError, FormatErrorKind, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

static VERSION_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*version\s*=\s*\{\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*\}\s*,?\s*$")
        .expect("version regex is valid")
});

static BLOCK_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*compatibility\s*=\s*\{\s*$").expect("block regex is valid")
});

static ENTRY_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\[\s*0[xX]([0-9a-fA-F]+)\s*\]\s*=\s*\{\s*$").expect("entry regex is valid")
});

static SIGNATURE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*\{\s*"[^"]*"(?:\s*,\s*"[^"]*")*\s*,?\s*\}\s*,?\s*$"#)
        .expect("signature regex is valid")
});

static QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]*)""#).expect("quoted regex is valid"));

static CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\}\s*,?\s*$").expect("close regex is valid"));

/// Result of loading a prior table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedTable {
    pub table: CompatibilityTable,
    pub version: Version,
    /// Signature lines read from the file
    pub signature_count: usize,
}

#[derive(Debug)]
enum Scope {
    TopLevel,
    Block,
    Entry {
        id: Identifier,
        in_block: bool,
        line: usize,
        text: String,
    },
}

/// Line-by-line parser state.
#[derive(Debug)]
struct TableParser {
    scope: Scope,
    loaded: LoadedTable,
}

impl TableParser {
    fn new() -> Self {
        Self {
            scope: Scope::TopLevel,
            loaded: LoadedTable::default(),
        }
    }

    fn feed(&mut self, number: usize, line: &str) -> std::result::Result<(), FormatError> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("--") {
            return Ok(());
        }
        let error = |kind| FormatError::new(kind, number, line);

        match trimmed.as_bytes()[0] {
            b'{' => {
                let Scope::Entry { id, .. } = self.scope else {
                    return Err(error(FormatErrorKind::SignatureOutsideEntry));
                };
                let signature = parse_signature(line)
                    .ok_or_else(|| error(FormatErrorKind::MalformedSignature))?;
                self.loaded.table.insert_if_absent(id, signature);
                self.loaded.signature_count += 1;
            }
            b'[' => {
                let in_block = match self.scope {
                    Scope::TopLevel => false,
                    Scope::Block => true,
                    Scope::Entry { .. } => return Err(error(FormatErrorKind::UnexpectedLine)),
                };
                let id = ENTRY_OPEN
                    .captures(line)
                    .and_then(|caps| Identifier::from_hex_digits(caps.get(1)?.as_str()))
                    .ok_or_else(|| error(FormatErrorKind::MalformedIdentifier))?;
                self.loaded.table.ensure_entry(id);
                self.scope = Scope::Entry {
                    id,
                    in_block,
                    line: number,
                    text: line.to_string(),
                };
            }
            b'}' => {
                if !CLOSE.is_match(line) {
                    return Err(error(FormatErrorKind::UnexpectedLine));
                }
                self.scope = match self.scope {
                    Scope::Entry { in_block: true, .. } => Scope::Block,
                    Scope::Entry { in_block: false, .. } => Scope::TopLevel,
                    Scope::Block => Scope::TopLevel,
                    Scope::TopLevel => return Err(error(FormatErrorKind::UnexpectedLine)),
                };
            }
            _ if trimmed.starts_with("version") && matches!(self.scope, Scope::TopLevel) => {
                self.loaded.version =
                    parse_version(line).ok_or_else(|| error(FormatErrorKind::MalformedVersion))?;
            }
            _ if BLOCK_OPEN.is_match(line) && matches!(self.scope, Scope::TopLevel) => {
                self.scope = Scope::Block;
            }
            _ => return Err(error(FormatErrorKind::UnexpectedLine)),
        }
        Ok(())
    }

    fn finish(self) -> std::result::Result<LoadedTable, FormatError> {
        match self.scope {
            Scope::Entry { line, text, .. } => Err(FormatError::new(
                FormatErrorKind::UnclosedEntry,
                line,
                text,
            )),
            Scope::TopLevel | Scope::Block => Ok(self.loaded),
        }
    }
}

fn parse_signature(line: &str) -> Option<Signature> {
    if !SIGNATURE_LINE.is_match(line) {
        return None;
    }
    let types = QUOTED
        .captures_iter(line)
        .map(|caps| caps.get(1)?.as_str().parse::<WireType>().ok())
        .collect::<Option<Vec<_>>>()?;
    Signature::new(types)
}

fn parse_version(line: &str) -> Option<Version> {
    let caps = VERSION_LINE.captures(line)?;
    let mut parts = [0u64; 4];
    for (slot, part) in parts.iter_mut().enumerate() {
        *part = caps.get(slot + 1)?.as_str().parse().ok()?;
    }
    Version::from_parts(parts).ok()
}

/// Parse a complete table held in memory.
pub fn load(text: &str) -> std::result::Result<LoadedTable, FormatError> {
    let mut parser = TableParser::new();
    for (index, line) in text.lines().enumerate() {
        parser.feed(index + 1, line)?;
    }
    parser.finish()
}

/// Parse a table from a reader, one line at a time.
pub fn load_reader<R: BufRead>(reader: R) -> Result<LoadedTable> {
    let mut parser = TableParser::new();
    for (index, line) in reader.lines().enumerate() {
        parser.feed(index + 1, &line?)?;
    }
    Ok(parser.finish()?)
}

/// Load the prior table at `path`.
///
/// `None` skips loading entirely. A missing file is fatal unless
/// `ignore_missing` is set, in which case an empty table with version
/// `0.0.0.0` is returned.
pub fn load_file(path: Option<&Path>, ignore_missing: bool) -> Result<LoadedTable> {
    let Some(path) = path else {
        tracing::debug!("prior table loading skipped");
        return Ok(LoadedTable::default());
    };

    match File::open(path) {
        Ok(file) => load_reader(BufReader::new(file)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            if ignore_missing {
                tracing::info!(path = %path.display(), "prior table not found, starting empty");
                Ok(LoadedTable::default())
            } else {
                Err(CompatError::MissingInput {
                    path: path.to_path_buf(),
                })
            }
        }
        Err(e) => Err(e.into()),
    }
}
