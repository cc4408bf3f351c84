//! C-style declaration parsing for history lines.
//!
//! Lines come from free-form commit history, so nothing here fails: a line
//! that does not look like a declaration yields `None`, and a parameter that
//! cannot be read is dropped from the list.

use crate::core::Signature;
use once_cell::sync::Lazy;
use regex::Regex;

/// `cs_type(...)` annotations that override a declared type for code
/// generation; they carry no wire information.
static TYPE_ANNOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)cs_type\(\w*\*?\)\s").expect("annotation regex is valid"));

static CONST_QUALIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bconst\s+").expect("const regex is valid"));

/// Diff marker, return type, optional pointer, function name, opening paren.
static DECLARATION_HEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\w+)(?:\s*(\*+)\s*|\s+)(\w+)\s*\(").expect("declaration regex is valid")
});

/// Leading qualifiers, type, pointer markers, optional name.
static PARAMETER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\w+\s+)*?(\w+)\s*((?:\*\s*)*)(\w+)?$").expect("parameter regex is valid")
});

/// Words that can open a call-like line without being a return type.
const STATEMENT_KEYWORDS: &[&str] = &[
    "return", "else", "if", "while", "for", "switch", "case", "sizeof", "typedef", "do", "goto",
];

/// One parameter of a parsed declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub source_type: String,
    /// Number of `*` markers; `0` for by-value
    pub pointer_depth: usize,
    pub name: Option<String>,
}

/// A function declaration found in history text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub return_type: String,
    pub return_pointer_depth: usize,
    pub name: String,
    pub parameters: Vec<Parameter>,
}

impl Declaration {
    /// Parse a single (already annotation-stripped) history line.
    ///
    /// The line must start with the return type, optionally preceded by a
    /// single `+`/`-` diff marker. Diff context lines, which begin with a
    /// space, never match.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let head = DECLARATION_HEAD.captures(line)?;
        let return_type = head.get(1)?.as_str();
        if STATEMENT_KEYWORDS.contains(&return_type) {
            return None;
        }

        let after_paren = &line[head.get(0)?.end()..];
        let parameter_text = balanced_parameters(after_paren)?;

        Some(Self {
            return_type: return_type.to_string(),
            return_pointer_depth: head.get(2).map_or(0, |m| m.as_str().len()),
            name: head.get(3)?.as_str().to_string(),
            parameters: parse_parameters(parameter_text),
        })
    }

    /// Wire signature of this declaration.
    #[must_use]
    pub fn signature(&self) -> Signature {
        Signature::from_source(
            &self.return_type,
            self.return_pointer_depth,
            self.parameters
                .iter()
                .map(|p| (p.source_type.as_str(), p.pointer_depth)),
        )
    }
}

/// Remove `cs_type(...)` annotations and `const` qualifiers.
#[must_use]
pub fn strip_annotations(line: &str) -> String {
    let without_annotations = TYPE_ANNOTATION.replace_all(line, "");
    CONST_QUALIFIER
        .replace_all(&without_annotations, "")
        .into_owned()
}

/// Text up to the parenthesis closing the one just consumed, or `None` when
/// the line ends first.
fn balanced_parameters(text: &str) -> Option<&str> {
    let mut depth = 1usize;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[..i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on commas that are not nested inside parentheses.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn parse_parameters(text: &str) -> Vec<Parameter> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "void" {
        return Vec::new();
    }

    split_top_level(trimmed)
        .into_iter()
        .filter_map(|raw| parse_parameter(raw.trim()))
        .collect()
}

fn parse_parameter(text: &str) -> Option<Parameter> {
    let caps = PARAMETER.captures(text)?;
    Some(Parameter {
        source_type: caps.get(1)?.as_str().to_string(),
        pointer_depth: caps.get(2).map_or(0, |m| m.as_str().matches('*').count()),
        name: caps.get(3).map(|m| m.as_str().to_string()),
    })
}
