//! Line tokenizer and signature grouping.
//!
//! Each history line is classified on its own into identifier markers
//! (`// 0x<hex>`), declarations and noise. [`SignatureStream`] then folds the
//! tokens into `(Identifier, Signature)` pairs: every declaration belongs to
//! the most recent marker. Declarations seen before any valid marker have no
//! identifier and are dropped.
//!
//! All scanning state lives in the stream value itself, so a new stream over
//! a new line iterator always starts from scratch.

use super::declaration::{strip_annotations, Declaration};
use crate::core::{Identifier, Signature};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::VecDeque;

static MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"//\s+0[xX](\w*)").expect("marker regex is valid"));

/// Classification of a piece of a history line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Start of a new group. `None` when the hex literal is unusable.
    Marker(Option<Identifier>),
    Declaration(Declaration),
    /// Line with neither a marker nor a declaration
    Noise,
}

/// Split one line into tokens, in the order they appear.
///
/// A declaration followed by a trailing marker comment yields both, the
/// declaration first.
#[must_use]
pub fn tokenize_line(line: &str) -> Vec<Token> {
    let stripped = strip_annotations(line);
    match MARKER.captures(&stripped) {
        Some(caps) => {
            let start = caps.get(0).map_or(0, |m| m.start());
            let id = caps
                .get(1)
                .and_then(|digits| Identifier::from_hex_digits(digits.as_str()));

            let mut tokens = Vec::with_capacity(2);
            if let Some(decl) = Declaration::parse(&stripped[..start]) {
                tokens.push(Token::Declaration(decl));
            }
            tokens.push(Token::Marker(id));
            tokens
        }
        None => match Declaration::parse(&stripped) {
            Some(decl) => vec![Token::Declaration(decl)],
            None => vec![Token::Noise],
        },
    }
}

/// Counters describing one extraction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub lines: usize,
    pub markers: usize,
    pub invalid_markers: usize,
    pub signatures: usize,
    /// Declarations outside any identified group
    pub orphaned: usize,
    pub noise: usize,
}

/// Lazy sequence of `(Identifier, Signature)` pairs over history lines.
///
/// When the input ends early, every complete declaration already read is
/// still emitted, including those of the last group. Only a declaration
/// whose line was cut off is lost.
pub struct SignatureStream<I> {
    lines: I,
    current: Option<Identifier>,
    pending: VecDeque<Token>,
    stats: ExtractionStats,
}

impl<I> SignatureStream<I>
where
    I: Iterator<Item = String>,
{
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            current: None,
            pending: VecDeque::new(),
            stats: ExtractionStats::default(),
        }
    }

    #[must_use]
    pub fn stats(&self) -> ExtractionStats {
        self.stats
    }

    fn apply(&mut self, token: Token) -> Option<(Identifier, Signature)> {
        match token {
            Token::Marker(id) => {
                if id.is_some() {
                    self.stats.markers += 1;
                } else {
                    self.stats.invalid_markers += 1;
                }
                self.current = id;
                None
            }
            Token::Declaration(decl) => match self.current {
                Some(id) => {
                    self.stats.signatures += 1;
                    Some((id, decl.signature()))
                }
                None => {
                    tracing::trace!(function = %decl.name, "declaration without identifier");
                    self.stats.orphaned += 1;
                    None
                }
            },
            Token::Noise => {
                self.stats.noise += 1;
                None
            }
        }
    }
}

impl<I> Iterator for SignatureStream<I>
where
    I: Iterator<Item = String>,
{
    type Item = (Identifier, Signature);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            while let Some(token) = self.pending.pop_front() {
                if let Some(pair) = self.apply(token) {
                    return Some(pair);
                }
            }
            let line = self.lines.next()?;
            self.stats.lines += 1;
            self.pending.extend(tokenize_line(&line));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WireType::*;
    use indoc::indoc;

    fn extract(text: &str) -> Vec<(Identifier, Signature)> {
        SignatureStream::new(text.lines().map(str::to_string)).collect()
    }

    #[test]
    fn test_marker_then_declaration() {
        let pairs = extract("// 0x1F3C2D9A\n+int GetVehicleSpeed(Vehicle* veh)\n");
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0.to_string(), "0x1f3c2d9a");
        assert_eq!(pairs[0].1.types(), &[ValueWord, RefWord]);
    }

    #[test]
    fn test_noise_inside_group_is_skipped() {
        let text = indoc! {"
            +// 0xABCD
            + not a real declaration
            +void SET_THING(Entity e);
        "};
        let mut stream = SignatureStream::new(text.lines().map(str::to_string));
        let pairs: Vec<_> = stream.by_ref().collect();
        assert_eq!(pairs.len(), 1);
        assert_eq!(stream.stats().noise, 1);
    }

    #[test]
    fn test_only_noise_produces_nothing() {
        let mut stream = SignatureStream::new(
            ["+// 0x1", "+ not a real declaration"]
                .into_iter()
                .map(str::to_string),
        );
        assert!(stream.next().is_none());
        assert_eq!(stream.stats().noise, 1);
    }

    #[test]
    fn test_declarations_before_marker_are_dropped() {
        let text = "+int ORPHAN(int a);\n// 0x10\n+int KEPT(int a);\n";
        let mut stream = SignatureStream::new(text.lines().map(str::to_string));
        let ids: Vec<u64> = stream.by_ref().map(|(id, _)| id.value()).collect();
        assert_eq!(ids, vec![0x10]);
        assert_eq!(stream.stats().orphaned, 1);
    }

    #[test]
    fn test_invalid_marker_closes_previous_group() {
        let text = "// 0x10\n+int A();\n// 0xNOTHEX\n+int B();\n// 0x20\n+int C();\n";
        let ids: Vec<u64> = extract(text).iter().map(|(id, _)| id.value()).collect();
        assert_eq!(ids, vec![0x10, 0x20]);
    }

    #[test]
    fn test_marker_case_is_normalized() {
        let pairs = extract("// 0XaBcD\n+int A();\n// 0xABCD\n+int B(int x);\n");
        assert_eq!(pairs[0].0, pairs[1].0);
    }

    #[test]
    fn test_group_spans_multiple_declarations() {
        let text = indoc! {"
            // 0x10
            -int GET(Ped ped);
            +int GET(Ped ped, BOOL p1);
        "};
        let pairs = extract(text);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].1.types(), &[ValueWord, ValueWord]);
        assert_eq!(pairs[1].1.types(), &[ValueWord, ValueWord, ValueWord]);
    }

    #[test]
    fn test_trailing_marker_follows_declaration() {
        let tokens = tokenize_line("+int A(); // 0x20");
        assert!(matches!(tokens[0], Token::Declaration(_)));
        assert_eq!(tokens[1], Token::Marker(Some(Identifier(0x20))));
    }

    #[test]
    fn test_oversized_identifier_is_invalid_marker() {
        assert_eq!(
            tokenize_line("// 0x1ffffffffffffffff"),
            vec![Token::Marker(None)]
        );
    }

    #[test]
    fn test_truncated_input_keeps_complete_pairs() {
        // last group cut off mid-declaration
        let text = "// 0x10\n+int A(int a);\n// 0x20\n+int B(int a,";
        let ids: Vec<u64> = extract(text).iter().map(|(id, _)| id.value()).collect();
        assert_eq!(ids, vec![0x10]);
    }

    #[test]
    fn test_truncated_input_keeps_last_group_declarations() {
        let text = "// 0x20\n+int A(int a);\n+int B(int a, int b);\n+int C(int a,";
        let pairs = extract(text);
        assert_eq!(pairs.len(), 2);
        assert!(pairs.iter().all(|(id, _)| id.value() == 0x20));
    }

    #[test]
    fn test_new_stream_starts_fresh() {
        let first: Vec<_> = extract("// 0x10\n");
        assert!(first.is_empty());
        // a second stream does not inherit the open group
        assert!(extract("+int A();\n").is_empty());
    }
}
