//! Signature extraction from history text.
//!
//! Pipeline, all streaming:
//! 1. [`fence::CodeFenceFilter`] keeps lines inside C code blocks (optional)
//! 2. [`tokenizer::tokenize_line`] strips annotations and classifies lines
//! 3. [`tokenizer::SignatureStream`] groups declarations under identifiers

pub mod declaration;
pub mod fence;
pub mod tokenizer;

pub use declaration::{strip_annotations, Declaration, Parameter};
pub use fence::CodeFenceFilter;
pub use tokenizer::{tokenize_line, ExtractionStats, SignatureStream, Token};

/// Boxed line source accepted by [`signature_stream`].
pub type Lines = Box<dyn Iterator<Item = String>>;

/// Build the extraction pipeline over raw history lines.
pub fn signature_stream(lines: Lines, fence_filter: bool) -> SignatureStream<Lines> {
    let lines: Lines = if fence_filter {
        Box::new(CodeFenceFilter::new(lines))
    } else {
        lines
    };
    SignatureStream::new(lines)
}
