pub mod parser;
pub mod record;

pub use record::{Properties, RawSlideRecord, Renderer, SlidePayload};

/// The result of parsing one deck source: its slide records in source order
/// plus any non-fatal diagnostics.
#[derive(Debug, Clone, Default)]
pub struct ParsedSource {
    pub records: Vec<RawSlideRecord>,
    /// Warning-severity diagnostics (e.g. a property declared twice).
    pub warnings: Vec<parser::ParseError>,
    /// The source file ID (for error reporting with codespan-reporting).
    pub source_id: usize,
}
