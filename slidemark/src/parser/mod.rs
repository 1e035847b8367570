pub mod error;
mod links;
mod structural;

pub use error::ParseError;

use crate::ParsedSource;

/// Parser entry point: deck source text → raw slide records.
pub struct Parser {
    source: String,
    file_id: usize,
}

impl Parser {
    /// Line endings are normalised to `\n` up front, so spans in records and
    /// diagnostics refer to [`Parser::source`], not the text passed in.
    pub fn new(source: impl Into<String>, file_id: usize) -> Self {
        let source: String = source.into();
        let source = if source.contains("\r\n") {
            source.replace("\r\n", "\n")
        } else {
            source
        };
        Parser { source, file_id }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Split the source into slide records.
    pub fn parse(&self) -> Result<ParsedSource, Vec<ParseError>> {
        let (records, warnings) = structural::parse_records(&self.source, self.file_id)?;
        Ok(ParsedSource {
            records,
            warnings,
            source_id: self.file_id,
        })
    }
}
