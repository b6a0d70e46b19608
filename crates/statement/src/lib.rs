pub mod extract;
pub mod pipeline;
pub mod source;
pub mod types;

#[cfg(test)]
mod fixtures;

pub use extract::{extract_amount_candidates, normalize_amount, parse_line, parse_page, AmountToken};
pub use pipeline::{StatementError, StatementPipeline};
pub use source::{MockSource, PageReader, PageSource, PdfTextSource, SourceError};
pub use types::{BatchReport, DocumentIssue, ExtractConfig, ParsedStatement};
