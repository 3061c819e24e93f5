//! Record extraction
//!
//! Applies the object-to-id map to a response page: every element found
//! under a mapped path becomes one [`ExtractedRecord`] keyed by its id field.

mod extractor;
mod types;

pub use extractor::RecordExtractor;
pub use types::{ExtractPolicy, ExtractedRecord, PageExtraction};
