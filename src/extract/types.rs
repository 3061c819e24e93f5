//! Extraction types

use crate::error::{Error, Result};
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};

/// One element found under a mapped path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// The mapped dotted path the element was found under
    pub source_path: String,
    /// The element's id field, rendered as text
    pub id: String,
    /// The element itself
    pub payload: JsonValue,
}

/// What to do with an element that has no usable identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractPolicy {
    /// Fail the page
    #[default]
    Strict,
    /// Log a warning and drop the element
    SkipMalformed,
}

/// Records of one page. Paths are independent: a failed path contributes
/// nothing, the other paths keep their records.
#[derive(Debug, Default)]
pub struct PageExtraction {
    /// Records from every path that extracted cleanly, in path order
    pub records: Vec<ExtractedRecord>,
    /// One error per failed path, in path order
    pub failures: Vec<Error>,
}

impl PageExtraction {
    /// Check if every path extracted cleanly
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// All records, or the first path failure
    pub fn into_result(self) -> Result<Vec<ExtractedRecord>> {
        match self.failures.into_iter().next() {
            Some(failure) => Err(failure),
            None => Ok(self.records),
        }
    }
}
