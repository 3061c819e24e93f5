//! Pagination types and traits

use crate::error::{Error, Result};
use crate::types::{JsonValue, PaginationModel};

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// Another page follows, starting after this cursor
    Continue {
        /// Cursor to send as `after`
        cursor: String,
    },
    /// No more pages
    Done,
}

impl NextPage {
    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Check if this is a continue result
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue { .. })
    }
}

/// Pagination progress of one sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    /// Cursor of the last page seen, sent as `after` on the next request
    pub cursor: Option<String>,
    /// Whether another page should be requested
    pub has_more: bool,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::starting_at(None)
    }
}

impl PaginationState {
    /// Fresh state resuming from `cursor`
    pub fn starting_at(cursor: Option<String>) -> Self {
        Self {
            cursor,
            has_more: true,
        }
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.has_more = false;
    }

    /// Set cursor
    pub fn set_cursor(&mut self, cursor: String) {
        self.cursor = Some(cursor);
    }
}

/// The `pageInfo` object of a connection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    /// `endCursor`; `None` when absent or null
    pub end_cursor: Option<String>,
    /// `hasNextPage`; `None` when absent
    pub has_next_page: Option<bool>,
}

impl PageInfo {
    /// Read `pageInfo` from the connection node found at `path`
    pub fn from_connection(connection: &JsonValue, path: &str) -> Result<Self> {
        let Some(page_info) = connection.get("pageInfo") else {
            return Err(Error::page_info(path, "pageInfo is missing"));
        };
        let JsonValue::Object(page_info) = page_info else {
            return Err(Error::page_info(path, "pageInfo is not an object"));
        };

        let end_cursor = match page_info.get("endCursor") {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::String(cursor)) => Some(cursor.clone()),
            Some(other) => {
                return Err(Error::page_info(
                    path,
                    format!("endCursor must be a string or null, got {other}"),
                ))
            }
        };

        let has_next_page = match page_info.get("hasNextPage") {
            None => None,
            Some(JsonValue::Bool(flag)) => Some(*flag),
            Some(other) => {
                return Err(Error::page_info(
                    path,
                    format!("hasNextPage must be a boolean, got {other}"),
                ))
            }
        };

        Ok(Self {
            end_cursor,
            has_next_page,
        })
    }
}

/// Core trait for pagination strategies
pub trait Paginator: Send + Sync {
    /// The model this paginator implements
    fn model(&self) -> PaginationModel;

    /// Cursor to send with the next request, if any
    fn request_cursor<'a>(&self, state: &'a PaginationState) -> Option<&'a str>;

    /// Inspect a response (already narrowed to its data root) and update
    /// `state`. The cursor is only advanced when the call succeeds.
    fn process_response(&self, data: &JsonValue, state: &mut PaginationState) -> Result<NextPage>;
}
