//! Pagination strategy implementations

use super::types::{NextPage, PageInfo, PaginationState, Paginator};
use crate::config::PaginationSpec;
use crate::error::{Error, Result};
use crate::path::{DottedPath, Lookup, Resolved};
use crate::types::{JsonValue, PaginationModel};
use tracing::debug;

/// Paginator for a configured pagination spec
pub fn paginator_for(spec: &PaginationSpec) -> Box<dyn Paginator> {
    match spec {
        PaginationSpec::None => Box::new(NoPaginator),
        PaginationSpec::Cursor { key } => Box::new(CursorPaginator::new(key.clone())),
    }
}

// ============================================================================
// Cursor Pagination
// ============================================================================

/// Relay-style cursor pagination.
///
/// `key` locates the connection object carrying `pageInfo { endCursor
/// hasNextPage }`; its `endCursor` becomes the next request's `after`.
#[derive(Debug, Clone)]
pub struct CursorPaginator {
    /// Dotted path to the connection
    pub key: DottedPath,
}

impl CursorPaginator {
    /// Create a new cursor paginator
    pub fn new(key: DottedPath) -> Self {
        Self { key }
    }

    /// Locate the single connection node
    fn connection<'a>(&self, data: &'a JsonValue) -> Result<&'a JsonValue> {
        match self.key.resolve(data) {
            Lookup::Found(Resolved::Node(node)) => Ok(node),
            Lookup::Found(Resolved::Many(_)) => Err(Error::page_info(
                self.key.as_str(),
                "pagination key resolves to several nodes",
            )),
            Lookup::NotFound(miss) => {
                debug!(
                    key = %self.key,
                    segment = %miss.segment,
                    depth = miss.depth,
                    "Pagination key not found"
                );
                Err(Error::PaginationKeyNotFound {
                    path: self.key.to_string(),
                })
            }
        }
    }
}

impl Paginator for CursorPaginator {
    fn model(&self) -> PaginationModel {
        PaginationModel::CursorPagination
    }

    fn request_cursor<'a>(&self, state: &'a PaginationState) -> Option<&'a str> {
        state.cursor.as_deref()
    }

    fn process_response(&self, data: &JsonValue, state: &mut PaginationState) -> Result<NextPage> {
        let path = self.key.as_str();
        let info = PageInfo::from_connection(self.connection(data)?, path)?;
        // Absent hasNextPage means last page, but only next to a real endCursor
        let has_next = match (info.has_next_page, info.end_cursor.as_deref()) {
            (Some(flag), _) => flag,
            (None, Some(_)) => false,
            (None, None) => {
                return Err(Error::page_info(
                    path,
                    "pageInfo carries neither endCursor nor hasNextPage",
                ))
            }
        };

        match (has_next, info.end_cursor) {
            (true, None) => Err(Error::page_info(
                path,
                "hasNextPage is true but endCursor is null",
            )),
            (true, Some(cursor)) if state.cursor.as_deref() == Some(cursor.as_str()) => {
                Err(Error::page_info(
                    path,
                    format!("endCursor '{cursor}' repeats the cursor that produced this page"),
                ))
            }
            (true, Some(cursor)) => {
                state.set_cursor(cursor.clone());
                Ok(NextPage::Continue { cursor })
            }
            (false, Some(cursor)) => {
                state.set_cursor(cursor);
                state.mark_done();
                Ok(NextPage::Done)
            }
            // Empty final page: keep resuming from the previous cursor
            (false, None) => {
                state.mark_done();
                Ok(NextPage::Done)
            }
        }
    }
}

// ============================================================================
// No Pagination
// ============================================================================

/// No pagination - single request
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPaginator;

impl Paginator for NoPaginator {
    fn model(&self) -> PaginationModel {
        PaginationModel::NoPagination
    }

    fn request_cursor<'a>(&self, _state: &'a PaginationState) -> Option<&'a str> {
        None
    }

    fn process_response(&self, _data: &JsonValue, state: &mut PaginationState) -> Result<NextPage> {
        state.mark_done();
        Ok(NextPage::Done)
    }
}
