//! Pagination module
//!
//! Supports: no pagination, GraphQL cursor pagination (`pageInfo`)
//!
//! # Overview
//!
//! A [`Paginator`] decides which cursor goes into the next request and reads
//! the response to decide whether another page follows. The engine owns the
//! [`PaginationState`] and drives the paginator page by page.

mod strategies;
mod types;

pub use strategies::{paginator_for, CursorPaginator, NoPaginator};
pub use types::{NextPage, PageInfo, PaginationState, Paginator};
