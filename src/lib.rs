// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::unused_async)]

//! # graphql-sync
//!
//! Extract records from a GraphQL endpoint, page by page, with a resumable
//! cursor.
//!
//! ## Features
//!
//! - **Field-table configuration**: validated once into an immutable model
//! - **Auth**: none, HTTP basic or bearer token
//! - **GET or POST**: query string or JSON body
//! - **Cursor pagination**: Relay-style `pageInfo { endCursor hasNextPage }`
//! - **Record extraction**: dotted paths mapped to an id field
//! - **Resumable state**: the cursor is committed after each delivered page
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use graphql_sync::config::{ConfigModel, RawConfiguration};
//! use graphql_sync::engine::{SyncEngine, VecSink};
//! use graphql_sync::http::HttpClient;
//! use graphql_sync::state::FileStateStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> graphql_sync::Result<()> {
//!     let raw = RawConfiguration::from_file("config.json")?;
//!     let config = ConfigModel::validate(&raw)?;
//!
//!     let mut engine = SyncEngine::new(
//!         config,
//!         Arc::new(HttpClient::new()?),
//!         Arc::new(FileStateStore::new("state.json")),
//!     );
//!
//!     let mut sink = VecSink::new();
//!     let report = engine.run(&mut sink).await?;
//!     println!("{} records, cursor {:?}", sink.records.len(), report.last_cursor);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ConfigModel ──► request::build ──► Authenticator ──► Transport
//!                                                          │
//!      StateStore ◄── commit ◄── RecordSink ◄── RecordExtractor
//!                                                  ▲
//!                                Paginator (pageInfo via path walker)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Dotted path resolution over JSON
pub mod path;

/// Configuration field table and validation
pub mod config;

/// Authentication header injection
pub mod auth;

/// GraphQL request assembly
pub mod request;

/// HTTP transport with retry and rate limiting
pub mod http;

/// Page info reading and pagination strategies
pub mod pagination;

/// Record extraction by object-to-id map
pub mod extract;

/// Durable sync state
pub mod state;

/// Main execution engine
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, ErrorCategory, Result};
pub use types::*;

pub use config::{ConfigModel, RawConfiguration};
pub use engine::{RecordSink, SyncConfig, SyncEngine, SyncReport};
pub use extract::ExtractedRecord;
pub use http::{HttpClient, Transport};
pub use state::{FileStateStore, StateStore, SyncState};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
