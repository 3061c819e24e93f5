//! GraphQL request assembly
//!
//! Turns a validated [`ConfigModel`](crate::config::ConfigModel) plus the
//! current variables into a [`GraphqlRequest`]: a plain value that can be
//! inspected in tests and converted to a `reqwest::Request` by the transport.

mod builder;
mod types;

pub use builder::{build, initial_variables, AFTER_VARIABLE};
pub use types::GraphqlRequest;
