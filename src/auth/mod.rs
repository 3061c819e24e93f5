//! Authentication module
//!
//! Supports: none, HTTP Basic, Bearer token
//!
//! The `Authenticator` applies the configured mode to an outgoing
//! [`GraphqlRequest`](crate::request::GraphqlRequest). Secrets are checked at
//! call time so a credential that went missing after validation still fails
//! the request rather than sending it unauthenticated.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::AuthConfig;
