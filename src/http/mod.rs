//! HTTP transport
//!
//! The engine talks to the endpoint through the [`Transport`] trait: one call
//! sends one request and returns the decoded JSON body. Retrying is the
//! caller's job, driven by a [`RetryPolicy`], so that cancellation and state
//! commits stay in one place.
//!
//! # Features
//!
//! - **reqwest transport**: per-request timeout, user agent, status classification
//! - **Rate limiting**: optional token bucket using governor
//! - **Backoff**: constant, linear and capped exponential delays, `Retry-After` aware

mod client;
mod rate_limit;
mod response;
mod retry;

pub use client::{HttpClient, HttpClientConfig, Transport};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use response::{check_graphql_errors, data_root};
pub use retry::RetryPolicy;
