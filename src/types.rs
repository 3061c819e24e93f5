//! Common types used throughout graphql-sync
//!
//! This module contains shared type definitions, type aliases,
//! and the small enums that the configuration selects between.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Ordered key-value map with string keys and values
pub type StringMap = BTreeMap<String, String>;

// ============================================================================
// HTTP Method
// ============================================================================

/// HTTP method used to send the GraphQL operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    /// Query and variables go into the URL query string
    Get,
    /// Query and variables go into a JSON body
    #[default]
    Post,
}

impl HttpMethod {
    /// Accepted configuration values
    pub const OPTIONS: &'static [&'static str] = &["get", "post"];

    /// Parse a configuration value
    pub fn from_config(value: &str) -> Option<Self> {
        match value {
            "get" => Some(Self::Get),
            "post" => Some(Self::Post),
            _ => None,
        }
    }

    /// Configuration value for this method
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Authentication Method
// ============================================================================

/// Authentication mode selected in the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    /// No authentication
    #[default]
    None,
    /// HTTP Basic with username and password
    Basic,
    /// Bearer token
    Bearer,
}

impl AuthMethod {
    /// Accepted configuration values
    pub const OPTIONS: &'static [&'static str] = &["none", "basic", "bearer"];

    /// Parse a configuration value
    pub fn from_config(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "basic" => Some(Self::Basic),
            "bearer" => Some(Self::Bearer),
            _ => None,
        }
    }

    /// Configuration value for this mode
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Basic => "basic",
            Self::Bearer => "bearer",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Pagination Model
// ============================================================================

/// Pagination strategy selected in the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationModel {
    /// A single request per sync
    #[default]
    NoPagination,
    /// Relay-style `pageInfo { endCursor hasNextPage }` with an `after` variable
    CursorPagination,
}

impl PaginationModel {
    /// Accepted configuration values
    pub const OPTIONS: &'static [&'static str] = &["no_pagination", "cursor_pagination"];

    /// Parse a configuration value
    pub fn from_config(value: &str) -> Option<Self> {
        match value {
            "no_pagination" => Some(Self::NoPagination),
            "cursor_pagination" => Some(Self::CursorPagination),
            _ => None,
        }
    }

    /// Configuration value for this model
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoPagination => "no_pagination",
            Self::CursorPagination => "cursor_pagination",
        }
    }
}

impl fmt::Display for PaginationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle blank strings
pub trait OptionStringExt {
    /// Returns None if the string is empty or only whitespace
    fn none_if_blank(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_blank(self) -> Option<String> {
        self.filter(|s| !s.trim().is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_blank(self) -> Option<String> {
        if self.trim().is_empty() {
            None
        } else {
            Some(self)
        }
    }
}
