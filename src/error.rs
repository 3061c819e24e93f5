//! Error types for graphql-sync
//!
//! This module defines the error hierarchy for the whole engine.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for graphql-sync
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Missing config field '{field}' required when {depends_on}")]
    MissingDependency { field: String, depends_on: String },

    #[error("Invalid value '{value}' for '{field}', expected one of: {allowed}")]
    InvalidEnum {
        field: String,
        value: String,
        allowed: String,
    },

    #[error("Malformed mapping in '{field}': {message}")]
    MalformedMap { field: String, message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Missing credential '{field}' for {mode} authentication")]
    MissingCredential { mode: String, field: String },

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid header '{name}': {message}")]
    InvalidHeader { name: String, message: String },

    // ============================================================================
    // GraphQL Errors
    // ============================================================================
    #[error("GraphQL server returned errors: {message}")]
    GraphqlErrors { message: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    // ============================================================================
    // Pagination Errors
    // ============================================================================
    #[error("Pagination key '{path}' not found in response")]
    PaginationKeyNotFound { path: String },

    #[error("Malformed pageInfo at '{path}': {message}")]
    MalformedPageInfo { path: String, message: String },

    // ============================================================================
    // Extraction Errors
    // ============================================================================
    #[error("Element {index} under '{path}' has no '{id_field}' field")]
    MissingIdField {
        path: String,
        index: usize,
        id_field: String,
    },

    #[error("Element {index} under '{path}' has a non-scalar '{id_field}' field")]
    InvalidIdField {
        path: String,
        index: usize,
        id_field: String,
    },

    #[error("Element {index} under '{path}' is not an object")]
    MalformedElement { path: String, index: usize },

    // ============================================================================
    // State Errors
    // ============================================================================
    #[error("State error: {message}")]
    State { message: String },

    // ============================================================================
    // Sync Errors
    // ============================================================================
    #[error("Sync aborted (last committed cursor: {}): {source}", .last_cursor.as_deref().unwrap_or("<none>"))]
    SyncAborted {
        last_cursor: Option<String>,
        #[source]
        source: Box<Error>,
    },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Invalid or incomplete configuration (fatal, before any request)
    Config,
    /// Missing or rejected credentials
    Auth,
    /// Network, timeout or HTTP status failures
    Transport,
    /// Errors reported by the GraphQL server, or an undecodable body
    Graphql,
    /// Missing or malformed `pageInfo`
    Pagination,
    /// Records without a usable identity
    Extraction,
    /// Sync state persistence
    State,
    /// Anything else
    Other,
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a malformed map error
    pub fn malformed_map(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedMap {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a missing credential error
    pub fn missing_credential(mode: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingCredential {
            mode: mode.into(),
            field: field.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a malformed pageInfo error
    pub fn page_info(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedPageInfo {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Wrap an error as a terminal sync failure
    pub fn aborted(source: Error, last_cursor: Option<String>) -> Self {
        Self::SyncAborted {
            last_cursor,
            source: Box::new(source),
        }
    }

    /// Classify this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config { .. }
            | Error::MissingConfigField { .. }
            | Error::MissingDependency { .. }
            | Error::InvalidEnum { .. }
            | Error::MalformedMap { .. }
            | Error::InvalidConfigValue { .. }
            | Error::YamlParse(_)
            | Error::InvalidHeader { .. } => ErrorCategory::Config,

            Error::MissingCredential { .. } => ErrorCategory::Auth,

            Error::Http(_)
            | Error::HttpStatus { .. }
            | Error::RateLimited { .. }
            | Error::Timeout { .. } => ErrorCategory::Transport,

            Error::GraphqlErrors { .. } | Error::Decode { .. } | Error::JsonParse(_) => {
                ErrorCategory::Graphql
            }

            Error::PaginationKeyNotFound { .. } | Error::MalformedPageInfo { .. } => {
                ErrorCategory::Pagination
            }

            Error::MissingIdField { .. }
            | Error::InvalidIdField { .. }
            | Error::MalformedElement { .. } => ErrorCategory::Extraction,

            Error::State { .. } => ErrorCategory::State,

            Error::SyncAborted { source, .. } => source.category(),

            Error::Io(_) | Error::FileNotFound { .. } | Error::Other(_) => {
                ErrorCategory::Other
            }
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout() || e.is_connect(),
            Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
pub(crate) fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500..=599)
}

/// Result type alias for graphql-sync
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("http_endpoint");
        assert_eq!(
            err.to_string(),
            "Missing required config field: http_endpoint"
        );

        let err = Error::http_status(404, "Not found");
        assert_eq!(err.to_string(), "HTTP 404: Not found");

        let err = Error::MissingIdField {
            path: "sampleData.users.nodes".to_string(),
            index: 3,
            id_field: "id".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Element 3 under 'sampleData.users.nodes' has no 'id' field"
        );
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::RateLimited {
            retry_after_seconds: 60
        }
        .is_retryable());
        assert!(Error::Timeout { timeout_ms: 1000 }.is_retryable());
        assert!(Error::http_status(429, "").is_retryable());
        assert!(Error::http_status(500, "").is_retryable());
        assert!(Error::http_status(503, "").is_retryable());

        assert!(!Error::http_status(400, "").is_retryable());
        assert!(!Error::http_status(401, "").is_retryable());
        assert!(!Error::http_status(404, "").is_retryable());
        assert!(!Error::config("test").is_retryable());
        assert!(!Error::PaginationKeyNotFound {
            path: "a".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_category() {
        assert_eq!(
            Error::MissingDependency {
                field: "password".to_string(),
                depends_on: "authentication_method=basic".to_string(),
            }
            .category(),
            ErrorCategory::Config
        );
        assert_eq!(
            Error::missing_credential("bearer", "token").category(),
            ErrorCategory::Auth
        );
        assert_eq!(
            Error::page_info("a", "missing").category(),
            ErrorCategory::Pagination
        );
        assert_eq!(
            Error::http_status(502, "").category(),
            ErrorCategory::Transport
        );
    }

    #[test]
    fn test_transport_category() {
        for err in [
            Error::Timeout { timeout_ms: 10 },
            Error::RateLimited {
                retry_after_seconds: 1,
            },
            Error::http_status(401, ""),
        ] {
            assert_eq!(err.category(), ErrorCategory::Transport, "{err}");
        }
        assert_eq!(Error::Other("x".to_string()).category(), ErrorCategory::Other);
    }

    #[test]
    fn test_aborted_keeps_cursor_and_category() {
        let err = Error::aborted(
            Error::MalformedElement {
                path: "items".to_string(),
                index: 0,
            },
            Some("abc".to_string()),
        );
        assert_eq!(err.category(), ErrorCategory::Extraction);
        assert!(err.to_string().contains("last committed cursor: abc"));
        match err {
            Error::SyncAborted { last_cursor, .. } => {
                assert_eq!(last_cursor.as_deref(), Some("abc"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
