//! Auth configuration types

use crate::types::AuthMethod;
use std::fmt;

/// Authentication configuration taken from the validated config model.
///
/// Secret fields are optional so that an absent credential is reported by
/// [`Authenticator::apply`](super::Authenticator::apply) as
/// `MissingCredential` instead of being silently sent empty.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum AuthConfig {
    /// No authentication required
    #[default]
    None,

    /// HTTP Basic authentication
    Basic {
        /// Username
        username: Option<String>,
        /// Password
        password: Option<String>,
    },

    /// Bearer token authentication
    Bearer {
        /// The bearer token
        token: Option<String>,
    },
}

impl AuthConfig {
    /// Basic auth with both credentials set
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    /// Bearer auth with a token set
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: Some(token.into()),
        }
    }

    /// The mode this config selects
    pub fn method(&self) -> AuthMethod {
        match self {
            Self::None => AuthMethod::None,
            Self::Basic { .. } => AuthMethod::Basic,
            Self::Bearer { .. } => AuthMethod::Bearer,
        }
    }
}

// Secrets never reach logs through Debug
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Basic { username, password } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &password.as_ref().map(|_| "<redacted>"))
                .finish(),
            Self::Bearer { token } => f
                .debug_struct("Bearer")
                .field("token", &token.as_ref().map(|_| "<redacted>"))
                .finish(),
        }
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_auth_config_default() {
        let config = AuthConfig::default();
        assert!(matches!(config, AuthConfig::None));
        assert_eq!(config.method(), AuthMethod::None);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let basic = format!("{:?}", AuthConfig::basic("alice", "hunter2"));
        assert!(basic.contains("alice"));
        assert!(!basic.contains("hunter2"));

        let bearer = format!("{:?}", AuthConfig::bearer("tok_live_123"));
        assert!(!bearer.contains("tok_live_123"));
        assert!(bearer.contains("<redacted>"));
    }
}
