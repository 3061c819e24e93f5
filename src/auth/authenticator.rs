//! Authenticator implementation
//!
//! Applies the configured authentication mode to a request.

use super::types::AuthConfig;
use crate::error::{Error, Result};
use crate::request::GraphqlRequest;
use crate::types::OptionStringExt;
use base64::Engine;
use reqwest::header::{HeaderValue, AUTHORIZATION};

/// Authenticator handles applying authentication to GraphQL requests
#[derive(Debug, Clone, Default)]
pub struct Authenticator {
    config: AuthConfig,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// The auth configuration in use
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Apply authentication to a request.
    ///
    /// `Authorization` set by user-declared headers is replaced for the basic
    /// and bearer modes and left alone for `none`.
    pub fn apply(&self, mut request: GraphqlRequest) -> Result<GraphqlRequest> {
        let value = match &self.config {
            AuthConfig::None => return Ok(request),

            AuthConfig::Basic { username, password } => {
                let username = require("basic", "username", username.as_ref())?;
                let password = require("basic", "password", password.as_ref())?;
                let encoded = base64::engine::general_purpose::STANDARD
                    .encode(format!("{username}:{password}"));
                format!("Basic {encoded}")
            }

            AuthConfig::Bearer { token } => {
                let token = require("bearer", "token", token.as_ref())?;
                format!("Bearer {token}")
            }
        };

        let mut value = HeaderValue::from_str(&value).map_err(|e| Error::InvalidHeader {
            name: AUTHORIZATION.to_string(),
            message: e.to_string(),
        })?;
        value.set_sensitive(true);
        request.headers.insert(AUTHORIZATION, value);

        Ok(request)
    }
}

fn require(mode: &str, field: &str, value: Option<&String>) -> Result<String> {
    value
        .cloned()
        .none_if_blank()
        .ok_or_else(|| Error::missing_credential(mode, field))
}
