//! Request value type

use crate::error::Result;
use crate::types::{HttpMethod, JsonValue};
use reqwest::header::HeaderMap;
use std::time::Duration;
use url::Url;

/// A fully assembled GraphQL HTTP request
#[derive(Debug, Clone)]
pub struct GraphqlRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Endpoint, without the query string parameters below
    pub url: Url,
    /// Query string parameters (`query`, `variables` for GET)
    pub query_params: Vec<(String, String)>,
    /// Request headers
    pub headers: HeaderMap,
    /// JSON body (POST)
    pub body: Option<JsonValue>,
}

impl GraphqlRequest {
    /// Create an empty request
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            query_params: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Endpoint with the query string parameters appended
    pub fn full_url(&self) -> Url {
        let mut url = self.url.clone();
        if !self.query_params.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query_params);
        }
        url
    }

    /// Value of a query string parameter
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Convert to a `reqwest::Request` bounded by `timeout`
    pub fn to_reqwest(&self, client: &reqwest::Client, timeout: Duration) -> Result<reqwest::Request> {
        let mut builder = client
            .request(self.method.into(), self.full_url())
            .headers(self.headers.clone())
            .timeout(timeout);

        if let Some(body) = &self.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        Ok(builder.build()?)
    }
}
