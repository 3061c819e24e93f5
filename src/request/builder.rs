//! Request builder

use super::types::GraphqlRequest;
use crate::auth::Authenticator;
use crate::config::{ConfigModel, PaginationSpec};
use crate::error::{Error, Result};
use crate::types::{HttpMethod, JsonObject, JsonValue};
use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use serde_json::json;

/// Variable carrying the pagination cursor
pub const AFTER_VARIABLE: &str = "after";

/// Variables for a page request.
///
/// Static `graphql_variables` apply to POST only. `after` is set when
/// paginating by cursor and a cursor is known.
pub fn initial_variables(config: &ConfigModel, cursor: Option<&str>) -> JsonObject {
    let mut variables = match config.http_method {
        HttpMethod::Post => config.graphql_variables.clone(),
        HttpMethod::Get => JsonObject::new(),
    };

    if let (PaginationSpec::Cursor { .. }, Some(cursor)) = (&config.pagination, cursor) {
        variables.insert(AFTER_VARIABLE.to_string(), JsonValue::String(cursor.to_string()));
    }

    variables
}

/// Assemble a request. Deterministic in `(config, variables)`.
///
/// Header order: user headers, then authentication, then `Content-Type`.
pub fn build(config: &ConfigModel, variables: &JsonObject) -> Result<GraphqlRequest> {
    let mut request = GraphqlRequest::new(config.http_method, config.endpoint.clone());

    match config.http_method {
        HttpMethod::Get => {
            request
                .query_params
                .push(("query".to_string(), config.graphql_query.clone()));
            if !variables.is_empty() {
                request.query_params.push((
                    "variables".to_string(),
                    serde_json::to_string(variables)?,
                ));
            }
        }
        HttpMethod::Post => {
            request.body = Some(json!({
                "query": config.graphql_query,
                "variables": variables,
            }));
        }
    }

    for (name, value) in &config.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::InvalidHeader {
            name: name.clone(),
            message: e.to_string(),
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader {
            name: name.clone(),
            message: e.to_string(),
        })?;
        request.headers.insert(header_name, header_value);
    }

    let mut request = Authenticator::new(config.auth.clone()).apply(request)?;

    request
        .headers
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(request)
}
