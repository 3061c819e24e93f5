//! GraphQL response envelope handling

use crate::error::{Error, Result};
use crate::types::JsonValue;

/// Fail when the body carries a non-empty top-level `errors` array
pub fn check_graphql_errors(body: &JsonValue) -> Result<()> {
    let Some(errors) = body.get("errors").and_then(JsonValue::as_array) else {
        return Ok(());
    };
    if errors.is_empty() {
        return Ok(());
    }

    let message = errors
        .iter()
        .map(|e| match e.get("message").and_then(JsonValue::as_str) {
            Some(message) => message.to_string(),
            None => e.to_string(),
        })
        .collect::<Vec<_>>()
        .join("; ");

    Err(Error::GraphqlErrors { message })
}

/// The tree that configured paths resolve against: `data` when the body
/// carries a `data` object, else the whole body
pub fn data_root(body: &JsonValue) -> &JsonValue {
    match body.get("data") {
        Some(data) if data.is_object() => data,
        _ => body,
    }
}
