//! Validated configuration model

use super::fields::RawConfiguration;
use super::query::check_query;
use super::rules::{
    self, value_as_string, ActiveFields, AUTHENTICATION_METHOD, CONNECTION_TIMEOUT,
    GRAPHQL_OBJECT_TO_ID_MAP, GRAPHQL_QUERY, GRAPHQL_VARIABLES, HEADERS, HTTP_ENDPOINT,
    HTTP_METHOD, PAGINATION_KEY, PAGINATION_MODEL, PASSWORD, TOKEN, USERNAME,
};
use crate::auth::AuthConfig;
use crate::error::{Error, Result};
use crate::path::DottedPath;
use crate::types::{AuthMethod, HttpMethod, JsonObject, PaginationModel, StringMap};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Mapping from a dotted response path to the id field of each element found there
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectIdMap {
    entries: BTreeMap<DottedPath, String>,
}

impl ObjectIdMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a JSON object, or from a string holding one
    pub fn parse(value: &Value) -> Result<Self> {
        let object = json_object(GRAPHQL_OBJECT_TO_ID_MAP, value)?;
        if object.is_empty() {
            return Err(Error::malformed_map(
                GRAPHQL_OBJECT_TO_ID_MAP,
                "mapping must contain at least one path",
            ));
        }

        let mut map = Self::new();
        for (path, id_field) in object {
            let Value::String(id_field) = id_field else {
                return Err(Error::malformed_map(
                    GRAPHQL_OBJECT_TO_ID_MAP,
                    format!("id field for '{path}' must be a string"),
                ));
            };
            map.insert(&path, &id_field)?;
        }
        Ok(map)
    }

    /// Add a mapping, validating both sides
    pub fn insert(&mut self, path: &str, id_field: &str) -> Result<()> {
        let parsed = DottedPath::parse(path).ok_or_else(|| {
            Error::malformed_map(
                GRAPHQL_OBJECT_TO_ID_MAP,
                format!("'{path}' is not a dotted path"),
            )
        })?;
        let id_field = id_field.trim();
        if id_field.is_empty() {
            return Err(Error::malformed_map(
                GRAPHQL_OBJECT_TO_ID_MAP,
                format!("id field for '{path}' is empty"),
            ));
        }
        self.entries.insert(parsed, id_field.to_string());
        Ok(())
    }

    /// Builder-style insert for code-built maps
    pub fn with(mut self, path: &str, id_field: &str) -> Result<Self> {
        self.insert(path, id_field)?;
        Ok(self)
    }

    /// Id field for a path
    pub fn get(&self, path: &str) -> Option<&str> {
        let path = DottedPath::parse(path)?;
        self.entries.get(&path).map(String::as_str)
    }

    /// Iterate `(path, id_field)` pairs in path order
    pub fn iter(&self) -> impl Iterator<Item = (&DottedPath, &str)> {
        self.entries.iter().map(|(p, f)| (p, f.as_str()))
    }

    /// Number of mapped paths
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How the sync pages through results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PaginationSpec {
    /// One request per sync
    #[default]
    None,
    /// Cursor pagination; `key` points at the node carrying `pageInfo`
    Cursor { key: DottedPath },
}

impl PaginationSpec {
    /// Create a cursor pagination spec
    pub fn cursor(key: &str) -> Result<Self> {
        let key = DottedPath::parse(key).ok_or_else(|| {
            Error::invalid_value(PAGINATION_KEY, format!("'{key}' is not a dotted path"))
        })?;
        Ok(Self::Cursor { key })
    }

    /// The configured model
    pub fn model(&self) -> PaginationModel {
        match self {
            Self::None => PaginationModel::NoPagination,
            Self::Cursor { .. } => PaginationModel::CursorPagination,
        }
    }

    /// The pagination key, for cursor pagination
    pub fn key(&self) -> Option<&DottedPath> {
        match self {
            Self::None => None,
            Self::Cursor { key } => Some(key),
        }
    }
}

/// Immutable snapshot of a validated configuration
#[derive(Debug, Clone)]
pub struct ConfigModel {
    /// GraphQL endpoint
    pub endpoint: Url,
    /// How the operation is sent
    pub http_method: HttpMethod,
    /// Authentication settings
    pub auth: AuthConfig,
    /// The GraphQL document
    pub graphql_query: String,
    /// Static variables (POST only; empty for GET)
    pub graphql_variables: JsonObject,
    /// User-declared headers, sent verbatim
    pub headers: StringMap,
    /// Record collections to extract
    pub object_id_map: ObjectIdMap,
    /// Pagination strategy
    pub pagination: PaginationSpec,
    /// Bound on each individual request
    pub connection_timeout: Duration,
}

impl ConfigModel {
    /// Validate a raw configuration. Pure: identical input yields an
    /// identical model or an identical error.
    pub fn validate(raw: &RawConfiguration) -> Result<Self> {
        let active = rules::evaluate(raw)?;

        let endpoint = parse_endpoint(&active)?;

        let http_method = active
            .get_str(HTTP_METHOD)
            .and_then(|v| HttpMethod::from_config(&v))
            .unwrap_or_default();

        let auth = match active
            .get_str(AUTHENTICATION_METHOD)
            .and_then(|v| AuthMethod::from_config(&v))
            .unwrap_or_default()
        {
            AuthMethod::None => AuthConfig::None,
            AuthMethod::Basic => AuthConfig::Basic {
                username: active.get_str(USERNAME),
                password: active.get_str(PASSWORD),
            },
            AuthMethod::Bearer => AuthConfig::Bearer {
                token: active.get_str(TOKEN),
            },
        };

        let pagination = match active
            .get_str(PAGINATION_MODEL)
            .and_then(|v| PaginationModel::from_config(&v))
            .unwrap_or_default()
        {
            PaginationModel::NoPagination => PaginationSpec::None,
            PaginationModel::CursorPagination => {
                let key = active
                    .get_str(PAGINATION_KEY)
                    .ok_or_else(|| Error::missing_field(PAGINATION_KEY))?;
                PaginationSpec::cursor(&key)?
            }
        };

        let graphql_query = active
            .get_str(GRAPHQL_QUERY)
            .ok_or_else(|| Error::missing_field(GRAPHQL_QUERY))?;
        check_query(&graphql_query, matches!(pagination, PaginationSpec::Cursor { .. }))?;

        let graphql_variables = match active.get(GRAPHQL_VARIABLES) {
            Some(value) => json_object(GRAPHQL_VARIABLES, value)?,
            None => JsonObject::new(),
        };

        let headers = match active.get(HEADERS) {
            Some(value) => string_map(HEADERS, value)?,
            None => StringMap::new(),
        };

        let object_id_map = match active.get(GRAPHQL_OBJECT_TO_ID_MAP) {
            Some(value) => ObjectIdMap::parse(value)?,
            None => return Err(Error::missing_field(GRAPHQL_OBJECT_TO_ID_MAP)),
        };

        let connection_timeout = parse_timeout(active.get(CONNECTION_TIMEOUT))?;

        Ok(Self {
            endpoint,
            http_method,
            auth,
            graphql_query,
            graphql_variables,
            headers,
            object_id_map,
            pagination,
            connection_timeout,
        })
    }

    /// Configured pagination model
    pub fn pagination_model(&self) -> PaginationModel {
        self.pagination.model()
    }
}

fn parse_endpoint(active: &ActiveFields) -> Result<Url> {
    let raw = active
        .get_str(HTTP_ENDPOINT)
        .ok_or_else(|| Error::missing_field(HTTP_ENDPOINT))?;
    let url = Url::parse(&raw)
        .map_err(|e| Error::invalid_value(HTTP_ENDPOINT, format!("'{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::invalid_value(
            HTTP_ENDPOINT,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

fn parse_timeout(value: Option<&Value>) -> Result<Duration> {
    let Some(value) = value else {
        return Ok(Duration::from_secs(rules::DEFAULT_CONNECTION_TIMEOUT_SECS));
    };

    let seconds = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    match seconds {
        Some(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(Error::invalid_value(
            CONNECTION_TIMEOUT,
            format!("expected a positive integer, got {value}"),
        )),
    }
}

/// Accept a JSON object, or a string containing one
fn json_object(field: &str, value: &Value) -> Result<JsonObject> {
    let parsed = match value {
        Value::String(s) => serde_json::from_str::<Value>(s)
            .map_err(|e| Error::malformed_map(field, format!("invalid JSON: {e}")))?,
        other => other.clone(),
    };

    match parsed {
        Value::Object(map) => Ok(map),
        other => Err(Error::malformed_map(
            field,
            format!("expected a JSON object, got {}", json_kind(&other)),
        )),
    }
}

fn string_map(field: &str, value: &Value) -> Result<StringMap> {
    json_object(field, value)?
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => Ok((key, s)),
            Value::Number(_) | Value::Bool(_) => Ok((key, value_as_string(&value))),
            other => Err(Error::malformed_map(
                field,
                format!("value for '{key}' must be a string, got {}", json_kind(&other)),
            )),
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
