//! Fixed field table and the `depends_on` rule pass
//!
//! Every field the connector understands is listed once in [`FIELD_TABLE`].
//! Validation walks that table in order; it never reflects over whatever
//! field names the inbound configuration happens to carry.

use super::fields::{FieldType, RawConfiguration};
use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// GraphQL endpoint URL
pub const HTTP_ENDPOINT: &str = "http_endpoint";
/// `get` or `post`
pub const HTTP_METHOD: &str = "http_method";
/// `none`, `basic` or `bearer`
pub const AUTHENTICATION_METHOD: &str = "authentication_method";
/// Basic auth username
pub const USERNAME: &str = "username";
/// Basic auth password
pub const PASSWORD: &str = "password";
/// Bearer token
pub const TOKEN: &str = "token";
/// The GraphQL document
pub const GRAPHQL_QUERY: &str = "graphql_query";
/// Static variables, POST only
pub const GRAPHQL_VARIABLES: &str = "graphql_variables";
/// Dotted path to id field mapping
pub const GRAPHQL_OBJECT_TO_ID_MAP: &str = "graphql_object_to_id_map";
/// Extra request headers
pub const HEADERS: &str = "headers";
/// `no_pagination` or `cursor_pagination`
pub const PAGINATION_MODEL: &str = "pagination_model";
/// Dotted path to the connection carrying `pageInfo`
pub const PAGINATION_KEY: &str = "pagination_key";
/// Per-request timeout in seconds
pub const CONNECTION_TIMEOUT: &str = "connection_timeout";

/// Default per-request timeout in seconds
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 300;

/// Default value of a table entry
#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    /// No default
    None,
    /// String default
    Str(&'static str),
    /// Integer default
    Int(u64),
}

/// One row of the fixed field table
#[derive(Debug)]
pub struct FieldSpec {
    /// Field name, the key in the inbound table
    pub name: &'static str,
    /// Human-readable label
    pub label: &'static str,
    /// Value type
    pub field_type: FieldType,
    /// Display hint: `text`, `textarea`, `dropdown` or `numeric`
    pub display: &'static str,
    /// `(label, value)` pairs; empty for free-form fields
    pub options: &'static [(&'static str, &'static str)],
    /// `(field, value)` conjunction
    pub depends_on: &'static [(&'static str, &'static str)],
    /// Required while active
    pub required: bool,
    /// Secret value, masked by renderers
    pub sensitive: bool,
    /// Shown under advanced settings
    pub advanced: bool,
    /// Help text
    pub tooltip: Option<&'static str>,
    /// Value used when none is given
    pub default: DefaultValue,
}

/// Every field the connector understands, in display order
pub static FIELD_TABLE: &[FieldSpec] = &[
    FieldSpec {
        name: HTTP_ENDPOINT,
        label: "GraphQL HTTP endpoint",
        field_type: FieldType::Str,
        display: "text",
        options: &[],
        depends_on: &[],
        required: true,
        sensitive: false,
        advanced: false,
        tooltip: None,
        default: DefaultValue::None,
    },
    FieldSpec {
        name: HTTP_METHOD,
        label: "HTTP method",
        field_type: FieldType::Str,
        display: "dropdown",
        options: &[("GET", "get"), ("POST", "post")],
        depends_on: &[],
        required: true,
        sensitive: false,
        advanced: false,
        tooltip: None,
        default: DefaultValue::Str("post"),
    },
    FieldSpec {
        name: AUTHENTICATION_METHOD,
        label: "Authentication method",
        field_type: FieldType::Str,
        display: "dropdown",
        options: &[
            ("No Auth", "none"),
            ("Basic Auth", "basic"),
            ("Bearer Token", "bearer"),
        ],
        depends_on: &[],
        required: true,
        sensitive: false,
        advanced: false,
        tooltip: None,
        default: DefaultValue::Str("none"),
    },
    FieldSpec {
        name: USERNAME,
        label: "Username",
        field_type: FieldType::Str,
        display: "text",
        options: &[],
        depends_on: &[(AUTHENTICATION_METHOD, "basic")],
        required: true,
        sensitive: false,
        advanced: false,
        tooltip: None,
        default: DefaultValue::None,
    },
    FieldSpec {
        name: PASSWORD,
        label: "Password",
        field_type: FieldType::Str,
        display: "text",
        options: &[],
        depends_on: &[(AUTHENTICATION_METHOD, "basic")],
        required: true,
        sensitive: true,
        advanced: false,
        tooltip: None,
        default: DefaultValue::None,
    },
    FieldSpec {
        name: TOKEN,
        label: "Bearer Token",
        field_type: FieldType::Str,
        display: "text",
        options: &[],
        depends_on: &[(AUTHENTICATION_METHOD, "bearer")],
        required: true,
        sensitive: true,
        advanced: false,
        tooltip: None,
        default: DefaultValue::None,
    },
    FieldSpec {
        name: GRAPHQL_QUERY,
        label: "GraphQL Body",
        field_type: FieldType::Str,
        display: "textarea",
        options: &[],
        depends_on: &[],
        required: true,
        sensitive: false,
        advanced: false,
        tooltip: Some("A query operation. Cursor pagination requires an $after variable and pageInfo { endCursor hasNextPage }."),
        default: DefaultValue::None,
    },
    FieldSpec {
        name: GRAPHQL_VARIABLES,
        label: "Graphql Variables",
        field_type: FieldType::Str,
        display: "textarea",
        options: &[],
        depends_on: &[(HTTP_METHOD, "post")],
        required: false,
        sensitive: false,
        advanced: false,
        tooltip: Some("JSON object of variables sent with every request."),
        default: DefaultValue::None,
    },
    FieldSpec {
        name: GRAPHQL_OBJECT_TO_ID_MAP,
        label: "GraphQL Objects to ID mapping",
        field_type: FieldType::Str,
        display: "textarea",
        options: &[],
        depends_on: &[],
        required: true,
        sensitive: false,
        advanced: false,
        tooltip: Some("JSON object mapping a dotted response path to the field that uniquely identifies each element, e.g. {\"sampleData.users.nodes\": \"id\"}."),
        default: DefaultValue::None,
    },
    FieldSpec {
        name: HEADERS,
        label: "Headers",
        field_type: FieldType::Str,
        display: "textarea",
        options: &[],
        depends_on: &[],
        required: false,
        sensitive: true,
        advanced: false,
        tooltip: Some("JSON object of extra request headers."),
        default: DefaultValue::None,
    },
    FieldSpec {
        name: PAGINATION_MODEL,
        label: "Pagination model",
        field_type: FieldType::Str,
        display: "dropdown",
        options: &[
            ("No pagination", "no_pagination"),
            ("Cursor-based pagination", "cursor_pagination"),
        ],
        depends_on: &[],
        required: true,
        sensitive: false,
        advanced: false,
        tooltip: None,
        default: DefaultValue::Str("no_pagination"),
    },
    FieldSpec {
        name: PAGINATION_KEY,
        label: "Pagination key",
        field_type: FieldType::Str,
        display: "text",
        options: &[],
        depends_on: &[(PAGINATION_MODEL, "cursor_pagination")],
        required: true,
        sensitive: false,
        advanced: false,
        tooltip: Some("Dotted path to the connection carrying pageInfo, e.g. sampleData.users."),
        default: DefaultValue::None,
    },
    FieldSpec {
        name: CONNECTION_TIMEOUT,
        label: "Connection Timeout",
        field_type: FieldType::Int,
        display: "numeric",
        options: &[],
        depends_on: &[],
        required: false,
        sensitive: false,
        advanced: true,
        tooltip: Some("Seconds before a single request is cancelled and retried."),
        default: DefaultValue::Int(DEFAULT_CONNECTION_TIMEOUT_SECS),
    },
];

/// Look up a table row by name
pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    FIELD_TABLE.iter().find(|spec| spec.name == name)
}

/// Values of the fields that are active after the rule pass
#[derive(Debug, Default)]
pub struct ActiveFields {
    values: BTreeMap<&'static str, Value>,
}

impl ActiveFields {
    /// Active value of a field
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Active value rendered as a string
    pub fn get_str(&self, name: &str) -> Option<String> {
        self.get(name).map(value_as_string)
    }

    /// Check if a field is present and active
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

/// Run the rule pass: resolve each field's effective value, decide whether it
/// is active under its `depends_on` conjunction, enforce required fields and
/// dropdown options.
pub fn evaluate(raw: &RawConfiguration) -> Result<ActiveFields> {
    let mut active = ActiveFields::default();

    for spec in FIELD_TABLE {
        let satisfied = spec.depends_on.iter().all(|(field, expected)| {
            active
                .get(field)
                .is_some_and(|v| value_as_string(v) == *expected)
        });
        if !satisfied {
            continue;
        }

        let value = raw
            .value_of(spec.name)
            .cloned()
            .or_else(|| match spec.default {
                DefaultValue::None => None,
                DefaultValue::Str(s) => Some(Value::String(s.to_string())),
                DefaultValue::Int(n) => Some(Value::from(n)),
            });

        let Some(value) = value else {
            if spec.required {
                return Err(missing(spec));
            }
            continue;
        };

        if !spec.options.is_empty() {
            let rendered = value_as_string(&value);
            if !spec.options.iter().any(|(_, option)| *option == rendered) {
                return Err(Error::InvalidEnum {
                    field: spec.name.to_string(),
                    value: rendered,
                    allowed: spec
                        .options
                        .iter()
                        .map(|(_, option)| *option)
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
        }

        active.values.insert(spec.name, value);
    }

    Ok(active)
}

fn missing(spec: &FieldSpec) -> Error {
    if spec.depends_on.is_empty() {
        return Error::missing_field(spec.name);
    }

    Error::MissingDependency {
        field: spec.name.to_string(),
        depends_on: spec
            .depends_on
            .iter()
            .map(|(field, value)| format!("{field}={value}"))
            .collect::<Vec<_>>()
            .join(" and "),
    }
}

/// Render a scalar config value as text; strings are returned unquoted
pub fn value_as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}
