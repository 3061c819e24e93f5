//! Configuration module
//!
//! Turns the inbound field table into a validated [`ConfigModel`].
//!
//! # Overview
//!
//! - `RawConfiguration` - the inbound `{field: descriptor}` map (JSON or YAML)
//! - `default_configuration` - the connector's published field table
//! - `ConfigModel::validate` - the `depends_on` rule pass plus typed parsing

mod fields;
mod model;
mod query;
mod rules;

pub use fields::{
    default_configuration, ConfigField, Dependency, FieldType, RawConfiguration, SelectOption,
};
pub use model::{ConfigModel, ObjectIdMap, PaginationSpec};
pub use query::check_query;
pub use rules::{field_spec, FieldSpec, DEFAULT_CONNECTION_TIMEOUT_SECS, FIELD_TABLE};

/// Validate a raw configuration
pub fn validate(raw: &RawConfiguration) -> crate::Result<ConfigModel> {
    ConfigModel::validate(raw)
}
