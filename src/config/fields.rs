//! Inbound configuration field table
//!
//! The connector is configured through a map of field name to field
//! descriptor. The same shape is used for the default table this crate
//! publishes and for the filled-in table an operator hands back.

use super::rules::{DefaultValue, FIELD_TABLE};
use crate::error::{Error, Result, ResultExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Field value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// String value
    #[default]
    Str,
    /// Integer value
    Int,
}

/// One selectable option of a dropdown field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Text shown to the operator
    pub label: String,
    /// Value stored in the configuration
    pub value: String,
}

/// A single `depends_on` condition; all conditions of a field must hold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    /// Field the condition reads
    pub field: String,
    /// Value that field must hold
    pub value: Value,
}

/// Descriptor of one configuration field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigField {
    /// Human-readable label
    pub label: String,
    /// Display position
    pub order: u32,
    /// Value type
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    /// Operator-supplied value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Dropdown options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,
    /// Conditions that must all hold for the field to be active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<Vec<Dependency>>,
    /// Display hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    /// Secret value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitive: Option<bool>,
    /// `Some(false)` marks an optional field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// Help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    /// Value used when `value` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    /// Renderer hints such as `advanced`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_restrictions: Option<Vec<String>>,
}

impl ConfigField {
    /// The value in effect: `value` if present, else `default_value`.
    /// Null and blank strings count as absent.
    pub fn effective_value(&self) -> Option<&Value> {
        present(self.value.as_ref()).or_else(|| present(self.default_value.as_ref()))
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    match value? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        other => Some(other),
    }
}

/// Full inbound configuration: field name to descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawConfiguration {
    fields: BTreeMap<String, ConfigField>,
}

impl RawConfiguration {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field descriptor
    pub fn get(&self, name: &str) -> Option<&ConfigField> {
        self.fields.get(name)
    }

    /// Effective value of a field, if present
    pub fn value_of(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)?.effective_value()
    }

    /// Insert or replace a field descriptor
    pub fn insert(&mut self, name: impl Into<String>, field: ConfigField) {
        self.fields.insert(name.into(), field);
    }

    /// Set the value of a field. Unknown fields get a bare descriptor.
    pub fn set_value(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.fields.get_mut(name) {
            Some(field) => field.value = Some(value),
            None => {
                let order = self.fields.len() as u32 + 1;
                self.fields.insert(
                    name.to_string(),
                    ConfigField {
                        label: name.to_string(),
                        order,
                        field_type: match value {
                            Value::Number(_) => FieldType::Int,
                            _ => FieldType::Str,
                        },
                        value: Some(value),
                        options: None,
                        depends_on: None,
                        display: None,
                        sensitive: None,
                        required: None,
                        tooltip: None,
                        default_value: None,
                        ui_restrictions: None,
                    },
                );
            }
        }
    }

    /// Builder-style [`RawConfiguration::set_value`]
    #[must_use]
    pub fn with_value(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set_value(name, value);
        self
    }

    /// Iterate fields in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigField)> {
        self.fields.iter()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if there are no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build from a JSON value.
    ///
    /// Accepts either a full field table (every entry an object carrying a
    /// `label`) or a flat `{name: value}` map, which is overlaid on
    /// [`default_configuration`].
    pub fn from_json_value(value: Value) -> Result<Self> {
        let Value::Object(entries) = value else {
            return Err(Error::config("configuration must be a JSON object"));
        };

        let is_field_table = !entries.is_empty()
            && entries
                .values()
                .all(|v| v.as_object().is_some_and(|o| o.contains_key("label")));

        if is_field_table {
            let fields: BTreeMap<String, ConfigField> =
                serde_json::from_value(Value::Object(entries))?;
            return Ok(Self { fields });
        }

        let mut config = default_configuration();
        for (name, value) in entries {
            config.set_value(&name, value);
        }
        Ok(config)
    }

    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json_value(value)
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(yaml)?;
        Self::from_json_value(value)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&contents),
            _ => Self::from_json_str(&contents),
        }
    }
}

/// The connector's published field table, with defaults and no values
pub fn default_configuration() -> RawConfiguration {
    let mut config = RawConfiguration::new();

    for (index, spec) in FIELD_TABLE.iter().enumerate() {
        let options = (!spec.options.is_empty()).then(|| {
            spec.options
                .iter()
                .map(|(label, value)| SelectOption {
                    label: (*label).to_string(),
                    value: (*value).to_string(),
                })
                .collect()
        });

        let depends_on = (!spec.depends_on.is_empty()).then(|| {
            spec.depends_on
                .iter()
                .map(|(field, value)| Dependency {
                    field: (*field).to_string(),
                    value: Value::String((*value).to_string()),
                })
                .collect()
        });

        let default_value = match spec.default {
            DefaultValue::None => None,
            DefaultValue::Str(s) => Some(Value::String(s.to_string())),
            DefaultValue::Int(n) => Some(Value::from(n)),
        };

        config.insert(
            spec.name,
            ConfigField {
                label: spec.label.to_string(),
                order: index as u32 + 1,
                field_type: spec.field_type,
                value: None,
                options,
                depends_on,
                display: Some(spec.display.to_string()),
                sensitive: spec.sensitive.then_some(true),
                required: (!spec.required).then_some(false),
                tooltip: spec.tooltip.map(str::to_string),
                default_value,
                ui_restrictions: spec
                    .advanced
                    .then(|| vec!["advanced".to_string()]),
            },
        );
    }

    config
}
