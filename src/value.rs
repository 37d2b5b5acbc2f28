//! Registry value types and their token rendering.
//!
//! The put-value script reads each value as one text token. Binary and
//! multi-string values arrive from callers as arrays and are flattened into a
//! comma-separated token; every other type is passed through as given.

use crate::error::{RegeditError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// How a registry type tag is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    /// `REG_BINARY`: array of byte values.
    Binary,

    /// `REG_MULTI_SZ`: array of strings.
    MultiString,

    /// Any other tag, upper-cased. Its value passes through as a scalar.
    Other(String),
}

impl ValueType {
    /// Parses a registry type name. Matching is case-insensitive.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "REG_BINARY" => ValueType::Binary,
            "REG_MULTI_SZ" => ValueType::MultiString,
            other => ValueType::Other(other.to_string()),
        }
    }

    /// Returns the upper-cased name of this value type.
    pub fn name(&self) -> &str {
        match self {
            ValueType::Binary => "REG_BINARY",
            ValueType::MultiString => "REG_MULTI_SZ",
            ValueType::Other(name) => name.as_str(),
        }
    }

    /// Returns true if values of this type must be supplied as arrays.
    pub fn is_array_rendered(&self) -> bool {
        matches!(self, ValueType::Binary | ValueType::MultiString)
    }
}

/// A typed value to write, as `{ "type": "REG_SZ", "value": "..." }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryValue {
    /// Registry type tag, written to the script as given.
    #[serde(rename = "type")]
    pub value_type: String,

    /// Value data.
    pub value: Value,
}

impl RegistryValue {
    /// Creates a value descriptor.
    pub fn new(value_type: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            value_type: value_type.into(),
            value: value.into(),
        }
    }

    /// `REG_SZ` value.
    pub fn string(value: impl Into<String>) -> Self {
        let value: String = value.into();
        Self::new("REG_SZ", value)
    }

    /// `REG_DWORD` value.
    pub fn dword(value: u32) -> Self {
        Self::new("REG_DWORD", value)
    }

    /// `REG_QWORD` value.
    pub fn qword(value: u64) -> Self {
        Self::new("REG_QWORD", value)
    }

    /// `REG_BINARY` value.
    pub fn binary(bytes: &[u8]) -> Self {
        Self::new("REG_BINARY", bytes.to_vec())
    }

    /// `REG_MULTI_SZ` value.
    pub fn multi_string<S: Into<String>>(strings: impl IntoIterator<Item = S>) -> Self {
        let strings: Vec<String> = strings.into_iter().map(Into::into).collect();
        Self::new("REG_MULTI_SZ", strings)
    }

    /// Renders the value as the token the script expects.
    pub fn render(&self) -> Result<String> {
        render_value(&self.value, &self.value_type)
    }
}

/// Values to write: key path -> value name -> value.
pub type PutValues = BTreeMap<String, BTreeMap<String, RegistryValue>>;

/// Converts a typed value into a single token.
///
/// `REG_BINARY` and `REG_MULTI_SZ` require an array and join its elements
/// with `,`. Every other type passes the value through unchanged.
///
/// # Errors
///
/// Returns [`RegeditError::InvalidValueType`] if a binary or multi-string
/// value is not an array.
///
/// # Examples
///
/// ```rust
/// # use regedit_bridge::value::render_value;
/// # use serde_json::json;
/// assert_eq!(render_value(&json!([1, 2, 3]), "reg_binary").unwrap(), "1,2,3");
/// assert_eq!(render_value(&json!("text"), "REG_SZ").unwrap(), "text");
/// assert!(render_value(&json!("1,2,3"), "REG_BINARY").is_err());
/// ```
pub fn render_value(value: &Value, type_tag: &str) -> Result<String> {
    let value_type = ValueType::from_name(type_tag);

    if value_type.is_array_rendered() {
        return match value {
            Value::Array(items) => Ok(join_elements(items)),
            other => Err(RegeditError::InvalidValueType {
                registry_type: value_type.name().to_string(),
                actual: json_type_name(other),
            }),
        };
    }

    Ok(render_scalar(value))
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => join_elements(items),
        other => other.to_string(),
    }
}

fn join_elements(items: &[Value]) -> String {
    items
        .iter()
        .map(render_scalar)
        .collect::<Vec<_>>()
        .join(",")
}

/// Returns the JSON type name used in error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Flattens a put-value map into logical stdin tokens.
///
/// Each entry is pushed as `type tag, rendered value, value name, key`. The
/// encoder reverses the whole list, so the script reads every entry from
/// stdin as `key, value name, rendered value, type tag`, last entry first.
///
/// # Errors
///
/// Fails on the first value that cannot be rendered; nothing is spawned in
/// that case.
pub fn flatten_entries(values: &PutValues) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    for (key, names) in values {
        for (name, entry) in names {
            tokens.push(entry.value_type.clone());
            tokens.push(entry.render()?);
            tokens.push(name.clone());
            tokens.push(key.clone());
        }
    }
    Ok(tokens)
}
