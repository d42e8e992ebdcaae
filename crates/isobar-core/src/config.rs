//! Structured stage and plan configuration.
//!
//! [`Configuration`] is a read-only view over a nested key/value object.
//! Stages read named scalars and an optional nested `next` block; how the
//! object was produced (JSON, YAML, hand-built) is the caller's concern.

use serde_json::Value;
use std::fmt;

use crate::error::ConfigError;

/// Read-only nested configuration block.
#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    value: Value,
}

impl Configuration {
    /// Wrap a JSON object.
    pub fn new(value: Value) -> Result<Self, ConfigError> {
        if !value.is_object() {
            return Err(ConfigError::NotAnObject {
                found: describe(&value).to_string(),
            });
        }
        Ok(Self { value })
    }

    /// Parse JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let value = serde_json::from_str(text).map_err(|e| ConfigError::Malformed {
            reason: e.to_string(),
        })?;
        Self::new(value)
    }

    /// An empty block.
    pub fn empty() -> Self {
        Self {
            value: Value::Object(Default::default()),
        }
    }

    /// The underlying JSON value.
    pub fn as_value(&self) -> &Value {
        &self.value
    }

    /// Whether `key` is present.
    pub fn has(&self, key: &str) -> bool {
        self.value.get(key).is_some()
    }

    fn require(&self, key: &str) -> Result<&Value, ConfigError> {
        self.value.get(key).ok_or_else(|| ConfigError::MissingKey {
            key: key.to_string(),
        })
    }

    /// Read a string.
    pub fn get_str(&self, key: &str) -> Result<&str, ConfigError> {
        self.require(key)?
            .as_str()
            .ok_or_else(|| wrong_type(key, "a string"))
    }

    /// Read a string, falling back to `default` when absent.
    pub fn get_str_or<'a>(&'a self, key: &str, default: &'a str) -> Result<&'a str, ConfigError> {
        if self.has(key) {
            self.get_str(key)
        } else {
            Ok(default)
        }
    }

    /// Read an integer.
    pub fn get_i64(&self, key: &str) -> Result<i64, ConfigError> {
        self.require(key)?
            .as_i64()
            .ok_or_else(|| wrong_type(key, "an integer"))
    }

    /// Read a boolean.
    pub fn get_bool(&self, key: &str) -> Result<bool, ConfigError> {
        self.require(key)?
            .as_bool()
            .ok_or_else(|| wrong_type(key, "a boolean"))
    }

    /// Read a list of strings.
    pub fn get_str_list(&self, key: &str) -> Result<Vec<String>, ConfigError> {
        let items = self
            .require(key)?
            .as_array()
            .ok_or_else(|| wrong_type(key, "a list of strings"))?;
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| wrong_type(key, "a list of strings"))
            })
            .collect()
    }

    /// Read a nested block, if present.
    pub fn sub(&self, key: &str) -> Result<Option<Configuration>, ConfigError> {
        match self.value.get(key) {
            None => Ok(None),
            Some(v) if v.is_object() => Ok(Some(Self { value: v.clone() })),
            Some(_) => Err(wrong_type(key, "a nested block")),
        }
    }

    /// Read a list of nested blocks.
    pub fn sub_list(&self, key: &str) -> Result<Vec<Configuration>, ConfigError> {
        let items = self
            .require(key)?
            .as_array()
            .ok_or_else(|| wrong_type(key, "a list of blocks"))?;
        items
            .iter()
            .map(|item| {
                if item.is_object() {
                    Ok(Self {
                        value: item.clone(),
                    })
                } else {
                    Err(wrong_type(key, "a list of blocks"))
                }
            })
            .collect()
    }

    /// The stage type name (`type` key).
    pub fn action_type(&self) -> Result<&str, ConfigError> {
        self.get_str("type")
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

fn wrong_type(key: &str, expected: &'static str) -> ConfigError {
    ConfigError::WrongType {
        key: key.to_string(),
        expected,
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
