//! Message metadata: an ordered key→value map describing a field.
//!
//! Values are scalars (string, integer, real) or a nested map, which is
//! how run-level identification (`run.expver`, `run.class`, ...) travels
//! alongside per-field keys.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::MetadataError;

/// A single metadata value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    /// Signed integer value.
    Int(i64),
    /// Double-precision value.
    Real(f64),
    /// String value.
    Str(String),
    /// Nested key/value block.
    Map(Metadata),
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v}"),
            Self::Map(m) => write!(f, "{m}"),
        }
    }
}

impl From<i64> for MetaValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for MetaValue {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<&str> for MetaValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Metadata> for MetaValue {
    fn from(v: Metadata) -> Self {
        Self::Map(v)
    }
}

/// Ordered metadata mapping carried by every [`Message`](crate::Message).
///
/// Insertion order is preserved so that printed metadata and any
/// derived encodings are reproducible.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    entries: IndexMap<String, MetaValue>,
}

impl Metadata {
    /// Create an empty metadata map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or replace a value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<MetaValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Whether `key` is present.
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Raw access to a value.
    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.get(key)
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn require(&self, key: &str) -> Result<&MetaValue, MetadataError> {
        self.entries.get(key).ok_or_else(|| MetadataError::MissingKey {
            key: key.to_string(),
        })
    }

    /// Read a string value.
    pub fn get_str(&self, key: &str) -> Result<&str, MetadataError> {
        match self.require(key)? {
            MetaValue::Str(s) => Ok(s),
            _ => Err(MetadataError::WrongType {
                key: key.to_string(),
                expected: "a string",
            }),
        }
    }

    /// Read an integer value.
    ///
    /// Reals with no fractional part are accepted; JSON sources do not
    /// always preserve the distinction.
    pub fn get_i64(&self, key: &str) -> Result<i64, MetadataError> {
        match self.require(key)? {
            MetaValue::Int(v) => Ok(*v),
            MetaValue::Real(v) if v.fract() == 0.0 && v.is_finite() => Ok(*v as i64),
            _ => Err(MetadataError::WrongType {
                key: key.to_string(),
                expected: "an integer",
            }),
        }
    }

    /// Read a real value. Integers are widened.
    pub fn get_f64(&self, key: &str) -> Result<f64, MetadataError> {
        match self.require(key)? {
            MetaValue::Real(v) => Ok(*v),
            MetaValue::Int(v) => Ok(*v as f64),
            _ => Err(MetadataError::WrongType {
                key: key.to_string(),
                expected: "a number",
            }),
        }
    }

    /// Read a nested block.
    pub fn get_map(&self, key: &str) -> Result<&Metadata, MetadataError> {
        match self.require(key)? {
            MetaValue::Map(m) => Ok(m),
            _ => Err(MetadataError::WrongType {
                key: key.to_string(),
                expected: "a nested block",
            }),
        }
    }

    /// Read `globalSize` as an element count.
    pub fn global_size(&self) -> Result<usize, MetadataError> {
        let size = self.get_i64("globalSize")?;
        usize::try_from(size).map_err(|_| MetadataError::InvalidValue {
            key: "globalSize".to_string(),
            reason: format!("{size} is negative"),
        })
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}: {v}")?;
        }
        write!(f, "}}")
    }
}
