//! The binary codec collaborator and an in-memory reference codec.
//!
//! The pipeline never interprets encoded bytes. It only decides which
//! keys are set, in which order, through the [`Codec`] trait. A real
//! deployment plugs a GRIB library in behind [`CodecFactory`];
//! [`KeyValueCodec`] is a self-contained implementation used by default
//! and in tests.
//!
//! # `KeyValueCodec` layout
//!
//! All integers are little-endian; strings and byte arrays are
//! length-prefixed with a `u32`.
//!
//! ```text
//! [MAGIC "ISKV"] [key count u32] [key entry]* [value count u32] [f64]*
//! key entry = [name str] [type tag u8] [i64 | f64 | str | bytes]
//! ```

use indexmap::IndexMap;
use std::fmt;
use std::io::{Cursor, Read};

use crate::error::CodecError;

/// Template name understood by [`KeyValueCodecFactory`] out of the box.
pub const DEFAULT_TEMPLATE: &str = "unstructured_grid";

/// Magic bytes at the start of every [`KeyValueCodec`] message.
pub const MAGIC: [u8; 4] = *b"ISKV";

const TAG_LONG: u8 = 0;
const TAG_DOUBLE: u8 = 1;
const TAG_STRING: u8 = 2;
const TAG_BYTES: u8 = 3;

/// A handle onto one message being built by the codec library.
///
/// Mirrors the handle surface of a GRIB encoding library:
/// typed key setters, a data-values setter, and two-step serialization.
pub trait Codec: Send {
    /// Set an integer key.
    fn set_long(&mut self, key: &str, value: i64) -> Result<(), CodecError>;

    /// Set a real key.
    fn set_double(&mut self, key: &str, value: f64) -> Result<(), CodecError>;

    /// Set a string key.
    fn set_string(&mut self, key: &str, value: &str) -> Result<(), CodecError>;

    /// Set a raw byte key (e.g. a UUID).
    fn set_bytes(&mut self, key: &str, value: &[u8]) -> Result<(), CodecError>;

    /// Set the field values.
    fn set_data_values(&mut self, values: &[f64]) -> Result<(), CodecError>;

    /// Length of the serialized message in bytes.
    fn serialized_length(&self) -> usize;

    /// Serialize into `buf`, which must hold at least [`serialized_length`](Self::serialized_length) bytes.
    fn serialize(&self, buf: &mut [u8]) -> Result<(), CodecError>;
}

/// Opens codec handles from named templates.
pub trait CodecFactory: Send + Sync {
    /// Open a fresh handle initialised from `template`.
    fn open(&self, template: &str) -> Result<Box<dyn Codec>, CodecError>;
}

/// A value recorded by [`KeyValueCodec`].
#[derive(Clone, Debug, PartialEq)]
pub enum CodecValue {
    /// Integer key.
    Long(i64),
    /// Real key.
    Double(f64),
    /// String key.
    Str(String),
    /// Byte key.
    Bytes(Vec<u8>),
}

impl fmt::Display for CodecValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v}"),
            Self::Bytes(v) => write!(f, "{}", hex::encode(v)),
        }
    }
}

/// In-memory codec recording keys in the order they are set.
#[derive(Clone, Debug, Default)]
pub struct KeyValueCodec {
    keys: IndexMap<String, CodecValue>,
    values: Vec<f64>,
}

impl KeyValueCodec {
    /// A handle with no keys set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys set so far, in setting order.
    pub fn keys(&self) -> &IndexMap<String, CodecValue> {
        &self.keys
    }

    /// Data values set so far.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    fn insert(&mut self, key: &str, value: CodecValue) -> Result<(), CodecError> {
        if key.is_empty() {
            return Err(CodecError::Rejected {
                key: String::new(),
                reason: "empty key".to_string(),
            });
        }
        // Re-setting a key moves it to the end, matching the order the
        // caller last touched it.
        self.keys.shift_remove(key);
        self.keys.insert(key.to_string(), value);
        Ok(())
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_length());
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&(self.keys.len() as u32).to_le_bytes());
        for (key, value) in &self.keys {
            write_str(&mut out, key);
            match value {
                CodecValue::Long(v) => {
                    out.push(TAG_LONG);
                    out.extend_from_slice(&v.to_le_bytes());
                }
                CodecValue::Double(v) => {
                    out.push(TAG_DOUBLE);
                    out.extend_from_slice(&v.to_le_bytes());
                }
                CodecValue::Str(v) => {
                    out.push(TAG_STRING);
                    write_str(&mut out, v);
                }
                CodecValue::Bytes(v) => {
                    out.push(TAG_BYTES);
                    out.extend_from_slice(&(v.len() as u32).to_le_bytes());
                    out.extend_from_slice(v);
                }
            }
        }
        out.extend_from_slice(&(self.values.len() as u32).to_le_bytes());
        for v in &self.values {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out
    }

    /// Parse bytes produced by [`Codec::serialize`] on a `KeyValueCodec`.
    pub fn decode(bytes: &[u8]) -> Result<DecodedRecord, CodecError> {
        let mut r = Cursor::new(bytes);
        let mut magic = [0u8; 4];
        read_exact(&mut r, &mut magic)?;
        if magic != MAGIC {
            return Err(malformed("invalid magic bytes"));
        }
        let key_count = read_u32(&mut r)?;
        let mut keys = IndexMap::new();
        for _ in 0..key_count {
            let key = read_str(&mut r)?;
            let value = match read_u8(&mut r)? {
                TAG_LONG => CodecValue::Long(i64::from_le_bytes(read_array(&mut r)?)),
                TAG_DOUBLE => CodecValue::Double(f64::from_le_bytes(read_array(&mut r)?)),
                TAG_STRING => CodecValue::Str(read_str(&mut r)?),
                TAG_BYTES => CodecValue::Bytes(read_bytes(&mut r)?),
                tag => return Err(malformed(&format!("unknown value tag {tag}"))),
            };
            keys.insert(key, value);
        }
        let value_count = read_u32(&mut r)?;
        let mut values = Vec::with_capacity(value_count as usize);
        for _ in 0..value_count {
            values.push(f64::from_le_bytes(read_array(&mut r)?));
        }
        if (r.position() as usize) != bytes.len() {
            return Err(malformed("trailing bytes after values"));
        }
        Ok(DecodedRecord { keys, values })
    }
}

impl Codec for KeyValueCodec {
    fn set_long(&mut self, key: &str, value: i64) -> Result<(), CodecError> {
        self.insert(key, CodecValue::Long(value))
    }

    fn set_double(&mut self, key: &str, value: f64) -> Result<(), CodecError> {
        self.insert(key, CodecValue::Double(value))
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), CodecError> {
        self.insert(key, CodecValue::Str(value.to_string()))
    }

    fn set_bytes(&mut self, key: &str, value: &[u8]) -> Result<(), CodecError> {
        self.insert(key, CodecValue::Bytes(value.to_vec()))
    }

    fn set_data_values(&mut self, values: &[f64]) -> Result<(), CodecError> {
        if let Some(CodecValue::Long(declared)) = self.keys.get("numberOfValues") {
            if *declared != values.len() as i64 {
                return Err(CodecError::ValueCountMismatch {
                    expected: usize::try_from(*declared).unwrap_or(0),
                    found: values.len(),
                });
            }
        }
        self.values = values.to_vec();
        Ok(())
    }

    fn serialized_length(&self) -> usize {
        let keys: usize = self
            .keys
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    CodecValue::Long(_) | CodecValue::Double(_) => 8,
                    CodecValue::Str(s) => 4 + s.len(),
                    CodecValue::Bytes(b) => 4 + b.len(),
                };
                4 + k.len() + 1 + value
            })
            .sum();
        MAGIC.len() + 4 + keys + 4 + self.values.len() * 8
    }

    fn serialize(&self, buf: &mut [u8]) -> Result<(), CodecError> {
        let encoded = self.encode();
        if buf.len() < encoded.len() {
            return Err(CodecError::BufferTooSmall {
                needed: encoded.len(),
                found: buf.len(),
            });
        }
        buf[..encoded.len()].copy_from_slice(&encoded);
        Ok(())
    }
}

/// Opens [`KeyValueCodec`] handles for a fixed set of template names.
#[derive(Clone, Debug)]
pub struct KeyValueCodecFactory {
    templates: Vec<String>,
}

impl KeyValueCodecFactory {
    /// Factory knowing only [`DEFAULT_TEMPLATE`].
    pub fn new() -> Self {
        Self {
            templates: vec![DEFAULT_TEMPLATE.to_string()],
        }
    }

    /// Factory knowing the given templates.
    pub fn with_templates<I, S>(templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            templates: templates.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for KeyValueCodecFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecFactory for KeyValueCodecFactory {
    fn open(&self, template: &str) -> Result<Box<dyn Codec>, CodecError> {
        if !self.templates.iter().any(|t| t == template) {
            return Err(CodecError::UnknownTemplate {
                template: template.to_string(),
            });
        }
        Ok(Box::new(KeyValueCodec::new()))
    }
}

/// Keys and values recovered from a [`KeyValueCodec`] message.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedRecord {
    /// Keys in the order they were set.
    pub keys: IndexMap<String, CodecValue>,
    /// Field values.
    pub values: Vec<f64>,
}

impl DecodedRecord {
    /// Integer key, if present with that type.
    pub fn long(&self, key: &str) -> Option<i64> {
        match self.keys.get(key) {
            Some(CodecValue::Long(v)) => Some(*v),
            _ => None,
        }
    }

    /// String key, if present with that type.
    pub fn string(&self, key: &str) -> Option<&str> {
        match self.keys.get(key) {
            Some(CodecValue::Str(v)) => Some(v),
            _ => None,
        }
    }

    /// Byte key, if present with that type.
    pub fn bytes(&self, key: &str) -> Option<&[u8]> {
        match self.keys.get(key) {
            Some(CodecValue::Bytes(v)) => Some(v),
            _ => None,
        }
    }

    /// Position of `key` in setting order.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.keys.get_index_of(key)
    }
}

// ── Primitive helpers ───────────────────────────────────────────

fn write_str(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u32).to_le_bytes());
    out.extend_from_slice(s.as_bytes());
}

fn malformed(detail: &str) -> CodecError {
    CodecError::Malformed {
        detail: detail.to_string(),
    }
}

fn read_exact(r: &mut Cursor<&[u8]>, buf: &mut [u8]) -> Result<(), CodecError> {
    r.read_exact(buf).map_err(|_| malformed("truncated message"))
}

fn read_array<const N: usize>(r: &mut Cursor<&[u8]>) -> Result<[u8; N], CodecError> {
    let mut buf = [0u8; N];
    read_exact(r, &mut buf)?;
    Ok(buf)
}

fn read_u8(r: &mut Cursor<&[u8]>) -> Result<u8, CodecError> {
    Ok(read_array::<1>(r)?[0])
}

fn read_u32(r: &mut Cursor<&[u8]>) -> Result<u32, CodecError> {
    Ok(u32::from_le_bytes(read_array(r)?))
}

fn read_bytes(r: &mut Cursor<&[u8]>) -> Result<Vec<u8>, CodecError> {
    let len = read_u32(r)? as usize;
    let remaining = r.get_ref().len().saturating_sub(r.position() as usize);
    if len > remaining {
        return Err(malformed("length prefix exceeds message"));
    }
    let mut buf = vec![0u8; len];
    read_exact(r, &mut buf)?;
    Ok(buf)
}

fn read_str(r: &mut Cursor<&[u8]>) -> Result<String, CodecError> {
    String::from_utf8(read_bytes(r)?).map_err(|e| malformed(&format!("invalid UTF-8 string: {e}")))
}
