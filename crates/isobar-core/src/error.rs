//! Error types shared across the Isobar workspace.
//!
//! Each variant names the offending key or value so a failure can be
//! traced back to the message or configuration block that caused it.

use thiserror::Error;

/// Errors from reading message metadata.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MetadataError {
    /// A required key is absent.
    #[error("missing metadata key '{key}'")]
    MissingKey {
        /// The key that was looked up.
        key: String,
    },
    /// The key exists but holds a value of a different kind.
    #[error("metadata key '{key}' is not {expected}")]
    WrongType {
        /// The key that was looked up.
        key: String,
        /// Human-readable description of the expected kind.
        expected: &'static str,
    },
    /// The value is present and well-typed but outside its valid range.
    #[error("invalid value for metadata key '{key}': {reason}")]
    InvalidValue {
        /// The key that was looked up.
        key: String,
        /// Description of what is wrong with the value.
        reason: String,
    },
}

/// Errors from reading a stage or plan [`Configuration`](crate::Configuration).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required key is absent.
    #[error("missing configuration key '{key}'")]
    MissingKey {
        /// The key that was looked up.
        key: String,
    },
    /// The key exists but holds a value of a different kind.
    #[error("configuration key '{key}' is not {expected}")]
    WrongType {
        /// The key that was looked up.
        key: String,
        /// Human-readable description of the expected kind.
        expected: &'static str,
    },
    /// The configuration root is not a key/value object.
    #[error("configuration must be an object, got {found}")]
    NotAnObject {
        /// Short description of what was found instead.
        found: String,
    },
    /// Configuration text could not be parsed.
    #[error("malformed configuration: {reason}")]
    Malformed {
        /// Parser diagnostic.
        reason: String,
    },
}

/// Errors from gathering or scattering through [`LocalIndices`](crate::LocalIndices).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IndexError {
    /// The local buffer does not have one slot per mapped index.
    #[error("local buffer has {found} values, index map has {expected}")]
    LocalSizeMismatch {
        /// Number of indices in the map.
        expected: usize,
        /// Length of the buffer supplied.
        found: usize,
    },
    /// A mapped index lies outside the global buffer.
    #[error("global index {index} out of range for buffer of {len} values")]
    OutOfRange {
        /// The offending global index.
        index: usize,
        /// Length of the global buffer.
        len: usize,
    },
}
