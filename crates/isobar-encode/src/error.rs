//! Error types for grid caching and field encoding.

use isobar_core::{GridSubtype, MetadataError};
use thiserror::Error;

/// Errors raised by a [`Codec`](crate::Codec) implementation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The requested template does not exist.
    #[error("unknown codec template '{template}'")]
    UnknownTemplate {
        /// Template name that was requested.
        template: String,
    },
    /// The codec refused a key/value pair.
    #[error("codec rejected key '{key}': {reason}")]
    Rejected {
        /// The key being set.
        key: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The number of data values disagrees with the declared count.
    #[error("codec expected {expected} data values, got {found}")]
    ValueCountMismatch {
        /// Count declared through `numberOfValues`.
        expected: usize,
        /// Count supplied to `set_data_values`.
        found: usize,
    },
    /// The output buffer is too small for the serialized message.
    #[error("serialization buffer holds {found} bytes, message needs {needed}")]
    BufferTooSmall {
        /// Bytes required.
        needed: usize,
        /// Bytes available.
        found: usize,
    },
    /// Encoded bytes could not be decoded.
    #[error("malformed encoded message: {detail}")]
    Malformed {
        /// Description of the decoding failure.
        detail: String,
    },
}

/// Errors from the [`GridCache`](crate::GridCache).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// Coordinates were published for a subtype whose hash already exists.
    #[error("grid info for {subtype} is already complete")]
    AlreadyReady {
        /// The subtype concerned.
        subtype: GridSubtype,
    },
    /// The subtype's identity hash was requested before both coordinates arrived.
    #[error("grid info for {subtype} is not ready")]
    NotReady {
        /// The subtype concerned.
        subtype: GridSubtype,
    },
    /// The coordinate parameter names neither a latitude nor a longitude array.
    #[error("'{param}' is not a recognised coordinate parameter")]
    UnknownCoordinate {
        /// The parameter name found in the message.
        param: String,
    },
    /// Coordinate message metadata is incomplete.
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

/// Errors from the [`FieldEncoder`](crate::FieldEncoder).
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The statistical operation has no numeric code.
    #[error("no statistical processing code for operation '{operation}'")]
    UnknownOperation {
        /// The operation name.
        operation: String,
    },
    /// The run type has no generating-process code.
    #[error("no generating process code for run type '{run_type}'")]
    UnknownRunType {
        /// The run type name.
        run_type: String,
    },
    /// No level type is known for the field category.
    #[error("no level type for category '{category}'")]
    UnknownCategory {
        /// The category name.
        category: String,
    },
    /// A 3-D field declared a level that is not positive.
    #[error("3-D field must have a positive level, got {level}")]
    InvalidLevel {
        /// The offending level.
        level: i64,
    },
    /// The value buffer does not hold `globalSize` values.
    #[error("payload holds {found} values, metadata declares {expected}")]
    PayloadSize {
        /// Declared `globalSize`.
        expected: usize,
        /// Values actually present.
        found: usize,
    },
    /// Required metadata is missing or malformed.
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    /// The grid identity could not be resolved.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// The codec collaborator failed.
    #[error("codec failure: {0}")]
    Codec(#[from] CodecError),
}
