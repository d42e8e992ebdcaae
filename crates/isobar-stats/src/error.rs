//! Error type for temporal statistics.

use isobar_core::MetadataError;
use thiserror::Error;

/// Errors raised while folding fields into statistics.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StatisticsError {
    /// A field's element count differs from the allocated buffers.
    #[error("statistics buffers hold {expected} values, field has {found}")]
    SizeMismatch {
        /// Buffer size fixed at construction.
        expected: usize,
        /// Element count of the offending field.
        found: usize,
    },
    /// The operation name is not a known statistical operation.
    #[error("unknown statistical operation '{name}'")]
    UnknownOperation {
        /// The requested name.
        name: String,
    },
    /// The period name is not a known window kind.
    #[error("unknown statistics period '{name}'")]
    UnknownPeriod {
        /// The requested name.
        name: String,
    },
    /// No operation was requested.
    #[error("at least one statistical operation is required")]
    NoOperations,
    /// A `date` value is not a valid `YYYYMMDD` calendar date.
    #[error("'{date}' is not a valid YYYYMMDD date")]
    InvalidDate {
        /// The raw value.
        date: i64,
    },
    /// Field metadata is missing or malformed.
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}
