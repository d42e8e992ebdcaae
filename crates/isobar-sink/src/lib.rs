//! Storage backends for encoded Isobar output.
//!
//! The pipeline's terminal stage hands every encoded message to a
//! [`DataSink`]. [`StandardSinks`] opens the built-in backends from stage
//! configuration, and [`LegacySink`] exposes the integer-handle interface
//! still used by older procedural callers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod factory;
pub mod legacy;
pub mod sink;

pub use error::SinkError;
pub use factory::{SinkFactory, StandardSinks};
pub use legacy::{handle_error, HandleState, LegacySink, STATUS_ERROR, STATUS_OK};
pub use sink::{ChannelSink, DataSink, FileSink, NullSink};
