//! Core types for the Isobar output pipeline.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other Isobar crate: messages and their
//! metadata, grid subtypes, local/global index maps, stage configuration,
//! process-wide environment flags, and the shared error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod env;
pub mod error;
pub mod grid;
pub mod indices;
pub mod message;
pub mod metadata;

pub use config::Configuration;
pub use env::Environment;
pub use error::{ConfigError, IndexError, MetadataError};
pub use grid::GridSubtype;
pub use indices::LocalIndices;
pub use message::{Header, Message, Payload, Peer, Tag};
pub use metadata::{MetaValue, Metadata};
