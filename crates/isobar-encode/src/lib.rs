//! Grid identity and field encoding for the Isobar output pipeline.
//!
//! Field values on an unstructured ocean grid are only meaningful once
//! the grid they live on is known. [`GridCache`] collects the latitude
//! and longitude arrays of each [`GridSubtype`](isobar_core::GridSubtype)
//! and derives a content hash once both have arrived. [`FieldEncoder`]
//! then turns field messages into encoded output through a pluggable
//! [`Codec`], stamping each one with the identity of its grid.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod encoder;
pub mod error;
pub mod grid;
pub mod tables;

pub use codec::{
    Codec, CodecFactory, CodecValue, DecodedRecord, KeyValueCodec, KeyValueCodecFactory,
    DEFAULT_TEMPLATE,
};
pub use encoder::FieldEncoder;
pub use error::{CodecError, EncodeError, GridError};
pub use grid::{Axis, GridCache, GridHash, GridInfo};
