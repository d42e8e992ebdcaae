//! Built-in stages for the Isobar output pipeline.
//!
//! # Stages
//!
//! | Name         | Stage                       | Role                                     |
//! |--------------|-----------------------------|------------------------------------------|
//! | `print`      | [`Print`]                   | log every message and forward it         |
//! | `select`     | [`Select`]                  | forward messages matching a value list   |
//! | `statistics` | [`Statistics`]              | fold fields into calendar windows        |
//! | `encode`     | [`Encode`]                  | cache grids, encode coordinates & fields |
//! | `sink`       | [`Sink`]                    | write encoded output to storage          |
//!
//! All of them are registered at startup by [`BuiltinActions::register`],
//! before any plan is built.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod builtin;
pub mod context;
pub mod encode;
pub mod print;
pub mod select;
pub mod sink;
pub mod statistics;

pub use builtin::{BuiltinActions, BUILTIN_NAMES};
pub use context::PipelineContext;
pub use encode::Encode;
pub use print::Print;
pub use select::Select;
pub use sink::Sink;
pub use statistics::Statistics;
