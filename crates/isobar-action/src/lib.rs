//! Action chains, the stage registry and plans for the Isobar output pipeline.
//!
//! A plan's configuration names stage types; the [`ActionRegistry`] maps
//! each name to an [`ActionBuilder`] and builds the chain outer to inner,
//! each builder resolving its own `next` block through the same registry.
//! At run time a [`Plan`] feeds messages into the head of its chain.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod action;
pub mod error;
mod lock;
pub mod plan;
pub mod registry;

pub use action::{chain_len, stage_names, Action, Successor};
pub use error::ActionError;
pub use plan::{Dispatcher, Plan};
pub use registry::{ActionBuilder, ActionRegistry, Registration};
