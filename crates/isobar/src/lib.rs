//! Isobar: an in-process output pipeline for model I/O servers.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Isobar sub-crates. For most users, adding `isobar` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use isobar::prelude::*;
//!
//! // Register the built-in stages once, at startup.
//! let registry = ActionRegistry::new();
//! let _builtins = BuiltinActions::register(&registry, PipelineContext::default()).unwrap();
//!
//! // A plan is a chain of named stages, each owning its successor.
//! let config = Configuration::from_json(
//!     r#"{
//!         "name": "surface",
//!         "actions": {
//!             "type": "select",
//!             "match": ["ocean-2d"],
//!             "next": { "type": "print", "prefix": "surface: ", "next": { "type": "sink" } }
//!         }
//!     }"#,
//! )
//! .unwrap();
//! let plan = Plan::new(&config, &registry).unwrap();
//! assert_eq!(plan.stage_names(), ["select", "print", "sink"]);
//!
//! let field = Message::field(
//!     Metadata::new().with("category", "ocean-2d").with("param", 151130_i64),
//!     &[1.0, 2.0, 3.0],
//! );
//! plan.process(field).unwrap();
//! plan.process(Message::control(Tag::Close)).unwrap();
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `isobar-core` | Messages, metadata, grid subtypes, configuration, environment flags |
//! | [`encode`] | `isobar-encode` | Codec traits, the key/value codec, grid cache, field encoder |
//! | [`stats`] | `isobar-stats` | Statistics operations and calendar windows |
//! | [`action`] | `isobar-action` | Action trait, registry, plans and the dispatcher |
//! | [`sink`] | `isobar-sink` | Storage backends and the handle-based adapter |
//! | [`actions`] | `isobar-actions` | Built-in stages and their startup registration |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use isobar_core::Environment;
use tracing_subscriber::EnvFilter;

/// Core types (`isobar-core`).
///
/// Contains [`types::Message`] and its header, tag and payload,
/// [`types::Metadata`], [`types::GridSubtype`], [`types::LocalIndices`],
/// [`types::Configuration`] and the cached [`types::Environment`] flags.
pub use isobar_core as types;

/// Encoding of fields and grid coordinates (`isobar-encode`).
///
/// The [`encode::Codec`] collaborator traits, the reference
/// [`encode::KeyValueCodec`], the shared [`encode::GridCache`] and the
/// [`encode::FieldEncoder`].
pub use isobar_encode as encode;

/// Temporal statistics (`isobar-stats`).
///
/// [`stats::Operation`]s folded over [`stats::MonthlyStatistics`] and
/// [`stats::DailyStatistics`] windows.
pub use isobar_stats as stats;

/// Stage chains and their construction (`isobar-action`).
///
/// The [`action::Action`] trait is the main extension point: register a
/// builder with an [`action::ActionRegistry`] and name it in a plan.
pub use isobar_action as action;

/// Storage backends (`isobar-sink`).
///
/// [`sink::DataSink`] implementations, the [`sink::StandardSinks`] factory
/// and the integer-handle [`sink::LegacySink`].
pub use isobar_sink as sink;

/// Built-in stages (`isobar-actions`).
///
/// `print`, `select`, `statistics`, `encode` and `sink`, registered
/// together by [`actions::BuiltinActions::register`].
pub use isobar_actions as actions;

/// Install a `fmt` subscriber filtered by `RUST_LOG`.
///
/// Without `RUST_LOG` the filter is `debug` when `ISOBAR_TRACE` is set and
/// `info` otherwise. Returns `false` if a global subscriber was already
/// installed, in which case nothing changes.
pub fn init_tracing() -> bool {
    let default = if Environment::get().trace { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

/// Common imports for typical Isobar usage.
///
/// ```rust
/// use isobar::prelude::*;
/// ```
///
/// This imports the most frequently used types: the message model, stage
/// construction, the built-in stage registration, grid and codec services,
/// storage and statistics.
pub mod prelude {
    // Message model
    pub use isobar_core::{
        Configuration, GridSubtype, Header, Message, MetaValue, Metadata, Payload, Peer, Tag,
    };

    // Stage construction
    pub use isobar_action::{
        Action, ActionError, ActionRegistry, Dispatcher, Plan, Registration, Successor,
    };

    // Built-in stages
    pub use isobar_actions::{BuiltinActions, PipelineContext};

    // Encoding
    pub use isobar_encode::{CodecFactory, FieldEncoder, GridCache, KeyValueCodec};

    // Storage
    pub use isobar_sink::{DataSink, SinkFactory, StandardSinks};

    // Statistics
    pub use isobar_stats::{make_statistics, Operation, Period, TemporalStatistics};
}
