//! Error type for chain construction and message processing.

use std::error::Error;

use isobar_core::{ConfigError, MetadataError};
use thiserror::Error;

/// Errors raised while building or running an action chain.
#[derive(Debug, Error)]
pub enum ActionError {
    /// No builder is registered under the requested stage name.
    #[error("unknown action '{name}', registered actions: [{}]", available.join(", "))]
    UnknownAction {
        /// The requested name.
        name: String,
        /// Every name registered at the time of the lookup.
        available: Vec<String>,
    },

    /// A builder is already registered under this name.
    #[error("action '{name}' is already registered")]
    DuplicateAction {
        /// The contested name.
        name: String,
    },

    /// Deregistration of a name that is not registered.
    #[error("action '{name}' is not registered")]
    NotRegistered {
        /// The missing name.
        name: String,
    },

    /// Stage configuration is missing or malformed.
    #[error("invalid action configuration: {0}")]
    Config(#[from] ConfigError),

    /// Message metadata is missing or malformed.
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// A stage failed while handling a message.
    #[error("stage '{stage}' failed: {source}")]
    Stage {
        /// Name of the failing stage.
        stage: String,
        /// The underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl ActionError {
    /// Wrap a stage-specific failure with the stage's name.
    pub fn stage(stage: impl Into<String>, source: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self::Stage {
            stage: stage.into(),
            source: source.into(),
        }
    }
}
