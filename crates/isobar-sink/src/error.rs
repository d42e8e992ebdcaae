//! Error type for storage backends.

use std::io;
use std::path::PathBuf;

use isobar_core::ConfigError;
use thiserror::Error;

/// Errors raised by a [`DataSink`](crate::DataSink) or its factory.
#[derive(Debug, Error)]
pub enum SinkError {
    /// A file operation failed.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// The file concerned.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
    /// The receiving end of a channel sink has gone away.
    #[error("channel '{channel}' is disconnected")]
    Disconnected {
        /// Channel name.
        channel: String,
    },
    /// No channel of this name was created on the factory.
    #[error("no channel named '{name}'")]
    UnknownChannel {
        /// The requested channel.
        name: String,
    },
    /// The configured sink kind does not exist.
    #[error("unknown sink kind '{kind}'")]
    UnknownKind {
        /// The requested kind.
        kind: String,
    },
    /// A legacy handle that was never opened or is already closed.
    #[error("no open sink handle {handle}")]
    UnknownHandle {
        /// The offending handle.
        handle: i32,
    },
    /// A legacy open mode other than read, write or append.
    #[error("unsupported open mode '{mode}'")]
    InvalidMode {
        /// The requested mode.
        mode: String,
    },
    /// Sink configuration is missing or malformed.
    #[error("invalid sink configuration: {0}")]
    Config(#[from] ConfigError),
}
