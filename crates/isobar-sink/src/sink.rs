//! The [`DataSink`] trait and the standard backends.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crossbeam_channel::Sender;

use crate::error::SinkError;

/// Receives encoded output.
pub trait DataSink: Send {
    /// Store one encoded message.
    fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError>;

    /// Push buffered output to its destination.
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Appends encoded messages to a file, creating it if needed.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    out: BufWriter<File>,
}

impl FileSink {
    /// Open `path` for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SinkError::Io {
                path: path.clone(),
                source,
            })?;
        tracing::info!(path = %path.display(), "opened file sink");
        Ok(Self {
            path,
            out: BufWriter::new(file),
        })
    }

    /// The file being appended to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SinkError {
        SinkError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl DataSink for FileSink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.out.write_all(bytes).map_err(|e| self.io_error(e))
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.out.flush().map_err(|e| self.io_error(e))
    }
}

/// Discards output, counting what it was given.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NullSink {
    writes: u64,
    bytes: u64,
}

impl NullSink {
    /// A sink with zero counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages written.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Total bytes written.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }
}

impl DataSink for NullSink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.writes += 1;
        self.bytes += bytes.len() as u64;
        Ok(())
    }
}

/// Hands owned copies of encoded output to another thread.
#[derive(Debug)]
pub struct ChannelSink {
    name: String,
    sender: Sender<Vec<u8>>,
}

impl ChannelSink {
    /// Send through `sender`, reporting failures under `name`.
    pub fn new(name: impl Into<String>, sender: Sender<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            sender,
        }
    }
}

impl DataSink for ChannelSink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.sender
            .send(bytes.to_vec())
            .map_err(|_| SinkError::Disconnected {
                channel: self.name.clone(),
            })
    }
}
