//! Construction of sinks from stage configuration.

use std::sync::{Mutex, PoisonError};

use crossbeam_channel::{Receiver, Sender};
use indexmap::IndexMap;
use isobar_core::Configuration;

use crate::error::SinkError;
use crate::sink::{ChannelSink, DataSink, FileSink, NullSink};

/// Configuration key selecting the sink kind.
pub const KIND_KEY: &str = "sink";

/// Opens sinks described by configuration blocks.
pub trait SinkFactory: Send + Sync {
    /// Open the sink described by `config`.
    fn open(&self, config: &Configuration) -> Result<Box<dyn DataSink>, SinkError>;
}

/// The built-in sink kinds.
///
/// | `sink`    | extra keys | backend         |
/// |-----------|------------|-----------------|
/// | `file`    | `path`     | [`FileSink`]    |
/// | `discard` |            | [`NullSink`]    |
/// | `channel` | `channel`  | [`ChannelSink`] |
///
/// `discard` is used when no kind is configured. Channels must be created
/// with [`StandardSinks::channel`] before a sink can be opened on them.
#[derive(Debug, Default)]
pub struct StandardSinks {
    channels: Mutex<IndexMap<String, Sender<Vec<u8>>>>,
}

impl StandardSinks {
    /// A factory with no channels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or replace) the channel `name` and return its receiving end.
    pub fn channel(&self, name: impl Into<String>) -> Receiver<Vec<u8>> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), tx);
        rx
    }

    fn sender(&self, name: &str) -> Result<Sender<Vec<u8>>, SinkError> {
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| SinkError::UnknownChannel {
                name: name.to_string(),
            })
    }
}

impl SinkFactory for StandardSinks {
    fn open(&self, config: &Configuration) -> Result<Box<dyn DataSink>, SinkError> {
        match config.get_str_or(KIND_KEY, "discard")? {
            "file" => Ok(Box::new(FileSink::open(config.get_str("path")?)?)),
            "discard" => Ok(Box::new(NullSink::new())),
            "channel" => {
                let name = config.get_str("channel")?;
                Ok(Box::new(ChannelSink::new(name, self.sender(name)?)))
            }
            kind => Err(SinkError::UnknownKind {
                kind: kind.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_kind_discards() {
        let sinks = StandardSinks::new();
        let mut sink = sinks.open(&Configuration::empty()).unwrap();
        sink.write(b"x").unwrap();
    }

    #[test]
    fn channel_must_exist() {
        let sinks = StandardSinks::new();
        let config = Configuration::from_json(r#"{"sink": "channel", "channel": "out"}"#).unwrap();
        assert!(matches!(
            sinks.open(&config),
            Err(SinkError::UnknownChannel { .. })
        ));

        let rx = sinks.channel("out");
        let mut sink = sinks.open(&config).unwrap();
        sink.write(b"abc").unwrap();
        assert_eq!(rx.try_recv().unwrap(), b"abc".to_vec());
    }

    #[test]
    fn file_kind_requires_path() {
        let sinks = StandardSinks::new();
        let config = Configuration::from_json(r#"{"sink": "file"}"#).unwrap();
        assert!(matches!(sinks.open(&config), Err(SinkError::Config(_))));
    }

    #[test]
    fn unknown_kind() {
        let sinks = StandardSinks::new();
        let config = Configuration::from_json(r#"{"sink": "fdb"}"#).unwrap();
        assert!(matches!(
            sinks.open(&config),
            Err(SinkError::UnknownKind { ref kind }) if kind == "fdb"
        ));
    }
}
