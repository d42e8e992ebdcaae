//! Terminal stage writing encoded output to storage.

use isobar_action::{Action, ActionError};
use isobar_core::{Configuration, Message, Tag};
use isobar_sink::{DataSink, SinkFactory};

/// Registered stage name.
pub const NAME: &str = "sink";

/// Storage adapter at the end of a chain.
///
/// Writes the payload of every `Encoded` message, flushes on
/// `StepComplete` and `Close`, and ignores everything else. The sink
/// itself is opened from the stage configuration (see
/// [`StandardSinks`](isobar_sink::StandardSinks)).
pub struct Sink {
    sink: Box<dyn DataSink>,
    written: u64,
}

impl Sink {
    /// Open the configured sink through `sinks`.
    pub fn from_config(config: &Configuration, sinks: &dyn SinkFactory) -> Result<Self, ActionError> {
        let sink = sinks.open(config).map_err(|e| ActionError::stage(NAME, e))?;
        Ok(Self::new(sink))
    }

    /// Write into an already-open sink.
    pub fn new(sink: Box<dyn DataSink>) -> Self {
        Self { sink, written: 0 }
    }

    /// Encoded messages written so far.
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl Action for Sink {
    fn name(&self) -> &str {
        NAME
    }

    fn execute(&mut self, msg: Message) -> Result<(), ActionError> {
        let result = match msg.tag() {
            Tag::Encoded => {
                self.written += 1;
                self.sink.write(msg.payload().as_bytes())
            }
            Tag::StepComplete | Tag::Close => self.sink.flush(),
            tag => {
                tracing::debug!(%tag, "sink ignores non-encoded message");
                Ok(())
            }
        };
        result.map_err(|e| ActionError::stage(NAME, e))
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink")
            .field("written", &self.written)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isobar_core::{Header, Metadata, Payload};
    use isobar_sink::NullSink;

    #[test]
    fn writes_only_encoded_payloads() {
        let mut sink = Sink::new(Box::new(NullSink::new()));
        let encoded = Message::new(
            Header::new(Tag::Encoded),
            Metadata::new(),
            Payload::from(vec![1u8, 2, 3]),
        );
        sink.execute(encoded).unwrap();
        sink.execute(Message::field(Metadata::new(), &[1.0])).unwrap();
        sink.execute(Message::control(Tag::StepComplete)).unwrap();
        assert_eq!(sink.written(), 1);
    }
}
