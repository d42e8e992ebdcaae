//! The [`Message`] type: the unit of work flowing through a pipeline.
//!
//! A message is immutable once built. Stages that transform a message
//! construct a new one; clones share the payload buffer.

use std::fmt;
use std::sync::Arc;

use crate::error::MetadataError;
use crate::metadata::Metadata;

/// Size in bytes of one encoded field value.
const VALUE_BYTES: usize = std::mem::size_of::<f64>();

/// Kind of message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Raw model field: payload is `globalSize` little-endian doubles.
    Field,
    /// Grid coordinate array (latitudes or longitudes of one subtype).
    Coordinate,
    /// Encoded output ready for storage.
    Encoded,
    /// All fields of the current step have been delivered.
    StepComplete,
    /// End of run.
    Close,
}

impl Tag {
    /// Whether messages of this kind carry numeric field data.
    pub fn carries_values(self) -> bool {
        matches!(self, Self::Field | Self::Coordinate)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Field => "Field",
            Self::Coordinate => "Coordinate",
            Self::Encoded => "Encoded",
            Self::StepComplete => "StepComplete",
            Self::Close => "Close",
        };
        f.write_str(s)
    }
}

/// One end of a message route: a named group and a rank within it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Peer {
    /// Process group name (e.g. the model communicator).
    pub group: String,
    /// Rank within the group.
    pub id: usize,
}

impl Peer {
    /// Create a peer.
    pub fn new(group: impl Into<String>, id: usize) -> Self {
        Self {
            group: group.into(),
            id,
        }
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.id)
    }
}

/// Routing header of a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    /// Message kind.
    pub tag: Tag,
    /// Producer.
    pub source: Peer,
    /// Consumer.
    pub destination: Peer,
}

impl Header {
    /// Header with default (anonymous) peers.
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            source: Peer::default(),
            destination: Peer::default(),
        }
    }
}

/// Immutable, cheaply clonable byte buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Payload(Arc<[u8]>);

impl Payload {
    /// Empty payload.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Encode doubles as consecutive little-endian IEEE 754 values.
    pub fn from_values(values: &[f64]) -> Self {
        let mut bytes = Vec::with_capacity(values.len() * VALUE_BYTES);
        for v in values {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        Self(bytes.into())
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of whole doubles in the payload.
    pub fn value_count(&self) -> usize {
        self.0.len() / VALUE_BYTES
    }

    /// Decode the payload as little-endian doubles.
    ///
    /// Trailing bytes that do not form a whole value are ignored;
    /// [`Message::values`] checks the length against `globalSize`.
    pub fn values(&self) -> Vec<f64> {
        self.0
            .chunks_exact(VALUE_BYTES)
            .map(|chunk| {
                let mut buf = [0u8; VALUE_BYTES];
                buf.copy_from_slice(chunk);
                f64::from_le_bytes(buf)
            })
            .collect()
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes.into())
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.into())
    }
}

/// A unit of data passed between pipeline stages.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    header: Header,
    metadata: Metadata,
    payload: Payload,
}

impl Message {
    /// Assemble a message from its parts.
    pub fn new(header: Header, metadata: Metadata, payload: Payload) -> Self {
        Self {
            header,
            metadata,
            payload,
        }
    }

    /// A raw field carrying `values`.
    pub fn field(metadata: Metadata, values: &[f64]) -> Self {
        Self::new(
            Header::new(Tag::Field),
            metadata,
            Payload::from_values(values),
        )
    }

    /// A coordinate array carrying `values`.
    pub fn coordinate(metadata: Metadata, values: &[f64]) -> Self {
        Self::new(
            Header::new(Tag::Coordinate),
            metadata,
            Payload::from_values(values),
        )
    }

    /// A control message with no payload.
    pub fn control(tag: Tag) -> Self {
        Self::new(Header::new(tag), Metadata::new(), Payload::empty())
    }

    /// Message kind.
    pub fn tag(&self) -> Tag {
        self.header.tag
    }

    /// Routing header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Producer.
    pub fn source(&self) -> &Peer {
        &self.header.source
    }

    /// Consumer.
    pub fn destination(&self) -> &Peer {
        &self.header.destination
    }

    /// Field metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Raw payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Declared element count (`globalSize`).
    pub fn global_size(&self) -> Result<usize, MetadataError> {
        self.metadata.global_size()
    }

    /// Decode the payload, checking it holds exactly `globalSize` values.
    pub fn values(&self) -> Result<Vec<f64>, MetadataError> {
        let expected = self.global_size()?;
        let bytes = self.payload.len();
        if expected.checked_mul(VALUE_BYTES) != Some(bytes) {
            return Err(MetadataError::InvalidValue {
                key: "globalSize".to_string(),
                reason: format!(
                    "declares {expected} values but payload holds {bytes} bytes"
                ),
            });
        }
        Ok(self.payload.values())
    }

    /// Replace the metadata, keeping header and payload.
    pub fn with_metadata(self, metadata: Metadata) -> Self {
        Self { metadata, ..self }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Message(tag={}, source={}, destination={}, payload={} bytes, metadata={})",
            self.header.tag,
            self.header.source,
            self.header.destination,
            self.payload.len(),
            self.metadata,
        )
    }
}
