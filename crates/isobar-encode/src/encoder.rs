//! Translation of field and coordinate messages into encoded output.
//!
//! [`FieldEncoder`] decides which codec keys are set and in which order:
//! identification, then statistical processing (for non-instantaneous
//! fields), then grid identity, then raw values, then serialization. It
//! opens a fresh codec handle for every call, so no key set for one field
//! can leak into the next.

use std::sync::Arc;

use isobar_core::{GridSubtype, Header, Message, MetadataError, Metadata, Tag};

use crate::codec::{Codec, CodecFactory};
use crate::error::EncodeError;
use crate::grid::GridCache;
use crate::tables::{self, INSTANT, TIME_UNIT_SECONDS};

/// Encodes fields and grid coordinates through a [`CodecFactory`].
pub struct FieldEncoder {
    codecs: Arc<dyn CodecFactory>,
    grids: Arc<GridCache>,
    template: String,
    grid_type: String,
}

impl FieldEncoder {
    /// Create an encoder.
    ///
    /// `template` names the codec template opened for every message;
    /// `grid_type` is the unstructured grid name written to every field
    /// (e.g. `"ORCA1"`).
    pub fn new(
        codecs: Arc<dyn CodecFactory>,
        grids: Arc<GridCache>,
        template: impl Into<String>,
        grid_type: impl Into<String>,
    ) -> Self {
        Self {
            codecs,
            grids,
            template: template.into(),
            grid_type: grid_type.into(),
        }
    }

    /// The grid cache consulted for grid identities.
    pub fn grids(&self) -> &Arc<GridCache> {
        &self.grids
    }

    /// The unstructured grid name.
    pub fn grid_type(&self) -> &str {
        &self.grid_type
    }

    /// Encode a raw field message.
    ///
    /// Fails with [`GridError::NotReady`](crate::GridError::NotReady) if
    /// the field's grid subtype has no identity yet.
    pub fn encode_field(&self, msg: &Message) -> Result<Message, EncodeError> {
        let values = msg.values()?;
        self.encode_field_values(msg.metadata(), &values)
    }

    /// Encode already-aggregated values described by `metadata`.
    pub fn encode_field_values(
        &self,
        metadata: &Metadata,
        values: &[f64],
    ) -> Result<Message, EncodeError> {
        let expected = metadata.global_size()?;
        if values.len() != expected {
            return Err(EncodeError::PayloadSize {
                expected,
                found: values.len(),
            });
        }
        let mut codec = self.codecs.open(&self.template)?;
        let mut keys = KeySetter::new(codec.as_mut());
        self.set_field_metadata(&mut keys, metadata)?;
        finish(codec, metadata, values)
    }

    /// Encode the latitudes of a ready subtype.
    pub fn encode_latitudes(&self, subtype: GridSubtype) -> Result<Message, EncodeError> {
        let msg = self.grids.latitudes(subtype)?;
        self.encode_coordinates(&msg)
    }

    /// Encode the longitudes of a ready subtype.
    pub fn encode_longitudes(&self, subtype: GridSubtype) -> Result<Message, EncodeError> {
        let msg = self.grids.longitudes(subtype)?;
        self.encode_coordinates(&msg)
    }

    fn encode_coordinates(&self, msg: &Message) -> Result<Message, EncodeError> {
        let values = msg.values()?;
        let mut codec = self.codecs.open(&self.template)?;
        let mut keys = KeySetter::new(codec.as_mut());
        self.set_coordinate_metadata(&mut keys, msg.metadata())?;
        finish(codec, msg.metadata(), &values)
    }

    fn set_field_metadata(
        &self,
        keys: &mut KeySetter<'_>,
        md: &Metadata,
    ) -> Result<(), EncodeError> {
        // Identification
        let run = md.get_map("run")?;
        set_run_identification(keys, run)?;
        keys.long("step", md.get_i64("step")?)?;

        if run.has("dateOfAnalysis") {
            let (year, month, day) = split_date_str(run.get_str("dateOfAnalysis")?, "dateOfAnalysis")?;
            keys.long("yearOfAnalysis", year)?;
            keys.long("monthOfAnalysis", month)?;
            keys.long("dayOfAnalysis", day)?;
        }
        if run.has("number") {
            keys.long("number", run.get_i64("number")?)?;
        }

        let date = md.get_i64("date")?;
        keys.long("year", date / 10000)?;
        keys.long("month", (date % 10000) / 100)?;
        keys.long("day", date % 100)?;

        let global_size = md.get_i64("globalSize")?;
        keys.long("numberOfDataPoints", global_size)?;
        keys.long("numberOfValues", global_size)?;
        keys.long("paramId", md.get_i64("param")?)?;

        let category = if md.has("category") {
            Some(md.get_str("category")?)
        } else {
            None
        };
        set_level_type(keys, md, category)?;
        if category == Some("ocean-3d") {
            let level = md.get_i64("level")?;
            if level <= 0 {
                return Err(EncodeError::InvalidLevel { level });
            }
            keys.long("scaledValueOfFirstFixedSurface", level)?;
            keys.long("scaledValueOfSecondFixedSurface", level + 1)?;
        }

        // Statistical processing
        if md.has("operation") {
            let operation = md.get_str("operation")?;
            if operation != INSTANT {
                keys.long("typeOfStatisticalProcessing", tables::operation_code(operation)?)?;
                keys.string("stepRange", md.get_str("stepRange")?)?;
                keys.long("indicatorOfUnitForTimeIncrement", TIME_UNIT_SECONDS)?;
                keys.long("timeIncrement", md.get_i64("timeStep")?)?;
            }
        }

        // Grid identity
        self.set_grid_identity(keys, md)
    }

    fn set_coordinate_metadata(
        &self,
        keys: &mut KeySetter<'_>,
        md: &Metadata,
    ) -> Result<(), EncodeError> {
        let run = md.get_map("run")?;
        set_run_identification(keys, run)?;
        keys.long(
            "typeOfGeneratingProcess",
            tables::generating_process_code(run.get_str("type")?)?,
        )?;
        keys.long("date", md.get_i64("date")?)?;

        let global_size = md.get_i64("globalSize")?;
        keys.long("numberOfDataPoints", global_size)?;
        keys.long("numberOfValues", global_size)?;
        keys.long("paramId", md.get_i64("param")?)?;

        let category = if md.has("category") {
            Some(md.get_str("category")?)
        } else {
            None
        };
        set_level_type(keys, md, category)?;

        self.set_grid_identity(keys, md)
    }

    fn set_grid_identity(
        &self,
        keys: &mut KeySetter<'_>,
        md: &Metadata,
    ) -> Result<(), EncodeError> {
        let subtype = GridSubtype::from_metadata(md)?;
        let hash = self.grids.hash_value(subtype)?;
        keys.string("unstructuredGridType", &self.grid_type)?;
        keys.string("unstructuredGridSubtype", subtype.code())?;
        keys.bytes("uuidOfHGrid", hash.as_bytes())?;
        Ok(())
    }
}

impl std::fmt::Debug for FieldEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldEncoder")
            .field("template", &self.template)
            .field("grid_type", &self.grid_type)
            .finish_non_exhaustive()
    }
}

fn set_run_identification(keys: &mut KeySetter<'_>, run: &Metadata) -> Result<(), EncodeError> {
    keys.string("expver", run.get_str("expver")?)?;
    keys.string("class", run.get_str("class")?)?;
    keys.string("stream", run.get_str("stream")?)?;
    keys.string("type", run.get_str("type")?)?;
    Ok(())
}

fn set_level_type(
    keys: &mut KeySetter<'_>,
    md: &Metadata,
    category: Option<&str>,
) -> Result<(), EncodeError> {
    if md.has("typeOfLevel") {
        keys.string("typeOfLevel", md.get_str("typeOfLevel")?)
    } else {
        let category = category.ok_or_else(|| MetadataError::MissingKey {
            key: "typeOfLevel".to_string(),
        })?;
        keys.string("typeOfLevel", tables::level_type(category)?)
    }
}

/// Split a `YYYYMMDD` string into its parts.
fn split_date_str(date: &str, key: &str) -> Result<(i64, i64, i64), MetadataError> {
    let invalid = || MetadataError::InvalidValue {
        key: key.to_string(),
        reason: format!("'{date}' is not a YYYYMMDD date"),
    };
    if date.len() < 8 || !date.is_ascii() {
        return Err(invalid());
    }
    let part = |range: std::ops::Range<usize>| {
        date.get(range)
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or_else(invalid)
    };
    Ok((part(0..4)?, part(4..6)?, part(6..8)?))
}

fn finish(
    mut codec: Box<dyn Codec>,
    metadata: &Metadata,
    values: &[f64],
) -> Result<Message, EncodeError> {
    codec.set_data_values(values)?;
    let mut buf = vec![0u8; codec.serialized_length()];
    codec.serialize(&mut buf)?;
    Ok(Message::new(
        Header::new(Tag::Encoded),
        metadata.clone(),
        buf.into(),
    ))
}

/// Thin wrapper tracing every key as it is set.
struct KeySetter<'a> {
    codec: &'a mut dyn Codec,
}

impl<'a> KeySetter<'a> {
    fn new(codec: &'a mut dyn Codec) -> Self {
        Self { codec }
    }

    fn long(&mut self, key: &str, value: i64) -> Result<(), EncodeError> {
        tracing::debug!(key, value, "setting codec key");
        Ok(self.codec.set_long(key, value)?)
    }

    fn string(&mut self, key: &str, value: &str) -> Result<(), EncodeError> {
        tracing::debug!(key, value, "setting codec key");
        Ok(self.codec.set_string(key, value)?)
    }

    fn bytes(&mut self, key: &str, value: &[u8]) -> Result<(), EncodeError> {
        tracing::debug!(key, value = %hex::encode(value), "setting codec key");
        Ok(self.codec.set_bytes(key, value)?)
    }
}
