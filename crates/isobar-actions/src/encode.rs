//! Encodes coordinates and fields.
//!
//! Coordinates are published to the shared grid cache. When a coordinate
//! completes its subtype, the encoded latitudes and then longitudes of
//! that subtype are forwarded. Fields are encoded against the cached grid
//! identity and forwarded. Anything else passes through.
//!
//! # Configuration
//!
//! ```json
//! { "type": "encode", "grid-type": "ORCA1", "template": "unstructured_grid" }
//! ```

use std::sync::Arc;

use isobar_action::{Action, ActionError, ActionRegistry, Successor};
use isobar_core::{Configuration, GridSubtype, Message, Tag};
use isobar_encode::{CodecFactory, FieldEncoder, GridCache, DEFAULT_TEMPLATE};

/// Registered stage name.
pub const NAME: &str = "encode";

/// Encoding stage.
#[derive(Debug)]
pub struct Encode {
    encoder: FieldEncoder,
    next: Successor,
}

impl Encode {
    /// Build from configuration, encoding against the shared `grids`.
    pub fn from_config(
        config: &Configuration,
        registry: &ActionRegistry,
        grids: Arc<GridCache>,
        codecs: Arc<dyn CodecFactory>,
    ) -> Result<Self, ActionError> {
        let template = config.get_str_or("template", DEFAULT_TEMPLATE)?;
        let grid_type = config.get_str("grid-type")?;
        tracing::info!(template, grid_type, "encode stage configured");
        Ok(Self {
            encoder: FieldEncoder::new(codecs, grids, template, grid_type),
            next: Successor::from_config(config, registry)?,
        })
    }

    fn publish_coordinates(&mut self, msg: &Message) -> Result<(), ActionError> {
        let ready = self
            .encoder
            .grids()
            .set_grid_info(msg)
            .map_err(|e| ActionError::stage(NAME, e))?;
        if !ready {
            return Ok(());
        }
        let subtype = GridSubtype::from_metadata(msg.metadata())?;
        tracing::info!(%subtype, "grid ready, emitting coordinates");
        let latitudes = self
            .encoder
            .encode_latitudes(subtype)
            .map_err(|e| ActionError::stage(NAME, e))?;
        self.next.forward(latitudes)?;
        let longitudes = self
            .encoder
            .encode_longitudes(subtype)
            .map_err(|e| ActionError::stage(NAME, e))?;
        self.next.forward(longitudes)
    }
}

impl Action for Encode {
    fn name(&self) -> &str {
        NAME
    }

    fn execute(&mut self, msg: Message) -> Result<(), ActionError> {
        match msg.tag() {
            Tag::Coordinate => self.publish_coordinates(&msg),
            Tag::Field => {
                let encoded = self
                    .encoder
                    .encode_field(&msg)
                    .map_err(|e| ActionError::stage(NAME, e))?;
                self.next.forward(encoded)
            }
            _ => self.next.forward(msg),
        }
    }

    fn next(&self) -> Option<&dyn Action> {
        self.next.get()
    }
}
