//! Shared services handed to the built-in stages.

use std::sync::Arc;

use isobar_encode::{CodecFactory, GridCache, KeyValueCodecFactory};
use isobar_sink::{SinkFactory, StandardSinks};

/// Services shared by every stage built from one registration.
///
/// The grid cache in particular must be the same instance for every
/// pipeline encoding fields on the same grids.
#[derive(Clone)]
pub struct PipelineContext {
    /// Grid identities shared across pipelines.
    pub grids: Arc<GridCache>,
    /// Codec used by `encode` stages.
    pub codecs: Arc<dyn CodecFactory>,
    /// Storage opened by `sink` stages.
    pub sinks: Arc<dyn SinkFactory>,
}

impl PipelineContext {
    /// Bundle the given services.
    pub fn new(
        grids: Arc<GridCache>,
        codecs: Arc<dyn CodecFactory>,
        sinks: Arc<dyn SinkFactory>,
    ) -> Self {
        Self {
            grids,
            codecs,
            sinks,
        }
    }
}

impl Default for PipelineContext {
    /// A fresh grid cache, the key/value codec and the standard sinks.
    fn default() -> Self {
        Self::new(
            Arc::new(GridCache::new()),
            Arc::new(KeyValueCodecFactory::new()),
            Arc::new(StandardSinks::new()),
        )
    }
}

impl std::fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineContext").finish_non_exhaustive()
    }
}
