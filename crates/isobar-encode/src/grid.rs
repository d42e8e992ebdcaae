//! Grid identity cache.
//!
//! Every field on an unstructured ocean grid references its mesh by a
//! content hash of the mesh's latitude and longitude arrays instead of
//! repeating the arrays. [`GridCache`] memoizes that hash once per
//! [`GridSubtype`].
//!
//! # Readiness
//!
//! A subtype becomes *ready* when both coordinate arrays have arrived and
//! the hash has been computed. Readiness is edge-triggered:
//! [`GridCache::set_grid_info`] returns `true` only on the call that
//! completes the pair. Grids do not change during a run, so publishing
//! coordinates for a ready subtype is a precondition violation.
//!
//! Writes are expected during a single-threaded warm-up phase; once a
//! subtype is ready its entry is immutable and safe for any number of
//! concurrent readers.

use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use isobar_core::{GridSubtype, Message};

use crate::error::GridError;

/// Metadata key naming the coordinate parameter of a coordinate message.
pub const COORDINATE_PARAM_KEY: &str = "nemoParam";

/// Width in bytes of a grid identity hash.
pub const HASH_LEN: usize = 16;

/// Content hash identifying one grid's coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridHash([u8; HASH_LEN]);

impl GridHash {
    /// Hash latitude bytes followed by longitude bytes.
    pub fn compute(latitudes: &[u8], longitudes: &[u8]) -> Self {
        let mut ctx = md5::Context::new();
        ctx.consume(latitudes);
        ctx.consume(longitudes);
        Self(ctx.compute().0)
    }

    /// The raw digest.
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }
}

impl fmt::Display for GridHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Which coordinate array a message carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Latitudes.
    Latitude,
    /// Longitudes.
    Longitude,
}

impl Axis {
    /// Classify a coordinate parameter name (`lat_T`, `lon_U`, ...).
    pub fn from_param(param: &str) -> Option<Axis> {
        Self::split_param(param).map(|(axis, _)| axis)
    }

    /// Classify a coordinate parameter name and return the subtype it names.
    pub fn split_param(param: &str) -> Option<(Axis, GridSubtype)> {
        let (prefix, subtype) = param.split_once('_')?;
        let subtype = subtype.parse::<GridSubtype>().ok()?;
        match prefix {
            "lat" => Some((Axis::Latitude, subtype)),
            "lon" => Some((Axis::Longitude, subtype)),
            _ => None,
        }
    }
}

/// Coordinates and identity of one grid subtype.
#[derive(Clone, Debug, Default)]
pub struct GridInfo {
    latitudes: Option<Message>,
    longitudes: Option<Message>,
    hash: Option<GridHash>,
}

impl GridInfo {
    /// An empty entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the latitude array.
    pub fn set_latitudes(&mut self, msg: Message) {
        self.latitudes = Some(msg);
    }

    /// Store the longitude array.
    pub fn set_longitudes(&mut self, msg: Message) {
        self.longitudes = Some(msg);
    }

    /// Stored latitudes, if any.
    pub fn latitudes(&self) -> Option<&Message> {
        self.latitudes.as_ref()
    }

    /// Stored longitudes, if any.
    pub fn longitudes(&self) -> Option<&Message> {
        self.longitudes.as_ref()
    }

    /// Compute the hash if both arrays are present and it does not exist yet.
    ///
    /// Returns `true` only when this call produced the hash.
    pub fn compute_hash_if_can(&mut self) -> bool {
        if self.hash.is_some() {
            return false;
        }
        match (&self.latitudes, &self.longitudes) {
            (Some(lat), Some(lon)) => {
                self.hash = Some(GridHash::compute(
                    lat.payload().as_bytes(),
                    lon.payload().as_bytes(),
                ));
                true
            }
            _ => false,
        }
    }

    /// The identity hash, once computed.
    pub fn hash(&self) -> Option<GridHash> {
        self.hash
    }

    /// Whether the hash exists.
    pub fn is_ready(&self) -> bool {
        self.hash.is_some()
    }
}

/// One [`GridInfo`] per [`GridSubtype`], shared by every pipeline.
#[derive(Debug)]
pub struct GridCache {
    grids: [RwLock<GridInfo>; GridSubtype::COUNT],
}

impl GridCache {
    /// A cache with every subtype empty.
    pub fn new() -> Self {
        Self {
            grids: std::array::from_fn(|_| RwLock::new(GridInfo::new())),
        }
    }

    fn read(&self, subtype: GridSubtype) -> RwLockReadGuard<'_, GridInfo> {
        self.grids[subtype.index()]
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, subtype: GridSubtype) -> RwLockWriteGuard<'_, GridInfo> {
        self.grids[subtype.index()]
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a coordinate message and compute the hash when the pair completes.
    ///
    /// Returns `true` exactly when this call made the subtype ready.
    ///
    /// # Errors
    ///
    /// - [`GridError::AlreadyReady`] if the subtype's hash already exists.
    /// - [`GridError::UnknownCoordinate`] if `nemoParam` is not a latitude
    ///   or longitude parameter of the message's own subtype.
    /// - [`GridError::Metadata`] if `gridSubtype` or `nemoParam` is missing.
    pub fn set_grid_info(&self, msg: &Message) -> Result<bool, GridError> {
        let subtype = GridSubtype::from_metadata(msg.metadata())?;
        let param = msg.metadata().get_str(COORDINATE_PARAM_KEY)?;
        let axis = match Axis::split_param(param) {
            Some((axis, named)) if named == subtype => axis,
            _ => {
                return Err(GridError::UnknownCoordinate {
                    param: param.to_string(),
                })
            }
        };

        let mut info = self.write(subtype);
        if info.is_ready() {
            return Err(GridError::AlreadyReady { subtype });
        }

        match axis {
            Axis::Latitude => {
                if info.latitudes().is_some() {
                    tracing::warn!(%subtype, param, "replacing latitudes before grid is ready");
                }
                info.set_latitudes(msg.clone());
            }
            Axis::Longitude => {
                if info.longitudes().is_some() {
                    tracing::warn!(%subtype, param, "replacing longitudes before grid is ready");
                }
                info.set_longitudes(msg.clone());
            }
        }

        let ready = info.compute_hash_if_can();
        if ready {
            if let Some(hash) = info.hash() {
                tracing::info!(%subtype, %hash, "grid identity computed");
            }
        }
        Ok(ready)
    }

    /// Whether the subtype's hash exists.
    pub fn is_ready(&self, subtype: GridSubtype) -> bool {
        self.read(subtype).is_ready()
    }

    /// The subtype's identity hash.
    pub fn hash_value(&self, subtype: GridSubtype) -> Result<GridHash, GridError> {
        self.read(subtype)
            .hash()
            .ok_or(GridError::NotReady { subtype })
    }

    /// The subtype's latitude message. Only available once ready.
    pub fn latitudes(&self, subtype: GridSubtype) -> Result<Message, GridError> {
        let info = self.read(subtype);
        match (info.is_ready(), info.latitudes()) {
            (true, Some(msg)) => Ok(msg.clone()),
            _ => Err(GridError::NotReady { subtype }),
        }
    }

    /// The subtype's longitude message. Only available once ready.
    pub fn longitudes(&self, subtype: GridSubtype) -> Result<Message, GridError> {
        let info = self.read(subtype);
        match (info.is_ready(), info.longitudes()) {
            (true, Some(msg)) => Ok(msg.clone()),
            _ => Err(GridError::NotReady { subtype }),
        }
    }
}

impl Default for GridCache {
    fn default() -> Self {
        Self::new()
    }
}
