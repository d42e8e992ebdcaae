//! Grid subtypes of the staggered ocean mesh.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::error::MetadataError;
use crate::metadata::Metadata;

/// One of the staggered (Arakawa C) grid types of the producing model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GridSubtype {
    /// Tracer points.
    T,
    /// Zonal velocity points.
    U,
    /// Meridional velocity points.
    V,
    /// Vertical velocity points.
    W,
    /// Vorticity points.
    F,
}

impl GridSubtype {
    /// Number of subtypes.
    pub const COUNT: usize = 5;

    /// Every subtype, in table order.
    pub const ALL: [GridSubtype; Self::COUNT] = [Self::T, Self::U, Self::V, Self::W, Self::F];

    /// Position of this subtype in [`ALL`](Self::ALL).
    pub fn index(self) -> usize {
        match self {
            Self::T => 0,
            Self::U => 1,
            Self::V => 2,
            Self::W => 3,
            Self::F => 4,
        }
    }

    /// Single-letter code written to encoded output.
    pub fn code(self) -> &'static str {
        match self {
            Self::T => "T",
            Self::U => "U",
            Self::V => "V",
            Self::W => "W",
            Self::F => "F",
        }
    }

    /// Read the `gridSubtype` key of a message's metadata.
    pub fn from_metadata(metadata: &Metadata) -> Result<Self, MetadataError> {
        let raw = metadata.get_str("gridSubtype")?;
        raw.parse().map_err(|_| MetadataError::InvalidValue {
            key: "gridSubtype".to_string(),
            reason: format!("unknown grid subtype '{raw}'"),
        })
    }
}

impl fmt::Display for GridSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} grid", self.code())
    }
}

/// Error returned when a string names no grid subtype.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown grid subtype '{0}'")]
pub struct UnknownSubtype(pub String);

impl FromStr for GridSubtype {
    type Err = UnknownSubtype;

    /// Accepts both `"T"` and `"T grid"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let letter = s.strip_suffix(" grid").unwrap_or(s);
        match letter {
            "T" => Ok(Self::T),
            "U" => Ok(Self::U),
            "V" => Ok(Self::V),
            "W" => Ok(Self::W),
            "F" => Ok(Self::F),
            _ => Err(UnknownSubtype(s.to_string())),
        }
    }
}
