//! Coordinate Reference System codes understood by the discovery client.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two CRS codes a map view can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// Web Mercator (meters). GetFeatureInfo is addressed by pixel within a projected bbox.
    #[serde(rename = "EPSG:3857")]
    Epsg3857,
    /// WGS84 Geographic (degrees, lon/lat axis order in WMS 1.1.1)
    #[serde(rename = "EPSG:4326")]
    Epsg4326,
}

impl CrsCode {
    /// Parse a CRS string as it appears in an SRS/CRS request parameter.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326"
    /// - "epsg:3857"
    /// - "CRS:84" (equivalent to EPSG:4326 with lon/lat axis order)
    /// - "EPSG:900913" (legacy alias of EPSG:3857)
    pub fn from_wms_string(s: &str) -> Result<Self, CrsParseError> {
        let normalized = s.trim().to_uppercase();

        match normalized.as_str() {
            "EPSG:4326" | "CRS:84" => Ok(CrsCode::Epsg4326),
            "EPSG:3857" | "EPSG:900913" => Ok(CrsCode::Epsg3857),
            _ => Err(CrsParseError::UnsupportedCrs(s.to_string())),
        }
    }

    /// The code string sent as `SRS`.
    pub fn as_str(&self) -> &'static str {
        match self {
            CrsCode::Epsg3857 => "EPSG:3857",
            CrsCode::Epsg4326 => "EPSG:4326",
        }
    }

    /// Check if this is a geographic (lon/lat) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, CrsCode::Epsg4326)
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CrsCode {
    type Err = CrsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wms_string(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),
}
