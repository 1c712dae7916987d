//! Map coordinates tagged with the CRS they are expressed in.

use serde::{Deserialize, Serialize};

use crate::crs::CrsCode;
use crate::mercator;

/// A single map coordinate. `x`/`y` are easting/northing in EPSG:3857 and
/// longitude/latitude in EPSG:4326.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
    pub crs: CrsCode,
}

impl MapPoint {
    pub fn new(x: f64, y: f64, crs: CrsCode) -> Self {
        Self { x, y, crs }
    }

    /// A geographic point from longitude and latitude in degrees.
    pub fn lon_lat(lon: f64, lat: f64) -> Self {
        Self::new(lon, lat, CrsCode::Epsg4326)
    }

    /// Re-express the point in another CRS. Identity when the CRS already matches.
    pub fn to_crs(self, target: CrsCode) -> Self {
        match (self.crs, target) {
            (CrsCode::Epsg3857, CrsCode::Epsg4326) => {
                let (lon, lat) = mercator::inverse(self.x, self.y);
                Self::new(lon, lat, target)
            }
            (CrsCode::Epsg4326, CrsCode::Epsg3857) => {
                let (x, y) = mercator::forward(self.x, self.y);
                Self::new(x, y, target)
            }
            _ => self,
        }
    }

    /// Geographic `[longitude, latitude]` pair regardless of the source CRS.
    pub fn to_lon_lat(self) -> [f64; 2] {
        let geo = self.to_crs(CrsCode::Epsg4326);
        [geo.x, geo.y]
    }
}
