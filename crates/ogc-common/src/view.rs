//! Immutable snapshot of the map view taken at click time.

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::crs::CrsCode;
use crate::point::MapPoint;

/// Size and extent of the map view in a single CRS.
///
/// A fresh snapshot is passed with every click; nothing holds on to "the
/// current map" between requests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewSnapshot {
    /// Map width in pixels
    pub width: u32,
    /// Map height in pixels
    pub height: u32,
    /// Extent visible on screen, in `crs` units
    pub bbox: BoundingBox,
    pub crs: CrsCode,
}

impl ViewSnapshot {
    pub fn new(width: u32, height: u32, bbox: BoundingBox, crs: CrsCode) -> Self {
        Self {
            width,
            height,
            bbox,
            crs,
        }
    }

    /// Strictly positive pixel size and extent.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.bbox.is_valid()
    }

    /// Container pixel offset of a map point (0,0 is the top-left corner).
    ///
    /// The point is first converted to the view's CRS.
    pub fn pixel_of(&self, point: MapPoint) -> (f64, f64) {
        let p = point.to_crs(self.crs);
        let px = (p.x - self.bbox.min_x) / self.bbox.width() * f64::from(self.width);
        // Y is inverted (top=max, bottom=min)
        let py = (self.bbox.max_y - p.y) / self.bbox.height() * f64::from(self.height);
        (px, py)
    }

    /// Map point under a container pixel offset.
    pub fn point_at(&self, px: f64, py: f64) -> MapPoint {
        let x_ratio = px / f64::from(self.width);
        let y_ratio = py / f64::from(self.height);
        MapPoint::new(
            self.bbox.min_x + x_ratio * self.bbox.width(),
            self.bbox.max_y - y_ratio * self.bbox.height(),
            self.crs,
        )
    }
}
