//! WFS 1.1.0 GetFeature request construction.

use ogc_common::{BoundingBox, CrsCode, MapPoint};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::query::{with_params, Query};

/// Half-width of the box a spatial WFS lookup searches around a click.
///
/// The two values are tuned per CRS rather than derived from a shared ground
/// distance: 5 units is meters in EPSG:3857, degrees need a far smaller number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialTolerance {
    /// EPSG:3857 half-width in projected units
    #[serde(default = "default_projected")]
    pub projected: f64,
    /// EPSG:4326 half-width in degrees
    #[serde(default = "default_geographic")]
    pub geographic: f64,
}

fn default_projected() -> f64 {
    5.0
}

fn default_geographic() -> f64 {
    0.00005
}

impl Default for SpatialTolerance {
    fn default() -> Self {
        Self {
            projected: default_projected(),
            geographic: default_geographic(),
        }
    }
}

impl SpatialTolerance {
    pub fn half_width(&self, crs: CrsCode) -> f64 {
        match crs {
            CrsCode::Epsg3857 => self.projected,
            CrsCode::Epsg4326 => self.geographic,
        }
    }

    /// Search box around `point`, in the point's own CRS.
    pub fn bbox_around(&self, point: MapPoint) -> BoundingBox {
        BoundingBox::around(point.x, point.y, self.half_width(point.crs))
    }
}

fn base_params(type_name: &str) -> Vec<(&'static str, String)> {
    vec![
        ("service", "WFS".to_string()),
        ("version", "1.1.0".to_string()),
        ("request", "GetFeature".to_string()),
        ("typeName", type_name.to_string()),
    ]
}

/// GetFeature for the first feature of `type_name` within a small box around `point`.
///
/// The bbox carries the point's CRS as its fifth element.
pub fn build_spatial_query(
    endpoint: &Url,
    point: MapPoint,
    type_name: &str,
    tolerance: &SpatialTolerance,
) -> Query {
    let bbox = tolerance.bbox_around(point);
    let mut params = base_params(type_name);
    params.push(("bbox", format!("{},{}", bbox.to_wms_string(), point.crs)));
    params.push(("maxFeatures", "1".to_string()));
    Query::get(with_params(endpoint, params))
}

/// GetFeature for a single feature by id.
pub fn build_feature_by_id_query(endpoint: &Url, type_name: &str, fid: &str) -> Query {
    let mut params = base_params(type_name);
    params.push(("featureId", fid.to_string()));
    Query::get(with_params(endpoint, params))
}
