//! WMS GetFeatureInfo request construction.
//!
//! Builds WMS 1.1.1 GetFeatureInfo queries that address the clicked point as
//! a pixel offset inside the visible bounding box.

use ogc_common::{BoundingBox, CrsCode, ViewSnapshot};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::query::{with_params, Query};

/// GetFeatureInfo request parameters
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureInfoRequest {
    /// Layers to query, in candidate order. Sent as both LAYERS and QUERY_LAYERS.
    pub layers: Vec<String>,
    /// Coordinate reference system of `bbox`
    pub crs: CrsCode,
    /// Visible extent
    pub bbox: BoundingBox,
    /// Map width in pixels
    pub width: u32,
    /// Map height in pixels
    pub height: u32,
    /// Pixel column (0-based from left)
    pub x: u32,
    /// Pixel row (0-based from top)
    pub y: u32,
    /// Response format
    pub info_format: InfoFormat,
    /// Maximum number of features to return
    pub feature_count: u32,
}

impl FeatureInfoRequest {
    /// Address `pixel` within `view`. Offsets are rounded to the nearest
    /// integer and kept inside `[0, width]` x `[0, height]`.
    ///
    /// Callers guarantee a non-empty layer list and a view with positive size.
    pub fn from_view(
        view: &ViewSnapshot,
        pixel: (f64, f64),
        layers: &[String],
        feature_count: u32,
    ) -> Self {
        debug_assert!(!layers.is_empty(), "GetFeatureInfo needs at least one layer");
        debug_assert!(view.is_valid(), "GetFeatureInfo needs a non-empty view");

        Self {
            layers: layers.to_vec(),
            crs: view.crs,
            bbox: view.bbox,
            width: view.width,
            height: view.height,
            x: round_pixel(pixel.0, view.width),
            y: round_pixel(pixel.1, view.height),
            info_format: InfoFormat::Gml,
            feature_count,
        }
    }

    /// Query-string parameters in the order they are sent.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let layers = self.layers.join(",");
        vec![
            ("SERVICE", "WMS".to_string()),
            ("VERSION", "1.1.1".to_string()),
            ("REQUEST", "GetFeatureInfo".to_string()),
            ("LAYERS", layers.clone()),
            ("QUERY_LAYERS", layers),
            ("STYLES", String::new()),
            ("SRS", self.crs.to_string()),
            ("BBOX", self.bbox.to_wms_string()),
            ("WIDTH", self.width.to_string()),
            ("HEIGHT", self.height.to_string()),
            ("X", self.x.to_string()),
            ("Y", self.y.to_string()),
            ("INFO_FORMAT", self.info_format.to_mime().to_string()),
            ("FEATURE_COUNT", self.feature_count.to_string()),
        ]
    }

    pub fn to_query(&self, endpoint: &Url) -> Query {
        Query::get(with_params(endpoint, self.to_params()))
    }
}

/// Build a GetFeatureInfo GET query for the clicked pixel of `view`.
pub fn build_feature_info_query(
    endpoint: &Url,
    view: &ViewSnapshot,
    pixel: (f64, f64),
    layers: &[String],
    feature_count: u32,
) -> Query {
    FeatureInfoRequest::from_view(view, pixel, layers, feature_count).to_query(endpoint)
}

fn round_pixel(offset: f64, extent: u32) -> u32 {
    if !offset.is_finite() {
        return 0;
    }
    offset.round().clamp(0.0, f64::from(extent)) as u32
}

/// GetFeatureInfo response formats the parser understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
pub enum InfoFormat {
    /// application/vnd.ogc.gml - GML feature collection
    #[serde(rename = "application/vnd.ogc.gml")]
    #[default]
    Gml,
    /// application/json - GeoJSON FeatureCollection
    #[serde(rename = "application/json")]
    Json,
    /// text/xml - generic XML (GML without the vendor MIME type)
    #[serde(rename = "text/xml")]
    Xml,
}

impl InfoFormat {
    /// Parse from a MIME type or Content-Type header value (parameters ignored)
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_lowercase().as_str() {
            "application/vnd.ogc.gml" | "application/gml+xml" => Some(InfoFormat::Gml),
            "application/json" | "application/geo+json" => Some(InfoFormat::Json),
            "text/xml" | "application/xml" => Some(InfoFormat::Xml),
            _ => None,
        }
    }

    /// Get MIME type string
    pub fn to_mime(&self) -> &'static str {
        match self {
            InfoFormat::Gml => "application/vnd.ogc.gml",
            InfoFormat::Json => "application/json",
            InfoFormat::Xml => "text/xml",
        }
    }
}
