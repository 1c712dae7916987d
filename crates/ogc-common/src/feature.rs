//! Feature shapes produced by parsing OGC responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Attribute name to trimmed text value.
pub type Properties = BTreeMap<String, String>;

/// One feature parsed out of a WMS/WFS response. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedFeature {
    /// Qualified feature type, e.g. `openlayers:teploset`
    pub typename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fid: Option<String>,
    pub props: Properties,
    /// Point geometry as `[longitude, latitude]` (GML axis order)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<[f64; 2]>,
    /// Minimal GeoJSON Feature carrying the geometry and properties
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geojson: Option<Value>,
}

impl ParsedFeature {
    pub fn new(typename: impl Into<String>) -> Self {
        Self {
            typename: typename.into(),
            fid: None,
            props: Properties::new(),
            point: None,
            geojson: None,
        }
    }

    /// Whether the response carried any geometry.
    pub fn has_geometry(&self) -> bool {
        self.geojson.is_some()
    }
}

/// The canonical, CRS-independent result of one click.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundFeature {
    pub typename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fid: Option<String>,
    /// Clicked location as `[longitude, latitude]`
    pub coordinate: [f64; 2],
    pub props: Properties,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geojson: Option<Value>,
}

impl FoundFeature {
    /// Build the published result from a parsed feature and the clicked location.
    pub fn from_parsed(parsed: ParsedFeature, coordinate: [f64; 2]) -> Self {
        Self {
            typename: parsed.typename,
            fid: parsed.fid,
            coordinate,
            props: parsed.props,
            geojson: parsed.geojson,
        }
    }
}

/// Minimal GeoJSON Point Feature.
pub fn point_feature(coordinates: [f64; 2], props: &Properties) -> Value {
    json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": coordinates },
        "properties": props,
    })
}
