//! GetFeatureInfo `application/json` responses.

use ogc_common::{ParsedFeature, Properties};
use serde_json::{json, Value};

/// First feature of a FeatureCollection-shaped document.
///
/// The typename is the part of the feature `id` before the first `.`; the full
/// id is kept as the fid. A feature without an id cannot be attributed to a
/// type and counts as no feature.
pub fn parse_feature_collection(value: &Value) -> Option<ParsedFeature> {
    let feature = value.get("features")?.as_array()?.first()?;
    let id = feature.get("id").and_then(id_string)?;
    let typename = id.split('.').next().unwrap_or_default();
    if typename.is_empty() {
        return None;
    }

    let mut parsed = ParsedFeature::new(typename);
    parsed.fid = Some(id);
    parsed.props = feature
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .filter_map(|(k, v)| property_string(v).map(|s| (k.clone(), s)))
                .collect()
        })
        .unwrap_or_else(Properties::new);

    if let Some(geometry) = feature.get("geometry").filter(|g| g.is_object()) {
        parsed.point = point_coordinates(geometry);
        parsed.geojson = Some(json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": parsed.props,
        }));
    }

    Some(parsed)
}

fn id_string(id: &Value) -> Option<String> {
    match id {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn property_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn point_coordinates(geometry: &Value) -> Option<[f64; 2]> {
    if geometry.get("type")?.as_str()? != "Point" {
        return None;
    }
    let coords = geometry.get("coordinates")?.as_array()?;
    Some([coords.first()?.as_f64()?, coords.get(1)?.as_f64()?])
}
