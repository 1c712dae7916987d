//! GML feature extraction from GetFeatureInfo / GetFeature responses.

use ogc_common::{point_feature, ParsedFeature, Properties};

use crate::xml::XmlElement;

/// First feature of a GML feature collection, or `None` when there is no
/// `featureMember`.
///
/// The feature's qualified tag becomes the typename, `gml:id` (or the GML 2
/// `fid` attribute) the feature id. Every non-GML child element contributes
/// a property keyed by local name, unless its trimmed text is empty. A
/// `gml:Point` position, read in lon/lat order, yields a GeoJSON Point.
pub fn parse_feature_member(root: &XmlElement) -> Option<ParsedFeature> {
    let feature = first_feature_node(root)?;

    let mut parsed = ParsedFeature::new(feature.name.clone());
    parsed.fid = feature
        .attribute("gml:id")
        .or_else(|| feature.attribute("fid"))
        .filter(|id| !id.is_empty())
        .map(str::to_string);
    parsed.props = extract_properties(feature);

    if let Some(point) = point_position(feature) {
        parsed.geojson = Some(point_feature(point, &parsed.props));
        parsed.point = Some(point);
    }

    Some(parsed)
}

fn first_feature_node(root: &XmlElement) -> Option<&XmlElement> {
    // GML 2/3 `featureMember` holds one feature, GML 3 `featureMembers` many.
    let member = std::iter::once(root)
        .chain(root.descendants())
        .find(|e| e.is_gml() && matches!(e.local_name.as_str(), "featureMember" | "featureMembers"))?;
    member.child_elements().next()
}

fn extract_properties(feature: &XmlElement) -> Properties {
    feature
        .child_elements()
        .filter(|child| !child.is_gml())
        .filter_map(|child| {
            let value = child.text_content().trim().to_string();
            (!value.is_empty()).then(|| (child.local_name.clone(), value))
        })
        .collect()
}

fn point_position(feature: &XmlElement) -> Option<[f64; 2]> {
    let point = feature.find_gml("Point");
    let pos = match point {
        Some(p) => p.find_gml("pos").or_else(|| p.find_gml("coordinates")),
        None => feature.find_gml("pos"),
    }?;
    parse_pair(&pos.text_content())
}

/// Two numbers separated by spaces and/or commas.
fn parse_pair(text: &str) -> Option<[f64; 2]> {
    let mut numbers = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::parse::<f64>);
    let x = numbers.next()?.ok()?;
    let y = numbers.next()?.ok()?;
    Some([x, y])
}
