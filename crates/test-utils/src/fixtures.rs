//! Common response fixtures for feature-discovery tests.
//!
//! Bodies mirror what a GeoServer-style WMS/WFS and the ZWS catalog return,
//! including the failure shapes that arrive with HTTP 200.

/// Layer names used across the test suites.
pub mod layers {
    pub const TEPLOSET: &str = "openlayers:teploset";
    pub const THERMO: &str = "mo:thermo";
    pub const VP: &str = "mo:vp";

    /// The default candidate list, in query order.
    pub const DEFAULTS: [&str; 3] = [TEPLOSET, THERMO, VP];
}

/// Views matching the area the sample data covers.
pub mod views {
    /// EPSG:4326 extent around the sample network, (minx, miny, maxx, maxy).
    pub const GEOGRAPHIC_BBOX: (f64, f64, f64, f64) = (39.80, 64.54, 39.85, 64.57);

    /// Map size in pixels.
    pub const SIZE: (u32, u32) = (1024, 768);
}

/// Canned WMS/WFS/ZWS response bodies.
pub mod responses {
    /// GetFeatureInfo GML with one feature, a point and a blank attribute.
    pub const FEATURE_INFO_GML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<wfs:FeatureCollection xmlns:wfs="http://www.opengis.net/wfs"
    xmlns:gml="http://www.opengis.net/gml"
    xmlns:openlayers="http://openlayers.org">
  <gml:featureMember>
    <openlayers:teploset gml:id="teploset.1042">
      <gml:boundedBy><gml:Envelope><gml:lowerCorner>37.4 55.6</gml:lowerCorner></gml:Envelope></gml:boundedBy>
      <openlayers:name>  Магистраль 3  </openlayers:name>
      <openlayers:diameter>530</openlayers:diameter>
      <openlayers:comment>   </openlayers:comment>
      <openlayers:geom>
        <gml:Point srsName="EPSG:4326"><gml:pos>37.5 55.7</gml:pos></gml:Point>
      </openlayers:geom>
    </openlayers:teploset>
  </gml:featureMember>
  <gml:featureMember>
    <openlayers:teploset gml:id="teploset.1043">
      <openlayers:name>second</openlayers:name>
    </openlayers:teploset>
  </gml:featureMember>
</wfs:FeatureCollection>"#;

    /// WFS GetFeature GML 2 output: `fid` attribute and comma-separated `gml:pos`.
    pub const WFS_POINT_GML2: &str = r#"<wfs:FeatureCollection xmlns:wfs="http://www.opengis.net/wfs" xmlns:gml="http://www.opengis.net/gml" xmlns:mo="http://mo">
  <gml:featureMember>
    <mo:thermo fid="thermo.5">
      <mo:title>Котельная</mo:title>
      <mo:the_geom><gml:Point><gml:pos>39.82,64.55</gml:pos></gml:Point></mo:the_geom>
    </mo:thermo>
  </gml:featureMember>
</wfs:FeatureCollection>"#;

    /// A collection with no members.
    pub const EMPTY_COLLECTION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<wfs:FeatureCollection xmlns:wfs="http://www.opengis.net/wfs" xmlns:gml="http://www.opengis.net/gml"/>"#;

    /// Exception report returned with HTTP 200.
    pub const EXCEPTION_REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ServiceExceptionReport version="1.1.1">
  <ServiceException code="InvalidSRS">
    SRS EPSG:4326 is not supported by layer mo:thermo
  </ServiceException>
</ServiceExceptionReport>"#;

    /// The same kind of report, base64 encoded.
    /// Decodes to a `LayerNotDefined` exception for `mo:unknown`.
    pub const EXCEPTION_REPORT_BASE64: &str = "PD94bWwgdmVyc2lvbj0iMS4wIiBlbmNvZGluZz0iVVRGLTgiPz48U2VydmljZUV4Y2VwdGlvblJlcG9ydCB2ZXJzaW9uPSIxLjEuMSI+PFNlcnZpY2VFeGNlcHRpb24gY29kZT0iTGF5ZXJOb3REZWZpbmVkIj5MYXllciBtbzp1bmtub3duIGlzIG5vdCBkZWZpbmVkPC9TZXJ2aWNlRXhjZXB0aW9uPjwvU2VydmljZUV4Y2VwdGlvblJlcG9ydD4=";

    /// Base64-encoded feature collection holding one `mo:vp` feature named "Pump".
    pub const FEATURE_GML_BASE64: &str = "PD94bWwgdmVyc2lvbj0iMS4wIiBlbmNvZGluZz0iVVRGLTgiPz48d2ZzOkZlYXR1cmVDb2xsZWN0aW9uIHhtbG5zOndmcz0iaHR0cDovL3d3dy5vcGVuZ2lzLm5ldC93ZnMiIHhtbG5zOmdtbD0iaHR0cDovL3d3dy5vcGVuZ2lzLm5ldC9nbWwiIHhtbG5zOm1vPSJodHRwOi8vbW8iPjxnbWw6ZmVhdHVyZU1lbWJlcj48bW86dnAgZ21sOmlkPSJ2cC43Ij48bW86bmFtZT5QdW1wPC9tbzpuYW1lPjwvbW86dnA+PC9nbWw6ZmVhdHVyZU1lbWJlcj48L3dmczpGZWF0dXJlQ29sbGVjdGlvbj4=";

    /// GetFeatureInfo as application/json.
    pub const FEATURE_INFO_JSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "id": "vp.17",
      "geometry": { "type": "Point", "coordinates": [39.83, 64.56] },
      "properties": { "name": "Колодец", "depth": 2.5, "note": null }
    }
  ]
}"#;

    /// JSON with an empty feature list.
    pub const EMPTY_JSON: &str = r#"{"type":"FeatureCollection","features":[]}"#;

    /// ZWS GetLayerList response.
    pub const LAYER_LIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<zwsResponse>
  <GetLayerList>
    <Layer><Name>example:demo</Name><Title>Demo</Title></Layer>
    <Layer><Name>mo:heat</Name><Title>Heat network</Title></Layer>
    <Layer><Name></Name><Title>Broken entry</Title></Layer>
    <Layer><Name>mo:water</Name></Layer>
  </GetLayerList>
</zwsResponse>"#;

    /// A ZWS response that carries the marker but no usable layers.
    pub const LAYER_LIST_EMPTY: &str =
        "<zwsResponse><GetLayerList><Layer><Name> </Name></Layer></GetLayerList></zwsResponse>";
}
