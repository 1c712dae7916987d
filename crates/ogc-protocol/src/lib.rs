//! OGC request construction and response parsing for feature discovery.
//!
//! Supports only the request shapes the discovery client issues:
//! - WMS 1.1.1 GetFeatureInfo (GML or JSON info format)
//! - WFS 1.1.0 GetFeature by bounding box or by feature id
//! - ZWS GetLayerList over three transports
//!
//! Everything here is pure: builders return [`Query`] values and parsers work
//! on response text. Issuing requests is the caller's concern.

pub mod content;
pub mod exceptions;
pub mod getfeature;
pub mod getfeatureinfo;
pub mod gml;
pub mod json;
pub mod query;
pub mod response;
pub mod xml;
pub mod zws;

pub use content::{classify, ContentKind};
pub use getfeature::{build_feature_by_id_query, build_spatial_query, SpatialTolerance};
pub use getfeatureinfo::{build_feature_info_query, FeatureInfoRequest, InfoFormat};
pub use query::{HttpMethod, Query};
pub use response::parse_feature_response;
pub use zws::{build_layer_list_query, parse_layer_list, LayerListStrategy};
