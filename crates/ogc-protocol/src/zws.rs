//! ZWS layer catalog: GetLayerList requests and response parsing.
//!
//! The ZWS endpoint has been seen to answer GetLayerList over three different
//! transports, so each one is a separate [`LayerListStrategy`].

use ogc_common::LayerDescriptor;
use url::Url;

use crate::query::{with_params, Query};
use crate::xml;

/// XML command body for the POST transport.
pub const LAYER_LIST_REQUEST_BODY: &str =
    r#"<?xml version="1.0" encoding="UTF-8"?><zwsRequest><GetLayerList/></zwsRequest>"#;

/// Header naming the action for the POST transport.
pub const ACTION_HEADER: &str = "SOAPAction";

/// Transports for GetLayerList, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerListStrategy {
    /// `GET {endpoint}/GetLayerList` with `Accept: text/xml`
    RestGet,
    /// `POST {endpoint}` with an XML command body
    XmlPost,
    /// `GET {endpoint}?Action=GetLayerList`
    QueryParamGet,
}

impl LayerListStrategy {
    pub const ALL: [LayerListStrategy; 3] = [
        LayerListStrategy::RestGet,
        LayerListStrategy::XmlPost,
        LayerListStrategy::QueryParamGet,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LayerListStrategy::RestGet => "rest-get",
            LayerListStrategy::XmlPost => "xml-post",
            LayerListStrategy::QueryParamGet => "query-param-get",
        }
    }
}

/// Build the GetLayerList request for one transport.
pub fn build_layer_list_query(endpoint: &Url, strategy: LayerListStrategy) -> Query {
    match strategy {
        LayerListStrategy::RestGet => {
            let mut url = endpoint.clone();
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty().push("GetLayerList");
            }
            Query::get(url).with_header("Accept", "text/xml")
        }
        LayerListStrategy::XmlPost => Query::post(endpoint.clone(), LAYER_LIST_REQUEST_BODY)
            .with_header("Content-Type", "text/xml")
            .with_header(ACTION_HEADER, "GetLayerList"),
        LayerListStrategy::QueryParamGet => Query::get(with_params(
            endpoint,
            [("Action", "GetLayerList".to_string())],
        )),
    }
}

/// Whether a body looks like a GetLayerList answer at all.
pub fn has_layer_list_marker(body: &str) -> bool {
    body.to_ascii_lowercase().contains("<getlayerlist")
}

/// Layers listed in a GetLayerList response.
///
/// `None` when the body lacks the GetLayerList marker or is not XML. Entries
/// with an empty name are dropped, so `Some` may still hold an empty list.
pub fn parse_layer_list(body: &str) -> Option<Vec<LayerDescriptor>> {
    if !has_layer_list_marker(body) {
        return None;
    }
    let root = xml::parse_document(body).ok()?;

    let layers = std::iter::once(&root)
        .chain(root.descendants())
        .filter(|e| e.local_name == "Layer")
        .filter_map(|layer| {
            let name = layer
                .find_local("Name")
                .map(|n| n.text_content().trim().to_string())
                .unwrap_or_default();
            let title = layer
                .find_local("Title")
                .map(|t| t.text_content().trim().to_string())
                .unwrap_or_default();
            (!name.is_empty()).then(|| LayerDescriptor::new(name, title))
        })
        .collect();

    Some(layers)
}
