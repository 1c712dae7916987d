//! Response Parser entry point: raw body in, feature or classified error out.

use ogc_common::{DiscoveryError, ParsedFeature};
use serde_json::Value;
use tracing::debug;

use crate::content::{classify, decode_base64_xml, ContentKind};
use crate::exceptions::{find_json_exception, find_service_exception};
use crate::{gml, json, xml};

/// Turn a WMS/WFS response body into at most one feature.
///
/// Malformed bodies are read as "no feature" (`Ok(None)`). The only error is
/// [`DiscoveryError::ServiceException`], raised whenever the body is, or
/// base64-decodes to, an exception report.
pub fn parse_feature_response(
    content_type: Option<&str>,
    body: &str,
) -> Result<Option<ParsedFeature>, DiscoveryError> {
    match classify(content_type, body) {
        ContentKind::Json => parse_json(body),
        ContentKind::PlainXml => parse_xml(body),
        ContentKind::Base64Xml => match decode_base64_xml(body) {
            Ok(decoded) => parse_xml(&decoded),
            Err(e) => {
                debug!(error = %e, "Discarding undecodable base64 body");
                Ok(None)
            }
        },
    }
}

fn parse_xml(body: &str) -> Result<Option<ParsedFeature>, DiscoveryError> {
    let root = match xml::parse_document(body) {
        Ok(root) => root,
        Err(e) => {
            debug!(error = %e, "Discarding malformed XML body");
            return Ok(None);
        }
    };

    if let Some(message) = find_service_exception(&root) {
        return Err(DiscoveryError::ServiceException(message));
    }

    Ok(gml::parse_feature_member(&root))
}

fn parse_json(body: &str) -> Result<Option<ParsedFeature>, DiscoveryError> {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "Discarding malformed JSON body");
            return Ok(None);
        }
    };

    if let Some(message) = find_json_exception(&value) {
        return Err(DiscoveryError::ServiceException(message));
    }

    Ok(json::parse_feature_collection(&value))
}
