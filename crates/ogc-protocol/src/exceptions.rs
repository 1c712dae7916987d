//! Detection of exception reports embedded in successful responses.
//!
//! WMS servers return `ServiceExceptionReport` documents with HTTP 200, and
//! WFS 1.1.0 answers with an OWS `ExceptionReport`. Both must surface as a
//! service exception rather than an empty result.

use serde_json::Value;

use crate::xml::XmlElement;

const UNKNOWN_ERROR: &str = "Unknown WMS error";

/// Message of the exception report contained in `root`, if any.
pub fn find_service_exception(root: &XmlElement) -> Option<String> {
    if root.contains_local("ServiceExceptionReport") || root.contains_local("ServiceException") {
        let message = std::iter::once(root)
            .chain(root.descendants())
            .find(|e| e.local_name == "ServiceException")
            .map(|e| e.text_content().trim().to_string());
        return Some(non_empty_or_unknown(message));
    }

    if root.local_name == "ExceptionReport" {
        let message = root
            .find_local("ExceptionText")
            .map(|e| e.text_content().trim().to_string());
        return Some(non_empty_or_unknown(message));
    }

    None
}

/// Message of a GeoServer-style JSON exception body (`{"exceptions":[{"text":..}]}`).
pub fn find_json_exception(value: &Value) -> Option<String> {
    let exceptions = value.get("exceptions")?.as_array()?;
    let message = exceptions
        .first()
        .and_then(|e| e.get("text"))
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string());
    Some(non_empty_or_unknown(message))
}

fn non_empty_or_unknown(message: Option<String>) -> String {
    message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
}
