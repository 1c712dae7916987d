//! Classification of response bodies before parsing.
//!
//! Some upstream servers answer GetFeatureInfo with a base64-encoded XML
//! document (typically an exception report) and still send HTTP 200. The
//! encoding is recognized by the base64 form of `<?xml`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ogc_common::DiscoveryError;

use crate::getfeatureinfo::InfoFormat;

/// Base64 encoding of the `<?xml` prologue.
pub const BASE64_XML_SIGNATURE: &str = "PD94bWw";

/// How a response body must be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// GeoJSON-style FeatureCollection
    Json,
    /// GML / XML text
    PlainXml,
    /// XML document wrapped in base64
    Base64Xml,
}

/// Decide how to read `body`, given the response Content-Type if there was one.
///
/// The body decides whenever it can: the base64 signature, a leading `<` and a
/// leading `{` or `[` each settle the kind regardless of the header. The
/// header only breaks the tie for bodies that look like none of these.
pub fn classify(content_type: Option<&str>, body: &str) -> ContentKind {
    let trimmed = body.trim_start();
    if trimmed.starts_with(BASE64_XML_SIGNATURE) {
        return ContentKind::Base64Xml;
    }
    if trimmed.starts_with('<') {
        return ContentKind::PlainXml;
    }
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return ContentKind::Json;
    }

    let json_header = content_type
        .and_then(InfoFormat::from_mime)
        .is_some_and(|f| f == InfoFormat::Json);
    if json_header {
        ContentKind::Json
    } else {
        ContentKind::PlainXml
    }
}

/// Decode a [`ContentKind::Base64Xml`] body into XML text.
///
/// Documents declaring ISO-8859-1 are decoded byte for byte. Any other
/// non-UTF-8 payload is decoded lossily so an exception report inside it is
/// still recognized.
pub fn decode_base64_xml(body: &str) -> Result<String, DiscoveryError> {
    let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| DiscoveryError::Parse(format!("invalid base64 body: {e}")))?;

    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => decode_legacy(e.into_bytes()),
    })
}

fn decode_legacy(bytes: Vec<u8>) -> String {
    let latin1 = declared_encoding(&bytes).is_some_and(|label| {
        matches!(
            label.as_str(),
            "iso-8859-1" | "iso8859-1" | "iso_8859-1" | "latin1" | "latin-1" | "l1"
        )
    });
    if latin1 {
        bytes.into_iter().map(char::from).collect()
    } else {
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// Lowercased `encoding` label from the XML declaration, if any.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(128)]);
    let decl = head.strip_prefix("<?xml")?;
    let decl = &decl[..decl.find("?>")?];
    let value = &decl[decl.find("encoding=")? + "encoding=".len()..];
    let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &value[1..];
    let end = value.find(quote)?;
    Some(value[..end].trim().to_ascii_lowercase())
}
