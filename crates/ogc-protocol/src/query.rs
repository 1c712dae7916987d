//! Ephemeral request values handed to a transport.

use std::fmt;

use tokio_util::sync::CancellationToken;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => f.write_str("GET"),
            HttpMethod::Post => f.write_str("POST"),
        }
    }
}

/// One network round trip: target, method, headers, optional body, and the
/// token that aborts it.
///
/// Builders hand out a query with a fresh token; the issuer swaps in a token
/// from its cancellation scope with [`Query::with_cancel`].
#[derive(Debug, Clone)]
pub struct Query {
    pub url: Url,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub cancel: CancellationToken,
}

impl Query {
    pub fn get(url: Url) -> Self {
        Self {
            url,
            method: HttpMethod::Get,
            headers: Vec::new(),
            body: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn post(url: Url, body: impl Into<String>) -> Self {
        Self {
            url,
            method: HttpMethod::Post,
            headers: Vec::new(),
            body: Some(body.into()),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// First query-string value for `name` (case-sensitive, as sent).
    pub fn param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Endpoint URL with `params` appended to whatever query it already carries.
pub(crate) fn with_params<'a, I>(endpoint: &Url, params: I) -> Url
where
    I: IntoIterator<Item = (&'a str, String)>,
{
    let mut url = endpoint.clone();
    url.query_pairs_mut().extend_pairs(params);
    url
}
