//! Incoming HTTP request type.

use crate::body::Body;

/// The slice of an incoming request the decoding layer needs: method, url,
/// headers, and the one-shot body.
///
/// The hosting framework owns connection handling and routing; it hands one
/// of these to the decode layer per request. Everything here is request-scoped
/// and dropped when the request/response cycle ends.
pub struct Request {
    method: String,
    url: String,
    headers: Vec<(String, String)>,
    body: Body,
}

impl Request {
    pub fn new(
        method: impl Into<String>,
        url: impl Into<String>,
        headers: Vec<(String, String)>,
        body: Body,
    ) -> Self {
        Self { method: method.into(), url: url.into(), headers, body }
    }

    /// Builds a `Request` from an in-flight hyper request.
    ///
    /// Header values that are not valid UTF-8 are dropped — the decode layer
    /// only ever inspects `content-type`, which is always ASCII.
    pub fn from_hyper(req: http::Request<hyper::body::Incoming>) -> Self {
        let (parts, body) = req.into_parts();
        let url = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_owned())
            .unwrap_or_else(|| parts.uri.path().to_owned());
        let headers = parts
            .headers
            .iter()
            .filter_map(|(k, v)| {
                v.to_str().ok().map(|v| (k.as_str().to_owned(), v.to_owned()))
            })
            .collect();
        Self {
            method: parts.method.as_str().to_owned(),
            url,
            headers,
            body: Body::from_incoming(body),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// The full request url, query component included.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The url up to (not including) the first `?`.
    pub fn path(&self) -> &str {
        self.url.split_once('?').map_or(self.url.as_str(), |(path, _)| path)
    }

    /// The query component after the first `?`, if any.
    pub fn query_string(&self) -> Option<&str> {
        self.url.split_once('?').map(|(_, query)| query)
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}
