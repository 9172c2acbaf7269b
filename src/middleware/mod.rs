//! Catch-and-default decode wrappers.
//!
//! Decode failures are advisory, not request-terminating. Each wrapper here
//! runs one decode, stores the result in the request-scoped [`Context`], and
//! on any failure logs it at `debug` and substitutes the safe default — an
//! empty map, empty string, empty object, or `None`. A middleware chain can
//! therefore stack these freely; one malformed body never aborts the
//! pipeline. Handlers that want to short-circuit on bad input call the
//! [`decode`](crate::decode) functions directly and inspect the error.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;

use crate::decode::{self, RawFile};
use crate::multipart::FormValue;
use crate::request::Request;
use crate::route::{self, ParamMap};

/// Request-scoped slots for decoded values.
///
/// Created empty at the start of a request, filled by the wrappers below,
/// dropped with the request. Untouched slots hold their default.
pub struct Context {
    pub query: IndexMap<String, String>,
    pub params: ParamMap,
    pub json: Value,
    pub graphql: Value,
    pub urlencoded: IndexMap<String, String>,
    pub text: String,
    pub html: String,
    pub javascript: String,
    pub xml: Value,
    pub multipart: IndexMap<String, FormValue>,
    pub file: Option<RawFile>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            query: IndexMap::new(),
            params: ParamMap::new(),
            json: empty_object(),
            graphql: empty_object(),
            urlencoded: IndexMap::new(),
            text: String::new(),
            html: String::new(),
            javascript: String::new(),
            xml: empty_object(),
            multipart: IndexMap::new(),
            file: None,
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Stores the url's query map, or an empty map.
pub fn query(req: &Request, ctx: &mut Context) {
    ctx.query = decode::query(req).unwrap_or_else(|e| {
        debug!(error = %e, "query decode failed, defaulting to empty");
        IndexMap::new()
    });
}

/// Stores the path parameters matched by `pattern`, or an empty map.
pub fn params(req: &Request, ctx: &mut Context, pattern: &str) {
    ctx.params = route::extract(req.path(), pattern).unwrap_or_else(|e| {
        debug!(error = %e, "param extraction failed, defaulting to empty");
        ParamMap::new()
    });
}

/// Stores the JSON body, or an empty object.
pub async fn json(req: &mut Request, ctx: &mut Context) {
    ctx.json = decode::json(req).await.unwrap_or_else(|e| {
        debug!(error = %e, "json decode failed, defaulting to empty object");
        empty_object()
    });
}

/// Stores the GraphQL (JSON) body in its own slot, or an empty object.
pub async fn graphql(req: &mut Request, ctx: &mut Context) {
    ctx.graphql = decode::graphql(req).await.unwrap_or_else(|e| {
        debug!(error = %e, "graphql decode failed, defaulting to empty object");
        empty_object()
    });
}

/// Stores the urlencoded form fields, or an empty map.
pub async fn urlencoded(req: &mut Request, ctx: &mut Context) {
    ctx.urlencoded = decode::urlencoded(req).await.unwrap_or_else(|e| {
        debug!(error = %e, "urlencoded decode failed, defaulting to empty");
        IndexMap::new()
    });
}

/// Stores the plain-text body, or an empty string.
pub async fn text(req: &mut Request, ctx: &mut Context) {
    ctx.text = decode::text(req).await.unwrap_or_else(|e| {
        debug!(error = %e, "text decode failed, defaulting to empty");
        String::new()
    });
}

/// Stores the HTML body, or an empty string.
pub async fn html(req: &mut Request, ctx: &mut Context) {
    ctx.html = decode::html(req).await.unwrap_or_else(|e| {
        debug!(error = %e, "html decode failed, defaulting to empty");
        String::new()
    });
}

/// Stores the JavaScript body, or an empty string.
pub async fn javascript(req: &mut Request, ctx: &mut Context) {
    ctx.javascript = decode::javascript(req).await.unwrap_or_else(|e| {
        debug!(error = %e, "javascript decode failed, defaulting to empty");
        String::new()
    });
}

/// Stores the XML body, or an empty object.
pub async fn xml(req: &mut Request, ctx: &mut Context) {
    ctx.xml = decode::xml(req).await.unwrap_or_else(|e| {
        debug!(error = %e, "xml decode failed, defaulting to empty object");
        empty_object()
    });
}

/// Stores the multipart fields, or an empty map.
pub async fn multipart(req: &mut Request, ctx: &mut Context) {
    ctx.multipart = decode::multipart(req).await.unwrap_or_else(|e| {
        debug!(error = %e, "multipart decode failed, defaulting to empty");
        IndexMap::new()
    });
}

/// Stores the raw file body, or `None`.
pub async fn file(req: &mut Request, ctx: &mut Context, ext: &str) {
    ctx.file = match decode::file(req, ext).await {
        Ok(raw) => Some(raw),
        Err(e) => {
            debug!(error = %e, "file decode failed, defaulting to none");
            None
        }
    };
}
