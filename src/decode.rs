//! Content-type dispatch and body decoding.
//!
//! One entry point, [`decode`], validates the declared `content-type` against
//! the requested [`Kind`], drains the body exactly once, and applies the
//! matching strategy. Validation always happens before the body is touched —
//! a mismatched request keeps its body readable for whoever handles it next.
//!
//! Per-kind functions ([`json`], [`urlencoded`], [`xml`], ...) return the
//! concrete decoded type; `decode` wraps the same results in [`Decoded`] for
//! callers that dispatch dynamically.

use std::fmt;

use bytes::Bytes;
use indexmap::IndexMap;
use serde_json::Value;

use crate::body::BodyError;
use crate::error::DecodeError;
use crate::form;
use crate::multipart::{self, FormValue};
use crate::request::Request;
use crate::xml;

/// What the caller wants the body decoded as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    /// `text/plain`, passed through verbatim.
    Text,
    /// `text/html`, passed through verbatim.
    Html,
    /// `application/javascript`, passed through verbatim.
    Javascript,
    /// `application/json`, parsed into a [`Value`].
    Json,
    /// GraphQL requests travel as JSON; alias for [`Kind::Json`].
    Graphql,
    /// `application/x-www-form-urlencoded` form fields.
    Urlencoded,
    /// `application/xml`, converted to a compact [`Value`] tree.
    Xml,
    /// `multipart/form-data` fields and file uploads.
    Multipart,
    /// Raw file bytes; the string is the expected file-extension hint.
    File(String),
    /// The url's query string. Reads no body at all.
    Query,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Html => "html",
            Self::Javascript => "javascript",
            Self::Json => "json",
            Self::Graphql => "graphql",
            Self::Urlencoded => "urlencoded form",
            Self::Xml => "xml",
            Self::Multipart => "multipart form",
            Self::File(_) => "file",
            Self::Query => "query",
        })
    }
}

/// A decoded request body, tagged by the [`Kind`] that produced it.
#[derive(Debug)]
pub enum Decoded {
    Text(String),
    Json(Value),
    Form(IndexMap<String, String>),
    Xml(Value),
    Multipart(IndexMap<String, FormValue>),
    File(RawFile),
    Query(IndexMap<String, String>),
}

/// A raw file body: resolved extension plus unmodified bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFile {
    pub extension: String,
    pub bytes: Bytes,
}

/// Decodes the request body (or url) as `kind`.
pub async fn decode(req: &mut Request, kind: Kind) -> Result<Decoded, DecodeError> {
    match kind {
        Kind::Text => text(req).await.map(Decoded::Text),
        Kind::Html => html(req).await.map(Decoded::Text),
        Kind::Javascript => javascript(req).await.map(Decoded::Text),
        Kind::Json => json(req).await.map(Decoded::Json),
        Kind::Graphql => graphql(req).await.map(Decoded::Json),
        Kind::Urlencoded => urlencoded(req).await.map(Decoded::Form),
        Kind::Xml => xml(req).await.map(Decoded::Xml),
        Kind::Multipart => multipart(req).await.map(Decoded::Multipart),
        Kind::File(ext) => file(req, &ext).await.map(Decoded::File),
        Kind::Query => query(req).map(Decoded::Query),
    }
}

/// `text/plain` body, verbatim.
pub async fn text(req: &mut Request) -> Result<String, DecodeError> {
    plain_text(req, "text/plain", Kind::Text).await
}

/// `text/html` body, verbatim.
pub async fn html(req: &mut Request) -> Result<String, DecodeError> {
    plain_text(req, "text/html", Kind::Html).await
}

/// `application/javascript` body, verbatim.
pub async fn javascript(req: &mut Request) -> Result<String, DecodeError> {
    plain_text(req, "application/javascript", Kind::Javascript).await
}

/// `application/json` body as a [`Value`].
///
/// A syntax error surfaces the raw body in the error for diagnostics.
pub async fn json(req: &mut Request) -> Result<Value, DecodeError> {
    check_content_type(req, "application/json")?;
    let raw = read_utf8(req, Kind::Json).await?;
    serde_json::from_str(&raw).map_err(|_| DecodeError::InvalidPayload {
        kind: Kind::Json,
        body: Some(raw),
    })
}

/// GraphQL over HTTP is JSON on the wire; same decode, same errors.
pub async fn graphql(req: &mut Request) -> Result<Value, DecodeError> {
    json(req).await
}

/// `application/x-www-form-urlencoded` body as an ordered field map.
///
/// The whole body is percent-decoded first, then split on `&` and the first
/// `=`. The first occurrence of a duplicate key wins.
pub async fn urlencoded(req: &mut Request) -> Result<IndexMap<String, String>, DecodeError> {
    check_content_type(req, "application/x-www-form-urlencoded")?;
    let raw = read_utf8(req, Kind::Urlencoded).await?;
    let decoded = form::percent_decode(&raw).ok_or(DecodeError::InvalidPayload {
        kind: Kind::Urlencoded,
        body: Some(raw),
    })?;
    Ok(form::parse_pairs(&decoded))
}

/// `application/xml` body as a compact [`Value`] tree.
pub async fn xml(req: &mut Request) -> Result<Value, DecodeError> {
    check_content_type(req, "application/xml")?;
    let raw = read_utf8(req, Kind::Xml).await?;
    xml::to_value(&raw).map_err(|_| DecodeError::InvalidPayload {
        kind: Kind::Xml,
        body: Some(raw),
    })
}

/// `multipart/form-data` fields and files as an ordered map.
///
/// The content type only needs to *start with* `multipart/form-data` — the
/// boundary parameter follows it. A missing or garbled boundary fails before
/// the part parser runs and before the body is read.
pub async fn multipart(req: &mut Request) -> Result<IndexMap<String, FormValue>, DecodeError> {
    const EXPECTED: &str = "multipart/form-data";

    let content_type = match req.header("content-type") {
        Some(ct) if ct.starts_with(EXPECTED) => ct.to_owned(),
        actual => {
            return Err(DecodeError::ContentTypeMismatch {
                actual: actual.map(str::to_owned),
                expected: EXPECTED.to_owned(),
            });
        }
    };

    let boundary = multer::parse_boundary(&content_type).map_err(|_| {
        DecodeError::InvalidPayload { kind: Kind::Multipart, body: None }
    })?;

    let bytes = read_bytes(req, Kind::Multipart).await?;
    multipart::parse(boundary, bytes)
        .await
        .map_err(|_| DecodeError::InvalidPayload { kind: Kind::Multipart, body: None })
}

/// Raw file body.
///
/// The declared content type must equal the MIME type looked up from the
/// extension hint. The returned extension is resolved back from the content
/// type when possible, else the hint is kept.
pub async fn file(req: &mut Request, ext: &str) -> Result<RawFile, DecodeError> {
    let expected = mime_guess::from_ext(ext).first_raw();
    let actual = req.header("content-type");

    let content_type = match (expected, actual) {
        (Some(expected), Some(actual)) if actual == expected => expected,
        _ => {
            return Err(DecodeError::ContentTypeMismatch {
                actual: actual.map(str::to_owned),
                expected: expected.unwrap_or("unknown").to_owned(),
            });
        }
    };

    let bytes = read_bytes(req, Kind::File(ext.to_owned())).await?;
    Ok(RawFile { extension: resolve_extension(content_type, ext), bytes })
}

/// Resolves the returned extension from the actual content type; falls back
/// to the caller's hint when the reverse lookup has nothing.
fn resolve_extension(content_type: &str, hint: &str) -> String {
    mime_guess::get_mime_extensions_str(content_type)
        .and_then(|exts| exts.first())
        .map_or_else(|| hint.to_owned(), |e| (*e).to_owned())
}

/// The url's query component as an ordered map. No body is read.
///
/// Pairs are split raw — no percent-decoding — and the first occurrence of a
/// duplicate key wins, same as urlencoded forms.
pub fn query(req: &Request) -> Result<IndexMap<String, String>, DecodeError> {
    let qs = req.query_string().ok_or(DecodeError::InvalidQuery)?;
    Ok(form::parse_pairs(qs))
}

// ── Shared validation and body reading ───────────────────────────────────────

/// Exact content-type equality, checked before any body read.
fn check_content_type(req: &Request, expected: &str) -> Result<(), DecodeError> {
    match req.header("content-type") {
        Some(ct) if ct == expected => Ok(()),
        actual => Err(DecodeError::ContentTypeMismatch {
            actual: actual.map(str::to_owned),
            expected: expected.to_owned(),
        }),
    }
}

async fn read_bytes(req: &mut Request, kind: Kind) -> Result<Bytes, DecodeError> {
    req.body_mut().read_to_end().await.map_err(|e| match e {
        BodyError::Consumed => DecodeError::BodyConsumed,
        BodyError::Read(_) => DecodeError::InvalidPayload { kind, body: None },
    })
}

async fn read_utf8(req: &mut Request, kind: Kind) -> Result<String, DecodeError> {
    let bytes = read_bytes(req, kind.clone()).await?;
    String::from_utf8(bytes.to_vec())
        .map_err(|_| DecodeError::InvalidPayload { kind, body: None })
}

async fn plain_text(
    req: &mut Request,
    expected: &str,
    kind: Kind,
) -> Result<String, DecodeError> {
    check_content_type(req, expected)?;
    read_utf8(req, kind).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Body;

    fn request(content_type: &str, body: impl Into<Body>) -> Request {
        Request::new(
            "POST",
            "/",
            vec![("content-type".to_owned(), content_type.to_owned())],
            body.into(),
        )
    }

    #[tokio::test]
    async fn json_matches_a_standard_parse() {
        let raw = r#"{"name":"alice","tags":["a","b"],"n":3}"#;
        let mut req = request("application/json", raw);
        let value = json(&mut req).await.unwrap();
        assert_eq!(value, serde_json::from_str::<Value>(raw).unwrap());
    }

    #[tokio::test]
    async fn mismatch_never_touches_the_body() {
        let mut req = request("text/plain", r#"{"a":1}"#);
        let err = json(&mut req).await.unwrap_err();
        assert!(matches!(
            err,
            DecodeError::ContentTypeMismatch { actual: Some(ref a), .. } if a == "text/plain"
        ));
        // The stream is still unconsumed and available to a later decode.
        assert!(!req.body().is_consumed());
        assert_eq!(text(&mut req).await.unwrap(), r#"{"a":1}"#);
    }

    #[tokio::test]
    async fn missing_content_type_is_a_mismatch() {
        let mut req = Request::new("POST", "/", Vec::new(), Body::from("{}"));
        assert!(matches!(
            json(&mut req).await.unwrap_err(),
            DecodeError::ContentTypeMismatch { actual: None, .. }
        ));
    }

    #[tokio::test]
    async fn malformed_json_carries_the_raw_body() {
        let mut req = request("application/json", "{bad");
        match json(&mut req).await.unwrap_err() {
            DecodeError::InvalidPayload { kind: Kind::Json, body: Some(raw) } => {
                assert_eq!(raw, "{bad");
            }
            other => panic!("expected InvalidPayload, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn second_decode_hits_body_consumed() {
        let mut req = request("application/json", "{}");
        json(&mut req).await.unwrap();
        // Content-type still matches, but the stream is gone.
        assert!(matches!(json(&mut req).await, Err(DecodeError::BodyConsumed)));
    }

    #[tokio::test]
    async fn urlencoded_first_duplicate_wins() {
        let mut req = request("application/x-www-form-urlencoded", "a=1&a=2");
        let fields = urlencoded(&mut req).await.unwrap();
        assert_eq!(fields.get("a").map(String::as_str), Some("1"));
        assert_eq!(fields.len(), 1);
    }

    #[tokio::test]
    async fn urlencoded_percent_decodes_before_splitting() {
        let mut req = request("application/x-www-form-urlencoded", "city=S%C3%A3o+Paulo&x=1");
        let fields = urlencoded(&mut req).await.unwrap();
        // `+` is not translated; only percent escapes are decoded.
        assert_eq!(fields.get("city").map(String::as_str), Some("São+Paulo"));
        assert_eq!(fields.get("x").map(String::as_str), Some("1"));
    }

    #[tokio::test]
    async fn text_kinds_pass_through_verbatim() {
        let mut req = request("text/plain", "hello there");
        assert_eq!(text(&mut req).await.unwrap(), "hello there");

        let mut req = request("text/html", "<p>hi</p>");
        assert_eq!(html(&mut req).await.unwrap(), "<p>hi</p>");

        let mut req = request("application/javascript", "console.log(1)");
        assert_eq!(javascript(&mut req).await.unwrap(), "console.log(1)");
    }

    #[tokio::test]
    async fn invalid_utf8_fails_the_text_decode() {
        let mut req = request("text/plain", vec![0xff, 0xfe, 0x00]);
        assert!(matches!(
            text(&mut req).await.unwrap_err(),
            DecodeError::InvalidPayload { kind: Kind::Text, .. }
        ));
    }

    #[tokio::test]
    async fn xml_body_decodes_to_a_compact_tree() {
        let mut req = request("application/xml", "<user><name>alice</name></user>");
        let value = xml(&mut req).await.unwrap();
        assert_eq!(value["user"]["name"]["#text"], "alice");
    }

    #[tokio::test]
    async fn malformed_xml_carries_the_raw_body() {
        let mut req = request("application/xml", "<a><b></b>");
        match xml(&mut req).await.unwrap_err() {
            DecodeError::InvalidPayload { kind: Kind::Xml, body: Some(raw) } => {
                assert_eq!(raw, "<a><b></b>");
            }
            other => panic!("expected InvalidPayload, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn multipart_without_boundary_fails_before_parsing() {
        let mut req = request("multipart/form-data", "irrelevant");
        let err = multipart(&mut req).await.unwrap_err();
        assert!(matches!(err, DecodeError::InvalidPayload { kind: Kind::Multipart, .. }));
        // Failed before the body read, not after.
        assert!(!req.body().is_consumed());
    }

    #[tokio::test]
    async fn multipart_rejects_non_multipart_content_type() {
        let mut req = request("application/json", "{}");
        assert!(matches!(
            multipart(&mut req).await.unwrap_err(),
            DecodeError::ContentTypeMismatch { .. }
        ));
        assert!(!req.body().is_consumed());
    }

    #[tokio::test]
    async fn multipart_decodes_fields_and_files() {
        let body = "--B\r\n\
                    content-disposition: form-data; name=\"name\"\r\n\r\n\
                    alice\r\n\
                    --B\r\n\
                    content-disposition: form-data; name=\"data\"; filename=\"d.bin\"\r\n\
                    content-type: application/octet-stream\r\n\r\n\
                    binary\r\n\
                    --B--\r\n";
        let mut req = request("multipart/form-data; boundary=B", body);
        let fields = multipart(&mut req).await.unwrap();

        assert_eq!(fields.get("name"), Some(&FormValue::Text("alice".to_owned())));
        assert!(matches!(fields.get("data"), Some(FormValue::File(_))));
    }

    #[tokio::test]
    async fn file_kind_checks_the_extension_mime() {
        let mut req = request("application/json", r#"{"a":1}"#);
        let raw = file(&mut req, "json").await.unwrap();
        assert_eq!(raw.extension, "json");
        assert_eq!(&raw.bytes[..], br#"{"a":1}"#);
    }

    #[tokio::test]
    async fn file_kind_rejects_a_different_mime() {
        let mut req = request("text/plain", "data");
        assert!(matches!(
            file(&mut req, "json").await.unwrap_err(),
            DecodeError::ContentTypeMismatch { .. }
        ));
        assert!(!req.body().is_consumed());
    }

    #[tokio::test]
    async fn file_kind_resolves_extension_from_the_content_type() {
        // `jpeg` maps forward to `image/jpeg`; the reverse lookup picks the
        // table's first extension for that type, whatever the hint was.
        let mut req = request("image/jpeg", "JPEGBYTES");
        let raw = file(&mut req, "jpeg").await.unwrap();
        let expected = mime_guess::get_mime_extensions_str("image/jpeg")
            .and_then(|exts| exts.first())
            .unwrap();
        assert_eq!(raw.extension, *expected);
    }

    #[test]
    fn extension_resolution_falls_back_to_the_hint() {
        assert_eq!(resolve_extension("application/x-no-such-type", "bin"), "bin");
        assert_eq!(resolve_extension("application/json", "ignored-hint"), "json");
    }

    #[tokio::test]
    async fn file_kind_rejects_unknown_extensions() {
        let mut req = request("application/octet-stream", "data");
        assert!(matches!(
            file(&mut req, "no-such-ext").await.unwrap_err(),
            DecodeError::ContentTypeMismatch { .. }
        ));
    }

    #[test]
    fn query_parses_with_first_wins_policy() {
        let req = Request::new("GET", "/search?x=1&y=2&x=3", Vec::new(), Body::empty());
        let q = query(&req).unwrap();
        assert_eq!(q.get("x").map(String::as_str), Some("1"));
        assert_eq!(q.get("y").map(String::as_str), Some("2"));
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn query_requires_a_query_component() {
        let req = Request::new("GET", "/search", Vec::new(), Body::empty());
        assert!(matches!(query(&req), Err(DecodeError::InvalidQuery)));
    }

    #[tokio::test]
    async fn graphql_is_json_on_the_wire() {
        let mut req = request("application/json", r#"{"query":"{ me }"}"#);
        let value = graphql(&mut req).await.unwrap();
        assert_eq!(value["query"], "{ me }");
    }

    #[tokio::test]
    async fn decode_dispatches_by_kind() {
        let mut req = request("application/json", r#"{"a":1}"#);
        match decode(&mut req, Kind::Json).await.unwrap() {
            Decoded::Json(v) => assert_eq!(v["a"], 1),
            other => panic!("expected Decoded::Json, got {other:?}"),
        }

        let mut req = Request::new("GET", "/?k=v", Vec::new(), Body::empty());
        match decode(&mut req, Kind::Query).await.unwrap() {
            Decoded::Query(q) => assert_eq!(q.get("k").map(String::as_str), Some("v")),
            other => panic!("expected Decoded::Query, got {other:?}"),
        }
    }
}
