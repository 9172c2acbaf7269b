//! Unified error type.

use thiserror::Error;

use crate::decode::Kind;

/// The error type returned by datsu's decode and extract operations.
///
/// Every variant is recoverable and request-scoped — nothing here is fatal to
/// the process. The [`middleware`](crate::middleware) wrappers catch all of
/// these and substitute a safe default, so a failed decode never has to abort
/// a request pipeline unless the caller wants it to.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The declared `content-type` does not match what the decoder was asked
    /// to parse. The body has not been touched.
    #[error("content-type is {}, expected `{expected}`", fmt_actual(.actual))]
    ContentTypeMismatch {
        /// The declared type, or `None` if the header was absent.
        actual: Option<String>,
        expected: String,
    },

    /// The body was read but failed to parse under the expected grammar.
    ///
    /// For JSON and XML the offending raw body text is attached so callers
    /// can log what was actually sent.
    #[error("invalid {kind} payload{}", fmt_body(.body))]
    InvalidPayload {
        kind: Kind,
        body: Option<String>,
    },

    /// The request url has no query component.
    #[error("request url has no query component")]
    InvalidQuery,

    /// The compiled route pattern did not match the given path.
    #[error("route pattern `{pattern}` does not match `{url}`")]
    RouteMismatch { url: String, pattern: String },

    /// The route pattern could not be compiled — usually a duplicate
    /// parameter name within one pattern.
    #[error("invalid route pattern `{0}`")]
    InvalidPattern(String),

    /// The request body was already read by an earlier decode.
    ///
    /// A body is a single-consumption resource; the second read fails
    /// deterministically instead of hanging on an empty stream.
    #[error("request body already consumed")]
    BodyConsumed,
}

fn fmt_actual(actual: &Option<String>) -> String {
    match actual {
        Some(ct) => format!("`{ct}`"),
        None => "missing".to_owned(),
    }
}

fn fmt_body(body: &Option<String>) -> String {
    match body {
        Some(raw) => format!(" - {raw}"),
        None => String::new(),
    }
}
