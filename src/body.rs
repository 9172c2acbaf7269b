//! Single-consumption request body.
//!
//! An HTTP body is a stream you get to read once. `Body` makes that explicit:
//! the handle owns the underlying stream in an `Option`, the first
//! [`read_to_end`](Body::read_to_end) takes it, and every later read fails
//! deterministically with [`BodyError::Consumed`] instead of hanging on an
//! empty stream.

use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Why a body read failed.
#[derive(Debug, Error)]
pub enum BodyError {
    /// The body was already drained by an earlier read.
    #[error("body already consumed")]
    Consumed,
    /// The underlying stream failed mid-read.
    #[error("body read failed: {0}")]
    Read(#[source] BoxError),
}

/// A request body that can be drained exactly once.
pub struct Body {
    inner: Option<BoxBody<Bytes, BoxError>>,
}

impl Body {
    /// An empty body. Still readable once — it drains to zero bytes.
    pub fn empty() -> Self {
        Self::from_bytes(Bytes::new())
    }

    /// A body over an in-memory buffer. This is what tests and non-hyper
    /// callers use.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let full = Full::new(bytes.into()).map_err(|e| match e {});
        Self { inner: Some(BoxBody::new(full)) }
    }

    /// Adopts the body of an in-flight hyper request.
    pub fn from_incoming(body: hyper::body::Incoming) -> Self {
        let boxed = body.map_err(|e| Box::new(e) as BoxError).boxed();
        Self { inner: Some(boxed) }
    }

    /// `true` once the body has been drained.
    pub fn is_consumed(&self) -> bool {
        self.inner.is_none()
    }

    /// Drains the whole stream into one buffer.
    ///
    /// The stream is fully consumed before this returns, success or failure.
    /// A second call returns [`BodyError::Consumed`].
    pub(crate) async fn read_to_end(&mut self) -> Result<Bytes, BodyError> {
        let body = self.inner.take().ok_or(BodyError::Consumed)?;
        let collected = body.collect().await.map_err(BodyError::Read)?;
        Ok(collected.to_bytes())
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Self::from_bytes(Bytes::from_static(s.as_bytes()))
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Self::from_bytes(Bytes::from(s.into_bytes()))
    }
}
