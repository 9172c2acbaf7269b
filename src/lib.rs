//! # datsu
//!
//! Request-body decoding and route-parameter extraction for HTTP services.
//! Nothing more. Nothing less.
//!
//! ## The contract
//!
//! The hosting framework owns the server loop, the routing tree, and static
//! files — datsu does not, by design. It covers the one part that actually
//! varies between applications: turning a declared content type and a raw
//! byte stream into a structured value, and pulling named segments out of a
//! path.
//!
//! What the host already owns — datsu intentionally ignores:
//!
//! - **Connection handling** — hyper / the framework's accept loop
//! - **Routing** — the framework's route table decides *which* handler runs
//! - **Static files** — the framework or the reverse proxy
//!
//! What's left for datsu:
//!
//! - Content-type validation and per-kind body decoding — JSON, urlencoded
//!   forms, plain text, XML, multipart, raw file bytes, query strings
//! - Route-pattern compilation and parameter extraction — `/users/:id`
//!   against `/users/42`, compiled once and cached for the process lifetime
//! - Advisory failure semantics — every decode returns a [`DecodeError`]
//!   instead of panicking, and the [`middleware`] wrappers turn failures into
//!   safe defaults so one bad body never kills a pipeline
//!
//! ## Quick start
//!
//! ```rust
//! use datsu::{decode, route, Body, Request};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut req = Request::new(
//!     "POST",
//!     "/users/42?verbose=1",
//!     vec![("content-type".to_owned(), "application/json".to_owned())],
//!     Body::from(r#"{"name":"alice"}"#),
//! );
//!
//! let body = decode::json(&mut req).await.unwrap();
//! assert_eq!(body["name"], "alice");
//!
//! let params = route::extract(req.path(), "/users/:id").unwrap();
//! assert_eq!(params.get("id").map(String::as_str), Some("42"));
//!
//! let query = decode::query(&req).unwrap();
//! assert_eq!(query.get("verbose").map(String::as_str), Some("1"));
//! # }
//! ```
//!
//! ## One body, one read
//!
//! A request body is a single-consumption resource. The first decode drains
//! it; a second decode on the same request fails deterministically with
//! [`DecodeError::BodyConsumed`] rather than hanging on an empty stream.
//! Content-type validation happens *before* the read, so a mismatched decode
//! leaves the body available for the next attempt.

mod body;
mod error;
mod form;
mod multipart;
mod request;
mod xml;

pub mod decode;
pub mod middleware;
pub mod route;

pub use body::Body;
pub use decode::{Decoded, Kind, RawFile};
pub use error::DecodeError;
pub use middleware::Context;
pub use multipart::{FileField, FormValue};
pub use request::Request;
pub use route::ParamMap;
