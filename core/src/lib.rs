//! Wire layer for a small embeddable HTTP/1.0 test server.
//!
//! # Overview
//! Reads requests from and writes responses to plain byte streams. Nothing
//! here owns a socket except the blocking [`client`] helpers; the server crate
//! hands in `BufRead` / `Write` halves of each accepted connection.
//!
//! # Design
//! - [`line`] splits a stream into lines ending in LF, CR or CRLF.
//! - [`decode`] builds a [`Request`] from those lines plus a
//!   `content-length` bounded body, including folded headers.
//! - [`encode`] writes a [`Response`] as byte-exact HTTP/1.0.
//! - [`status`] supplies default reason phrases.
//! - Malformed input is returned as [`DecodeError::Protocol`] carrying a 400
//!   status rather than a panic or an opaque I/O error.

pub mod client;
pub mod decode;
pub mod encode;
pub mod error;
pub mod headers;
pub mod http;
pub mod line;
pub mod status;

pub use decode::{decode, decode_into, decode_response};
pub use encode::{encode, encode_request, write_request, write_response};
pub use error::{DecodeError, HttpError};
pub use headers::Headers;
pub use http::{Request, Response, CONTENT_LENGTH, CONTENT_TYPE};
pub use line::{next_line, read_line};
pub use status::reason_for;
