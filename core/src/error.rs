//! Error types for the wire layer.
//!
//! # Design
//! Protocol problems travel as a tagged value instead of unwinding:
//! `HttpError` carries the HTTP status the server should answer with, and
//! `DecodeError` separates those protocol errors from transport failures so
//! the connection loop can answer the first and merely log the second.

use std::io;

use thiserror::Error;

/// A structured HTTP error: a status code plus a human readable message.
///
/// Produced by the decoder for malformed input (always 400) and by request
/// handlers for anything they want reported as an error page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("HTTP {status}: {message}")]
pub struct HttpError {
    pub status: u16,
    pub message: String,
}

impl HttpError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// A 400 error, used for every malformed-request condition.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, message)
    }
}

/// An I/O failure inside a handler surfaces as a 500.
impl From<io::Error> for HttpError {
    fn from(err: io::Error) -> Self {
        Self::internal(err.to_string())
    }
}

/// Errors returned while decoding a request or response from a byte stream.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes arrived but do not form a valid message.
    #[error(transparent)]
    Protocol(#[from] HttpError),

    /// The underlying stream failed.
    #[error("i/o failure while decoding: {0}")]
    Io(#[from] io::Error),
}

impl DecodeError {
    /// The HTTP status to answer with, if this is a protocol error.
    pub fn status(&self) -> Option<u16> {
        match self {
            DecodeError::Protocol(err) => Some(err.status),
            DecodeError::Io(_) => None,
        }
    }
}
