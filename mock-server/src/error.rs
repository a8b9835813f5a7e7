//! Errors raised by the server's control surface.
//!
//! Per-connection failures never show up here: the accept loop contains them
//! and logs them. These are the errors a test harness sees from `start`,
//! configuration loading, or constructing a file server.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// A file server root that is missing or not a directory.
    #[error("invalid document root {}: {reason}", .path.display())]
    InvalidRoot { path: PathBuf, reason: &'static str },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}
