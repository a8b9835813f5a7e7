//! An HTTP/1.0 server to embed in tests.
//!
//! # Overview
//! Start a [`MockServer`] on an ephemeral port, point the code under test at
//! it, then inspect [`MockServer::requests`] and [`MockServer::responses`].
//! What the server answers is up to the installed [`Handler`]; the stock
//! ones are [`AlwaysOk`] and the directory-backed [`FileServer`].
//!
//! # Design
//! - One accept thread, one connection at a time, so the logs are ordered.
//! - The wire format lives in `mockhttp-core`; this crate owns sockets,
//!   lifecycle and the connection log.
//! - Every per-connection failure is contained: malformed requests and
//!   handler errors get an HTML error page, transport errors are logged.

pub mod config;
pub mod connection;
pub mod error;
pub mod file_type;
pub mod files;
pub mod handler;
pub mod server;

pub use config::ServerConfig;
pub use connection::Exchange;
pub use error::ServerError;
pub use file_type::FileType;
pub use files::FileServer;
pub use handler::{AlwaysOk, Handler};
pub use server::{MockServer, ServerState};

pub use mockhttp_core::{HttpError, Request, Response};
