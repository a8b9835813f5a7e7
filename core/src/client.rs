//! Blocking client helpers for driving a server from tests.
//!
//! # Design
//! `exchange` works on any duplex stream so it can be exercised without a
//! network; `send` is the thin TCP wrapper around it. The write side of a TCP
//! stream is shut down after the request so servers that read until end of
//! stream see one.

use std::io::{BufReader, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::decode::decode_response;
use crate::encode::write_request;
use crate::error::DecodeError;
use crate::http::{Request, Response};

/// Write `request` to `stream` and decode the response that follows.
pub fn exchange<S: Read + Write>(stream: &mut S, request: &Request) -> Result<Response, DecodeError> {
    write_request(stream, request)?;
    let mut reader = BufReader::new(stream);
    decode_response(&mut reader)
}

/// Connect to `addr`, send `request`, and read the response until the
/// server closes the connection.
pub fn send<A: ToSocketAddrs>(addr: A, request: &Request) -> Result<Response, DecodeError> {
    let mut stream = TcpStream::connect(addr)?;
    stream.set_read_timeout(Some(Duration::from_secs(30)))?;
    write_request(&mut stream, request)?;
    stream.shutdown(Shutdown::Write)?;
    let mut reader = BufReader::new(stream);
    decode_response(&mut reader)
}
