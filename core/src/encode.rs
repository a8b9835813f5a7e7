//! Serializing responses (and, for clients, requests) to bytes.
//!
//! Responses are always written as HTTP/1.0:
//!
//! ```text
//! HTTP/1.0 <status> <reason>\r\n
//! <name>: <value>\r\n      (per header)
//! \r\n                     (only when there is a body)
//! <body>
//! ```
//!
//! The reason phrase is written exactly as stored on the response.

use std::io::{self, Write};

use crate::http::{Request, Response};

/// Write `response` to `writer` and flush it.
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> io::Result<()> {
    write!(
        writer,
        "HTTP/1.0 {} {}\r\n",
        response.status(),
        response.reason_phrase()
    )?;
    for (name, value) in response.headers() {
        write!(writer, "{name}: {value}\r\n")?;
    }
    if let Some(body) = response.body() {
        writer.write_all(b"\r\n")?;
        writer.write_all(body)?;
    }
    writer.flush()
}

/// The exact bytes [`write_response`] would send.
pub fn encode(response: &Response) -> Vec<u8> {
    let mut out = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_response(&mut out, response);
    out
}

/// Write `request` to `writer` and flush it.
///
/// Unlike responses, the header block is always terminated so the server
/// knows where the headers end even without a body.
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> io::Result<()> {
    write!(
        writer,
        "{} {} {}\r\n",
        request.method(),
        request.path(),
        request.version().unwrap_or("HTTP/1.0")
    )?;
    for (name, value) in request.headers() {
        write!(writer, "{name}: {value}\r\n")?;
    }
    writer.write_all(b"\r\n")?;
    if let Some(body) = request.body() {
        writer.write_all(body)?;
    }
    writer.flush()
}

pub fn encode_request(request: &Request) -> Vec<u8> {
    let mut out = Vec::new();
    // Same as `encode`: a Vec sink never errors.
    let _ = write_request(&mut out, request);
    out
}
