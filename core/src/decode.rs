//! Decoding requests (and, for clients, responses) from a byte stream.
//!
//! # Design
//! Decoding is line oriented up to the blank line that ends the header block
//! and byte oriented afterwards, so binary bodies pass through untouched.
//! Every malformed-input condition becomes `DecodeError::Protocol` with a
//! 400 status; only genuine stream failures become `DecodeError::Io`.
//!
//! Header folding follows RFC 2616: a line without a `:` that starts with
//! whitespace continues the previous header, and its trimmed text is joined
//! onto that header's value with one space.
//!
//! A declared `content-length` larger than what the peer actually sends is
//! tolerated: the body is whatever arrived before end of stream.

use std::io::{BufRead, Read};

use tracing::debug;

use crate::error::{DecodeError, HttpError};
use crate::headers::Headers;
use crate::http::{Request, Response, CONTENT_LENGTH};
use crate::line::next_line;

/// Read a complete request from `reader`.
pub fn decode<R: BufRead>(reader: &mut R) -> Result<Request, DecodeError> {
    let mut request = Request::default();
    decode_into(reader, &mut request)?;
    Ok(request)
}

/// Read a request into `request`, filling fields as they are parsed.
///
/// On error `request` keeps whatever was decoded before the failure, which
/// lets the server log a partial request next to the error it answered with.
pub fn decode_into<R: BufRead>(reader: &mut R, request: &mut Request) -> Result<(), DecodeError> {
    let line = next_line(reader)?
        .ok_or_else(|| HttpError::bad_request("empty request: no request line received"))?;
    debug!(line = %line, "request line");

    let mut tokens = line.split_whitespace();
    let (Some(method), Some(path), Some(version)) = (tokens.next(), tokens.next(), tokens.next())
    else {
        return Err(HttpError::bad_request(format!("malformed request line: {line:?}")).into());
    };
    request.set_method(method);
    request.set_path(path);
    request.set_version(version);

    read_headers(reader, request.headers_mut())?;

    if let Some(body) = read_body(reader, request.headers())? {
        request.set_body(body);
    }
    Ok(())
}

/// Read a response as written by [`crate::encode::write_response`] or any
/// HTTP/1.x server.
///
/// Without a `content-length` the rest of the stream is taken as the body.
pub fn decode_response<R: BufRead>(reader: &mut R) -> Result<Response, DecodeError> {
    let line = next_line(reader)?
        .ok_or_else(|| HttpError::bad_request("empty response: no status line received"))?;
    debug!(line = %line, "status line");

    let malformed = || HttpError::bad_request(format!("malformed status line: {line:?}"));
    let (version, rest) = line.split_once(' ').ok_or_else(malformed)?;
    if !version.starts_with("HTTP/") {
        return Err(malformed().into());
    }
    let (code, reason) = rest.split_once(' ').unwrap_or((rest, ""));
    let status: u16 = code.trim().parse().map_err(|_| malformed())?;

    let mut response = Response::new();
    response.set_status(status);
    if reason != response.reason_phrase() {
        response.set_reason_phrase(reason);
    }

    read_headers(reader, response.headers_mut())?;

    match read_body(reader, response.headers())? {
        Some(body) => response.set_body(body),
        None if response.header(CONTENT_LENGTH).is_none() => {
            let mut rest = Vec::new();
            reader.read_to_end(&mut rest)?;
            if !rest.is_empty() {
                response.set_body(rest);
            }
        }
        None => {}
    }
    Ok(response)
}

/// Read header lines up to a blank line or end of stream.
fn read_headers<R: BufRead>(reader: &mut R, headers: &mut Headers) -> Result<(), DecodeError> {
    let mut current: Option<String> = None;

    while let Some(line) = next_line(reader)? {
        debug!(line = %line, "header line");
        if line.is_empty() {
            break;
        }

        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            if name.is_empty() {
                return Err(HttpError::bad_request(format!("header without a name: {line:?}")).into());
            }
            headers.set(name, value.trim());
            current = Some(name.to_ascii_lowercase());
            continue;
        }

        let folded = line.starts_with(char::is_whitespace);
        match current.as_deref() {
            Some(name) if folded => {
                let more = line.trim();
                if !more.is_empty() {
                    headers.append_to(name, more);
                }
            }
            Some(_) => {
                return Err(HttpError::bad_request(format!(
                    "header line without ':' that is not a continuation: {line:?}"
                ))
                .into());
            }
            None => {
                return Err(HttpError::bad_request(format!(
                    "continuation line without a preceding header: {line:?}"
                ))
                .into());
            }
        }
    }
    Ok(())
}

/// Read the body announced by `content-length`, if any.
///
/// Missing, empty, unparsable and zero lengths all mean "no body".
fn read_body<R: BufRead>(reader: &mut R, headers: &Headers) -> Result<Option<Vec<u8>>, DecodeError> {
    let Some(length) = headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|length| *length > 0)
    else {
        return Ok(None);
    };

    let mut body = Vec::new();
    (&mut *reader).take(length).read_to_end(&mut body)?;
    if (body.len() as u64) < length {
        debug!(declared = length, received = body.len(), "short body");
    }
    Ok(Some(body))
}
