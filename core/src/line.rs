//! Line reading over a buffered byte stream.
//!
//! # Design
//! A line ends at LF, CR or CRLF. After a terminator the reader peeks one
//! byte through `fill_buf` and only consumes it when it is the *other*
//! terminator character, so `\n\n` stays two lines and a CR followed by the
//! first byte of the next line loses nothing. Peeking costs nothing extra on
//! a `BufReader`, which is what the decoder wraps every socket in.

use std::io::{self, BufRead};

fn is_terminator(byte: u8) -> bool {
    byte == b'\n' || byte == b'\r'
}

/// Look at the next byte without consuming it. `None` at end of stream.
fn peek_byte<R: BufRead + ?Sized>(reader: &mut R) -> io::Result<Option<u8>> {
    loop {
        match reader.fill_buf() {
            Ok(buf) => return Ok(buf.first().copied()),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
}

fn next_byte<R: BufRead + ?Sized>(reader: &mut R) -> io::Result<Option<u8>> {
    let byte = peek_byte(reader)?;
    if byte.is_some() {
        reader.consume(1);
    }
    Ok(byte)
}

/// Read one line, excluding its terminator, decoded as UTF-8.
///
/// Returns an empty string at end of stream; use [`next_line`] when the
/// caller needs to tell "blank line" from "no more input".
pub fn read_line<R: BufRead + ?Sized>(reader: &mut R) -> io::Result<String> {
    let mut line = Vec::new();
    while let Some(byte) = next_byte(reader)? {
        if is_terminator(byte) {
            if let Some(peeked) = peek_byte(reader)? {
                if peeked != byte && is_terminator(peeked) {
                    reader.consume(1);
                }
            }
            break;
        }
        line.push(byte);
    }
    Ok(String::from_utf8_lossy(&line).into_owned())
}

/// Like [`read_line`], but `None` when the stream is already exhausted.
pub fn next_line<R: BufRead + ?Sized>(reader: &mut R) -> io::Result<Option<String>> {
    if peek_byte(reader)?.is_none() {
        return Ok(None);
    }
    read_line(reader).map(Some)
}
