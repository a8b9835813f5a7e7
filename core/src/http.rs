//! HTTP request and response values.
//!
//! # Design
//! Both types are plain data with owned fields. The only coupling between
//! fields is the body invariant: assigning a body always sets
//! `content-length` to its exact byte length, and clearing the body removes
//! that header, so the two can never disagree.
//!
//! A response's reason phrase is stored, not computed at write time.
//! `set_status` fills it from [`reason_for`] unless the caller has set an
//! explicit phrase, which then sticks across later status changes.

use serde::{Serialize, Serializer};

use crate::error::HttpError;
use crate::headers::Headers;
use crate::status::reason_for;

pub const CONTENT_LENGTH: &str = "content-length";
pub const CONTENT_TYPE: &str = "content-type";

/// Serialize an optional body as text so captured traffic dumps read well.
fn body_as_text<S: Serializer>(body: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
    match body {
        Some(bytes) => serializer.serialize_some(&String::from_utf8_lossy(bytes)),
        None => serializer.serialize_none(),
    }
}

/// A request as read from the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Request {
    method: String,
    path: String,
    version: Option<String>,
    headers: Headers,
    #[serde(serialize_with = "body_as_text")]
    body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn set_method(&mut self, method: impl Into<String>) {
        self.method = method.into();
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = Some(version.into());
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.set(name, value);
    }

    pub(crate) fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// The body decoded as UTF-8, with invalid sequences replaced.
    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_deref()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Assign the body and set `content-length` to its length.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        let body = body.into();
        self.headers.set(CONTENT_LENGTH, body.len().to_string());
        self.body = Some(body);
    }

    /// Drop the body together with its `content-length`.
    pub fn clear_body(&mut self) {
        self.body = None;
        self.headers.remove(CONTENT_LENGTH);
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.set_body(body);
        self
    }
}

/// A response to be written to the wire.
///
/// Status `0` means "not set by anyone" and never collides with a real code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Response {
    status: u16,
    reason_phrase: String,
    #[serde(skip)]
    explicit_reason: bool,
    headers: Headers,
    #[serde(serialize_with = "body_as_text")]
    body: Option<Vec<u8>>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Set the status. The reason phrase follows unless one was set explicitly.
    pub fn set_status(&mut self, status: u16) {
        self.status = status;
        if !self.explicit_reason {
            self.reason_phrase = reason_for(status);
        }
    }

    pub fn reason_phrase(&self) -> &str {
        &self.reason_phrase
    }

    /// Set an explicit reason phrase. Later `set_status` calls keep it.
    pub fn set_reason_phrase(&mut self, phrase: impl Into<String>) {
        self.reason_phrase = phrase.into();
        self.explicit_reason = true;
    }

    pub fn has_explicit_reason(&self) -> bool {
        self.explicit_reason
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.set(name, value);
    }

    pub(crate) fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_deref()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        let body = body.into();
        self.headers.set(CONTENT_LENGTH, body.len().to_string());
        self.body = Some(body);
    }

    pub fn clear_body(&mut self) {
        self.body = None;
        self.headers.remove(CONTENT_LENGTH);
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.set_status(status);
        self
    }

    pub fn with_reason(mut self, phrase: impl Into<String>) -> Self {
        self.set_reason_phrase(phrase);
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.set_body(body);
        self
    }

    /// The standard error page for `err`: its status, the canonical phrase
    /// and a small HTML body that includes the error message.
    pub fn error_page(err: &HttpError) -> Self {
        let mut response = Response::new();
        response.set_status(err.status);
        let body = format!(
            "<html><body><h1>{} - {}</h1><p>{}</p></body></html>",
            err.status,
            response.reason_phrase,
            escape_html(&err.message)
        );
        response.set_header(CONTENT_TYPE, "text/html");
        response.set_body(body);
        response
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_request_is_empty() {
        let request = Request::default();
        assert_eq!(request.method(), "");
        assert_eq!(request.path(), "");
        assert_eq!(request.version(), None);
        assert!(request.headers().is_empty());
        assert_eq!(request.body(), None);
        assert_eq!(request.body_text(), None);
    }

    #[test]
    fn set_body_sets_content_length() {
        let mut request = Request::new("POST", "/");
        request.set_body(vec![1, 2, 3, 4]);
        assert_eq!(request.body(), Some(&[1u8, 2, 3, 4][..]));
        assert_eq!(request.header("Content-Length"), Some("4"));

        request.set_body("héllo");
        assert_eq!(request.header("content-length"), Some("6"));
        assert_eq!(request.body_text().as_deref(), Some("héllo"));
    }

    #[test]
    fn empty_body_still_has_length() {
        let mut request = Request::default();
        request.set_body("");
        assert_eq!(request.body(), Some(&b""[..]));
        assert_eq!(request.header(CONTENT_LENGTH), Some("0"));
    }

    #[test]
    fn clear_body_drops_content_length() {
        let mut response = Response::new();
        response.set_body("hello");
        response.clear_body();
        assert_eq!(response.body(), None);
        assert_eq!(response.header(CONTENT_LENGTH), None);
    }

    #[test]
    fn unset_status_is_zero() {
        let response = Response::new();
        assert_eq!(response.status(), 0);
        assert_eq!(response.reason_phrase(), "");
    }

    #[test]
    fn status_derives_reason() {
        let mut response = Response::new();
        response.set_status(404);
        assert_eq!(response.reason_phrase(), "Not Found");
        response.set_status(200);
        assert_eq!(response.reason_phrase(), "OK");
        response.set_status(302);
        assert_eq!(response.reason_phrase(), "302 Message");
    }

    #[test]
    fn explicit_reason_survives_status_change() {
        let mut response = Response::new();
        response.set_status(200);
        response.set_reason_phrase("Fine");
        response.set_status(500);
        assert_eq!(response.status(), 500);
        assert_eq!(response.reason_phrase(), "Fine");
        assert!(response.has_explicit_reason());
    }

    #[test]
    fn explicit_reason_before_status() {
        let response = Response::new().with_reason("Teapot").with_status(418);
        assert_eq!(response.reason_phrase(), "Teapot");
    }

    #[test]
    fn error_page_layout() {
        let response = Response::error_page(&HttpError::bad_request("no <colon>"));
        assert_eq!(response.status(), 400);
        assert_eq!(response.reason_phrase(), "Bad Request");
        assert_eq!(response.header("content-type"), Some("text/html"));
        let body = response.body_text().unwrap();
        assert_eq!(
            body,
            "<html><body><h1>400 - Bad Request</h1><p>no &lt;colon&gt;</p></body></html>"
        );
        assert_eq!(response.header(CONTENT_LENGTH), Some(body.len().to_string().as_str()));
    }
}
