//! Serving a single accepted connection.
//!
//! # Design
//! One connection carries exactly one exchange: decode, handle, encode,
//! close. Whatever happens, one request and one response are appended to the
//! connection log so the two lists stay index-aligned:
//!
//! - malformed input is answered with the standard error page for the
//!   decoder's status (always 400), next to the partially decoded request;
//! - handler errors and handler panics are answered with an error page;
//! - a transport failure while reading logs the partial request and an
//!   untouched response, and is returned to the accept loop for logging.

use std::io::{self, BufReader};
use std::net::{Shutdown, TcpStream};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};

use mockhttp_core::{decode_into, write_response, DecodeError, HttpError, Request, Response};
use serde::Serialize;
use tracing::{debug, warn};

use crate::handler::Handler;

/// One captured request together with the response sent for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exchange {
    pub request: Request,
    pub response: Response,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // The logs are append-only data; a panic elsewhere cannot leave them torn.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The append-only request and response logs.
///
/// Each append is atomic for readers, but a reader may see the request of an
/// in-flight connection before its response.
#[derive(Debug, Default)]
pub(crate) struct ConnectionLog {
    requests: Mutex<Vec<Request>>,
    responses: Mutex<Vec<Response>>,
}

impl ConnectionLog {
    pub(crate) fn push_request(&self, request: Request) {
        lock(&self.requests).push(request);
    }

    pub(crate) fn push_response(&self, response: Response) {
        lock(&self.responses).push(response);
    }

    pub(crate) fn requests(&self) -> Vec<Request> {
        lock(&self.requests).clone()
    }

    pub(crate) fn responses(&self) -> Vec<Response> {
        lock(&self.responses).clone()
    }

    pub(crate) fn clear(&self) {
        lock(&self.requests).clear();
        lock(&self.responses).clear();
    }
}

/// Run `handler` for `request`, turning every failure into an error page.
pub(crate) fn respond(handler: Option<&dyn Handler>, request: &Request) -> Response {
    let Some(handler) = handler else {
        warn!("no request handler installed");
        return Response::error_page(&HttpError::internal("no request handler installed"));
    };

    let mut response = Response::new();
    match catch_unwind(AssertUnwindSafe(|| handler.handle(request, &mut response))) {
        Ok(Ok(())) => response,
        Ok(Err(err)) => {
            debug!(status = err.status, error = %err.message, "handler returned an error");
            Response::error_page(&err)
        }
        Err(_) => {
            warn!(method = request.method(), path = request.path(), "request handler panicked");
            Response::error_page(&HttpError::internal("request handler panicked"))
        }
    }
}

/// Serve one exchange on `stream` and close it.
pub(crate) fn handle_connection(
    stream: TcpStream,
    handler: Option<&dyn Handler>,
    log: &ConnectionLog,
) -> io::Result<()> {
    let mut reader = BufReader::new(&stream);
    let mut request = Request::default();

    let response = match decode_into(&mut reader, &mut request) {
        Ok(()) => {
            debug!(method = request.method(), path = request.path(), "request decoded");
            log.push_request(request.clone());
            respond(handler, &request)
        }
        Err(DecodeError::Protocol(err)) => {
            warn!(status = err.status, error = %err.message, "malformed request");
            log.push_request(request);
            Response::error_page(&err)
        }
        Err(DecodeError::Io(err)) => {
            log.push_request(request);
            log.push_response(Response::new());
            return Err(err);
        }
    };

    debug!(
        status = response.status(),
        reason = response.reason_phrase(),
        "sending response"
    );
    log.push_response(response.clone());

    let mut writer = &stream;
    write_response(&mut writer, &response)?;
    // Half-close so the client sees end of stream even if it keeps its side open.
    if let Err(err) = stream.shutdown(Shutdown::Write) {
        debug!(error = %err, "shutdown after response failed");
    }
    Ok(())
}
