//! The extension point: code that turns a captured request into a response.

use mockhttp_core::{HttpError, Request, Response};

/// Populates a response for a request.
///
/// The server hands every handler a fresh [`Response`] with status 0. A
/// handler should at least set a status; returning an [`HttpError`] instead
/// makes the server answer with the standard error page for that status.
///
/// Any `Fn(&Request, &mut Response) -> Result<(), HttpError>` closure that is
/// `Send + Sync` is a handler.
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, request: &Request, response: &mut Response) -> Result<(), HttpError>;
}

impl<F> Handler for F
where
    F: Fn(&Request, &mut Response) -> Result<(), HttpError> + Send + Sync + 'static,
{
    fn handle(&self, request: &Request, response: &mut Response) -> Result<(), HttpError> {
        self(request, response)
    }
}

/// Answers `200 OK` with no body, whatever the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOk;

impl Handler for AlwaysOk {
    fn handle(&self, _request: &Request, response: &mut Response) -> Result<(), HttpError> {
        response.set_status(200);
        Ok(())
    }
}
