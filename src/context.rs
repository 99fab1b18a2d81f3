//! Per-request context threaded through the middleware chain.

use http::StatusCode;
use http::header::{HeaderName, HeaderValue};

use crate::log::Log;
use crate::request::Request;
use crate::response::Response;
use crate::state::State;

/// Everything one request's middleware may read or change.
///
/// The response starts as an empty `404 Not Found`; the matched handler
/// replaces it. The base logger is passed in explicitly and becomes the
/// initial [`State::log`].
pub struct Context {
    request: Request,
    response: Response,
    state: State,
}

impl Context {
    pub fn new(request: Request, log: Log) -> Self {
        Self {
            request,
            response: Response::status(StatusCode::NOT_FOUND),
            state: State::new(log),
        }
    }

    pub fn request(&self) -> &Request { &self.request }
    pub fn response(&self) -> &Response { &self.response }
    pub fn state(&self) -> &State { &self.state }
    pub fn state_mut(&mut self) -> &mut State { &mut self.state }

    pub fn set_response(&mut self, response: Response) {
        self.response = response;
    }

    /// Request header, case-insensitive.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.request.header(name)
    }

    /// Sets a response header.
    pub fn set(&mut self, name: HeaderName, value: HeaderValue) {
        self.response.set_header(name, value);
    }

    pub fn into_response(self) -> Response {
        self.response
    }

    /// The handler's copy of the request, carrying the current state.
    pub(crate) fn handler_request(&self) -> Request {
        let mut req = self.request.clone();
        req.state = Some(self.state.clone());
        req
    }
}
