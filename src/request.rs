//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use serde_json::{Map, Value, json};

use crate::log::Log;
use crate::state::State;

/// An incoming HTTP request.
///
/// Handlers receive their own copy. Inside a handler, [`state`](Request::state)
/// is a snapshot of the request state as the middleware left it, so
/// [`log`](Request::log) is the per-request logger.
#[derive(Clone)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    params: HashMap<String, String>,
    pub(crate) state: Option<State>,
}

impl Request {
    pub(crate) fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Path plus query string, as sent on the request line.
    pub fn url(&self) -> &str {
        self.uri.path_and_query().map_or(self.uri.path(), |pq| pq.as_str())
    }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Request state snapshot. `None` outside a handler.
    pub fn state(&self) -> Option<&State> {
        self.state.as_ref()
    }

    /// The per-request logger. `None` outside a handler.
    pub fn log(&self) -> Option<&Log> {
        self.state().map(State::log)
    }

    /// The loggable form of this request: method, URL and headers.
    pub fn record(&self) -> Value {
        json!({
            "method": self.method.as_str(),
            "url": self.url(),
            "headers": header_record(&self.headers),
        })
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            params: HashMap::new(),
            state: None,
        }
    }
}

/// Renders headers as a JSON object. Repeated names are joined with `, `.
pub(crate) fn header_record(headers: &HeaderMap) -> Value {
    let mut out = Map::new();
    for name in headers.keys() {
        let joined = headers.get_all(name).iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        out.insert(name.as_str().to_owned(), Value::String(joined));
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str) -> Request {
        http::Request::builder()
            .method("POST")
            .uri(uri)
            .header("X-Request-Name", "create")
            .header("accept", "text/plain")
            .header("accept", "application/json")
            .body(Bytes::from_static(b"{}"))
            .unwrap()
            .into()
    }

    #[test]
    fn url_keeps_the_query() {
        assert_eq!(request("/users?page=2").url(), "/users?page=2");
        assert_eq!(request("/users").url(), "/users");
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = request("/");
        assert_eq!(req.header("x-request-name"), Some("create"));
        assert_eq!(req.header("X-REQUEST-NAME"), Some("create"));
        assert_eq!(req.header("x-missing"), None);
    }

    #[test]
    fn record_has_method_url_and_headers() {
        let record = request("/users?page=2").record();
        assert_eq!(record["method"], "POST");
        assert_eq!(record["url"], "/users?page=2");
        assert_eq!(record["headers"]["accept"], "text/plain, application/json");
        assert_eq!(record["headers"]["x-request-name"], "create");
    }

    #[test]
    fn log_is_absent_outside_a_handler() {
        assert!(request("/").log().is_none());
    }
}
