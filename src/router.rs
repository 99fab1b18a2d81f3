//! Radix-tree request router and the middleware stack.
//!
//! One tree per HTTP method. O(path-length) lookup. Every request, matched
//! or not, runs through the middleware stack before reaching its handler.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;
use tracing::{debug, error};

use crate::context::Context;
use crate::error::BoxError;
use crate::handler::{BoxedHandler, Handler};
use crate::log::{Log, TracingLogger};
use crate::middleware::{BoxFuture, Endpoint, Middleware, Next};
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each builder call returns `self` so registrations chain naturally.
///
/// ```rust,no_run
/// # use reqlog::{Request, Response, Router};
/// # use reqlog::middleware::{ContextLogger, RequestLogger, ResponseTime};
/// # use http::Method;
/// # async fn get_user(_: Request) -> Response { Response::text("") }
/// let app = Router::new()
///     .layer(ContextLogger::default())
///     .layer(RequestLogger::default())
///     .layer(ResponseTime::new("x-response-time").unwrap())
///     .on(Method::GET, "/users/{id}", get_user);
/// ```
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    stack: Vec<Arc<dyn Middleware>>,
    log: Log,
}

impl Router {
    /// An empty router whose base logger is a [`TracingLogger`].
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            stack: Vec::new(),
            log: Arc::new(TracingLogger::new()),
        }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    /// Append a middleware. The first one added is the outermost.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        debug!(middleware = middleware.name(), position = self.stack.len(), "middleware registered");
        self.stack.push(Arc::new(middleware));
        self
    }

    /// Replace the base logger every request context starts with.
    pub fn logger(mut self, log: Log) -> Self {
        self.log = log;
        self
    }

    /// Runs one request through the middleware stack and its handler.
    ///
    /// Unmatched routes still pass through every middleware and end as
    /// `404 Not Found`. A downstream failure that no middleware handled is
    /// logged and answered with `500 Internal Server Error`.
    pub async fn handle(&self, request: Request) -> Response {
        let (handler, params) = match self.lookup(request.method(), request.path()) {
            Some((handler, params)) => (Some(handler), params),
            None => (None, HashMap::new()),
        };
        let endpoint = Route(handler);
        let mut cx = Context::new(request.with_params(params), Arc::clone(&self.log));

        let outcome = Next::new(&self.stack, &endpoint).run(&mut cx).await;
        match outcome {
            Ok(()) => cx.into_response(),
            Err(e) => {
                error!(
                    method = %cx.request().method(),
                    path = cx.request().path(),
                    error = %e,
                    "request failed"
                );
                Response::status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

/// The endpoint stage: calls the matched handler, if any, with a snapshot of
/// the request state and stores its response.
struct Route(Option<BoxedHandler>);

impl Endpoint for Route {
    fn call<'a>(&'a self, cx: &'a mut Context) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(async move {
            if let Some(handler) = &self.0 {
                let response = handler.call(cx.handler_request()).await?;
                cx.set_response(response);
            }
            Ok(())
        })
    }
}
