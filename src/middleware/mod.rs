//! Middleware layer.
//!
//! Middleware intercepts a request before the handler runs and the response
//! after it returns. It is the place for cross-cutting concerns: structured
//! logging, request ids, latency headers.
//!
//! A middleware receives the request [`Context`] and a [`Next`] handle to the
//! rest of the chain. Code before `next.run(cx).await` runs outer to inner in
//! registration order; code after it runs inner to outer.
//!
//! ```text
//! ContextLogger ─▶ RequestLogger ─▶ ResponseTime ─▶ handler
//!                                                      │
//! ContextLogger ◀─ RequestLogger ◀─ ResponseTime ◀─────┘
//! ```
//!
//! Built-in middleware:
//! - [`ContextLogger`] derives a per-request child logger with correlation
//!   fields and stores it in [`State`](crate::State).
//! - [`RequestLogger`] logs `Request: Start` and `Request: End` around the
//!   downstream call.
//! - [`ResponseTime`] writes the elapsed milliseconds into a response header.
//!
//! # Writing one
//!
//! ```rust
//! use reqlog::middleware::{BoxFuture, Middleware, Next};
//! use reqlog::{BoxError, Context};
//!
//! struct PoweredBy;
//!
//! impl Middleware for PoweredBy {
//!     fn call<'a>(&'a self, cx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<(), BoxError>> {
//!         Box::pin(async move {
//!             next.run(cx).await?;
//!             cx.set(http::header::SERVER, http::HeaderValue::from_static("reqlog"));
//!             Ok(())
//!         })
//!     }
//! }
//! ```

mod config;
mod context_logger;
mod request_logger;
mod response_time;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::error::BoxError;

pub use config::ConfigError;
pub use context_logger::{ContextLogger, ContextLoggerOptions, Generator};
pub use request_logger::{RequestLogger, RequestLoggerOptions};
pub use response_time::{ResponseTime, ResponseTimeOptions};

/// A heap-allocated, type-erased future borrowing for `'a`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One stage of the request pipeline.
pub trait Middleware: Send + Sync + 'static {
    /// Runs this stage. Call `next.run(cx)` at most once to continue the
    /// chain; return its error to propagate a downstream failure.
    fn call<'a>(&'a self, cx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<(), BoxError>>;

    /// Name used in diagnostics.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// The innermost stage: produces the response.
pub trait Endpoint: Send + Sync {
    fn call<'a>(&'a self, cx: &'a mut Context) -> BoxFuture<'a, Result<(), BoxError>>;
}

/// The remainder of the chain below the current middleware.
///
/// [`run`](Next::run) consumes it, so the downstream chain runs at most once
/// per invocation.
pub struct Next<'a> {
    stack: &'a [Arc<dyn Middleware>],
    endpoint: &'a dyn Endpoint,
}

impl<'a> Next<'a> {
    pub fn new(stack: &'a [Arc<dyn Middleware>], endpoint: &'a dyn Endpoint) -> Self {
        Self { stack, endpoint }
    }

    /// Runs the next middleware, or the endpoint once the stack is exhausted.
    pub fn run<'b>(self, cx: &'b mut Context) -> BoxFuture<'b, Result<(), BoxError>>
    where
        'a: 'b,
    {
        match self.stack.split_first() {
            Some((first, rest)) => first.call(cx, Next { stack: rest, endpoint: self.endpoint }),
            None => self.endpoint.call(cx),
        }
    }
}
