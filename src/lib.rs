//! # reqlog
//!
//! Request-lifecycle instrumentation for a minimal hyper framework.
//!
//! Every request gets its own child logger carrying correlation fields, a
//! `Request: Start` / `Request: End` pair of log events, and a response
//! header with its latency. The framework around it stays small: radix-tree
//! routing, a middleware stack, graceful shutdown.
//!
//! What reqlog does not do:
//!
//! - **Log transport and formatting**: the [`log::Logger`] backend decides.
//!   The default, [`log::TracingLogger`], hands every call to `tracing`.
//! - **Metrics aggregation**: latency is reported per request, never summed.
//! - **Trace propagation**: one execution id and an optional upstream
//!   request id, nothing more.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::Method;
//! use reqlog::middleware::{ContextLogger, RequestLogger, ResponseTime};
//! use reqlog::log::{Fields, Level, Logger};
//! use reqlog::{BoxError, Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), BoxError> {
//!     let app = Router::new()
//!         .layer(ContextLogger::default())
//!         .layer(RequestLogger::default())
//!         .layer(ResponseTime::new("x-response-time")?)
//!         .on(Method::GET, "/users/{id}", get_user);
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await?;
//!     Ok(())
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     if let Some(log) = req.log() {
//!         log.log(Level::Debug, Fields::new().with("userId", id), "loading user");
//!     }
//!     Response::json(format!(r#"{{"id":"{id}"}}"#))
//! }
//! ```

mod context;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;
mod state;

pub mod log;
pub mod middleware;

pub use context::Context;
pub use error::{BoxError, Error};
pub use handler::{Handler, IntoOutcome};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use state::State;
