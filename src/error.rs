//! Unified error types.

/// A type-erased failure raised by a handler or middleware.
///
/// Downstream failures travel through the middleware chain as `BoxError`
/// untouched. Only [`Router::handle`](crate::Router::handle) turns them into
/// a `500` response.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by reqlog's fallible infrastructure operations.
///
/// Application-level errors (404, 422, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// infrastructure failures: binding to a port or accepting a connection.
/// Middleware misconfiguration is a separate type,
/// [`ConfigError`](crate::middleware::ConfigError).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{0}`")]
    Addr(String),
}
