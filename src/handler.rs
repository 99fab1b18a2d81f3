//! Handler trait and type erasure.
//!
//! The router holds handlers of different types in one map, so each is
//! boxed behind [`ErasedHandler`]:
//!
//! ```text
//! async fn hello(req: Request) -> Response { … }   ← user writes this
//!        ↓ router.on(Method::GET, "/", hello)
//! hello.into_boxed_handler()                       ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(hello))                       ← stored as BoxedHandler
//!        ↓
//! handler.call(req)  inside the endpoint stage     ← one vtable dispatch
//!        ↓
//! Box::pin(async { hello(req).await.into_outcome() })
//! ```
//!
//! A handler may fail: returning `Err` from a `Result` handler is a
//! downstream failure. It travels up through every middleware unchanged.

use std::future::Future;
use std::sync::Arc;

use http::StatusCode;

use crate::error::BoxError;
use crate::middleware::BoxFuture;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture<'static, Result<Response, BoxError>>;
}

#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Handler output ────────────────────────────────────────────────────────────

/// What a handler may return: a response-like value, or a `Result` of one.
pub trait IntoOutcome: Send + 'static {
    fn into_outcome(self) -> Result<Response, BoxError>;
}

macro_rules! infallible_outcome {
    ($($ty:ty),*) => {
        $(impl IntoOutcome for $ty {
            fn into_outcome(self) -> Result<Response, BoxError> {
                Ok(self.into_response())
            }
        })*
    };
}

infallible_outcome!(Response, &'static str, String, StatusCode);

impl<T, E> IntoOutcome for Result<T, E>
where
    T: IntoResponse + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    fn into_outcome(self) -> Result<Response, BoxError> {
        self.map(IntoResponse::into_response).map_err(Into::into)
    }
}

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// Automatically satisfied for any `async fn` with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoOutcome
/// ```
///
/// The trait is sealed: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoOutcome,
{
}

impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoOutcome,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

struct FnHandler<F>(F);

impl<F, Fut> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future + Send + 'static,
    Fut::Output: IntoOutcome,
{
    fn call(&self, req: Request) -> BoxFuture<'static, Result<Response, BoxError>> {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_outcome() })
    }
}
