//! The logger capability consumed by the instrumentation middleware.
//!
//! A [`Logger`] can do two things: derive a child carrying extra structured
//! [`Fields`], and emit one leveled call with a structured payload and a
//! message. Everything else (formatting, transport, storage) belongs to the
//! backend.
//!
//! Two backends ship with the crate:
//!
//! - [`TracingLogger`] forwards every call to a `tracing` event. It is the
//!   default base logger of a [`Router`](crate::Router).
//! - [`MemoryLogger`] keeps every call in memory. Use it in tests.
//!
//! ```rust
//! use reqlog::log::{Fields, Level, Logger, MemoryLogger};
//! use serde_json::json;
//!
//! let root = MemoryLogger::new();
//! let child = root.child(Fields::new().with("execId", "e-1"));
//! child.log(Level::Info, Fields::new().with("ok", true), "done");
//!
//! let entries = root.entries();
//! assert_eq!(entries[0].message, "done");
//! assert_eq!(entries[0].record()["execId"], json!("e-1"));
//! ```

mod fields;
mod level;
mod memory;
mod trace_logger;

use std::sync::Arc;

pub use fields::{Fields, Serializer};
pub use level::{Level, ParseLevelError};
pub use memory::{Entry, MemoryLogger};
pub use trace_logger::TracingLogger;

/// A shared, type-erased logger handle.
///
/// Cloning is one atomic increment. The base logger outlives every request;
/// each derived child lives in one request's [`State`](crate::State).
pub type Log = Arc<dyn Logger>;

/// Hierarchical structured logger.
pub trait Logger: Send + Sync + 'static {
    /// Derives a child that carries `fields` merged over this logger's own.
    ///
    /// Keys in `fields` replace inherited keys of the same name. Serializer
    /// overrides merge the same way.
    fn child(&self, fields: Fields) -> Log;

    /// Emits one call at `level`.
    fn log(&self, level: Level, payload: Fields, message: &str);

    /// The fields bound to this logger, inherited ones included.
    fn fields(&self) -> &Fields;
}
