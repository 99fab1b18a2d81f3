//! In-memory logger backend.

use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{Map, Value};

use super::{Fields, Level, Log, Logger};

/// One recorded log call.
#[derive(Clone, Debug)]
pub struct Entry {
    pub level: Level,
    pub message: String,
    /// Fields bound to the logger that made the call.
    pub bindings: Fields,
    /// The payload, serializers already applied.
    pub payload: Map<String, Value>,
}

impl Entry {
    /// Bound fields overlaid by the payload: the record a backend would write.
    pub fn record(&self) -> Map<String, Value> {
        let mut record = self.bindings.render(&Fields::new());
        record.extend(self.payload.clone());
        record
    }
}

/// Records every call in memory, shared by a root and all its children.
///
/// ```rust
/// use reqlog::log::{Fields, Level, Logger, MemoryLogger};
///
/// let root = MemoryLogger::new();
/// root.child(Fields::new()).log(Level::Warn, Fields::new(), "careful");
/// assert_eq!(root.messages(), ["careful"]);
/// ```
#[derive(Clone, Default)]
pub struct MemoryLogger {
    fields: Fields,
    entries: Arc<Mutex<Vec<Entry>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fields(fields: Fields) -> Self {
        Self { fields, entries: Arc::default() }
    }

    /// A snapshot of every call made through this logger or any descendant.
    pub fn entries(&self) -> Vec<Entry> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.message).collect()
    }
}

impl Logger for MemoryLogger {
    fn child(&self, fields: Fields) -> Log {
        let mut merged = self.fields.clone();
        merged.merge(fields);
        Arc::new(Self { fields: merged, entries: Arc::clone(&self.entries) })
    }

    fn log(&self, level: Level, payload: Fields, message: &str) {
        let entry = Entry {
            level,
            message: message.to_owned(),
            bindings: self.fields.clone(),
            payload: self.fields.serialize(&payload),
        };
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).push(entry);
    }

    fn fields(&self) -> &Fields {
        &self.fields
    }
}
