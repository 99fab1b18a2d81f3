//! Request-scoped state shared between middleware stages.

use std::collections::HashMap;

use serde_json::Value;

use crate::log::Log;

/// Mutable bag scoped to one request.
///
/// The logger has its own slot: there is always exactly one, and
/// [`set_log`](State::set_log) replaces it. Everything else is a JSON value
/// under a string key, e.g. an upstream-assigned request id under `reqId`.
#[derive(Clone)]
pub struct State {
    log: Log,
    values: HashMap<String, Value>,
}

impl State {
    pub fn new(log: Log) -> Self {
        Self { log, values: HashMap::new() }
    }

    /// The logger for this request.
    pub fn log(&self) -> &Log {
        &self.log
    }

    /// Replaces the logger for this request.
    pub fn set_log(&mut self, log: Log) {
        self.log = log;
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns the value under `key` if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::log::{Fields, Logger, MemoryLogger};
    use serde_json::json;

    #[test]
    fn set_log_replaces_the_single_slot() {
        let root = MemoryLogger::new();
        let mut state = State::new(Arc::new(root.clone()));

        state.set_log(root.child(Fields::new().with("execId", "1")));
        state.set_log(root.child(Fields::new().with("execId", "2")));

        assert_eq!(state.log().fields().get("execId"), Some(&json!("2")));
    }

    #[test]
    fn get_str_ignores_non_strings() {
        let mut state = State::new(Arc::new(MemoryLogger::new()));
        state.insert("reqId", 42);
        assert_eq!(state.get_str("reqId"), None);

        state.insert("reqId", "abc");
        assert_eq!(state.get_str("reqId"), Some("abc"));
    }
}
