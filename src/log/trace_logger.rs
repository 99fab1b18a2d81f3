//! `tracing`-backed logger, the default base logger of a router.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::{Fields, Level, Log, Logger, Serializer};

/// Forwards every call to one `tracing` event under the `reqlog` target.
///
/// The record (bound fields overlaid by the serialized payload) is attached
/// as a single `fields` value, rendered as compact JSON text through its
/// `Display` impl; the message becomes the event message. `Fatal` maps to an
/// `ERROR` event with `fatal = true`.
///
/// `tracing` has no nested values, so a JSON-formatting subscriber writes
/// `fields` as an escaped string rather than as structured keys. Parse it
/// downstream, or give the router a [`Logger`] of your own.
///
/// A root logger registers a `res` serializer that keeps only `statusCode`
/// and `headers`. Override it on a child with
/// [`Serializer::identity`] to log a response record in full.
#[derive(Clone, Debug)]
pub struct TracingLogger {
    fields: Fields,
}

impl TracingLogger {
    pub fn new() -> Self {
        Self { fields: Fields::new().with_serializer("res", Serializer::new(res_summary)) }
    }

    /// A root logger with `fields` bound to every call.
    pub fn with_fields(fields: Fields) -> Self {
        let mut root = Self::new();
        root.fields.merge(fields);
        root
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for TracingLogger {
    fn child(&self, fields: Fields) -> Log {
        let mut merged = self.fields.clone();
        merged.merge(fields);
        Arc::new(Self { fields: merged })
    }

    fn log(&self, level: Level, payload: Fields, message: &str) {
        let record = Value::Object(self.fields.render(&payload));
        match level {
            Level::Trace => tracing::trace!(target: "reqlog", fields = %record, "{message}"),
            Level::Debug => tracing::debug!(target: "reqlog", fields = %record, "{message}"),
            Level::Info  => tracing::info!(target: "reqlog", fields = %record, "{message}"),
            Level::Warn  => tracing::warn!(target: "reqlog", fields = %record, "{message}"),
            Level::Error => tracing::error!(target: "reqlog", fields = %record, "{message}"),
            Level::Fatal => tracing::error!(target: "reqlog", fatal = true, fields = %record, "{message}"),
        }
    }

    fn fields(&self) -> &Fields {
        &self.fields
    }
}

/// Default `res` serializer: status code and headers only.
fn res_summary(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| matches!(key.as_str(), "statusCode" | "headers"))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect::<Map<_, _>>(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;

    use super::*;
    use serde_json::json;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        fn lines(&self) -> Vec<String> {
            let bytes = self.0.lock().unwrap();
            String::from_utf8_lossy(&bytes).lines().map(str::to_owned).collect()
        }
    }

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn captured(f: impl FnOnce()) -> Vec<String> {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        capture.lines()
    }

    #[test]
    fn root_summarises_res() {
        let root = TracingLogger::new();
        let res = Fields::new().with("res", json!({
            "time": 4,
            "size": 2,
            "headers": {},
            "statusCode": 200,
        }));

        let record = root.fields().render(&res);
        assert_eq!(record["res"], json!({ "headers": {}, "statusCode": 200 }));
    }

    #[test]
    fn child_identity_override_keeps_full_res() {
        let child = TracingLogger::new()
            .child(Fields::new().with_serializer("res", Serializer::identity()));
        let res = Fields::new().with("res", json!({ "time": 4, "statusCode": 200 }));

        let record = child.fields().render(&res);
        assert_eq!(record["res"], json!({ "time": 4, "statusCode": 200 }));
    }

    #[test]
    fn logging_without_subscriber_is_a_no_op() {
        let log = TracingLogger::with_fields(Fields::new().with("service", "test"));
        for level in [Level::Trace, Level::Info, Level::Fatal] {
            log.log(level, Fields::new().with("n", 1), "hello");
        }
        assert_eq!(log.fields().get("service"), Some(&json!("test")));
    }

    #[test]
    fn emits_one_event_per_call_at_the_mapped_level() {
        let lines = captured(|| {
            let log = TracingLogger::new().child(Fields::new().with("execId", "e1"));
            let res = json!({ "time": 4, "size": 2, "statusCode": 200 });
            log.log(Level::Warn, Fields::new().with("res", res), "Request: End");
            log.log(Level::Fatal, Fields::new(), "dead");
        });

        assert_eq!(lines.len(), 2, "{lines:?}");

        let end = &lines[0];
        assert!(end.contains("WARN"), "{end}");
        assert!(end.contains("reqlog"), "{end}");
        assert!(end.contains("Request: End"), "{end}");
        assert!(end.contains(r#""execId":"e1""#), "{end}");
        assert!(end.contains(r#""res":{"statusCode":200}"#), "{end}");
        assert!(!end.contains("time"), "{end}");

        let fatal = &lines[1];
        assert!(fatal.contains("ERROR"), "{fatal}");
        assert!(fatal.contains("dead"), "{fatal}");
        assert!(fatal.contains("fatal=true"), "{fatal}");
    }

    #[test]
    fn levels_below_the_subscriber_filter_are_dropped() {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let log = TracingLogger::new();
            log.log(Level::Debug, Fields::new(), "hidden");
            log.log(Level::Info, Fields::new(), "shown");
        });

        let lines = capture.lines();
        assert_eq!(lines.len(), 1, "{lines:?}");
        assert!(lines[0].contains("shown"));
    }
}
