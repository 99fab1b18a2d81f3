//! Start/end log events around the downstream call.

use std::time::Instant;

use serde_json::{Value, json};

use super::config::{ConfigError, lookup, non_empty, non_empty_string};
use super::{BoxFuture, Middleware, Next};
use crate::context::Context;
use crate::error::BoxError;
use crate::log::{Fields, Level};

const NAME: &str = "Logger middleware";

/// Options for [`RequestLogger`].
#[derive(Clone, Debug)]
pub struct RequestLoggerOptions {
    /// Level name for both events. Default `info`.
    pub level: String,
}

impl Default for RequestLoggerOptions {
    fn default() -> Self {
        Self { level: Level::Info.as_str().to_owned() }
    }
}

impl RequestLoggerOptions {
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Reads `level` from a JSON object. A present `level` must be a
    /// non-empty string.
    pub fn from_json(options: &Value) -> Result<Self, ConfigError> {
        let mut out = Self::default();
        if let Some(level) = lookup(NAME, options, "level")? {
            out.level = non_empty_string(NAME, "level", level)?.to_owned();
        }
        Ok(out)
    }
}

/// Logs `Request: Start` before the downstream call and `Request: End`
/// after it, through the logger in [`State`](crate::State).
///
/// Start payload: `{ req, isRequestLog: true, isAppLog: false }`.
///
/// End payload: `{ res: { time, size, headers, statusCode }, resStatusCode,
/// isRequestLog: true, isAppLog: false }`, with `time` in whole
/// milliseconds and the response read after the downstream call returns.
///
/// If the downstream call fails, no End event is written and the error is
/// returned as is.
#[derive(Clone, Copy, Debug)]
pub struct RequestLogger {
    level: Level,
}

impl RequestLogger {
    pub fn new(options: RequestLoggerOptions) -> Result<Self, ConfigError> {
        let name = non_empty(NAME, "level", &options.level)?;
        let level = name.parse::<Level>().map_err(|e| ConfigError::Invalid {
            middleware: NAME,
            option: "level",
            value: name.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self { level })
    }

    pub fn from_json(options: &Value) -> Result<Self, ConfigError> {
        Self::new(RequestLoggerOptions::from_json(options)?)
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

impl Default for RequestLogger {
    fn default() -> Self {
        Self { level: Level::Info }
    }
}

fn request_log(payload: Fields) -> Fields {
    payload.with("isRequestLog", true).with("isAppLog", false)
}

impl Middleware for RequestLogger {
    fn call<'a>(&'a self, cx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(async move {
            let start = Instant::now();
            let payload = Fields::new().with("req", cx.request().record());
            cx.state().log().log(self.level, request_log(payload), "Request: Start");

            next.run(cx).await?;

            let res = cx.response();
            let status = res.status_code().as_u16();
            let time = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            let payload = Fields::new()
                .with("res", json!({
                    "time": time,
                    "size": res.len(),
                    "headers": res.header_record(),
                    "statusCode": status,
                }))
                .with("resStatusCode", status);
            cx.state().log().log(self.level, request_log(payload), "Request: End");
            Ok(())
        })
    }

    fn name(&self) -> &'static str {
        "request_logger"
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use http::StatusCode;

    use super::*;
    use crate::log::MemoryLogger;
    use crate::middleware::Endpoint;
    use crate::middleware::test_support::{Fail, Respond, context, get};
    use crate::response::Response;

    struct Slow(Duration);

    impl Endpoint for Slow {
        fn call<'a>(&'a self, cx: &'a mut Context) -> BoxFuture<'a, Result<(), BoxError>> {
            Box::pin(async move {
                tokio::time::sleep(self.0).await;
                cx.set_response(Response::text("late"));
                Ok(())
            })
        }
    }

    #[tokio::test]
    async fn logs_start_then_end_at_info() {
        let root = MemoryLogger::new();
        let mut cx = context(&root, get("/things?x=1"));
        let endpoint = Respond(StatusCode::CREATED, "made");

        RequestLogger::default().call(&mut cx, Next::new(&[], &endpoint)).await.unwrap();

        let entries = root.entries();
        assert_eq!(root.messages(), ["Request: Start", "Request: End"]);
        assert!(entries.iter().all(|e| e.level == Level::Info));

        let start = &entries[0].payload;
        assert_eq!(start["req"]["url"], "/things?x=1");
        assert_eq!(start["isRequestLog"], true);
        assert_eq!(start["isAppLog"], false);

        let end = &entries[1].payload;
        assert!(end["res"]["time"].is_u64());
        assert_eq!(end["res"]["size"], 4);
        assert_eq!(end["res"]["statusCode"], 201);
        assert_eq!(end["res"]["headers"]["content-type"], "text/plain; charset=utf-8");
        assert_eq!(end["resStatusCode"], 201);
        assert_eq!(end["isRequestLog"], true);
        assert_eq!(end["isAppLog"], false);
    }

    #[tokio::test]
    async fn end_time_covers_the_downstream_call() {
        let root = MemoryLogger::new();
        let mut cx = context(&root, get("/"));
        let endpoint = Slow(Duration::from_millis(25));

        RequestLogger::default().call(&mut cx, Next::new(&[], &endpoint)).await.unwrap();

        let time = root.entries()[1].payload["res"]["time"].as_u64().unwrap();
        assert!(time >= 25, "time was {time}");
    }

    #[tokio::test]
    async fn configured_level_is_used_for_both_events() {
        let root = MemoryLogger::new();
        let mut cx = context(&root, get("/"));
        let endpoint = Respond(StatusCode::OK, "");
        let mw = RequestLogger::new(RequestLoggerOptions::default().level("debug")).unwrap();

        mw.call(&mut cx, Next::new(&[], &endpoint)).await.unwrap();

        assert!(root.entries().iter().all(|e| e.level == Level::Debug));
        assert_eq!(root.entries().len(), 2);
    }

    #[tokio::test]
    async fn downstream_failure_skips_the_end_event() {
        let root = MemoryLogger::new();
        let mut cx = context(&root, get("/"));
        let endpoint = Fail("handler exploded");

        let err = RequestLogger::default()
            .call(&mut cx, Next::new(&[], &endpoint))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "handler exploded");
        assert_eq!(root.messages(), ["Request: Start"]);
    }

    #[test]
    fn non_string_level_fails_at_construction() {
        let err = RequestLogger::from_json(&json!({ "level": 123 })).unwrap_err();
        assert_eq!(
            err,
            ConfigError::WrongType {
                middleware: "Logger middleware",
                option: "level",
                expected: "string",
                found: "number",
            },
        );
        assert!(err.to_string().starts_with("Logger middleware"));
    }

    #[test]
    fn empty_or_unknown_level_fails_at_construction() {
        let empty = RequestLogger::new(RequestLoggerOptions::default().level("")).unwrap_err();
        assert!(matches!(empty, ConfigError::Empty { option: "level", .. }));
        assert_eq!(
            empty.to_string(),
            "Logger middleware: option 'level' must be a non-empty string, got empty string.",
        );

        let unknown = RequestLogger::new(RequestLoggerOptions::default().level("loud")).unwrap_err();
        assert!(matches!(unknown, ConfigError::Invalid { option: "level", .. }));
        assert!(unknown.to_string().contains("loud"));
    }

    #[test]
    fn from_json_defaults_to_info() {
        assert_eq!(RequestLogger::from_json(&json!({})).unwrap().level(), Level::Info);
        assert_eq!(RequestLogger::from_json(&Value::Null).unwrap().level(), Level::Info);
        assert_eq!(RequestLogger::from_json(&json!({ "level": "warn" })).unwrap().level(), Level::Warn);
    }
}
