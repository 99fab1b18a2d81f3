//! Response latency header.

use std::time::Instant;

use http::header::{HeaderName, HeaderValue};
use serde_json::Value;

use super::config::{ConfigError, lookup, non_empty, non_empty_string};
use super::{BoxFuture, Middleware, Next};
use crate::context::Context;
use crate::error::BoxError;

const NAME: &str = "Response time middleware";

/// Options for [`ResponseTime`]. The header name has no default.
#[derive(Clone, Debug)]
pub struct ResponseTimeOptions {
    pub res_header: String,
}

impl ResponseTimeOptions {
    pub fn new(res_header: impl Into<String>) -> Self {
        Self { res_header: res_header.into() }
    }

    /// Reads the required `resHeader` from a JSON object.
    pub fn from_json(options: &Value) -> Result<Self, ConfigError> {
        match lookup(NAME, options, "resHeader")? {
            Some(value) => Ok(Self::new(non_empty_string(NAME, "resHeader", value)?)),
            None => Err(ConfigError::Missing { middleware: NAME, option: "resHeader" }),
        }
    }
}

/// Sets a response header to the downstream latency, e.g. `x-response-time: 12ms`.
///
/// The value is whole elapsed milliseconds followed by `ms`. If the
/// downstream call fails the header is not set and the error is returned.
///
/// ```rust
/// use reqlog::middleware::ResponseTime;
///
/// assert!(ResponseTime::new("x-response-time").is_ok());
/// assert!(ResponseTime::new("").is_err());
/// ```
#[derive(Clone, Debug)]
pub struct ResponseTime {
    header: HeaderName,
}

impl ResponseTime {
    pub fn new(res_header: &str) -> Result<Self, ConfigError> {
        Self::with_options(ResponseTimeOptions::new(res_header))
    }

    pub fn with_options(options: ResponseTimeOptions) -> Result<Self, ConfigError> {
        let name = non_empty(NAME, "resHeader", &options.res_header)?;
        let header = HeaderName::try_from(name).map_err(|e| ConfigError::Invalid {
            middleware: NAME,
            option: "resHeader",
            value: name.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self { header })
    }

    pub fn from_json(options: &Value) -> Result<Self, ConfigError> {
        Self::with_options(ResponseTimeOptions::from_json(options)?)
    }

    pub fn header(&self) -> &HeaderName {
        &self.header
    }
}

impl Middleware for ResponseTime {
    fn call<'a>(&'a self, cx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(async move {
            let start = Instant::now();
            next.run(cx).await?;

            let value = HeaderValue::try_from(format!("{}ms", start.elapsed().as_millis()))?;
            cx.set(self.header.clone(), value);
            Ok(())
        })
    }

    fn name(&self) -> &'static str {
        "response_time"
    }
}
