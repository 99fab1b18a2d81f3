//! Per-request child logger with correlation fields.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use super::config::{ConfigError, lookup};
use super::{BoxFuture, Middleware, Next};
use crate::context::Context;
use crate::error::BoxError;
use crate::log::{Fields, Serializer};

const NAME: &str = "Context logger middleware";

/// Produces one execution id per invocation.
#[derive(Clone)]
pub struct Generator(Arc<dyn Fn() -> String + Send + Sync>);

impl Generator {
    pub fn new(f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn generate(&self) -> String {
        (self.0)()
    }
}

/// Random UUID v4 ids.
impl Default for Generator {
    fn default() -> Self {
        Self::new(|| Uuid::new_v4().to_string())
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Generator(..)")
    }
}

/// Options for [`ContextLogger`]. Every option has a safe default.
#[derive(Clone, Debug)]
pub struct ContextLoggerOptions {
    /// Bind the request record as `req`. Default `true`.
    pub add_req: bool,
    /// Header carrying a human-readable request name. Default `x-request-name`.
    pub req_name_header: String,
    /// State key holding an upstream request id. Default `reqId`.
    pub request_id_param_name: String,
    pub generator: Generator,
}

impl Default for ContextLoggerOptions {
    fn default() -> Self {
        Self {
            add_req: true,
            req_name_header: "x-request-name".to_owned(),
            request_id_param_name: "reqId".to_owned(),
            generator: Generator::default(),
        }
    }
}

impl ContextLoggerOptions {
    pub fn add_req(mut self, add_req: bool) -> Self {
        self.add_req = add_req;
        self
    }

    pub fn req_name_header(mut self, name: impl Into<String>) -> Self {
        self.req_name_header = name.into();
        self
    }

    pub fn request_id_param_name(mut self, name: impl Into<String>) -> Self {
        self.request_id_param_name = name.into();
        self
    }

    pub fn generator(mut self, f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.generator = Generator::new(f);
        self
    }

    /// Reads `addReq`, `reqNameHeader` and `requestIdParamName` from a JSON
    /// object. Values of the wrong type are ignored and the default kept;
    /// only a non-object `options` is an error.
    pub fn from_json(options: &Value) -> Result<Self, ConfigError> {
        let mut out = Self::default();
        if let Some(Value::Bool(add_req)) = lookup(NAME, options, "addReq")? {
            out.add_req = *add_req;
        }
        if let Some(Value::String(name)) = lookup(NAME, options, "reqNameHeader")? {
            out.req_name_header = name.clone();
        }
        if let Some(Value::String(name)) = lookup(NAME, options, "requestIdParamName")? {
            out.request_id_param_name = name.clone();
        }
        Ok(out)
    }
}

/// Attaches a child logger carrying correlation fields to request state.
///
/// The child is derived from whatever logger is in [`State`](crate::State)
/// and replaces it there. It carries:
///
/// | field | when |
/// |---|---|
/// | `execId` | always, from the generator |
/// | `reqId` | state value under `request_id_param_name` is a non-empty string |
/// | `reqName` | header `req_name_header` is present and non-empty |
/// | `reqUrl`, `reqMethod` | non-empty |
/// | `req` | `add_req` |
///
/// It also overrides the `res` serializer with identity, so response
/// records logged through the child are written in full.
///
/// All work happens before the downstream call; its result is returned
/// unchanged.
#[derive(Clone, Debug, Default)]
pub struct ContextLogger {
    options: ContextLoggerOptions,
}

impl ContextLogger {
    pub fn new(options: ContextLoggerOptions) -> Self {
        Self { options }
    }

    pub fn from_json(options: &Value) -> Result<Self, ConfigError> {
        ContextLoggerOptions::from_json(options).map(Self::new)
    }

    fn fields(&self, cx: &Context) -> Fields {
        let req = cx.request();
        let mut fields = Fields::new()
            .with_serializer("res", Serializer::identity())
            .with("execId", self.options.generator.generate());

        fields.insert_non_empty("reqId", cx.state().get_str(&self.options.request_id_param_name));
        fields.insert_non_empty("reqName", cx.get(&self.options.req_name_header));
        fields.insert_non_empty("reqUrl", Some(req.url()));
        fields.insert_non_empty("reqMethod", Some(req.method().as_str()));
        if self.options.add_req {
            fields.insert("req", req.record());
        }
        fields
    }
}

impl Middleware for ContextLogger {
    fn call<'a>(&'a self, cx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(async move {
            let child = cx.state().log().child(self.fields(cx));
            cx.state_mut().set_log(child);
            next.run(cx).await
        })
    }

    fn name(&self) -> &'static str {
        "context_logger"
    }
}
