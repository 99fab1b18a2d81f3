//! Construction-time validation of middleware options.
//!
//! Every check runs once, when the middleware is built. A middleware that
//! exists is valid; nothing is re-checked per request.

use serde_json::Value;

/// A middleware option was rejected at construction time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{middleware}: option '{option}' must be {expected}, got {found}.")]
    WrongType {
        middleware: &'static str,
        option: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{middleware}: option '{option}' is required.")]
    Missing {
        middleware: &'static str,
        option: &'static str,
    },

    #[error("{middleware}: option '{option}' must be a non-empty string, got empty string.")]
    Empty {
        middleware: &'static str,
        option: &'static str,
    },

    #[error("{middleware}: option '{option}' has invalid value `{value}`: {reason}.")]
    Invalid {
        middleware: &'static str,
        option: &'static str,
        value: String,
        reason: String,
    },

    #[error("{middleware}: options must be an object, got {found}.")]
    NotAnObject {
        middleware: &'static str,
        found: &'static str,
    },
}

/// The runtime type of a JSON value, as reported in error messages.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null      => "null",
        Value::Bool(_)   => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_)  => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn non_empty<'v>(
    middleware: &'static str,
    option: &'static str,
    value: &'v str,
) -> Result<&'v str, ConfigError> {
    if value.is_empty() {
        Err(ConfigError::Empty { middleware, option })
    } else {
        Ok(value)
    }
}

/// Accepts only a non-empty JSON string.
pub(crate) fn non_empty_string<'v>(
    middleware: &'static str,
    option: &'static str,
    value: &'v Value,
) -> Result<&'v str, ConfigError> {
    match value {
        Value::String(s) => non_empty(middleware, option, s),
        other => Err(ConfigError::WrongType {
            middleware,
            option,
            expected: "string",
            found: type_name(other),
        }),
    }
}

/// Looks up `option` in an options object. Absent and `null` both read as
/// "not given".
pub(crate) fn lookup<'v>(
    middleware: &'static str,
    options: &'v Value,
    option: &str,
) -> Result<Option<&'v Value>, ConfigError> {
    match options {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(map.get(option).filter(|v| !v.is_null())),
        other => Err(ConfigError::NotAnObject { middleware, found: type_name(other) }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reports_the_offending_type() {
        let err = non_empty_string("Logger middleware", "level", &json!(123)).unwrap_err();
        assert_eq!(err.to_string(), "Logger middleware: option 'level' must be string, got number.");
    }

    #[test]
    fn rejects_empty_strings() {
        let err = non_empty_string("Response time middleware", "resHeader", &json!("")).unwrap_err();
        assert_eq!(err, ConfigError::Empty { middleware: "Response time middleware", option: "resHeader" });
    }

    #[test]
    fn lookup_treats_null_as_absent() {
        let options = json!({ "level": null, "other": "x" });
        assert_eq!(lookup("m", &options, "level").unwrap(), None);
        assert_eq!(lookup("m", &options, "other").unwrap(), Some(&json!("x")));
        assert_eq!(lookup("m", &Value::Null, "level").unwrap(), None);
        assert!(matches!(lookup("m", &json!([1]), "level"), Err(ConfigError::NotAnObject { found: "array", .. })));
    }
}
