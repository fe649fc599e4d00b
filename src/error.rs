//! Error types shared by the builder and the argument adapters.

use thiserror::Error;

/// A failure tied to one declared argument.
///
/// `path` names the field (e.g. `Options.verbose` or `options[2]`) and
/// `kind` its value type, so the message points at the offending declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to convert field {path} of type {kind}: {msg}")]
pub struct FieldError {
    pub path: String,
    pub kind: String,
    pub msg: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: kind.into(),
            msg: msg.into(),
        }
    }
}

/// A custom value encoder refused to produce a string.
#[derive(Debug, Error)]
#[error("failed to marshal value {value}: {reason}")]
pub struct MarshalError {
    pub value: String,
    pub reason: String,
}

impl MarshalError {
    pub fn new(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that abort a build. No partial output is ever returned with one.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid argument source: expected {expected}, got {actual}")]
    InvalidSource { expected: String, actual: String },

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("field {path}: {source}")]
    Marshal {
        path: String,
        #[source]
        source: MarshalError,
    },

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl BuildError {
    pub fn invalid_source(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::InvalidSource {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_message() {
        let err = FieldError::new("Options.bool", "bool", "option does not have long name");
        assert_eq!(
            err.to_string(),
            "failed to convert field Options.bool of type bool: option does not have long name"
        );
    }

    #[test]
    fn test_build_error_wraps_field_error_transparently() {
        let err: BuildError = FieldError::new("-b", "option", "option does not have long name").into();
        assert!(err.to_string().contains("option does not have long name"));
        assert!(matches!(err, BuildError::Field(_)));
    }

    #[test]
    fn test_marshal_error_message() {
        let err = BuildError::Marshal {
            path: "value".to_string(),
            source: MarshalError::new("\"fail\"", "error"),
        };
        assert_eq!(err.to_string(), "field value: failed to marshal value \"fail\": error");
    }

    #[test]
    fn test_invalid_source_message() {
        let err = BuildError::invalid_source("object", "bool");
        assert_eq!(
            err.to_string(),
            "invalid argument source: expected object, got bool"
        );
    }
}
