//! Error type shared by every codec and by the top-level facade.

use thiserror::Error;

/// Errors raised while reading or writing models.
///
/// Contract violations (`InvalidArgument`, `UnsupportedContentType`) are
/// reported before any codec runs. Payload problems (`Parse`) carry the path
/// of the node that failed so callers can localize the fault.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializationError {
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },
    #[error("unsupported content type `{0}`")]
    UnsupportedContentType(String),
    #[error("parse error at `{path}`: {message}")]
    Parse { path: String, message: String },
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
    #[error("value cannot be formatted: {0}")]
    Format(String),
}

impl SerializationError {
    pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// A payload-shape error at `path`. The root node reports `/`.
    pub fn parse(path: &str, message: impl Into<String>) -> Self {
        let path = if path.is_empty() { "/" } else { path };
        Self::Parse {
            path: path.to_owned(),
            message: message.into(),
        }
    }

    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation(operation.into())
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

pub type Result<T> = std::result::Result<T, SerializationError>;
