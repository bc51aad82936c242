//! Error types for the audit engine

use thiserror::Error;

use crate::report::Message;

/// Result type for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Audit engine errors
///
/// A failed audit is not an error; it is an ordinary `Ok(false)`. These
/// variants abort the whole validation.
#[derive(Error, Debug)]
pub enum AuditError {
    /// An audit hit a problem it can describe with a ready-made message
    #[error("{}", .0.build_message())]
    Report(Box<Message>),

    /// Any other internal fault
    #[error("Internal fault: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AuditError {
    /// Raise a reportable fault carrying `message`
    pub fn report(message: Message) -> Self {
        Self::Report(Box::new(message))
    }

    /// Raise a generic internal fault
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal(reason.into())
    }

    /// The message carried by a reportable fault, if any
    pub fn report_message(&self) -> Option<&Message> {
        match self {
            Self::Report(message) => Some(message),
            _ => None,
        }
    }
}

impl From<Message> for AuditError {
    fn from(message: Message) -> Self {
        Self::report(message)
    }
}
