//! Error handling module for folio
//!
//! This module defines the error types used throughout the application.
//! Validation failures on form fields are not errors here; they are normal
//! control flow handled in [`crate::models::error`]. The errors below are what
//! the top-level handlers in [`crate::app`] report and then move past.

use thiserror::Error;
use tracing::Level;

/// Result type alias for folio operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for folio
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors that escaped normal field feedback
    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed or unexpected DOM content
    #[error("DOM error: {0}")]
    Dom(String),

    /// Timer scheduling errors
    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// Event loop is shutting down
    #[error("Event loop is shutting down")]
    ShuttingDown,
}

impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Error::Validation(msg.into())
    }

    /// Create a DOM error
    pub fn dom<S: Into<String>>(msg: S) -> Self {
        Error::Dom(msg.into())
    }

    /// Create a scheduler error
    pub fn scheduler<S: Into<String>>(msg: S) -> Self {
        Error::Scheduler(msg.into())
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// Log level this error is reported at
    pub fn severity(&self) -> Level {
        match self {
            Error::Validation(_) | Error::Dom(_) => Level::WARN,
            Error::ShuttingDown => Level::INFO,
            Error::Config(_)
            | Error::Scheduler(_)
            | Error::Serialization(_)
            | Error::Io(_)
            | Error::Internal(_) => Level::ERROR,
        }
    }

    /// Whether the event loop can keep going after this error
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::Config(_) | Error::ShuttingDown)
    }

    /// Log the error at its severity
    pub fn report(&self) {
        let kind = error_type(self);
        match self.severity() {
            Level::ERROR => tracing::error!(error = %self, error_type = kind, "Unhandled error"),
            Level::WARN => tracing::warn!(error = %self, error_type = kind, "Degraded handler"),
            _ => tracing::info!(error = %self, error_type = kind, "Handler stopped"),
        }
    }
}

/// Get a string representation of the error type
pub fn error_type(error: &Error) -> &'static str {
    match error {
        Error::Config(_) => "configuration_error",
        Error::Validation(_) => "validation_error",
        Error::Dom(_) => "dom_error",
        Error::Scheduler(_) => "scheduler_error",
        Error::Serialization(_) => "serialization_error",
        Error::Io(_) => "io_error",
        Error::Internal(_) => "internal_error",
        Error::ShuttingDown => "shutting_down",
    }
}

/// Convert from envconfig::Error to our Error type
impl From<envconfig::Error> for Error {
    fn from(err: envconfig::Error) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        assert_eq!(Error::dom("missing bar").severity(), Level::WARN);
        assert_eq!(Error::validation("test").severity(), Level::WARN);
        assert_eq!(Error::internal("test").severity(), Level::ERROR);
        assert_eq!(Error::ShuttingDown.severity(), Level::INFO);
    }

    #[test]
    fn test_error_recoverable() {
        assert!(Error::dom("test").is_recoverable());
        assert!(Error::scheduler("test").is_recoverable());
        assert!(!Error::config("test").is_recoverable());
        assert!(!Error::ShuttingDown.is_recoverable());
    }

    #[test]
    fn test_error_type_names() {
        assert_eq!(error_type(&Error::dom("x")), "dom_error");
        assert_eq!(error_type(&Error::ShuttingDown), "shutting_down");

        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(error_type(&Error::from(parse)), "serialization_error");
    }

    #[test]
    fn test_report_does_not_panic() {
        Error::internal("boom").report();
        Error::dom("no skill bars").report();
        Error::ShuttingDown.report();
    }
}
