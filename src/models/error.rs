//! Validation error types for folio models
//!
//! This module defines error types specifically for data validation,
//! separate from the general application errors. Their `Display` output for
//! form fields is the message shown next to the field.

use std::fmt;
use thiserror::Error;

/// Main validation error type
#[derive(Error, Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// The kind of validation error
    pub kind: ValidationErrorKind,
    /// The field that failed validation
    pub field: String,
    /// Optional additional context
    pub context: Option<String>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(kind: ValidationErrorKind, field: impl Into<String>) -> Self {
        Self {
            kind,
            field: field.into(),
            context: None,
        }
    }

    /// Create a validation error with additional context
    pub fn with_context(
        kind: ValidationErrorKind,
        field: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field: field.into(),
            context: Some(context.into()),
        }
    }

    /// Add context to an existing error
    pub fn add_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// The user-facing message for this error
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(ctx) => write!(
                f,
                "Validation failed for field '{}': {} - {}",
                self.field, self.kind, ctx
            ),
            None => write!(
                f,
                "Validation failed for field '{}': {}",
                self.field, self.kind
            ),
        }
    }
}

/// Specific validation error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Field is required but empty after trimming
    #[error("This field is required")]
    RequiredField,

    /// Name outside 2-50 letters and spaces
    #[error("Please enter a valid name (2-50 characters, letters only)")]
    InvalidName,

    /// Email not shaped like local@domain.tld
    #[error("Please enter a valid email address")]
    InvalidEmail,

    /// Message outside 10-500 characters
    #[error("Message must be between 10 and 500 characters")]
    InvalidMessage,

    /// Page id outside the known set
    #[error("Unknown page")]
    UnknownPage,

    /// Field name outside the known set
    #[error("Unknown form field")]
    UnknownField,

    /// Skill progress attribute is not a percentage
    #[error("Invalid skill progress")]
    InvalidProgress,

    /// Custom validation error
    #[error("{0}")]
    Custom(String),
}

impl ValidationErrorKind {
    /// Stable machine-readable code, used as the validator crate's error code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationErrorKind::RequiredField => "required",
            ValidationErrorKind::InvalidName => "invalid_name",
            ValidationErrorKind::InvalidEmail => "invalid_email",
            ValidationErrorKind::InvalidMessage => "invalid_message",
            ValidationErrorKind::UnknownPage => "unknown_page",
            ValidationErrorKind::UnknownField => "unknown_field",
            ValidationErrorKind::InvalidProgress => "invalid_progress",
            ValidationErrorKind::Custom(_) => "custom",
        }
    }

    /// Inverse of [`code`](Self::code); unknown codes become `Custom`
    pub fn from_code(code: &str) -> Self {
        match code {
            "required" => ValidationErrorKind::RequiredField,
            "invalid_name" => ValidationErrorKind::InvalidName,
            "invalid_email" => ValidationErrorKind::InvalidEmail,
            "invalid_message" => ValidationErrorKind::InvalidMessage,
            "unknown_page" => ValidationErrorKind::UnknownPage,
            "unknown_field" => ValidationErrorKind::UnknownField,
            "invalid_progress" => ValidationErrorKind::InvalidProgress,
            other => ValidationErrorKind::Custom(other.to_string()),
        }
    }
}

/// Collection of validation errors
#[derive(Debug, Default, Clone)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Create a new empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validation error to the collection
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Get all errors
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Find the error recorded for a field, if any
    pub fn for_field(&self, field: &str) -> Option<&ValidationError> {
        self.errors.iter().find(|e| e.field == field)
    }

    /// Convert to a Result
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            write!(f, "No validation errors")
        } else {
            write!(f, "Validation failed with {} error(s):", self.errors.len())?;
            for error in &self.errors {
                write!(f, "\n  - {}", error)?;
            }
            Ok(())
        }
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        let mut errors = Self::new();
        errors.add(error);
        errors
    }
}

/// Convert validation errors to application errors
impl From<ValidationError> for crate::error::Error {
    fn from(err: ValidationError) -> Self {
        crate::error::Error::validation(err.to_string())
    }
}

impl From<ValidationErrors> for crate::error::Error {
    fn from(err: ValidationErrors) -> Self {
        crate::error::Error::validation(err.to_string())
    }
}
