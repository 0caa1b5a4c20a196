//! Validation rules for contact form fields
//!
//! Each field kind maps to one immutable rule: a regex pattern and the message
//! shown when the pattern does not match. Values are trimmed before checking
//! and an empty value always yields the shared "required" message.

use regex::Regex;
use std::sync::OnceLock;
use validator::ValidationError;

use super::error::{ValidationError as ModelValidationError, ValidationErrorKind};
use super::form::FieldKind;

// Lazy static regex patterns
static NAME_REGEX: OnceLock<Regex> = OnceLock::new();
static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static MESSAGE_REGEX: OnceLock<Regex> = OnceLock::new();

const NAME_PATTERN: &str = r"^[a-zA-Z\s]{2,50}$";
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const MESSAGE_PATTERN: &str = r"(?s)^.{10,500}$";

fn name_regex() -> &'static Regex {
    NAME_REGEX.get_or_init(|| Regex::new(NAME_PATTERN).expect("Invalid name regex pattern"))
}

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("Invalid email regex pattern"))
}

fn message_regex() -> &'static Regex {
    MESSAGE_REGEX
        .get_or_init(|| Regex::new(MESSAGE_PATTERN).expect("Invalid message regex pattern"))
}

/// Pattern and failure kind for one field
#[derive(Debug, Clone, Copy)]
pub struct ValidationRule {
    pub field: FieldKind,
    pattern: fn() -> &'static Regex,
    failure: fn() -> ValidationErrorKind,
}

impl ValidationRule {
    /// The rule for a field kind
    pub fn for_field(field: FieldKind) -> Self {
        match field {
            FieldKind::Name => ValidationRule {
                field,
                pattern: name_regex,
                failure: || ValidationErrorKind::InvalidName,
            },
            FieldKind::Email => ValidationRule {
                field,
                pattern: email_regex,
                failure: || ValidationErrorKind::InvalidEmail,
            },
            FieldKind::Message => ValidationRule {
                field,
                pattern: message_regex,
                failure: || ValidationErrorKind::InvalidMessage,
            },
        }
    }

    /// The compiled pattern
    pub fn pattern(&self) -> &'static Regex {
        (self.pattern)()
    }

    /// Message shown when a non-empty value fails the pattern
    pub fn message(&self) -> String {
        (self.failure)().to_string()
    }

    /// Check a raw value against this rule
    pub fn check(&self, raw: &str) -> Result<(), ModelValidationError> {
        let value = raw.trim();
        validate_required(value, self.field.as_str())?;

        if self.pattern().is_match(value) {
            Ok(())
        } else {
            Err(ModelValidationError::with_context(
                (self.failure)(),
                self.field.as_str(),
                format!("{} characters did not match {}", value.chars().count(), self.pattern().as_str()),
            ))
        }
    }
}

/// Validate a raw field value returning our custom error type
pub fn validate_field_value(field: FieldKind, raw: &str) -> Result<(), ModelValidationError> {
    ValidationRule::for_field(field).check(raw)
}

/// Validate a required field is not empty
pub fn validate_required(value: &str, field_name: &str) -> Result<(), ModelValidationError> {
    if value.trim().is_empty() {
        Err(ModelValidationError::new(
            ValidationErrorKind::RequiredField,
            field_name,
        ))
    } else {
        Ok(())
    }
}

fn to_validator_error(err: ModelValidationError) -> ValidationError {
    let mut out = ValidationError::new(err.kind.code());
    out.message = Some(err.message().into());
    out
}

/// Validate a name for validator crate
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    validate_field_value(FieldKind::Name, name).map_err(to_validator_error)
}

/// Validate an email address for validator crate
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    validate_field_value(FieldKind::Email, email).map_err(to_validator_error)
}

/// Validate a message body for validator crate
pub fn validate_message(message: &str) -> Result<(), ValidationError> {
    validate_field_value(FieldKind::Message, message).map_err(to_validator_error)
}
