//! Contact form data models
//!
//! `FormValues` is what the form holds when the user hits submit, with absent
//! fields left out; `ContactSubmission` is the trimmed, validated record that
//! would be sent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::error::{ValidationError, ValidationErrorKind, ValidationErrors};
use super::validation::{validate_email, validate_message, validate_name};

/// Fields of the contact form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Name,
    Email,
    Message,
}

impl FieldKind {
    /// All fields, in form order
    pub const ALL: [FieldKind; 3] = [FieldKind::Name, FieldKind::Email, FieldKind::Message];

    /// Value of the field's `name` attribute
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Name => "name",
            FieldKind::Email => "email",
            FieldKind::Message => "message",
        }
    }
}

impl FromStr for FieldKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(FieldKind::Name),
            "email" => Ok(FieldKind::Email),
            "message" => Ok(FieldKind::Message),
            _ => Err(ValidationError::with_context(
                ValidationErrorKind::UnknownField,
                "field",
                format!("Unknown form field: {}", s),
            )),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of the contact form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormState {
    /// Accepting input; initial state
    #[default]
    Editing,
    /// All fields passed and the submission is being handed off
    Submitting,
    /// Form hidden, success notice shown until the reset timer fires
    ShowingSuccess,
}

/// Raw form values as read from the page
///
/// A field missing from the page is `None` and takes no part in validation.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct FormValues {
    #[validate(custom(function = "validate_name"))]
    pub name: Option<String>,

    #[validate(custom(function = "validate_email"))]
    pub email: Option<String>,

    #[validate(custom(function = "validate_message"))]
    pub message: Option<String>,
}

impl FormValues {
    /// Values for a page where every field is present
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            message: Some(message.into()),
        }
    }

    /// Raw value for a field, `None` if the field is absent
    pub fn get(&self, field: FieldKind) -> Option<&str> {
        match field {
            FieldKind::Name => self.name.as_deref(),
            FieldKind::Email => self.email.as_deref(),
            FieldKind::Message => self.message.as_deref(),
        }
    }

    pub fn set(&mut self, field: FieldKind, value: Option<String>) {
        match field {
            FieldKind::Name => self.name = value,
            FieldKind::Email => self.email = value,
            FieldKind::Message => self.message = value,
        }
    }

    /// Validate every present field, collecting one error per failing field
    pub fn validate_fields(&self) -> Result<(), ValidationErrors> {
        let report = match self.validate() {
            Ok(()) => return Ok(()),
            Err(report) => report,
        };

        let field_errors = report.field_errors();
        let mut errors = ValidationErrors::new();
        for field in FieldKind::ALL {
            let Some(failures) = field_errors.get(field.as_str()) else {
                continue;
            };
            for failure in failures.iter() {
                let kind = ValidationErrorKind::from_code(&failure.code);
                errors.add(ValidationError::new(kind, field.as_str()));
            }
        }

        errors.into_result(())
    }
}

/// Validated contact submission
///
/// Fields absent from the page stay `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSubmission {
    /// Correlation id for the logs
    pub id: Uuid,

    pub name: Option<String>,

    pub email: Option<String>,

    pub message: Option<String>,

    /// When the submit was accepted
    pub submitted_at: DateTime<Utc>,
}

impl ContactSubmission {
    /// Message length in characters
    pub fn message_chars(&self) -> usize {
        self.message.as_deref().map_or(0, |m| m.chars().count())
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

/// Validate and trim raw values into a submission
impl TryFrom<FormValues> for ContactSubmission {
    type Error = ValidationErrors;

    fn try_from(values: FormValues) -> Result<Self, Self::Error> {
        values.validate_fields()?;

        Ok(ContactSubmission {
            id: Uuid::new_v4(),
            name: trimmed(values.name),
            email: trimmed(values.email),
            message: trimmed(values.message),
            submitted_at: Utc::now(),
        })
    }
}
