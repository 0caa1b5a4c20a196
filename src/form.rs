//! Contact form controller
//!
//! Validates fields against their rules, mirrors each result onto the field's
//! group in the document, and drives the submit → success → reset lifecycle.
//! The reset itself is delayed; the caller schedules it when a submit is
//! accepted and calls [`ContactForm::reset`] when it fires.

use std::collections::BTreeSet;
use std::convert::TryFrom;
use tracing::{debug, info};

use crate::dom::{Anchor, Dom, ScrollBehavior};
use crate::error::Result;
use crate::models::{
    validate_field_value, ContactSubmission, FieldKind, FormState, FormValues, ValidationError,
    ValidationErrors,
};

/// Result of a submit attempt
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// All fields passed; the success notice is showing
    Accepted(ContactSubmission),
    /// At least one field failed; focus moved to the first one
    Rejected {
        first_invalid: FieldKind,
        errors: ValidationErrors,
    },
    /// No form on the page, or a submission is already showing
    Ignored,
}

/// State of the contact form
#[derive(Debug, Default)]
pub struct ContactForm {
    state: FormState,
    invalid: BTreeSet<FieldKind>,
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    /// Whether the field's last check failed
    pub fn is_invalid(&self, field: FieldKind) -> bool {
        self.invalid.contains(&field)
    }

    /// Check one field and flag or clear its group
    pub fn validate_field<D: Dom + ?Sized>(&mut self, field: FieldKind, dom: &mut D) -> bool {
        self.check_field(field, dom).is_ok()
    }

    fn check_field<D: Dom + ?Sized>(
        &mut self,
        field: FieldKind,
        dom: &mut D,
    ) -> std::result::Result<(), ValidationError> {
        let result = validate_field_value(field, &dom.field_value(field));
        match &result {
            Ok(()) => {
                dom.set_field_error(field, None);
                self.invalid.remove(&field);
            },
            Err(e) => {
                debug!(field = %field, kind = ?e.kind, "Field failed validation");
                dom.set_field_error(field, Some(&e.message()));
                self.invalid.insert(field);
            },
        }
        result
    }

    /// Re-check a field on input, but only while it is flagged
    pub fn on_input<D: Dom + ?Sized>(&mut self, field: FieldKind, dom: &mut D) -> Option<bool> {
        if self.is_invalid(field) {
            Some(self.validate_field(field, dom))
        } else {
            None
        }
    }

    /// Check every present field, collecting every failure
    pub fn validate_all<D: Dom + ?Sized>(&mut self, dom: &mut D) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for field in FieldKind::ALL {
            if !dom.has_field(field) {
                continue;
            }
            if let Err(e) = self.check_field(field, dom) {
                errors.add(e);
            }
        }
        errors
    }

    /// Check every present field; true iff all pass
    pub fn validate_form<D: Dom + ?Sized>(&mut self, dom: &mut D) -> bool {
        self.validate_all(dom).is_empty()
    }

    /// Handle a submit attempt
    pub fn submit<D: Dom + ?Sized>(&mut self, dom: &mut D) -> Result<SubmitOutcome> {
        if !dom.has_anchor(Anchor::ContactForm) {
            return Ok(SubmitOutcome::Ignored);
        }
        if self.state != FormState::Editing {
            debug!(state = ?self.state, "Submit ignored outside editing");
            return Ok(SubmitOutcome::Ignored);
        }

        let errors = self.validate_all(dom);
        if let Some(first_invalid) = FieldKind::ALL.into_iter().find(|f| self.is_invalid(*f)) {
            dom.scroll_field_into_view(first_invalid, ScrollBehavior::Smooth);
            dom.focus_field(first_invalid);
            info!(
                first_invalid = %first_invalid,
                errors = errors.len(),
                "Submit rejected"
            );
            return Ok(SubmitOutcome::Rejected {
                first_invalid,
                errors,
            });
        }

        self.state = FormState::Submitting;
        let mut values = FormValues::default();
        for field in FieldKind::ALL {
            if dom.has_field(field) {
                values.set(field, Some(dom.field_value(field)));
            }
        }
        let submission = match ContactSubmission::try_from(values) {
            Ok(submission) => submission,
            Err(e) => {
                self.state = FormState::Editing;
                return Err(e.into());
            },
        };

        // There is no backend; the submission only reaches the logs
        info!(
            submission_id = %submission.id,
            name = ?submission.name,
            email = ?submission.email,
            message_chars = submission.message_chars(),
            submitted_at = %submission.submitted_at,
            "Contact form submitted"
        );

        dom.set_form_visible(false);
        dom.set_success_visible(true);
        self.state = FormState::ShowingSuccess;

        Ok(SubmitOutcome::Accepted(submission))
    }

    /// Clear the form and return to editing
    pub fn reset<D: Dom + ?Sized>(&mut self, dom: &mut D) {
        for field in FieldKind::ALL {
            dom.set_field_value(field, "");
            dom.set_field_error(field, None);
        }
        self.invalid.clear();

        dom.set_form_visible(true);
        dom.set_success_visible(false);
        self.state = FormState::Editing;
        info!("Contact form reset");
    }
}
