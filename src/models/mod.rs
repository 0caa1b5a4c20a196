//! Data models for folio
//!
//! This module contains the pure domain models: pages and routing decisions,
//! form fields and their validation rules, and observer geometry. Nothing here
//! touches the DOM.

pub mod element;
pub mod error;
pub mod form;
pub mod page;
pub mod validation;

// Re-export commonly used types
pub use element::{Bounds, ElementId, FadeState, IntersectionEntry, SkillLevel};
pub use error::{ValidationError, ValidationErrorKind, ValidationErrors};
pub use form::{ContactSubmission, FieldKind, FormState, FormValues};
pub use page::Page;
pub use validation::{validate_field_value, ValidationRule};
