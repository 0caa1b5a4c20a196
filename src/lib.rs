//! folio library
//!
//! Client-side behavior of a single-page portfolio site: hash routing between
//! the four pages, contact form validation with its submit lifecycle, and the
//! ambient effects around them. The document is reached only through the
//! [`dom::Dom`] trait, so everything here runs headless against
//! [`dom::MemoryDom`].

pub mod app;
pub mod config;
pub mod dom;
pub mod effects;
pub mod error;
pub mod form;
pub mod logging;
pub mod models;
pub mod navigation;
pub mod scheduler;

#[doc(hidden)]
pub mod test_utils;

// Re-export commonly used types at the crate root
pub use app::{App, ClickTarget, EventOutcome, TimerKind, UiEvent};
pub use config::Config;
pub use error::{Error, Result};

// Re-export controllers
pub use form::{ContactForm, SubmitOutcome};
pub use navigation::{HistoryMode, NavigationController, NavigationOutcome};

// Re-export model types
pub use models::{
    ContactSubmission, FieldKind, FormState, Page, ValidationError, ValidationErrorKind,
    ValidationErrors,
};
