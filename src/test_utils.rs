//! Test utilities for folio
//!
//! Fixtures shared by the unit and integration tests.

use std::sync::Arc;

use crate::app::{App, ClickTarget, UiEvent};
use crate::config::Config;
use crate::dom::MemoryDom;
use crate::error::Result;
use crate::models::FieldKind;

pub const VALID_NAME: &str = "Ada Lovelace";
pub const VALID_EMAIL: &str = "ada@example.com";
pub const VALID_MESSAGE: &str = "I enjoyed the projects page, let's talk.";

/// Configuration with the built-in defaults
pub fn default_config() -> Result<Arc<Config>> {
    Ok(Arc::new(Config::defaults()?))
}

/// An app over the full portfolio layout, not yet loaded
pub fn portfolio_app() -> Result<App<MemoryDom>> {
    Ok(App::new(default_config()?, MemoryDom::portfolio()))
}

/// An app over the portfolio layout opened at `fragment`, after load
///
/// Must be called from within a tokio runtime.
pub fn loaded_app(fragment: &str) -> Result<App<MemoryDom>> {
    let mut app = App::new(
        default_config()?,
        MemoryDom::portfolio().with_location(fragment),
    );
    app.dispatch(UiEvent::Load)?;
    Ok(app)
}

/// Type a value into a field the way the host reports it
pub fn type_into(app: &mut App<MemoryDom>, field: FieldKind, value: &str) -> Result<()> {
    app.dispatch(UiEvent::Input {
        field,
        value: value.to_string(),
    })?;
    Ok(())
}

/// Fill every field with a value that passes validation
pub fn fill_valid_form(app: &mut App<MemoryDom>) -> Result<()> {
    type_into(app, FieldKind::Name, VALID_NAME)?;
    type_into(app, FieldKind::Email, VALID_EMAIL)?;
    type_into(app, FieldKind::Message, VALID_MESSAGE)
}

/// A message body of exactly `len` characters
pub fn message_of_len(len: usize) -> String {
    "m".repeat(len)
}

/// Click event on a page link
pub fn page_link(page: &str) -> UiEvent {
    UiEvent::Click {
        target: ClickTarget::PageLink {
            page: page.to_string(),
        },
    }
}

/// Key press
pub fn key(key: &str) -> UiEvent {
    UiEvent::KeyDown {
        key: key.to_string(),
    }
}

/// Give spawned timer tasks a chance to post their fires, then run them
pub async fn run_due_timers(app: &mut App<MemoryDom>) {
    for _ in 0..3 {
        tokio::task::yield_now().await;
    }
    while let Some(fired) = app.try_next_timer() {
        app.handle_fired(fired);
    }
}
