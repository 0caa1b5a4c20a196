//! DOM adapter
//!
//! Every presentation mutation goes through the [`Dom`] trait so the
//! controllers can be driven by a browser binding or by [`MemoryDom`]. The
//! trait is narrow: class toggles, attribute reads and the few
//! browser calls (history, scrolling, focus) the site uses.
//!
//! Methods addressing an element that does not exist are no-ops; callers that
//! care check existence first.

mod memory;

pub use memory::{DomSnapshot, FieldSnapshot, MemoryDom};

use serde::{Deserialize, Serialize};

use crate::models::{ElementId, FadeState, FieldKind, Page, SkillLevel};

/// Singleton elements the site looks up by id or class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    MobileToggle,
    NavMenu,
    Header,
    ContactForm,
    SuccessBanner,
}

impl Anchor {
    pub const ALL: [Anchor; 5] = [
        Anchor::MobileToggle,
        Anchor::NavMenu,
        Anchor::Header,
        Anchor::ContactForm,
        Anchor::SuccessBanner,
    ];
}

/// How a scroll request animates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// Browser document as seen by the controllers
pub trait Dom {
    // Anchors

    fn has_anchor(&self, anchor: Anchor) -> bool;

    // Pages and navigation links

    fn has_section(&self, page: Page) -> bool;
    fn set_section_active(&mut self, page: Page, active: bool);
    fn set_nav_link_active(&mut self, page: Page, active: bool);

    // Mobile menu

    fn is_menu_open(&self) -> bool;
    fn set_menu_open(&mut self, open: bool);

    // Header

    fn set_header_scrolled(&mut self, scrolled: bool);

    // Viewport and history

    fn scroll_to_top(&mut self, behavior: ScrollBehavior);

    /// Current address fragment including the leading `#`, or empty
    fn location_hash(&self) -> String;
    fn push_history(&mut self, fragment: &str);
    fn history_len(&self) -> usize;

    // Skill bars

    fn skill_bar_count(&self) -> usize;
    /// Raw target-progress attribute of a bar
    fn skill_bar_progress(&self, index: usize) -> Option<String>;
    fn set_skill_bar_fill(&mut self, index: usize, level: SkillLevel);
    /// Force a synchronous layout so a following style change transitions
    fn flush_layout(&mut self);

    // Contact form

    fn has_field(&self, field: FieldKind) -> bool;
    fn field_value(&self, field: FieldKind) -> String;
    fn set_field_value(&mut self, field: FieldKind, value: &str);
    /// Toggle the error flag on the field's group and set or clear its message
    fn set_field_error(&mut self, field: FieldKind, message: Option<&str>);
    fn scroll_field_into_view(&mut self, field: FieldKind, behavior: ScrollBehavior);
    fn focus_field(&mut self, field: FieldKind);
    fn set_form_visible(&mut self, visible: bool);
    fn set_success_visible(&mut self, visible: bool);

    // Observed elements

    fn fade_targets(&self) -> Vec<ElementId>;
    fn set_fade_state(&mut self, id: &ElementId, state: FadeState);
    fn lazy_images(&self) -> Vec<ElementId>;
    /// Move the deferred source into place; false if there was none
    fn load_lazy_image(&mut self, id: &ElementId) -> bool;
}
