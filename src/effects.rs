//! Ambient UI effects
//!
//! Header styling, mobile menu handling and the two viewport observers. Each
//! function here is the body of a handler; rate limiting is applied by the
//! caller.

use std::collections::BTreeSet;
use tracing::{debug, trace};

use crate::dom::{Anchor, Dom};
use crate::models::{ElementId, FadeState, IntersectionEntry};

/// Switch the header's scrolled style based on the last scroll offset
///
/// Returns the new state.
pub fn update_header<D: Dom + ?Sized>(dom: &mut D, scroll_y: f64, threshold: f64) -> bool {
    let scrolled = scroll_y > threshold;
    dom.set_header_scrolled(scrolled);
    trace!(scroll_y, scrolled, "Header updated");
    scrolled
}

/// Force-close the mobile menu when the viewport grew past the breakpoint
pub fn close_menu_above_breakpoint<D: Dom + ?Sized>(dom: &mut D, width: u32, breakpoint: u32) -> bool {
    if width > breakpoint && dom.is_menu_open() {
        dom.set_menu_open(false);
        debug!(width, breakpoint, "Closed mobile menu on resize");
        return true;
    }
    false
}

/// Flip the mobile menu; a no-op unless both the toggle and the menu exist
pub fn toggle_menu<D: Dom + ?Sized>(dom: &mut D) -> Option<bool> {
    if !dom.has_anchor(Anchor::MobileToggle) || !dom.has_anchor(Anchor::NavMenu) {
        return None;
    }
    let open = !dom.is_menu_open();
    dom.set_menu_open(open);
    debug!(open, "Mobile menu toggled");
    Some(open)
}

/// Close the mobile menu if it is open
pub fn close_menu_on_escape<D: Dom + ?Sized>(dom: &mut D) -> bool {
    if dom.is_menu_open() {
        dom.set_menu_open(false);
        return true;
    }
    false
}

/// Reveals fade targets once enough of them scrolls into view
#[derive(Debug)]
pub struct FadeInObserver {
    threshold: f64,
    root_margin: f64,
    observed: BTreeSet<ElementId>,
}

impl FadeInObserver {
    pub fn new(threshold: f64, root_margin: f64) -> Self {
        Self {
            threshold,
            root_margin,
            observed: BTreeSet::new(),
        }
    }

    /// Hide every fade target and start observing it
    pub fn prepare<D: Dom + ?Sized>(&mut self, dom: &mut D) -> usize {
        for id in dom.fade_targets() {
            dom.set_fade_state(&id, FadeState::Hidden);
            self.observed.insert(id);
        }
        debug!(targets = self.observed.len(), "Fade-in observer prepared");
        self.observed.len()
    }

    pub fn is_observing(&self, id: &ElementId) -> bool {
        self.observed.contains(id)
    }

    /// Reveal the target if at least `threshold` of it lies inside the
    /// viewport shrunk by the bottom root margin
    pub fn on_intersection<D: Dom + ?Sized>(&mut self, entry: &IntersectionEntry, dom: &mut D) -> bool {
        if !self.observed.contains(&entry.target) {
            return false;
        }
        let root_bottom = entry.viewport_height - self.root_margin;
        let ratio = entry.bounds.visible_ratio(root_bottom);
        if ratio < self.threshold {
            return false;
        }
        dom.set_fade_state(&entry.target, FadeState::Visible);
        trace!(element = %entry.target, ratio, "Faded in");
        true
    }
}

/// Swaps deferred image sources in as images reach the viewport
#[derive(Debug, Default)]
pub struct LazyImageLoader {
    observed: BTreeSet<ElementId>,
}

impl LazyImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prepare<D: Dom + ?Sized>(&mut self, dom: &D) -> usize {
        self.observed.extend(dom.lazy_images());
        self.observed.len()
    }

    pub fn is_observing(&self, id: &ElementId) -> bool {
        self.observed.contains(id)
    }

    /// Load an intersecting image and stop observing it
    pub fn on_intersection<D: Dom + ?Sized>(&mut self, entry: &IntersectionEntry, dom: &mut D) -> bool {
        if !self.observed.contains(&entry.target) {
            return false;
        }
        if entry.bounds.visible_ratio(entry.viewport_height) <= 0.0 {
            return false;
        }
        self.observed.remove(&entry.target);
        let loaded = dom.load_lazy_image(&entry.target);
        debug!(element = %entry.target, loaded, "Lazy image reached viewport");
        loaded
    }
}
