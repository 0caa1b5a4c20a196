//! Navigation controller
//!
//! Owns the single "current page" value and applies it to the document:
//! section and link highlighting, history, scroll position and menu state.
//! Delayed effects (the skill bar replay) are requested through the returned
//! [`NavigationOutcome`] and scheduled by the caller.

use tracing::{debug, info, warn};

use crate::dom::{Dom, ScrollBehavior};
use crate::error::Error;
use crate::models::page::{requested_id, resolve_initial};
use crate::models::{Page, SkillLevel};

/// Whether a navigation may add a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    /// Push the fragment if it differs from the current one
    Push,
    /// Leave history alone (initial load, back/forward)
    Skip,
}

/// What a navigation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationOutcome {
    /// Page now active, `None` for an unknown id
    pub page: Option<Page>,
    pub history_pushed: bool,
    /// The caller should schedule the skill bar replay
    pub animate_skills: bool,
}

/// Tracks and applies the active page
#[derive(Debug, Default)]
pub struct NavigationController {
    active: Option<Page>,
}

impl NavigationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page currently shown
    pub fn active(&self) -> Option<Page> {
        self.active
    }

    /// Show the page named by `page_id`
    ///
    /// Unknown ids deactivate every page and still update the fragment.
    pub fn navigate<D: Dom + ?Sized>(&mut self, page_id: &str, dom: &mut D) -> NavigationOutcome {
        self.navigate_with(page_id, HistoryMode::Push, dom)
    }

    pub fn navigate_with<D: Dom + ?Sized>(
        &mut self,
        page_id: &str,
        history: HistoryMode,
        dom: &mut D,
    ) -> NavigationOutcome {
        let page = page_id.parse::<Page>().ok();
        if page.is_none() {
            warn!(page_id, "Navigation to unknown page");
        }

        self.activate(page, dom);

        if dom.is_menu_open() {
            dom.set_menu_open(false);
        }
        dom.scroll_to_top(ScrollBehavior::Smooth);

        let fragment = format!("#{}", page_id);
        let history_pushed = history == HistoryMode::Push && dom.location_hash() != fragment;
        if history_pushed {
            dom.push_history(&fragment);
        }

        let animate_skills = page.map(|p| p.animates_skills()).unwrap_or(false);
        crate::log_event!(info, "Navigated", page_id = page_id, history_pushed = history_pushed);

        NavigationOutcome {
            page: self.active,
            history_pushed,
            animate_skills,
        }
    }

    /// Show the page named by the fragment present at load time
    ///
    /// Falls back to home when the fragment is empty or names no known page.
    /// Does not add a history entry.
    pub fn load<D: Dom + ?Sized>(&mut self, dom: &mut D) -> NavigationOutcome {
        let fragment = dom.location_hash();
        let page = resolve_initial(&fragment);
        if requested_id(&fragment) != page.as_str() {
            debug!(fragment = %fragment, "Unmatched fragment on load, showing home");
        }

        self.activate(Some(page), dom);
        info!(page = %page, "Initial page");

        NavigationOutcome {
            page: self.active,
            history_pushed: false,
            animate_skills: page.animates_skills(),
        }
    }

    /// Re-derive the page after browser back/forward
    pub fn on_pop_state<D: Dom + ?Sized>(&mut self, dom: &mut D) -> NavigationOutcome {
        let fragment = dom.location_hash();
        let page_id = requested_id(&fragment).to_string();
        self.navigate_with(&page_id, HistoryMode::Skip, dom)
    }

    fn activate<D: Dom + ?Sized>(&mut self, page: Option<Page>, dom: &mut D) {
        for p in Page::ALL {
            dom.set_section_active(p, false);
            dom.set_nav_link_active(p, false);
        }

        self.active = page.filter(|p| dom.has_section(*p));
        if let Some(p) = self.active {
            dom.set_section_active(p, true);
            dom.set_nav_link_active(p, true);
        }
    }
}

/// Empty every skill bar and flush layout so the next fill transitions
///
/// Returns the number of bars reset.
pub fn reset_skill_bars<D: Dom + ?Sized>(dom: &mut D) -> usize {
    let count = dom.skill_bar_count();
    for index in 0..count {
        dom.set_skill_bar_fill(index, SkillLevel::EMPTY);
    }
    dom.flush_layout();
    count
}

/// Fill every skill bar to its target progress
///
/// Bars with a malformed progress attribute are left empty and reported as a
/// DOM error. Returns the number of bars filled.
pub fn fill_skill_bars<D: Dom + ?Sized>(dom: &mut D) -> usize {
    let mut filled = 0;
    for index in 0..dom.skill_bar_count() {
        let Some(raw) = dom.skill_bar_progress(index) else {
            continue;
        };
        match raw.parse::<SkillLevel>() {
            Ok(level) => {
                dom.set_skill_bar_fill(index, level);
                filled += 1;
            },
            Err(e) => Error::dom(format!("Skill bar {} skipped: {}", index, e)).report(),
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Anchor, MemoryDom};

    #[test]
    fn test_navigate_activates_exactly_one_page() {
        let mut dom = MemoryDom::portfolio();
        let mut nav = NavigationController::new();

        for page in Page::ALL {
            let outcome = nav.navigate(page.as_str(), &mut dom);
            assert_eq!(outcome.page, Some(page));
            assert_eq!(nav.active(), Some(page));
            assert_eq!(dom.active_sections(), vec![page]);
            assert_eq!(dom.active_nav_links(), vec![page]);
        }
    }

    #[test]
    fn test_navigate_unknown_page() {
        let mut dom = MemoryDom::portfolio();
        let mut nav = NavigationController::new();
        nav.navigate("about", &mut dom);

        let outcome = nav.navigate("nonexistent", &mut dom);
        assert_eq!(outcome.page, None);
        assert!(!outcome.animate_skills);
        assert_eq!(nav.active(), None);
        assert!(dom.active_sections().is_empty());
        assert!(dom.active_nav_links().is_empty());
        assert_eq!(dom.location_hash(), "#nonexistent");
    }

    #[test]
    fn test_navigate_updates_fragment_once() {
        let mut dom = MemoryDom::portfolio();
        let mut nav = NavigationController::new();

        let outcome = nav.navigate("projects", &mut dom);
        assert!(outcome.history_pushed);
        assert_eq!(dom.location_hash(), "#projects");
        let len = dom.history_len();

        let outcome = nav.navigate("projects", &mut dom);
        assert!(!outcome.history_pushed);
        assert_eq!(dom.history_len(), len);
    }

    #[test]
    fn test_navigate_closes_menu_and_scrolls() {
        let mut dom = MemoryDom::portfolio();
        dom.set_menu_open(true);
        let mut nav = NavigationController::new();

        nav.navigate("contact", &mut dom);
        assert!(!dom.is_menu_open());
        assert_eq!(dom.scroll_to_top_count(), 1);
    }

    #[test]
    fn test_about_requests_skill_animation() {
        let mut dom = MemoryDom::portfolio();
        let mut nav = NavigationController::new();

        assert!(nav.navigate("about", &mut dom).animate_skills);
        assert!(!nav.navigate("home", &mut dom).animate_skills);
    }

    #[test]
    fn test_missing_section_leaves_nothing_active() {
        let mut dom = MemoryDom::new()
            .with_anchor(Anchor::NavMenu)
            .with_section(Page::Home);
        let mut nav = NavigationController::new();

        let outcome = nav.navigate("projects", &mut dom);
        assert_eq!(outcome.page, None);
        assert!(dom.active_sections().is_empty());
    }

    #[test]
    fn test_load_reads_fragment() {
        let mut dom = MemoryDom::portfolio().with_location("#about");
        let mut nav = NavigationController::new();

        let outcome = nav.load(&mut dom);
        assert_eq!(outcome.page, Some(Page::About));
        assert!(outcome.animate_skills);
        assert_eq!(dom.history_len(), 1);
    }

    #[test]
    fn test_load_falls_back_to_home() {
        for fragment in ["", "#", "#blog"] {
            let mut dom = MemoryDom::portfolio().with_location(fragment);
            let mut nav = NavigationController::new();

            let outcome = nav.load(&mut dom);
            assert_eq!(outcome.page, Some(Page::Home), "fragment {fragment:?}");
            assert_eq!(dom.active_sections(), vec![Page::Home]);
            assert_eq!(dom.active_nav_links(), vec![Page::Home]);
            assert!(!outcome.history_pushed);
        }
    }

    #[test]
    fn test_pop_state_does_not_push() {
        let mut dom = MemoryDom::portfolio();
        let mut nav = NavigationController::new();
        nav.load(&mut dom);
        nav.navigate("about", &mut dom);
        nav.navigate("contact", &mut dom);
        let len = dom.history_len();

        dom.go_back();
        let outcome = nav.on_pop_state(&mut dom);
        assert_eq!(outcome.page, Some(Page::About));
        assert!(!outcome.history_pushed);
        assert_eq!(dom.history_len(), len);

        // Back to the initial empty fragment shows home
        dom.go_back();
        let outcome = nav.on_pop_state(&mut dom);
        assert_eq!(outcome.page, Some(Page::Home));
        assert_eq!(dom.history_len(), len);
    }

    #[test]
    fn test_skill_bars_reset_then_fill() {
        let mut dom = MemoryDom::portfolio();

        assert_eq!(reset_skill_bars(&mut dom), 4);
        assert_eq!(dom.skill_fill(0), Some(SkillLevel::EMPTY));
        assert_eq!(dom.layout_flushes(), 1);

        assert_eq!(fill_skill_bars(&mut dom), 4);
        assert_eq!(dom.skill_fill(0).map(|l| l.percent()), Some(90));
        assert_eq!(dom.skill_fill(3).map(|l| l.percent()), Some(60));

        // Replaying starts from empty again
        reset_skill_bars(&mut dom);
        assert_eq!(dom.skill_fill(0), Some(SkillLevel::EMPTY));
        assert_eq!(dom.layout_flushes(), 2);
    }

    #[test]
    fn test_malformed_skill_bar_is_skipped() {
        let mut dom = MemoryDom::new().with_skill_bar("80%").with_skill_bar("lots");

        reset_skill_bars(&mut dom);
        assert_eq!(fill_skill_bars(&mut dom), 1);
        assert_eq!(dom.skill_fill(0).map(|l| l.percent()), Some(80));
        assert_eq!(dom.skill_fill(1), Some(SkillLevel::EMPTY));
    }
}
