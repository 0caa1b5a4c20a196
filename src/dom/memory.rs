//! In-memory DOM
//!
//! Backs the headless driver and every test. Mirrors the state a browser
//! would hold in classes, attributes and the history stack.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::{Anchor, Dom, ScrollBehavior};
use crate::models::{ElementId, FadeState, FieldKind, Page, SkillLevel};

#[derive(Debug, Clone, Default)]
struct FieldNode {
    value: String,
    error: Option<String>,
}

#[derive(Debug, Clone)]
struct SkillBar {
    progress: String,
    fill: Option<SkillLevel>,
}

#[derive(Debug, Clone)]
struct LazyImage {
    deferred: Option<String>,
    src: Option<String>,
}

/// Document held entirely in memory
#[derive(Debug, Clone)]
pub struct MemoryDom {
    anchors: BTreeSet<Anchor>,
    sections: BTreeMap<Page, bool>,
    nav_links: BTreeMap<Page, bool>,
    menu_open: bool,
    header_scrolled: bool,
    history: Vec<String>,
    history_index: usize,
    scroll_to_top_count: usize,
    skill_bars: Vec<SkillBar>,
    layout_flushes: usize,
    fields: BTreeMap<FieldKind, FieldNode>,
    focused: Option<FieldKind>,
    scrolled_into_view: Option<FieldKind>,
    form_visible: bool,
    success_visible: bool,
    fade_targets: BTreeMap<ElementId, FadeState>,
    lazy_images: BTreeMap<ElementId, LazyImage>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// An empty document at an empty fragment
    pub fn new() -> Self {
        Self {
            anchors: BTreeSet::new(),
            sections: BTreeMap::new(),
            nav_links: BTreeMap::new(),
            menu_open: false,
            header_scrolled: false,
            history: vec![String::new()],
            history_index: 0,
            scroll_to_top_count: 0,
            skill_bars: Vec::new(),
            layout_flushes: 0,
            fields: BTreeMap::new(),
            focused: None,
            scrolled_into_view: None,
            form_visible: true,
            success_visible: false,
            fade_targets: BTreeMap::new(),
            lazy_images: BTreeMap::new(),
        }
    }

    /// The full portfolio layout: every anchor, page, field and a few
    /// skill bars, fade targets and deferred images
    pub fn portfolio() -> Self {
        let mut dom = Self::new();
        for anchor in Anchor::ALL {
            dom = dom.with_anchor(anchor);
        }
        for page in Page::ALL {
            dom = dom.with_section(page);
        }
        for field in FieldKind::ALL {
            dom = dom.with_field(field);
        }
        dom.with_skill_bar("90%")
            .with_skill_bar("85%")
            .with_skill_bar("75%")
            .with_skill_bar("60%")
            .with_fade_target("about-intro")
            .with_fade_target("project-card-1")
            .with_fade_target("project-card-2")
            .with_fade_target("contact-info")
            .with_lazy_image("project-shot-1", "/img/projects/one.webp")
            .with_lazy_image("project-shot-2", "/img/projects/two.webp")
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchors.insert(anchor);
        self
    }

    /// Add a page section together with its navigation link
    pub fn with_section(mut self, page: Page) -> Self {
        self.sections.insert(page, false);
        self.nav_links.insert(page, false);
        self
    }

    pub fn with_field(mut self, field: FieldKind) -> Self {
        self.fields.insert(field, FieldNode::default());
        self
    }

    pub fn with_skill_bar(mut self, progress: impl Into<String>) -> Self {
        self.skill_bars.push(SkillBar {
            progress: progress.into(),
            fill: None,
        });
        self
    }

    pub fn with_fade_target(mut self, id: impl Into<String>) -> Self {
        self.fade_targets.insert(ElementId::new(id), FadeState::Untouched);
        self
    }

    pub fn with_lazy_image(mut self, id: impl Into<String>, src: impl Into<String>) -> Self {
        self.lazy_images.insert(
            ElementId::new(id),
            LazyImage {
                deferred: Some(src.into()),
                src: None,
            },
        );
        self
    }

    /// Start at the given fragment, as if the page was opened with it
    pub fn with_location(mut self, fragment: impl Into<String>) -> Self {
        self.history = vec![fragment.into()];
        self.history_index = 0;
        self
    }

    /// Step back in history the way the browser's back button does
    pub fn go_back(&mut self) -> bool {
        if self.history_index == 0 {
            return false;
        }
        self.history_index -= 1;
        true
    }

    /// Step forward in history
    pub fn go_forward(&mut self) -> bool {
        if self.history_index + 1 >= self.history.len() {
            return false;
        }
        self.history_index += 1;
        true
    }

    pub fn active_sections(&self) -> Vec<Page> {
        self.sections
            .iter()
            .filter(|(_, active)| **active)
            .map(|(page, _)| *page)
            .collect()
    }

    pub fn active_nav_links(&self) -> Vec<Page> {
        self.nav_links
            .iter()
            .filter(|(_, active)| **active)
            .map(|(page, _)| *page)
            .collect()
    }

    pub fn is_header_scrolled(&self) -> bool {
        self.header_scrolled
    }

    pub fn scroll_to_top_count(&self) -> usize {
        self.scroll_to_top_count
    }

    pub fn skill_fill(&self, index: usize) -> Option<SkillLevel> {
        self.skill_bars.get(index).and_then(|bar| bar.fill)
    }

    pub fn layout_flushes(&self) -> usize {
        self.layout_flushes
    }

    pub fn field_error(&self, field: FieldKind) -> Option<&str> {
        self.fields.get(&field).and_then(|f| f.error.as_deref())
    }

    pub fn has_error_flag(&self, field: FieldKind) -> bool {
        self.field_error(field).is_some()
    }

    pub fn focused_field(&self) -> Option<FieldKind> {
        self.focused
    }

    pub fn scrolled_into_view(&self) -> Option<FieldKind> {
        self.scrolled_into_view
    }

    pub fn is_form_visible(&self) -> bool {
        self.form_visible
    }

    pub fn is_success_visible(&self) -> bool {
        self.success_visible
    }

    pub fn fade_state(&self, id: &str) -> Option<FadeState> {
        self.fade_targets.get(&ElementId::new(id)).copied()
    }

    pub fn image_src(&self, id: &str) -> Option<&str> {
        self.lazy_images
            .get(&ElementId::new(id))
            .and_then(|img| img.src.as_deref())
    }

    /// Serializable view of the document state
    pub fn snapshot(&self) -> DomSnapshot {
        DomSnapshot {
            location_hash: self.location_hash(),
            history_len: self.history_len(),
            active_pages: self.active_sections(),
            active_nav_links: self.active_nav_links(),
            menu_open: self.menu_open,
            header_scrolled: self.header_scrolled,
            form_visible: self.form_visible,
            success_visible: self.success_visible,
            fields: self
                .fields
                .iter()
                .map(|(kind, node)| {
                    (
                        *kind,
                        FieldSnapshot {
                            value: node.value.clone(),
                            error: node.error.clone(),
                        },
                    )
                })
                .collect(),
            skill_fills: self.skill_bars.iter().map(|bar| bar.fill).collect(),
            fade_targets: self.fade_targets.clone(),
            images: self
                .lazy_images
                .iter()
                .map(|(id, img)| (id.clone(), img.src.clone()))
                .collect(),
        }
    }
}

/// Serializable state of one form field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSnapshot {
    pub value: String,
    pub error: Option<String>,
}

/// Serializable state of a [`MemoryDom`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomSnapshot {
    pub location_hash: String,
    pub history_len: usize,
    pub active_pages: Vec<Page>,
    pub active_nav_links: Vec<Page>,
    pub menu_open: bool,
    pub header_scrolled: bool,
    pub form_visible: bool,
    pub success_visible: bool,
    pub fields: BTreeMap<FieldKind, FieldSnapshot>,
    pub skill_fills: Vec<Option<SkillLevel>>,
    pub fade_targets: BTreeMap<ElementId, FadeState>,
    pub images: BTreeMap<ElementId, Option<String>>,
}

impl Dom for MemoryDom {
    fn has_anchor(&self, anchor: Anchor) -> bool {
        self.anchors.contains(&anchor)
    }

    fn has_section(&self, page: Page) -> bool {
        self.sections.contains_key(&page)
    }

    fn set_section_active(&mut self, page: Page, active: bool) {
        if let Some(flag) = self.sections.get_mut(&page) {
            *flag = active;
        }
    }

    fn set_nav_link_active(&mut self, page: Page, active: bool) {
        if let Some(flag) = self.nav_links.get_mut(&page) {
            *flag = active;
        }
    }

    fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    fn set_menu_open(&mut self, open: bool) {
        if self.has_anchor(Anchor::NavMenu) {
            self.menu_open = open;
        }
    }

    fn set_header_scrolled(&mut self, scrolled: bool) {
        if self.has_anchor(Anchor::Header) {
            self.header_scrolled = scrolled;
        }
    }

    fn scroll_to_top(&mut self, _behavior: ScrollBehavior) {
        self.scroll_to_top_count += 1;
    }

    fn location_hash(&self) -> String {
        self.history
            .get(self.history_index)
            .cloned()
            .unwrap_or_default()
    }

    fn push_history(&mut self, fragment: &str) {
        self.history.truncate(self.history_index + 1);
        self.history.push(fragment.to_string());
        self.history_index = self.history.len() - 1;
    }

    fn history_len(&self) -> usize {
        self.history.len()
    }

    fn skill_bar_count(&self) -> usize {
        self.skill_bars.len()
    }

    fn skill_bar_progress(&self, index: usize) -> Option<String> {
        self.skill_bars.get(index).map(|bar| bar.progress.clone())
    }

    fn set_skill_bar_fill(&mut self, index: usize, level: SkillLevel) {
        if let Some(bar) = self.skill_bars.get_mut(index) {
            bar.fill = Some(level);
        }
    }

    fn flush_layout(&mut self) {
        self.layout_flushes += 1;
    }

    fn has_field(&self, field: FieldKind) -> bool {
        self.fields.contains_key(&field)
    }

    fn field_value(&self, field: FieldKind) -> String {
        self.fields
            .get(&field)
            .map(|f| f.value.clone())
            .unwrap_or_default()
    }

    fn set_field_value(&mut self, field: FieldKind, value: &str) {
        if let Some(node) = self.fields.get_mut(&field) {
            node.value = value.to_string();
        }
    }

    fn set_field_error(&mut self, field: FieldKind, message: Option<&str>) {
        if let Some(node) = self.fields.get_mut(&field) {
            node.error = message.map(str::to_string);
        }
    }

    fn scroll_field_into_view(&mut self, field: FieldKind, _behavior: ScrollBehavior) {
        if self.has_field(field) {
            self.scrolled_into_view = Some(field);
        }
    }

    fn focus_field(&mut self, field: FieldKind) {
        if self.has_field(field) {
            self.focused = Some(field);
        }
    }

    fn set_form_visible(&mut self, visible: bool) {
        if self.has_anchor(Anchor::ContactForm) {
            self.form_visible = visible;
        }
    }

    fn set_success_visible(&mut self, visible: bool) {
        if self.has_anchor(Anchor::SuccessBanner) {
            self.success_visible = visible;
        }
    }

    fn fade_targets(&self) -> Vec<ElementId> {
        self.fade_targets.keys().cloned().collect()
    }

    fn set_fade_state(&mut self, id: &ElementId, state: FadeState) {
        if let Some(current) = self.fade_targets.get_mut(id) {
            *current = state;
        }
    }

    fn lazy_images(&self) -> Vec<ElementId> {
        self.lazy_images
            .iter()
            .filter(|(_, img)| img.deferred.is_some())
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn load_lazy_image(&mut self, id: &ElementId) -> bool {
        match self.lazy_images.get_mut(id) {
            Some(img) => match img.deferred.take() {
                Some(src) => {
                    img.src = Some(src);
                    true
                },
                None => false,
            },
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portfolio_layout() {
        let dom = MemoryDom::portfolio();
        for anchor in Anchor::ALL {
            assert!(dom.has_anchor(anchor));
        }
        for page in Page::ALL {
            assert!(dom.has_section(page));
        }
        assert_eq!(dom.skill_bar_count(), 4);
        assert_eq!(dom.lazy_images().len(), 2);
        assert!(dom.active_sections().is_empty());
        assert_eq!(dom.location_hash(), "");
        assert_eq!(dom.history_len(), 1);
    }

    #[test]
    fn test_history_push_and_back() {
        let mut dom = MemoryDom::new();
        dom.push_history("#about");
        dom.push_history("#projects");
        assert_eq!(dom.history_len(), 3);
        assert_eq!(dom.location_hash(), "#projects");

        assert!(dom.go_back());
        assert_eq!(dom.location_hash(), "#about");
        assert!(dom.go_forward());
        assert_eq!(dom.location_hash(), "#projects");

        // Pushing after going back drops the forward entries
        dom.go_back();
        dom.push_history("#contact");
        assert_eq!(dom.history_len(), 3);
        assert!(!dom.go_forward());
    }

    #[test]
    fn test_missing_elements_are_ignored() {
        let mut dom = MemoryDom::new();
        dom.set_section_active(Page::About, true);
        dom.set_menu_open(true);
        dom.set_header_scrolled(true);
        dom.set_field_value(FieldKind::Name, "Ada");
        dom.focus_field(FieldKind::Name);

        assert!(dom.active_sections().is_empty());
        assert!(!dom.is_menu_open());
        assert!(!dom.is_header_scrolled());
        assert_eq!(dom.field_value(FieldKind::Name), "");
        assert_eq!(dom.focused_field(), None);
    }

    #[test]
    fn test_lazy_image_loads_once() {
        let mut dom = MemoryDom::new().with_lazy_image("shot", "/a.png");
        let id = ElementId::new("shot");

        assert!(dom.load_lazy_image(&id));
        assert_eq!(dom.image_src("shot"), Some("/a.png"));
        assert!(!dom.load_lazy_image(&id));
        assert!(dom.lazy_images().is_empty());
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut dom = MemoryDom::portfolio();
        dom.set_field_error(FieldKind::Email, Some("Please enter a valid email address"));
        let json = serde_json::to_value(dom.snapshot()).unwrap();

        assert_eq!(json["form_visible"], true);
        assert_eq!(
            json["fields"]["email"]["error"],
            "Please enter a valid email address"
        );
        assert_eq!(json["images"]["project-shot-1"], serde_json::Value::Null);
    }
}
