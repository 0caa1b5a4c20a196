//! Event loop
//!
//! [`App`] owns the controllers, the observers and the timer scheduler.
//! [`App::dispatch`] handles one UI event to completion; [`App::run`] drives
//! the loop over an inbox of UI events and the scheduler's fire channel until
//! the inbox closes and no timer is left pending.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::dom::Dom;
use crate::effects::{self, FadeInObserver, LazyImageLoader};
use crate::error::Result;
use crate::form::{ContactForm, SubmitOutcome};
use crate::logging::Timer;
use crate::models::{FieldKind, IntersectionEntry, Page};
use crate::navigation::{fill_skill_bars, reset_skill_bars, NavigationController, NavigationOutcome};
use crate::scheduler::{Debouncer, Fired, Scheduler, TaskHandle};

/// Delayed continuations the site schedules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Empty the skill bars after landing on the about page
    SkillAnimation,
    /// Fill the skill bars to their targets
    SkillFill,
    /// Return the contact form to editing
    FormReset,
    /// Scroll burst settled
    ScrollSettled,
    /// Resize burst settled
    ResizeSettled,
}

/// What was clicked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClickTarget {
    /// An element carrying a page target
    PageLink { page: String },
    MobileToggle,
    Other,
}

/// Browser events delivered by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    /// Document finished loading
    Load,
    Click {
        target: ClickTarget,
    },
    KeyDown {
        key: String,
    },
    Input {
        field: FieldKind,
        value: String,
    },
    Blur {
        field: FieldKind,
    },
    Submit,
    Scroll {
        y: f64,
    },
    Resize {
        width: u32,
    },
    Intersection(IntersectionEntry),
    /// Browser back/forward; the history position has already moved
    PopState,
    UncaughtError {
        message: String,
    },
    UnhandledRejection {
        reason: String,
    },
}

impl UiEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            UiEvent::Load => "load",
            UiEvent::Click { .. } => "click",
            UiEvent::KeyDown { .. } => "key_down",
            UiEvent::Input { .. } => "input",
            UiEvent::Blur { .. } => "blur",
            UiEvent::Submit => "submit",
            UiEvent::Scroll { .. } => "scroll",
            UiEvent::Resize { .. } => "resize",
            UiEvent::Intersection(_) => "intersection",
            UiEvent::PopState => "pop_state",
            UiEvent::UncaughtError { .. } => "uncaught_error",
            UiEvent::UnhandledRejection { .. } => "unhandled_rejection",
        }
    }
}

/// Result of dispatching one event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// The host should suppress the browser's default action
    pub prevent_default: bool,
}

impl EventOutcome {
    fn prevent_default() -> Self {
        Self {
            prevent_default: true,
        }
    }
}

/// The site's client runtime over a document
pub struct App<D: Dom> {
    config: Arc<Config>,
    dom: D,
    navigation: NavigationController,
    form: ContactForm,
    fade_in: FadeInObserver,
    lazy_images: LazyImageLoader,
    scheduler: Scheduler<TimerKind>,
    timers: mpsc::UnboundedReceiver<Fired<TimerKind>>,
    scroll: Debouncer<TimerKind>,
    resize: Debouncer<TimerKind>,
    form_reset: Option<TaskHandle>,
    last_scroll_y: f64,
    last_width: u32,
}

impl<D: Dom> App<D> {
    pub fn new(config: Arc<Config>, dom: D) -> Self {
        let (scheduler, timers) = Scheduler::new();
        let timing = &config.timing;
        let layout = &config.layout;

        Self {
            fade_in: FadeInObserver::new(layout.fade_in_threshold, layout.fade_in_root_margin_px),
            lazy_images: LazyImageLoader::new(),
            scroll: Debouncer::new(TimerKind::ScrollSettled, timing.scroll_debounce()),
            resize: Debouncer::new(TimerKind::ResizeSettled, timing.resize_debounce()),
            navigation: NavigationController::new(),
            form: ContactForm::new(),
            form_reset: None,
            last_scroll_y: 0.0,
            last_width: 0,
            scheduler,
            timers,
            config,
            dom,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn into_dom(self) -> D {
        self.dom
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn form(&self) -> &ContactForm {
        &self.form
    }

    pub fn scheduler(&self) -> &Scheduler<TimerKind> {
        &self.scheduler
    }

    /// Handle of the pending form reset, if one is scheduled
    pub fn form_reset(&self) -> Option<TaskHandle> {
        self.form_reset.filter(|handle| self.scheduler.is_pending(*handle))
    }

    /// Cancel a pending form reset
    ///
    /// Nothing in the event flow calls this; a reset scheduled by a
    /// successful submit always runs.
    pub fn cancel_form_reset(&mut self) -> bool {
        self.form_reset
            .take()
            .map(|handle| self.scheduler.cancel(handle))
            .unwrap_or(false)
    }

    /// Handle one UI event
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&mut self, event: UiEvent) -> Result<EventOutcome> {
        match event {
            UiEvent::Load => {
                let outcome = self.navigation.load(&mut self.dom);
                self.after_navigation(outcome)?;
                if self.config.features.fade_in {
                    self.fade_in.prepare(&mut self.dom);
                }
                if self.config.features.lazy_images {
                    self.lazy_images.prepare(&self.dom);
                }
                Ok(EventOutcome::default())
            },
            UiEvent::Click { target } => match target {
                ClickTarget::PageLink { page } => {
                    self.navigate(&page)?;
                    Ok(EventOutcome::prevent_default())
                },
                ClickTarget::MobileToggle => {
                    effects::toggle_menu(&mut self.dom);
                    Ok(EventOutcome::default())
                },
                ClickTarget::Other => Ok(EventOutcome::default()),
            },
            UiEvent::KeyDown { key } => {
                self.on_key_down(&key)?;
                Ok(EventOutcome::default())
            },
            UiEvent::Input { field, value } => {
                self.dom.set_field_value(field, &value);
                self.form.on_input(field, &mut self.dom);
                Ok(EventOutcome::default())
            },
            UiEvent::Blur { field } => {
                self.form.validate_field(field, &mut self.dom);
                Ok(EventOutcome::default())
            },
            UiEvent::Submit => {
                if let SubmitOutcome::Accepted(submission) = self.form.submit(&mut self.dom)? {
                    let delay = self.config.timing.form_reset_delay();
                    let handle = self.scheduler.schedule(TimerKind::FormReset, delay)?;
                    self.form_reset = Some(handle);
                    debug!(submission_id = %submission.id, task = %handle, "Form reset scheduled");
                }
                Ok(EventOutcome::prevent_default())
            },
            UiEvent::Scroll { y } => {
                self.last_scroll_y = y;
                self.scroll.call(&mut self.scheduler)?;
                Ok(EventOutcome::default())
            },
            UiEvent::Resize { width } => {
                self.last_width = width;
                self.resize.call(&mut self.scheduler)?;
                Ok(EventOutcome::default())
            },
            UiEvent::Intersection(entry) => {
                if self.config.features.fade_in {
                    self.fade_in.on_intersection(&entry, &mut self.dom);
                }
                if self.config.features.lazy_images {
                    self.lazy_images.on_intersection(&entry, &mut self.dom);
                }
                Ok(EventOutcome::default())
            },
            UiEvent::PopState => {
                let outcome = self.navigation.on_pop_state(&mut self.dom);
                self.after_navigation(outcome)?;
                Ok(EventOutcome::default())
            },
            UiEvent::UncaughtError { message } => {
                error!(error_message = %message, "Uncaught error in page script");
                Ok(EventOutcome::default())
            },
            UiEvent::UnhandledRejection { reason } => {
                error!(reason = %reason, "Unhandled promise rejection");
                Ok(EventOutcome::default())
            },
        }
    }

    fn navigate(&mut self, page_id: &str) -> Result<()> {
        let outcome = self.navigation.navigate(page_id, &mut self.dom);
        self.after_navigation(outcome)
    }

    fn after_navigation(&mut self, outcome: NavigationOutcome) -> Result<()> {
        if outcome.animate_skills {
            let delay = self.config.timing.skill_animation_delay();
            self.scheduler.schedule(TimerKind::SkillAnimation, delay)?;
        }
        Ok(())
    }

    fn on_key_down(&mut self, key: &str) -> Result<()> {
        if key == "Escape" {
            effects::close_menu_on_escape(&mut self.dom);
            return Ok(());
        }
        if !self.config.features.keyboard_shortcuts {
            return Ok(());
        }
        match Page::from_shortcut(key) {
            Some(page) => {
                debug!(key, page = %page, "Shortcut");
                self.navigate(page.as_str())
            },
            None => Ok(()),
        }
    }

    /// Run the continuation for a fired timer
    pub fn on_timer(&mut self, kind: TimerKind) -> Result<()> {
        match kind {
            TimerKind::SkillAnimation => {
                let bars = reset_skill_bars(&mut self.dom);
                if bars > 0 {
                    let delay = self.config.timing.skill_fill_delay();
                    self.scheduler.schedule(TimerKind::SkillFill, delay)?;
                }
            },
            TimerKind::SkillFill => {
                let filled = fill_skill_bars(&mut self.dom);
                debug!(filled, "Skill bars filled");
            },
            TimerKind::FormReset => {
                self.form_reset = None;
                self.form.reset(&mut self.dom);
            },
            TimerKind::ScrollSettled => {
                let threshold = self.config.layout.header_scroll_threshold_px;
                effects::update_header(&mut self.dom, self.last_scroll_y, threshold);
            },
            TimerKind::ResizeSettled => {
                let breakpoint = self.config.layout.mobile_breakpoint_px;
                effects::close_menu_above_breakpoint(&mut self.dom, self.last_width, breakpoint);
            },
        }
        Ok(())
    }

    /// Dispatch an event, reporting any error instead of returning it
    pub fn handle_event(&mut self, event: UiEvent) -> Result<()> {
        let span = crate::ui_event_span!(event.kind());
        let _enter = span.enter();
        let timer = Timer::start(event.kind());

        let result = self.dispatch(event);
        if let Some(page) = self.navigation.active() {
            span.record("page", page.as_str());
        }
        timer.stop();

        match result {
            Ok(outcome) => {
                span.record("prevent_default", outcome.prevent_default);
                Ok(())
            },
            Err(e) if e.is_recoverable() => {
                e.report();
                Ok(())
            },
            Err(e) => {
                crate::log_error!(e, "Event handler failed");
                Err(e)
            },
        }
    }

    /// Accept a fire from the scheduler and run it unless it went stale
    pub fn handle_fired(&mut self, fired: Fired<TimerKind>) {
        let handle = fired.handle;
        if let Some(kind) = self.scheduler.accept(fired) {
            let span = crate::timer_span!(handle.to_string().as_str(), kind);
            let _enter = span.enter();
            if let Err(e) = self.on_timer(kind) {
                e.report();
            }
        }
    }

    /// Wait for the next fire, live or stale
    pub async fn next_timer(&mut self) -> Option<Fired<TimerKind>> {
        self.timers.recv().await
    }

    /// Take an already posted fire without waiting
    pub fn try_next_timer(&mut self) -> Option<Fired<TimerKind>> {
        self.timers.try_recv().ok()
    }

    /// Process fires until no timer is pending
    pub async fn settle(&mut self) {
        while self.scheduler.pending() > 0 {
            match self.timers.recv().await {
                Some(fired) => self.handle_fired(fired),
                None => break,
            }
        }
    }

    /// Drive the loop until the inbox closes and every timer has run
    ///
    /// Returns the document in its final state.
    pub async fn run(mut self, mut inbox: mpsc::Receiver<UiEvent>) -> Result<D> {
        info!("Event loop started");
        let mut events = 0usize;

        loop {
            tokio::select! {
                event = inbox.recv() => match event {
                    Some(event) => {
                        events += 1;
                        if let Err(e) = self.handle_event(event) {
                            let dropped = self.scheduler.cancel_all();
                            warn!(events, dropped, "Event loop stopped");
                            return Err(e);
                        }
                    },
                    None => break,
                },
                Some(fired) = self.timers.recv() => self.handle_fired(fired),
            }
        }

        let pending = self.scheduler.pending();
        if pending > 0 {
            debug!(pending, "Inbox closed, settling timers");
        }
        self.settle().await;

        if self.navigation.active().is_none() {
            warn!("Event loop finished with no active page");
        }
        info!(events, "Event loop finished");
        Ok(self.dom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;
    use crate::models::{Bounds, ElementId, FormState, SkillLevel};
    use std::time::Duration;
    use tokio::time::advance;

    fn app() -> App<MemoryDom> {
        let config = Config::defaults().unwrap();
        App::new(Arc::new(config), MemoryDom::portfolio())
    }

    async fn drain(app: &mut App<MemoryDom>) {
        crate::test_utils::run_due_timers(app).await;
    }

    fn key(key: &str) -> UiEvent {
        UiEvent::KeyDown { key: key.to_string() }
    }

    #[test]
    fn test_event_json_shape() {
        let event: UiEvent =
            serde_json::from_str(r#"{"type":"click","target":{"kind":"page_link","page":"about"}}"#)
                .unwrap();
        assert_eq!(
            event,
            UiEvent::Click {
                target: ClickTarget::PageLink {
                    page: "about".to_string()
                }
            }
        );

        let event: UiEvent = serde_json::from_str(r#"{"type":"key_down","key":"2"}"#).unwrap();
        assert_eq!(event, key("2"));

        let event: UiEvent = serde_json::from_str(
            r#"{"type":"intersection","target":"about-intro","bounds":{"top":10.0,"height":100.0},"viewport_height":800.0}"#,
        )
        .unwrap();
        assert_eq!(event.kind(), "intersection");

        let event: UiEvent =
            serde_json::from_str(r#"{"type":"input","field":"email","value":"a@b.c"}"#).unwrap();
        assert_eq!(
            event,
            UiEvent::Input {
                field: FieldKind::Email,
                value: "a@b.c".to_string()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_link_click_prevents_default() {
        let mut app = app();
        app.dispatch(UiEvent::Load).unwrap();

        let outcome = app
            .dispatch(UiEvent::Click {
                target: ClickTarget::PageLink {
                    page: "projects".to_string(),
                },
            })
            .unwrap();
        assert!(outcome.prevent_default);
        assert_eq!(app.navigation().active(), Some(Page::Projects));

        let outcome = app
            .dispatch(UiEvent::Click {
                target: ClickTarget::Other,
            })
            .unwrap();
        assert!(!outcome.prevent_default);
    }

    #[tokio::test(start_paused = true)]
    async fn test_about_replays_skill_bars() {
        let mut app = app();
        app.dispatch(UiEvent::Load).unwrap();
        app.dispatch(key("2")).unwrap();
        assert_eq!(app.scheduler().pending(), 1);

        advance(Duration::from_millis(300)).await;
        drain(&mut app).await;
        assert_eq!(app.dom().skill_fill(0), Some(SkillLevel::EMPTY));

        advance(Duration::from_millis(100)).await;
        drain(&mut app).await;
        assert_eq!(app.dom().skill_fill(0).map(|l| l.percent()), Some(90));
        assert_eq!(app.scheduler().pending(), 0);
    }

    #[test]
    fn test_scheduling_outside_runtime_is_reported() {
        let mut app = app();
        let err = app.dispatch(UiEvent::Scroll { y: 120.0 }).unwrap_err();
        assert!(matches!(err, crate::Error::Scheduler(_)));
        assert!(err.is_recoverable());

        // The loop reports it and keeps going
        assert!(app.handle_event(UiEvent::Resize { width: 1024 }).is_ok());
        app.handle_event(crate::test_utils::page_link("home")).unwrap();
        assert_eq!(app.navigation().active(), Some(Page::Home));
        assert_eq!(app.scheduler().pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_shortcut_press_navigates() {
        let mut app = app();
        app.dispatch(UiEvent::Load).unwrap();

        app.dispatch(key("3")).unwrap();
        assert_eq!(app.navigation().active(), Some(Page::Projects));
        app.dispatch(key("4")).unwrap();
        assert_eq!(app.navigation().active(), Some(Page::Contact));
        assert_eq!(app.dom().history_len(), 3);

        app.dispatch(key("5")).unwrap();
        assert_eq!(app.navigation().active(), Some(Page::Contact));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shortcuts_disabled_by_flag() {
        let mut config = Config::defaults().unwrap();
        config.features.keyboard_shortcuts = false;
        let mut app = App::new(Arc::new(config), MemoryDom::portfolio());
        app.dispatch(UiEvent::Load).unwrap();

        app.dispatch(key("4")).unwrap();
        assert_eq!(app.navigation().active(), Some(Page::Home));

        // Escape is not a shortcut
        app.dom_mut().set_menu_open(true);
        app.dispatch(key("Escape")).unwrap();
        assert!(!app.dom().is_menu_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_burst_updates_header_once_settled() {
        let mut app = app();
        app.dispatch(UiEvent::Scroll { y: 20.0 }).unwrap();
        app.dispatch(UiEvent::Scroll { y: 80.0 }).unwrap();
        app.dispatch(UiEvent::Scroll { y: 120.0 }).unwrap();
        assert_eq!(app.scheduler().pending(), 1);
        assert!(!app.dom().is_header_scrolled());

        advance(Duration::from_millis(10)).await;
        drain(&mut app).await;
        assert!(app.dom().is_header_scrolled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_resize_closes_menu() {
        let mut app = app();
        app.dispatch(UiEvent::Click {
            target: ClickTarget::MobileToggle,
        })
        .unwrap();
        assert!(app.dom().is_menu_open());

        app.dispatch(UiEvent::Resize { width: 500 }).unwrap();
        app.dispatch(UiEvent::Resize { width: 1200 }).unwrap();
        advance(Duration::from_millis(250)).await;
        drain(&mut app).await;
        assert!(!app.dom().is_menu_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_schedules_reset() {
        let mut app = app();
        app.dispatch(UiEvent::Load).unwrap();
        for (field, value) in [
            (FieldKind::Name, "Ada Lovelace"),
            (FieldKind::Email, "ada@example.com"),
            (FieldKind::Message, "Loved the projects section!"),
        ] {
            app.dispatch(UiEvent::Input {
                field,
                value: value.to_string(),
            })
            .unwrap();
        }

        let outcome = app.dispatch(UiEvent::Submit).unwrap();
        assert!(outcome.prevent_default);
        assert_eq!(app.form().state(), FormState::ShowingSuccess);
        assert!(app.form_reset().is_some());

        advance(Duration::from_millis(2999)).await;
        drain(&mut app).await;
        assert_eq!(app.form().state(), FormState::ShowingSuccess);

        advance(Duration::from_millis(1)).await;
        drain(&mut app).await;
        assert_eq!(app.form().state(), FormState::Editing);
        assert!(app.dom().is_form_visible());
        assert!(app.form_reset().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_form_reset() {
        let mut app = app();
        app.dom_mut().set_field_value(FieldKind::Name, "Ada Lovelace");
        app.dom_mut().set_field_value(FieldKind::Email, "ada@example.com");
        app.dom_mut()
            .set_field_value(FieldKind::Message, "Loved the projects section!");
        app.dispatch(UiEvent::Submit).unwrap();

        assert!(app.cancel_form_reset());
        assert!(!app.cancel_form_reset());
        advance(Duration::from_millis(5000)).await;
        drain(&mut app).await;
        assert_eq!(app.form().state(), FormState::ShowingSuccess);
    }

    #[tokio::test(start_paused = true)]
    async fn test_intersection_routes_to_observers() {
        let mut app = app();
        app.dispatch(UiEvent::Load).unwrap();

        app.dispatch(UiEvent::Intersection(IntersectionEntry {
            target: ElementId::new("project-shot-2"),
            bounds: Bounds::new(100.0, 300.0),
            viewport_height: 800.0,
        }))
        .unwrap();
        assert_eq!(app.dom().image_src("project-shot-2"), Some("/img/projects/two.webp"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_host_errors_are_logged_only() {
        let mut app = app();
        app.dispatch(UiEvent::Load).unwrap();
        app.handle_event(UiEvent::UncaughtError {
            message: "boom".to_string(),
        })
        .unwrap();
        app.handle_event(UiEvent::UnhandledRejection {
            reason: "fetch failed".to_string(),
        })
        .unwrap();
        assert_eq!(app.navigation().active(), Some(Page::Home));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_settles_pending_timers() {
        let app = app();
        let (tx, rx) = mpsc::channel(16);
        tx.send(UiEvent::Load).await.unwrap();
        tx.send(key("2")).await.unwrap();
        drop(tx);

        let dom = app.run(rx).await.unwrap();
        assert_eq!(dom.active_sections(), vec![Page::About]);
        assert_eq!(dom.skill_fill(3).map(|l| l.percent()), Some(60));
    }
}
