//! Rate limiting for bursty UI events

use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

use super::{Scheduler, TaskHandle};
use crate::error::Result;

/// Cancel-and-reschedule: only the last call in a burst fires
#[derive(Debug)]
pub struct Debouncer<K> {
    kind: K,
    window: Duration,
    pending: Option<TaskHandle>,
}

impl<K: Clone + fmt::Debug + Send + 'static> Debouncer<K> {
    pub fn new(kind: K, window: Duration) -> Self {
        Self {
            kind,
            window,
            pending: None,
        }
    }

    /// Restart the window, replacing any pending fire
    pub fn call(&mut self, scheduler: &mut Scheduler<K>) -> Result<TaskHandle> {
        if let Some(previous) = self.pending.take() {
            scheduler.cancel(previous);
        }
        let handle = scheduler.schedule(self.kind.clone(), self.window)?;
        self.pending = Some(handle);
        Ok(handle)
    }

    /// Drop the pending fire, if any
    pub fn cancel(&mut self, scheduler: &mut Scheduler<K>) -> bool {
        self.pending
            .take()
            .map(|handle| scheduler.cancel(handle))
            .unwrap_or(false)
    }

    pub fn is_pending(&self, scheduler: &Scheduler<K>) -> bool {
        self.pending
            .map(|handle| scheduler.is_pending(handle))
            .unwrap_or(false)
    }
}

/// Lets one call through per window and drops the rest
#[derive(Debug, Clone)]
pub struct Throttle {
    window: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Whether a call made now may proceed
    pub fn try_acquire(&mut self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    pub fn try_acquire_at(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.window => false,
            _ => {
                self.last = Some(now);
                true
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn test_debounce_fires_once_for_burst() {
        let (mut scheduler, mut rx) = Scheduler::new();
        let mut debouncer = Debouncer::new("scroll", Duration::from_millis(10));

        let start = Instant::now();
        debouncer.call(&mut scheduler).unwrap();
        advance(Duration::from_millis(5)).await;
        debouncer.call(&mut scheduler).unwrap();
        advance(Duration::from_millis(5)).await;
        let last = debouncer.call(&mut scheduler).unwrap();

        assert_eq!(scheduler.pending(), 1);
        assert!(debouncer.is_pending(&scheduler));

        let fired = rx.recv().await.unwrap();
        assert_eq!(fired.handle, last);
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert_eq!(scheduler.accept(fired), Some("scroll"));

        advance(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
        assert!(!debouncer.is_pending(&scheduler));
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_cancel() {
        let (mut scheduler, mut rx) = Scheduler::new();
        let mut debouncer = Debouncer::new("resize", Duration::from_millis(250));

        debouncer.call(&mut scheduler).unwrap();
        assert!(debouncer.cancel(&mut scheduler));
        assert!(!debouncer.cancel(&mut scheduler));

        advance(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_throttle_drops_calls_inside_window() {
        let mut throttle = Throttle::new(Duration::from_millis(100));
        let t0 = Instant::now();

        assert!(throttle.try_acquire_at(t0));
        assert!(!throttle.try_acquire_at(t0 + Duration::from_millis(40)));
        assert!(!throttle.try_acquire_at(t0 + Duration::from_millis(99)));
        assert!(throttle.try_acquire_at(t0 + Duration::from_millis(100)));
        assert!(!throttle.try_acquire_at(t0 + Duration::from_millis(150)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_reopens_after_window() {
        let mut throttle = Throttle::new(Duration::from_millis(100));
        assert!(throttle.try_acquire());
        assert!(!throttle.try_acquire());

        advance(Duration::from_millis(100)).await;
        assert!(throttle.try_acquire());
    }

    #[test]
    fn test_zero_window_never_throttles() {
        let mut throttle = Throttle::new(Duration::ZERO);
        let t0 = Instant::now();
        assert!(throttle.try_acquire_at(t0));
        assert!(throttle.try_acquire_at(t0));
    }
}
