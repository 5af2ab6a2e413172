//! Quiet-period debouncing for typed input.
//!
//! A [`Debouncer`] holds at most one pending value and its deadline. Each
//! [`push`](Debouncer::push) replaces both, so a burst of edits inside the
//! window collapses into the last one. The owner awaits
//! [`settled`](Debouncer::settled) alongside its other event sources.

use std::time::Duration;

use tokio::time::{Instant, sleep_until};

/// Single-owner debounce timer.
#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    /// Create a debouncer with the given quiet period.
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// The quiet period.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Schedule `value`, superseding any value still waiting.
    pub fn push(&mut self, value: T) {
        self.pending = Some((value, Instant::now() + self.window));
    }

    /// Drop the pending value, if any.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Whether a value is waiting for its quiet period to end.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Wait until the pending value's quiet period has elapsed and take it.
    ///
    /// Never resolves while nothing is pending. Cancel-safe: if the future is
    /// dropped before completing, the pending value and its deadline are kept.
    pub async fn settled(&mut self) -> T {
        let Some(deadline) = self.pending.as_ref().map(|(_, deadline)| *deadline) else {
            return std::future::pending().await;
        };

        sleep_until(deadline).await;

        match self.pending.take() {
            Some((value, _)) => value,
            None => std::future::pending().await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(500);

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_collapse_to_last() {
        let mut debouncer = Debouncer::new(WINDOW);

        for value in ["c", "ci", "civ", "Civ"] {
            tokio::time::advance(Duration::from_millis(100)).await;
            debouncer.push(value.to_string());
        }
        let last_push = Instant::now();

        let settled = debouncer.settled().await;

        assert_eq!(settled, "Civ");
        assert!(Instant::now() >= last_push + WINDOW);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_one_value_fires() {
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.push(1);
        debouncer.push(2);

        assert_eq!(debouncer.settled().await, 2);

        let again = tokio::time::timeout(Duration::from_secs(5), debouncer.settled()).await;
        assert!(again.is_err(), "nothing else should settle");
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_full_window_after_last_push() {
        let mut debouncer = Debouncer::new(WINDOW);
        let start = Instant::now();
        debouncer.push("a");
        tokio::time::advance(Duration::from_millis(400)).await;
        debouncer.push("b");

        assert_eq!(debouncer.settled().await, "b");
        assert!(Instant::now() >= start + Duration::from_millis(900));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending() {
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.push("a");
        debouncer.cancel();

        let result = tokio::time::timeout(Duration::from_secs(2), debouncer.settled()).await;
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_is_cancel_safe() {
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.push("keep");

        // Abandon the first wait half way through.
        let early = tokio::time::timeout(Duration::from_millis(200), debouncer.settled()).await;
        assert!(early.is_err());
        assert!(debouncer.is_pending());

        assert_eq!(debouncer.settled().await, "keep");
    }
}
