//! Search debounce control
//!
//! Coalesces rapid edits to the path/pattern fields into a single delayed
//! quick search. Any edit within the quiescence window reschedules; Enter
//! drops the pending search entirely and issues an immediate full search.

use std::time::{Duration, Instant};

/// Quiescence window between the last edit and the quick search it issues.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// Pending (path, pattern) pair waiting out the debounce window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSearch {
    pub path: String,
    pub pattern: String,
}

#[derive(Debug)]
pub struct SearchDebouncer {
    pub debounce_delay: Duration,
    pending: Option<PendingSearch>,
    last_input_time: Option<Instant>,
}

impl SearchDebouncer {
    pub fn new() -> Self {
        Self::with_delay(DEBOUNCE_DELAY)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            debounce_delay: delay,
            pending: None,
            last_input_time: None,
        }
    }

    /// Schedule (or reschedule) a quick search for after the window.
    pub fn schedule(&mut self, path: String, pattern: String) {
        self.pending = Some(PendingSearch { path, pattern });
        self.last_input_time = Some(Instant::now());
    }

    /// Drop the pending search, if any.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.last_input_time = None;
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consume and return the pending search once the window has elapsed.
    pub fn poll_ready(&mut self) -> Option<PendingSearch> {
        let last = self.last_input_time?;
        if last.elapsed() >= self.debounce_delay {
            self.last_input_time = None;
            return self.pending.take();
        }
        None
    }
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_debouncer_defaults() {
        let debouncer = SearchDebouncer::new();
        assert_eq!(debouncer.debounce_delay, Duration::from_millis(300));
        assert!(!debouncer.has_pending());
    }

    #[test]
    fn test_schedule_and_cancel() {
        let mut debouncer = SearchDebouncer::new();
        debouncer.schedule("/repo".into(), "TODO".into());
        assert!(debouncer.has_pending());

        debouncer.cancel();
        assert!(!debouncer.has_pending());
        assert!(debouncer.poll_ready().is_none());
    }

    #[test]
    fn test_not_ready_before_window_elapses() {
        let mut debouncer = SearchDebouncer::with_delay(Duration::from_millis(200));
        debouncer.schedule("/repo".into(), "TODO".into());
        assert!(debouncer.poll_ready().is_none());
        assert!(debouncer.has_pending());
    }

    #[test]
    fn test_ready_after_window_elapses() {
        let mut debouncer = SearchDebouncer::with_delay(Duration::from_millis(1));
        debouncer.schedule("/repo".into(), "TODO".into());

        thread::sleep(Duration::from_millis(5));

        let pending = debouncer.poll_ready().unwrap();
        assert_eq!(pending.path, "/repo");
        assert_eq!(pending.pattern, "TODO");
        assert!(!debouncer.has_pending());
    }

    #[test]
    fn test_reschedule_replaces_pending() {
        let mut debouncer = SearchDebouncer::with_delay(Duration::from_millis(1));
        debouncer.schedule("/repo".into(), "TOD".into());
        debouncer.schedule("/repo".into(), "TODO".into());

        thread::sleep(Duration::from_millis(5));

        let pending = debouncer.poll_ready().unwrap();
        assert_eq!(pending.pattern, "TODO");
        assert!(debouncer.poll_ready().is_none());
    }
}
