//! # Requeue backoff
//!
//! Failed reconciliations are requeued following a Fibonacci sequence in
//! minutes: 1m, 1m, 2m, 3m, 5m, 8m, then capped at 10m. The sequence grows
//! more slowly than exponential backoff, so a platform network that is
//! waiting on a user edit is not forgotten for hours.
//!
//! `BackoffTracker` keeps one sequence per resource key and resets it as soon
//! as that resource reconciles cleanly.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Fibonacci backoff sequence, in minutes
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    min_minutes: u64,
    prev_minutes: u64,
    current_minutes: u64,
    max_minutes: u64,
}

impl FibonacciBackoff {
    /// Sequence starting at `min_minutes` (used twice) and capped at `max_minutes`
    #[must_use]
    pub fn new(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            min_minutes,
            prev_minutes: 0,
            current_minutes: min_minutes,
            max_minutes,
        }
    }

    /// Current delay, advancing the sequence
    pub fn next_backoff(&mut self) -> Duration {
        let delay = Duration::from_secs(self.current_minutes * 60);

        let next_minutes = self.prev_minutes + self.current_minutes;
        self.prev_minutes = self.current_minutes;
        self.current_minutes = next_minutes.min(self.max_minutes);

        delay
    }

    /// Restart the sequence
    pub fn reset(&mut self) {
        self.prev_minutes = 0;
        self.current_minutes = self.min_minutes;
    }
}

impl Default for FibonacciBackoff {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

/// Per-resource backoff state keyed by `namespace/name`
#[derive(Debug, Default)]
pub struct BackoffTracker {
    states: Mutex<HashMap<String, FibonacciBackoff>>,
}

impl BackoffTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay before retrying `key` after another failure
    pub fn on_failure(&self, key: &str) -> Duration {
        let mut states = self.states.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        states.entry(key.to_string()).or_default().next_backoff()
    }

    /// Forget the failure history of `key`
    pub fn on_success(&self, key: &str) {
        let mut states = self.states.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(backoff) = states.get_mut(key) {
            backoff.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minutes(m: u64) -> Duration {
        Duration::from_secs(m * 60)
    }

    #[test]
    fn test_fibonacci_sequence_is_capped() {
        let mut backoff = FibonacciBackoff::default();
        let observed: Vec<Duration> = (0..9).map(|_| backoff.next_backoff()).collect();
        let expected: Vec<Duration> = [1, 1, 2, 3, 5, 8, 10, 10, 10].into_iter().map(minutes).collect();
        assert_eq!(observed, expected);
    }

    #[test]
    fn test_reset_restarts_sequence() {
        let mut backoff = FibonacciBackoff::default();
        for _ in 0..4 {
            backoff.next_backoff();
        }
        backoff.reset();
        assert_eq!(backoff.next_backoff(), minutes(1));
        assert_eq!(backoff.next_backoff(), minutes(1));
        assert_eq!(backoff.next_backoff(), minutes(2));
    }

    #[test]
    fn test_tracker_keeps_resources_apart() {
        let tracker = BackoffTracker::new();
        assert_eq!(tracker.on_failure("default/oam"), minutes(1));
        assert_eq!(tracker.on_failure("default/oam"), minutes(1));
        assert_eq!(tracker.on_failure("default/oam"), minutes(2));
        assert_eq!(tracker.on_failure("default/mgmt"), minutes(1));

        tracker.on_success("default/oam");
        assert_eq!(tracker.on_failure("default/oam"), minutes(1));
        assert_eq!(tracker.on_failure("default/mgmt"), minutes(1));
    }
}
