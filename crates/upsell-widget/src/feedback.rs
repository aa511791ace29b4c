//! Transient feedback timer.
//!
//! The error signal is a deadline, not a running timer: it is active until
//! `timeout` has passed since the most recent `raise`. Re-raising moves the
//! deadline, so there is never more than one pending expiry per signal.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::config::DEFAULT_FEEDBACK_TIMEOUT_MS;

/// Self-clearing error banner signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSignal {
    timeout: Duration,
    raised_at: Option<Instant>,
}

impl ErrorSignal {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            raised_at: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Raise the signal, restarting the full timeout.
    pub fn raise(&mut self, now: Instant) {
        debug!(timeout_ms = self.timeout.as_millis() as u64, "error signal raised");
        self.raised_at = Some(now);
    }

    /// Whether the banner is visible at `now`.
    pub fn is_active(&self, now: Instant) -> bool {
        self.deadline().is_some_and(|deadline| now < deadline)
    }

    /// When the signal clears, if it is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.raised_at.map(|raised| raised + self.timeout)
    }

    /// Clear the signal if its deadline has passed. Returns `true` if it did.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.deadline() {
            Some(deadline) if now >= deadline => {
                debug!("error signal cleared");
                self.raised_at = None;
                true
            }
            _ => false,
        }
    }

    /// Cancel any pending expiry.
    pub fn clear(&mut self) {
        self.raised_at = None;
    }
}

impl Default for ErrorSignal {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_FEEDBACK_TIMEOUT_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_clears_after_timeout() {
        let t0 = Instant::now();
        let mut signal = ErrorSignal::default();
        assert!(!signal.is_active(t0));

        signal.raise(t0);
        assert!(signal.is_active(t0));
        assert!(signal.is_active(t0 + ms(2999)));
        assert!(!signal.is_active(t0 + ms(3000)));

        assert!(!signal.expire(t0 + ms(2999)));
        assert!(signal.expire(t0 + ms(3000)));
        assert!(signal.deadline().is_none());
    }

    #[test]
    fn test_reraise_restarts_timer() {
        let t0 = Instant::now();
        let mut signal = ErrorSignal::default();

        signal.raise(t0);
        signal.raise(t0 + ms(1000));

        assert!(signal.is_active(t0 + ms(3500)));
        assert!(!signal.expire(t0 + ms(3500)));
        assert_eq!(signal.deadline(), Some(t0 + ms(4000)));

        assert!(!signal.is_active(t0 + ms(4001)));
        assert!(signal.expire(t0 + ms(4001)));
    }

    #[test]
    fn test_clear_cancels_pending_expiry() {
        let t0 = Instant::now();
        let mut signal = ErrorSignal::new(ms(500));
        signal.raise(t0);
        signal.clear();

        assert!(!signal.is_active(t0));
        assert!(signal.deadline().is_none());
        assert!(!signal.expire(t0 + ms(500)));
    }
}
