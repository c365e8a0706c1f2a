//! Fixed-interval readiness polling.
//!
//! The automated application offers no push notifications, so every
//! externally-owned state change (X server up, window visible, focus moved,
//! output file written) is detected by probing at a fixed interval until a
//! deadline. [`wait_until`] is the single combinator behind all of those
//! waits.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::errors::KiprintError;

/// Probe cadence used by all window-system waits.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, thiserror::Error)]
pub enum WaitError {
    #[error("Timed out after {timeout:?} waiting for {what}")]
    Timeout { what: String, timeout: Duration },
}

impl KiprintError for WaitError {
    fn error_code(&self) -> &'static str {
        match self {
            WaitError::Timeout { .. } => "WAIT_TIMEOUT",
        }
    }
}

/// Poll `probe` every `interval` until it yields a value or `timeout` elapses.
///
/// The probe runs once immediately, so a condition that already holds never
/// sleeps. The timeout error is only raised once at least `timeout` has
/// elapsed, never a poll interval early.
pub fn wait_until<T, F>(
    what: &str,
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> Result<T, WaitError>
where
    F: FnMut() -> Option<T>,
{
    let started = Instant::now();
    loop {
        if let Some(value) = probe() {
            return Ok(value);
        }
        if started.elapsed() >= timeout {
            return Err(WaitError::Timeout {
                what: what.to_string(),
                timeout,
            });
        }
        debug!(event = "core.wait.retry", what = what);
        std::thread::sleep(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immediate_success_does_not_sleep() {
        let started = Instant::now();
        let result = wait_until(
            "already-true condition",
            Duration::from_secs(5),
            Duration::from_secs(5),
            || Some(7),
        );
        assert_eq!(result.unwrap(), 7);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_success_after_retries() {
        let mut calls = 0;
        let result = wait_until(
            "third probe",
            Duration::from_secs(2),
            Duration::from_millis(10),
            || {
                calls += 1;
                (calls == 3).then_some(calls)
            },
        );
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn test_timeout_elapses_fully() {
        let timeout = Duration::from_millis(100);
        let interval = Duration::from_millis(20);
        let started = Instant::now();
        let result: Result<(), _> = wait_until("never-true condition", timeout, interval, || None);
        let elapsed = started.elapsed();

        match result {
            Err(WaitError::Timeout { what, timeout: t }) => {
                assert_eq!(what, "never-true condition");
                assert_eq!(t, timeout);
            }
            Ok(()) => panic!("expected timeout"),
        }
        // The error must not fire early (before timeout - interval).
        assert!(elapsed >= timeout, "timed out after only {:?}", elapsed);
    }

    #[test]
    fn test_error_code() {
        let err = WaitError::Timeout {
            what: "x".to_string(),
            timeout: Duration::from_secs(1),
        };
        assert_eq!(err.error_code(), "WAIT_TIMEOUT");
        assert!(!err.is_user_error());
    }
}
