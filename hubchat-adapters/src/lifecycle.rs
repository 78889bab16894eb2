//! Per-send cancellation and in-flight tracking.
//!
//! Every adapter owns one [`SendLifecycle`]. A send calls [`SendLifecycle::begin`],
//! which refuses to start while another send is in flight and registers a fresh
//! [`CancellationToken`]. The returned [`SendGuard`] hands that token to the
//! decode loop and clears the registration when dropped, whatever the outcome.

use hubchat_core::{AdapterError, AdapterResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::CancellationToken;

/// Cancellation slot plus the in-flight flag of one adapter instance.
#[derive(Debug, Default)]
pub struct SendLifecycle {
    active: Mutex<Option<CancellationToken>>,
    in_flight: AtomicBool,
}

impl SendLifecycle {
    /// Create an idle lifecycle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a send.
    ///
    /// Fails with [`AdapterError::Busy`] while another send holds a guard.
    pub fn begin(&self) -> AdapterResult<SendGuard<'_>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(AdapterError::Busy);
        }

        let token = CancellationToken::new();
        *self.active.lock() = Some(token.clone());

        Ok(SendGuard {
            lifecycle: self,
            token,
        })
    }

    /// Signal the active token, if any, and clear it.
    ///
    /// Returns whether a send was signalled. Safe to call repeatedly or when idle.
    pub fn cancel(&self) -> bool {
        match self.active.lock().take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Whether a send currently holds a guard.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Registration of one in-flight send; releases it on drop.
#[derive(Debug)]
pub struct SendGuard<'a> {
    lifecycle: &'a SendLifecycle,
    token: CancellationToken,
}

impl SendGuard<'_> {
    /// Token observed by this send's decode loop.
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for SendGuard<'_> {
    fn drop(&mut self) {
        self.lifecycle.active.lock().take();
        self.lifecycle.in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_is_exclusive() {
        let lifecycle = SendLifecycle::new();
        let guard = lifecycle.begin().unwrap();
        assert!(lifecycle.is_in_flight());
        assert!(matches!(lifecycle.begin(), Err(AdapterError::Busy)));

        drop(guard);
        assert!(!lifecycle.is_in_flight());
        assert!(lifecycle.begin().is_ok());
    }

    #[test]
    fn test_cancel_signals_active_token() {
        let lifecycle = SendLifecycle::new();
        let guard = lifecycle.begin().unwrap();
        let token = guard.token().clone();

        assert!(lifecycle.cancel());
        assert!(token.is_cancelled());
        // Already cleared: second call is a no-op.
        assert!(!lifecycle.cancel());
    }

    #[test]
    fn test_cancel_when_idle() {
        let lifecycle = SendLifecycle::new();
        assert!(!lifecycle.cancel());
        assert!(!lifecycle.cancel());
    }

    #[test]
    fn test_new_send_gets_fresh_token() {
        let lifecycle = SendLifecycle::new();
        {
            let _guard = lifecycle.begin().unwrap();
            lifecycle.cancel();
        }
        let guard = lifecycle.begin().unwrap();
        assert!(!guard.token().is_cancelled());
    }

    #[test]
    fn test_cancel_wakes_waiting_loop() {
        let lifecycle = SendLifecycle::new();
        let guard = lifecycle.begin().unwrap();
        let token = guard.token().clone();

        let mut waiting = tokio_test::task::spawn(token.cancelled());
        tokio_test::assert_pending!(waiting.poll());

        lifecycle.cancel();
        assert!(waiting.is_woken());
        tokio_test::assert_ready!(waiting.poll());
    }
}
