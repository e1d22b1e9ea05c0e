//! Synchronization utilities for multi-threaded scans.
//!
//! # Key Components
//!
//! - [`CancellationToken`] - A shared flag that stops a scan between two classes
//!
//! A scan never interrupts a class in the middle of decoding: workers observe the token
//! before picking up the next byte source, so every class is either fully registered or
//! not touched at all.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use crate::{Error, Result};

#[derive(Debug, Default)]
struct TokenState {
    cancelled: AtomicBool,
    reason: Mutex<Option<String>>,
}

/// A cloneable cancellation flag shared between a scan and its caller.
///
/// Clones observe the same state. Cancelling is one-way; the first reason given is kept.
///
/// # Examples
///
/// ```rust
/// use jvmscope::CancellationToken;
/// use std::thread;
///
/// let token = CancellationToken::new();
/// let worker = token.clone();
///
/// let handle = thread::spawn(move || {
///     let mut processed = 0;
///     while !worker.is_cancelled() && processed < 1_000_000 {
///         processed += 1;
///     }
///     processed
/// });
///
/// token.cancel_with("shutting down");
/// handle.join().unwrap();
/// assert_eq!(token.reason().as_deref(), Some("shutting down"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    state: Arc<TokenState>,
}

impl CancellationToken {
    /// Create a token in the running state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation without a reason
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::Release);
    }

    /// Request cancellation, recording `reason` unless one was recorded before
    pub fn cancel_with(&self, reason: impl Into<String>) {
        {
            let mut guard = lock!(self.state.reason);
            if guard.is_none() {
                *guard = Some(reason.into());
            }
        }
        self.cancel();
    }

    /// Returns `true` once cancellation was requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::Acquire)
    }

    /// The first cancellation reason, if any
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        lock!(self.state.reason).clone()
    }

    /// Fail if cancellation was requested.
    ///
    /// # Errors
    /// Returns [`crate::Error::Error`] carrying the cancellation reason.
    pub fn check(&self) -> Result<()> {
        if !self.is_cancelled() {
            return Ok(());
        }

        match self.reason() {
            Some(reason) => Err(Error::Error(format!("Scan cancelled: {reason}"))),
            None => Err(Error::Error("Scan cancelled".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn starts_running() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(token.reason().is_none());
        assert!(token.check().is_ok());
    }

    #[test]
    fn clones_share_state() {
        let token = CancellationToken::new();
        let clone = token.clone();

        clone.cancel();
        assert!(token.is_cancelled());
        assert!(token.check().is_err());
    }

    #[test]
    fn first_reason_wins() {
        let token = CancellationToken::new();
        token.cancel_with("first");
        token.cancel_with("second");

        assert_eq!(token.reason().as_deref(), Some("first"));
        let err = token.check().unwrap_err();
        assert!(err.to_string().contains("first"));
    }

    #[test]
    fn visible_across_threads() {
        let token = CancellationToken::new();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let token = token.clone();
                thread::spawn(move || {
                    if i == 2 {
                        token.cancel_with(format!("worker {i}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(token.is_cancelled());
        assert_eq!(token.reason().as_deref(), Some("worker 2"));
    }
}
