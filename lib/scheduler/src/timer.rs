//! One-shot timers with cancellation handles.
//!
//! A timer never calls back into a notifier. When it expires it posts a
//! [`TimerExpiry`] to whoever owns the notifiers, and the owner routes it.
//! The generation in the expiry lets the owner recognize timers that were
//! cancelled or superseded after the message was sent.

use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;
use waypost_core::NodeId;

/// Message posted when a timer expires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerExpiry {
    /// The action node the timer was armed for.
    pub node_id: NodeId,
    /// The notifier generation at arming time.
    pub generation: u64,
}

/// Handle to a running timer.
pub struct TimerHandle {
    expiry: TimerExpiry,
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TimerHandle {
    /// Creates a handle that runs `cancel` when cancelled.
    pub fn new(expiry: TimerExpiry, cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            expiry,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stops the timer. An expiry already posted is not recalled.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            debug!(node_id = %self.expiry.node_id, generation = self.expiry.generation, "cancelling timer");
            cancel();
        }
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

/// Starts one-shot timers.
pub trait Timer {
    /// Starts a timer that posts `expiry` after `delay`.
    fn start(&self, expiry: TimerExpiry, delay: Duration) -> TimerHandle;
}

/// Timer backed by tokio tasks, posting expiries on an unbounded channel.
///
/// Must be used from within a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioTimer {
    sender: mpsc::UnboundedSender<TimerExpiry>,
}

impl TokioTimer {
    /// Creates a timer and the receiving end of its expiry channel.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TimerExpiry>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Timer for TokioTimer {
    fn start(&self, expiry: TimerExpiry, delay: Duration) -> TimerHandle {
        let sender = self.sender.clone();
        let message = expiry.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The receiver is gone only when the owner shut down.
            let _ = sender.send(message);
        });
        let abort = task.abort_handle();
        debug!(node_id = %expiry.node_id, delay_ms = delay.as_millis() as u64, "timer started");
        TimerHandle::new(expiry, move || abort.abort())
    }
}

/// Timer for tests: records started timers and expires them on demand.
#[cfg(test)]
pub(crate) mod manual {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Debug)]
    struct Started {
        expiry: TimerExpiry,
        delay: Duration,
        cancelled: Arc<AtomicBool>,
    }

    #[derive(Debug, Clone, Default)]
    pub(crate) struct ManualTimer {
        started: Arc<Mutex<Vec<Started>>>,
    }

    impl ManualTimer {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        /// Number of timers ever started.
        pub(crate) fn started_count(&self) -> usize {
            self.started.lock().unwrap().len()
        }

        /// Delays of timers ever started, in start order.
        pub(crate) fn delays(&self) -> Vec<Duration> {
            self.started.lock().unwrap().iter().map(|s| s.delay).collect()
        }

        /// Expiries of timers that were started and not cancelled.
        pub(crate) fn live(&self) -> Vec<TimerExpiry> {
            self.started
                .lock()
                .unwrap()
                .iter()
                .filter(|s| !s.cancelled.load(Ordering::SeqCst))
                .map(|s| s.expiry.clone())
                .collect()
        }

        /// Expiries of every timer ever started, cancelled or not.
        pub(crate) fn all(&self) -> Vec<TimerExpiry> {
            self.started
                .lock()
                .unwrap()
                .iter()
                .map(|s| s.expiry.clone())
                .collect()
        }
    }

    impl Timer for ManualTimer {
        fn start(&self, expiry: TimerExpiry, delay: Duration) -> TimerHandle {
            let cancelled = Arc::new(AtomicBool::new(false));
            self.started.lock().unwrap().push(Started {
                expiry: expiry.clone(),
                delay,
                cancelled: Arc::clone(&cancelled),
            });
            TimerHandle::new(expiry, move || cancelled.store(true, Ordering::SeqCst))
        }
    }
}
