//! Cooperative cancellation, observed at superstep boundaries and at
//! handler `.await` points (SPEC_FULL §4.2).
//!
//! The teacher's loop checks explicit flags inline (`pregel/loop_impl.rs`);
//! we fold that into one clonable handle so a caller outside the run loop
//! (e.g. an HTTP request being dropped) can cancel without holding a
//! reference to the runner itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Clone, Default)]
pub struct CancelSignal {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves immediately if already cancelled, otherwise waits for
    /// [`Self::cancel`]. Race-free: `notify_waiters` only wakes tasks
    /// already registered, so a task that checks [`Self::is_cancelled`]
    /// right before calling this would otherwise hang past a cancel that
    /// landed in between — callers select! against this alongside their
    /// real work rather than awaiting it bare.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        self.notify.notified().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancelled_resolves_immediately_if_already_cancelled() {
        let signal = CancelSignal::new();
        signal.cancel();
        signal.cancelled().await;
        assert!(signal.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_resolves_once_cancel_is_called() {
        let signal = CancelSignal::new();
        let waiter = signal.clone();
        let handle = tokio::spawn(async move {
            waiter.cancelled().await;
        });
        tokio::task::yield_now().await;
        signal.cancel();
        handle.await.unwrap();
    }
}
