//! Trigger Debouncing
//!
//! Each trigger aborts the pending timer and starts a new one, so only the
//! last trigger inside the delay window is delivered.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;

pub struct Debouncer<T> {
    delay: Duration,
    tx: mpsc::Sender<T>,
    pending: Option<AbortHandle>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration, tx: mpsc::Sender<T>) -> Self {
        Self { delay, tx, pending: None }
    }

    /// Schedule `value` for delivery after the delay, replacing any pending one.
    /// Must be called from within a tokio runtime.
    pub fn trigger(&mut self, value: T) {
        self.cancel();

        let tx = self.tx.clone();
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(value).await;
        });
        self.pending = Some(handle.abort_handle());
    }

    /// Drop the pending trigger, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// True while a trigger is waiting for its delay to elapse
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
