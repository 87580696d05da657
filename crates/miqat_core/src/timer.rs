use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use tokio::task::AbortHandle;

use crate::clock::Clock;

struct Armed<T> {
    id: u64,
    at: DateTime<Utc>,
    tag: T,
    handle: AbortHandle,
}

/// A single cancellable deferred task.
///
/// Arming replaces whatever was armed before, so at most one task is ever
/// pending. The delay is measured against the injected clock when armed and
/// then slept on the tokio timer.
pub struct OneShotTimer<T> {
    clock: Arc<dyn Clock>,
    next_id: AtomicU64,
    slot: Arc<Mutex<Option<Armed<T>>>>,
}

impl<T: Copy + Send + 'static> OneShotTimer<T> {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            next_id: AtomicU64::new(0),
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Runs `task` at `at`, cancelling any pending task. Instants in the past
    /// fire immediately. Must be called inside a tokio runtime.
    pub fn arm(&self, at: DateTime<Utc>, tag: T, task: BoxFuture<'static, ()>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let delay = (at - self.clock.now()).to_std().unwrap_or_default();
        let slot = Arc::clone(&self.slot);

        let mut guard = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = guard.take() {
            previous.handle.abort();
        }
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
                if guard.as_ref().is_some_and(|armed| armed.id == id) {
                    *guard = None;
                }
            }
            task.await;
        })
        .abort_handle();
        *guard = Some(Armed { id, at, tag, handle });
    }

    /// Cancels the pending task, if any. Idempotent.
    pub fn cancel(&self) -> bool {
        let armed = self.slot.lock().unwrap_or_else(PoisonError::into_inner).take();
        match armed {
            Some(armed) => {
                armed.handle.abort();
                true
            }
            None => false,
        }
    }

    /// When and what is pending.
    pub fn armed(&self) -> Option<(DateTime<Utc>, T)> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|armed| (armed.at, armed.tag))
    }
}

impl<T> Drop for OneShotTimer<T> {
    fn drop(&mut self) {
        if let Some(armed) = self.slot.lock().unwrap_or_else(PoisonError::into_inner).take() {
            armed.handle.abort();
        }
    }
}
