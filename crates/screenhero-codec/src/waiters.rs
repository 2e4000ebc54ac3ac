//! Lock-protected completion-waiter map, bridging "async callbacks from native
//! codec").
//!
//! The hardware codec produces completions on an arbitrary thread. Rather
//! than bouncing through the owning task, the native callback looks up and
//! signals the matching waiter directly. A callback with no matching waiter
//! (because the frame was dropped, or the session was torn down) is
//! dropped silently.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::oneshot;

use crate::error::CodecError;

/// A lock-protected `{id -> waiter}` map, generic over the completion
/// payload `T`. Shared between the task awaiting the result and the
/// (possibly foreign-thread) completion callback via `Arc`.
pub struct WaiterMap<T> {
    inner: Mutex<HashMap<u64, oneshot::Sender<Result<T, CodecError>>>>,
}

impl<T: Send + 'static> WaiterMap<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Register a waiter for `id`, returning the receiving half.
    pub fn register(&self, id: u64) -> oneshot::Receiver<Result<T, CodecError>> {
        let (tx, rx) = oneshot::channel();
        let mut guard = self.lock();
        guard.insert(id, tx);
        rx
    }

    /// Resolve the waiter for `id`, if one is still registered. Intended to
    /// be called from the codec's completion callback, possibly on a
    /// foreign thread.
    pub fn complete(&self, id: u64, result: Result<T, CodecError>) {
        let sender = {
            let mut guard = self.lock();
            guard.remove(&id)
        };
        match sender {
            Some(tx) => {
                // The receiver may already be gone (caller cancelled); ignore.
                let _ = tx.send(result);
            }
            None => {
                tracing::trace!(id, "codec completion with no matching waiter, dropped");
            }
        }
    }

    /// Drop all outstanding waiters with `Cancelled`, e.g. on `stop()`.
    pub fn cancel_all(&self) {
        let mut guard = self.lock();
        for (_, tx) in guard.drain() {
            let _ = tx.send(Err(CodecError::Cancelled));
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<u64, oneshot::Sender<Result<T, CodecError>>>> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<T: Send + 'static> Default for WaiterMap<T> {
    fn default() -> Self {
        Self::new()
    }
}
