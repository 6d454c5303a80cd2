//! Completion gate between the producer loop and the engine callback thread.
//!
//! A counting signal with initial count zero. The engine's release callback
//! raises it once per consumed frame; the producer waits once per submitted
//! frame before reusing the buffer. Signals and waits are paired 1:1, which
//! is what keeps at most one frame in flight.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

pub struct CompletionGate {
    count: Mutex<u64>,
    ready: Condvar,
}

impl CompletionGate {
    pub fn new() -> Self {
        Self {
            count: Mutex::new(0),
            ready: Condvar::new(),
        }
    }

    /// Raise the gate. Non-blocking; safe to call from the engine's callback
    /// thread, which must never be able to fail or block here.
    pub fn signal(&self) {
        let mut count = recover(self.count.lock());
        *count += 1;
        drop(count);
        self.ready.notify_one();
    }

    /// Block until a matching `signal` has occurred, then consume it.
    pub fn wait(&self) {
        let mut count = recover(self.count.lock());
        while *count == 0 {
            count = recover(self.ready.wait(count));
        }
        *count -= 1;
    }

    /// Like `wait`, but give up after `timeout`. Returns true when a signal
    /// was consumed. The feed loop itself never uses this; it exists so tests
    /// and embedders can bound a wait.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        let mut count = recover(self.count.lock());
        while *count == 0 {
            let now = std::time::Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = self
                .ready
                .wait_timeout(count, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            count = guard;
        }
        *count -= 1;
        true
    }

    /// Signals raised but not yet consumed by a wait.
    pub fn pending(&self) -> u64 {
        *recover(self.count.lock())
    }
}

impl Default for CompletionGate {
    fn default() -> Self {
        Self::new()
    }
}

// A poisoned lock still holds a valid count; the writer only ever increments
// or decrements it. Recover instead of propagating the panic.
fn recover<'a, T>(
    result: Result<MutexGuard<'a, T>, PoisonError<MutexGuard<'a, T>>>,
) -> MutexGuard<'a, T> {
    result.unwrap_or_else(PoisonError::into_inner)
}
