// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A one-slot coalescing mailbox: a new `set` overwrites any unconsumed prior
//! value, and `get` blocks until a value is present. Used both as the
//! evaluator's trigger and as each worker's per-container request carrier.

use tokio::sync::{Mutex, Notify};

pub struct Signal<T> {
    slot: Mutex<Option<T>>,
    notify: Notify,
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(None),
            notify: Notify::new(),
        }
    }
}

impl<T: Clone> Signal<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any pending payload with `value`, waking a waiting `get`.
    pub async fn set(&self, value: T) {
        *self.slot.lock().await = Some(value);
        self.notify.notify_one();
    }

    /// Wait for and take the pending payload, blocking if none is set yet.
    pub async fn get(&self) -> T {
        loop {
            if let Some(v) = self.slot.lock().await.take() {
                return v;
            }
            self.notify.notified().await;
        }
    }

    /// Take the pending payload without blocking.
    pub async fn try_get(&self) -> Option<T> {
        self.slot.lock().await.take()
    }

    pub async fn is_empty(&self) -> bool {
        self.slot.lock().await.is_none()
    }
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
